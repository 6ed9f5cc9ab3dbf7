//! Host-supplied module catalog.

use std::sync::Arc;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::ExprArena;
use vela_ir::{StringInterner, VersionNumber};

/// One catalog module: its header and the text of its declaration.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    /// `\`-joined qualified name.
    pub name: Arc<str>,
    pub version: VersionNumber,
    pub text: Arc<str>,
}

/// Modules available to `using` besides those a script declares.
///
/// Sources are parsed once when added to validate them and split them
/// into one entry per module. Each compilation that imports an entry
/// parses its text again into the script's own arena.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every module declared in `source`. Returns how many were added.
    pub fn add(&mut self, source: &str) -> Result<usize, Diagnostic> {
        let interner = StringInterner::new();
        let mut arena = ExprArena::new();
        let modules = vela_parse::parse_modules(source, &interner, &mut arena)?;
        for module in &modules {
            let name: Arc<str> = Arc::from(module.name.display(&interner));
            if module.name.is_rooted() {
                return Err(Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!("module name `{name}` cannot be rooted"))
                    .with_label(module.span, "declared here"));
            }
            if self.find(&name, module.version).is_some() {
                return Err(Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "module `{name}` version {} is already in the catalog",
                        module.version
                    ))
                    .with_label(module.span, "declared again here"));
            }
            tracing::debug!(module = %name, version = %module.version, "catalog module added");
            self.entries.push(CatalogEntry {
                name,
                version: module.version,
                text: Arc::from(module.span.slice(source)),
            });
        }
        Ok(modules.len())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str, version: VersionNumber) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.name.as_ref() == name && e.version == version)
    }

    /// Entries named `name`.
    pub fn versions<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries.iter().filter(move |e| e.name.as_ref() == name)
    }
}

/// Pick the version a `using` binds to: the highest available version with
/// the requested major that is at least the requested version, or the
/// highest overall when no version was requested.
pub fn select_version(
    available: impl IntoIterator<Item = VersionNumber>,
    requested: Option<VersionNumber>,
) -> Option<VersionNumber> {
    available
        .into_iter()
        .filter(|v| requested.map_or(true, |r| v.satisfies(r)))
        .max()
}
