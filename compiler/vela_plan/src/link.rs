//! Import resolution: which module every `using` refers to.
//!
//! Catalog modules that a script imports are parsed into the script's
//! arena here, so the rest of planning and compilation sees one arena.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{ModuleDecl, Script};
use vela_ir::{Name, QualifiedName, Span, StringInterner, VersionNumber};
use vela_runtime::builtins;

use crate::catalog::select_version;
use crate::{Catalog, ModuleOrigin};

/// A module declaration available to the script.
pub(crate) struct LinkedModule {
    pub(crate) decl: ModuleDecl,
    pub(crate) origin: ModuleOrigin,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ImportTarget {
    System,
    /// Index into [`Linked::modules`].
    Module(usize),
}

pub(crate) struct Import {
    pub(crate) target: ImportTarget,
    pub(crate) alias: Option<Name>,
}

pub(crate) struct Linked {
    pub(crate) modules: Vec<LinkedModule>,
    pub(crate) imports: Vec<Import>,
}

struct Request {
    target: QualifiedName,
    version: Option<VersionNumber>,
    alias: Option<Name>,
    span: Span,
}

/// Split a `\`-separated module name from the options.
fn parse_name(text: &str, interner: &StringInterner) -> QualifiedName {
    let rooted = text.starts_with('\\');
    QualifiedName::new(
        text.split('\\').filter(|c| !c.is_empty()).map(|c| interner.intern(c)),
        rooted,
    )
}

#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn link(
    script: &mut Script,
    catalog: &Catalog,
    interner: &StringInterner,
    default_usings: &[String],
) -> Result<Linked, Diagnostic> {
    let mut modules: Vec<LinkedModule> = Vec::new();
    for decl in &script.modules {
        let name = decl.name.display(interner);
        if decl.name.is_rooted() {
            return Err(Diagnostic::error(ErrorCode::E2003)
                .with_message(format!("module name `{name}` cannot be rooted"))
                .with_label(decl.span, "declared here"));
        }
        if modules
            .iter()
            .any(|m| m.decl.name == decl.name && m.decl.version == decl.version)
        {
            return Err(Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "module `{name}` version {} is declared twice",
                    decl.version
                ))
                .with_label(decl.span, "declared again here"));
        }
        modules.push(LinkedModule {
            decl: decl.clone(),
            origin: ModuleOrigin::Script,
        });
    }

    let requests = default_usings
        .iter()
        .map(|text| Request {
            target: parse_name(text, interner),
            version: None,
            alias: None,
            span: Span::DUMMY,
        })
        .chain(script.usings.iter().map(|using| Request {
            target: using.target.unrooted(),
            version: using.version,
            alias: using.alias.map(|a| a.name),
            span: using.span,
        }))
        .collect::<Vec<_>>();

    let mut imports: Vec<Import> = Vec::new();
    for request in requests {
        let target = resolve_request(&request, &mut modules, catalog, interner, &mut script.arena)?;
        if imports
            .iter()
            .any(|i| i.target == target && i.alias == request.alias)
        {
            continue;
        }
        tracing::debug!(
            module = %request.target.display(interner),
            alias = request.alias.is_some(),
            "import registered"
        );
        imports.push(Import {
            target,
            alias: request.alias,
        });
    }

    // Modules the script declares are always in scope.
    for index in 0..modules.len() {
        let target = ImportTarget::Module(index);
        if modules[index].origin == ModuleOrigin::Script
            && !imports.iter().any(|i| i.target == target)
        {
            imports.push(Import {
                target,
                alias: None,
            });
        }
    }

    Ok(Linked { modules, imports })
}

fn resolve_request(
    request: &Request,
    modules: &mut Vec<LinkedModule>,
    catalog: &Catalog,
    interner: &StringInterner,
    arena: &mut vela_ir::ExprArena,
) -> Result<ImportTarget, Diagnostic> {
    let module_name = request.target.display(interner);
    if module_name == builtins::MODULE_NAME {
        let version = builtins::version();
        if request.version.map_or(true, |r| version.satisfies(r)) {
            return Ok(ImportTarget::System);
        }
        return Err(no_version(&module_name, request, [version]));
    }

    let declared = modules
        .iter()
        .filter(|m| m.decl.name == request.target)
        .map(|m| m.decl.version);
    let listed = catalog.versions(&module_name).map(|e| e.version);
    let available: Vec<VersionNumber> = declared.chain(listed).collect();
    if available.is_empty() {
        return Err(Diagnostic::error(ErrorCode::E2006)
            .with_message(format!("unknown module `{module_name}`"))
            .with_label(request.span, "imported here"));
    }
    let Some(version) = select_version(available.iter().copied(), request.version) else {
        return Err(no_version(&module_name, request, available));
    };

    if let Some(index) = modules
        .iter()
        .position(|m| m.decl.name == request.target && m.decl.version == version)
    {
        return Ok(ImportTarget::Module(index));
    }

    let Some(entry) = catalog.versions(&module_name).find(|e| e.version == version) else {
        return Err(Diagnostic::error(ErrorCode::E9001)
            .with_message(format!("catalog entry for `{module_name}` {version} disappeared")));
    };
    let parsed = vela_parse::parse_modules(&entry.text, interner, arena).map_err(|d| {
        d.with_note(format!(
            "in catalog module `{module_name}` {version}; positions refer to the module text"
        ))
    })?;
    let Some(decl) = parsed.into_iter().find(|d| d.version == version) else {
        return Err(Diagnostic::error(ErrorCode::E9001)
            .with_message(format!("catalog text for `{module_name}` declares no module")));
    };
    tracing::debug!(module = %module_name, %version, "linked catalog module");
    modules.push(LinkedModule {
        decl,
        origin: ModuleOrigin::Catalog,
    });
    Ok(ImportTarget::Module(modules.len() - 1))
}

fn no_version(
    display: &str,
    request: &Request,
    available: impl IntoIterator<Item = VersionNumber>,
) -> Diagnostic {
    let list = available
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let wanted = request
        .version
        .map_or_else(String::new, |v| format!(" compatible with {v}"));
    Diagnostic::error(ErrorCode::E2006)
        .with_message(format!("no version of module `{display}`{wanted}"))
        .with_label(request.span, "imported here")
        .with_note(format!("available versions: {list}"))
}
