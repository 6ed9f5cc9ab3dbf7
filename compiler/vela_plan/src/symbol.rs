//! Symbols and the modules that own them.

use std::sync::Arc;

use vela_ir::ast::{MemberDecl, MemberKind, ModuleDecl};
use vela_ir::{QualifiedName, Span, VersionNumber};
use vela_runtime::builtins::BuiltinId;
use vela_types::Type;

use crate::FrameId;

/// Index of a [`Symbol`] in a [`Plan`](crate::Plan).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub(crate) fn new(index: usize) -> Self {
        SymbolId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a module in a [`Plan`](crate::Plan).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    pub(crate) fn new(index: usize) -> Self {
        ModuleId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One member of one module.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberRef {
    pub module: ModuleId,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    /// A built-in scalar type name such as `Integer`.
    Scalar(Type),
    /// A function of the `System` module.
    Builtin(BuiltinId),
    Member(MemberRef),
    EnumValue { member: MemberRef, ordinal: u32 },
    /// Index into the script's `var` declarations.
    ScriptVar(usize),
    /// `for`/`let` variable, implicit `value`/`index`, or parameter.
    Local,
    /// Attribute of a tuple type declaration.
    Attribute,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    /// The name as registered; fully qualified for global symbols.
    pub name: QualifiedName,
    pub kind: SymbolKind,
    pub span: Span,
    pub frame: FrameId,
    /// Implicit bindings (`value`, `index`) may be rebound in the same
    /// frame without a conflict.
    pub implicit: bool,
}

/// Where a module's declaration came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModuleOrigin {
    /// Declared in the script itself.
    Script,
    /// Supplied by the host's module catalog.
    Catalog,
}

#[derive(Clone, Debug)]
pub struct ModuleInfo {
    pub name: QualifiedName,
    /// `\`-joined name, as handed to repository factories.
    pub display: Arc<str>,
    pub version: VersionNumber,
    pub decl: ModuleDecl,
    pub origin: ModuleOrigin,
    pub frame: FrameId,
    /// Parallel to `decl.members`.
    pub members: Vec<SymbolId>,
}

impl ModuleInfo {
    pub fn member(&self, index: usize) -> &MemberDecl {
        &self.decl.members[index]
    }
}

/// What a name may stand for at its use site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    Value,
    Type,
}

impl Role {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Role::Value => "a value",
            Role::Type => "a type",
        }
    }
}

/// Role a symbol can fill, given the member declarations it may refer to.
pub(crate) fn role_of(kind: &SymbolKind, member_kind: Option<&MemberKind>) -> Option<Role> {
    match kind {
        SymbolKind::Scalar(_) => Some(Role::Type),
        SymbolKind::Builtin(_)
        | SymbolKind::EnumValue { .. }
        | SymbolKind::ScriptVar(_)
        | SymbolKind::Local => Some(Role::Value),
        SymbolKind::Member(_) => match member_kind? {
            MemberKind::Typedef(_) | MemberKind::Enum(_) => Some(Role::Type),
            MemberKind::Const(_) | MemberKind::Variable(_) | MemberKind::Function(_) => {
                Some(Role::Value)
            }
        },
        SymbolKind::Attribute => None,
    }
}
