//! Script-level statements.

use crate::{QualifiedName, Span, VersionNumber};

use super::{ExprArena, ExprId, Ident, ParsedTypeId};

/// A parsed script: statements in their fixed order plus the arena that
/// owns every expression they reference.
#[derive(Clone, Debug, Default)]
pub struct Script {
    pub usings: Vec<UsingDecl>,
    pub modules: Vec<ModuleDecl>,
    pub vars: Vec<VarDecl>,
    pub assignments: Vec<Assignment>,
    pub body: Option<ExprId>,
    pub arena: ExprArena,
}

/// `using [alias :=] Module\Name [version]`
#[derive(Clone, Debug)]
pub struct UsingDecl {
    pub alias: Option<Ident>,
    pub target: QualifiedName,
    pub version: Option<VersionNumber>,
    pub span: Span,
}

/// `module Name version { members }`
#[derive(Clone, Debug)]
pub struct ModuleDecl {
    pub name: QualifiedName,
    pub version: VersionNumber,
    pub members: Vec<MemberDecl>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct MemberDecl {
    pub name: Ident,
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum MemberKind {
    /// `name : typedef T`
    Typedef(ParsedTypeId),
    /// `name : enum { A B C }`
    Enum(Vec<Ident>),
    /// `name : const expr`
    Const(ExprId),
    /// `name : T`, a repository-backed variable
    Variable(ParsedTypeId),
    /// `name : (params) [: T] return expr`; the id points at a
    /// [`ExprKind::Function`](super::ExprKind::Function) node.
    Function(ExprId),
}

impl MemberKind {
    pub fn describe(&self) -> &'static str {
        match self {
            MemberKind::Typedef(_) => "type definition",
            MemberKind::Enum(_) => "enumeration",
            MemberKind::Const(_) => "constant",
            MemberKind::Variable(_) => "variable",
            MemberKind::Function(_) => "function",
        }
    }
}

/// `var name [: T] [:= expr]`
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: Option<ParsedTypeId>,
    pub init: Option<ExprId>,
    pub span: Span,
}

/// `Target := expr`
#[derive(Clone, Debug)]
pub struct Assignment {
    pub target: QualifiedName,
    pub target_span: Span,
    pub value: ExprId,
    pub span: Span,
}
