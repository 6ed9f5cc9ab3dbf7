//! Type expressions as written in source.

use crate::{Name, QualifiedName, Span};

use super::ParsedTypeId;

/// An identifier with its position, for names the planner resolves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    pub const fn new(name: Name, span: Span) -> Self {
        Ident { name, span }
    }
}

#[derive(Clone, Debug)]
pub struct ParsedType {
    pub kind: ParsedTypeKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ParsedTypeKind {
    /// `Integer`, `Acme\Hr\Employee`
    Named(QualifiedName),
    /// `{T}`
    Set(ParsedTypeId),
    /// `[T]`
    List(ParsedTypeId),
    /// `T?`
    Optional(ParsedTypeId),
    /// `{a: T, b: U key{a}}`
    Tuple(Box<TupleTypeDecl>),
    /// `(T, U) -> R`
    Function {
        params: Vec<ParsedTypeId>,
        ret: ParsedTypeId,
    },
}

#[derive(Clone, Debug, Default)]
pub struct TupleTypeDecl {
    pub attrs: Vec<AttrDecl>,
    pub keys: Vec<KeyDecl>,
    pub refs: Vec<RefDecl>,
}

#[derive(Clone, Debug)]
pub struct AttrDecl {
    pub name: Ident,
    pub ty: ParsedTypeId,
}

/// `key { a b }`
#[derive(Clone, Debug)]
pub struct KeyDecl {
    pub attrs: Vec<Ident>,
    pub span: Span,
}

/// `ref Name { a } Target { b }`
#[derive(Clone, Debug)]
pub struct RefDecl {
    pub name: Ident,
    pub source: Vec<Ident>,
    pub target: QualifiedName,
    pub target_span: Span,
    pub target_attrs: Vec<Ident>,
    pub span: Span,
}
