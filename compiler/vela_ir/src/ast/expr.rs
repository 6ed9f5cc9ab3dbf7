//! Expression nodes.

use crate::{Literal, QualifiedName, Span};

use super::{ExprId, ExprRange, Ident, KeyDecl, OpRange, ParsedTypeId, RefDecl, UnaryOp};

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(Literal),
    Null,
    Ident(QualifiedName),

    /// One precedence level: `operands[0] ops[0] operands[1] ops[1] ...`.
    ///
    /// `operands.len() == ops.len() + 1` and every op has the same
    /// precedence.
    Binary {
        operands: ExprRange,
        ops: OpRange,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },

    /// `target.member`: tuple attribute access or element-wise projection.
    Deref {
        target: ExprId,
        member: ExprId,
    },
    /// `target[index]`
    Index {
        target: ExprId,
        index: ExprId,
    },
    /// `callee<T..>(args)`: a call, or a restriction when the callee is a
    /// collection.
    Call {
        callee: ExprId,
        type_args: Vec<ParsedTypeId>,
        args: ExprRange,
    },

    /// `[a b c]`
    List(ExprRange),
    /// `{a b c}`
    Set(ExprRange),
    /// `{x: a, y: b key{x}}`
    Tuple(Box<TupleSelector>),
    /// `(x: T) => return ...`
    Function(Box<FunctionSelector>),
    /// `for .. let .. where .. order(..) return ..`
    Clause(Box<Clause>),

    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    Case(Box<CaseExpr>),
    /// `try body catch handler`
    Try {
        body: ExprId,
        handler: ExprId,
    },
}

#[derive(Clone, Debug, Default)]
pub struct TupleSelector {
    pub attrs: Vec<TupleAttr>,
    pub keys: Vec<KeyDecl>,
    pub refs: Vec<RefDecl>,
}

/// One attribute of a tuple selector. `name` is absent for the shorthand
/// form `{x: 1 y}`, where the name comes from the identifier itself.
#[derive(Clone, Debug)]
pub struct TupleAttr {
    pub name: Option<Ident>,
    pub value: ExprId,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Ident,
    pub ty: ParsedTypeId,
}

#[derive(Clone, Debug)]
pub struct FunctionSelector {
    pub params: Vec<Param>,
    /// Declared return type. Required for recursive module functions.
    pub ret: Option<ParsedTypeId>,
    pub body: ExprId,
}

#[derive(Clone, Debug)]
pub struct ForClause {
    pub var: Ident,
    pub source: ExprId,
}

#[derive(Clone, Debug)]
pub struct LetClause {
    pub var: Ident,
    pub value: ExprId,
}

#[derive(Clone, Debug)]
pub struct OrderDim {
    pub expr: ExprId,
    pub descending: bool,
}

#[derive(Clone, Debug)]
pub struct Clause {
    pub fors: Vec<ForClause>,
    pub lets: Vec<LetClause>,
    pub filter: Option<ExprId>,
    pub order: Vec<OrderDim>,
    pub body: ExprId,
}

#[derive(Clone, Debug)]
pub struct CaseArm {
    pub when: ExprId,
    pub then: ExprId,
}

/// `case [subject] when .. then .. [else ..] end`
#[derive(Clone, Debug)]
pub struct CaseExpr {
    pub subject: Option<ExprId>,
    pub arms: Vec<CaseArm>,
    pub else_branch: Option<ExprId>,
}
