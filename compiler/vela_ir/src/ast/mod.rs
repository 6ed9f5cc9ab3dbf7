//! Syntax tree.
//!
//! Expressions and type expressions live in an [`ExprArena`] and are
//! addressed by [`ExprId`] / [`ParsedTypeId`]. Ids are stable for the
//! lifetime of a parse, so the planner and compiler key their per-node
//! tables (frames, resolved symbols) by id.

mod arena;
mod expr;
mod operators;
mod script;
mod types;

pub use arena::{ExprArena, ExprId, ExprRange, OpRange, ParsedTypeId};
pub use expr::{
    CaseArm, CaseExpr, Clause, Expr, ExprKind, ForClause, FunctionSelector, LetClause, OrderDim,
    Param, TupleAttr, TupleSelector,
};
pub use operators::{BinaryOp, Precedence, UnaryOp};
pub use script::{Assignment, MemberDecl, MemberKind, ModuleDecl, Script, UsingDecl, VarDecl};
pub use types::{AttrDecl, Ident, KeyDecl, ParsedType, ParsedTypeKind, RefDecl, TupleTypeDecl};

#[cfg(test)]
mod tests;
