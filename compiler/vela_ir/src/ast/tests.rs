#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::{Literal, Span};
use pretty_assertions::assert_eq;

fn lit(arena: &mut ExprArena, n: i32) -> ExprId {
    arena.alloc(Expr::new(ExprKind::Literal(Literal::Integer(n)), Span::DUMMY))
}

#[test]
fn binary_children_are_operands_in_order() {
    let mut arena = ExprArena::new();
    let a = lit(&mut arena, 1);
    let b = lit(&mut arena, 2);
    let c = lit(&mut arena, 3);
    let operands = arena.alloc_list([a, b, c]);
    let ops = arena.alloc_ops([BinaryOp::Add, BinaryOp::Sub]);
    let sum = arena.alloc(Expr::new(ExprKind::Binary { operands, ops }, Span::DUMMY));

    assert_eq!(arena.children(sum).as_slice(), &[a, b, c]);
    assert_eq!(arena.ops(ops), &[BinaryOp::Add, BinaryOp::Sub]);
}

#[test]
fn clause_children_follow_evaluation_order() {
    let mut arena = ExprArena::new();
    let source = lit(&mut arena, 1);
    let value = lit(&mut arena, 2);
    let filter = lit(&mut arena, 3);
    let body = lit(&mut arena, 4);
    let name = crate::Name::EMPTY;
    let clause = Clause {
        fors: vec![ForClause {
            var: Ident::new(name, Span::DUMMY),
            source,
        }],
        lets: vec![LetClause {
            var: Ident::new(name, Span::DUMMY),
            value,
        }],
        filter: Some(filter),
        order: Vec::new(),
        body,
    };
    let id = arena.alloc(Expr::new(ExprKind::Clause(Box::new(clause)), Span::DUMMY));
    assert_eq!(arena.children(id).as_slice(), &[source, value, filter, body]);
}

#[test]
fn precedence_levels_are_ordered_low_to_high() {
    assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
    assert!(BinaryOp::And.precedence() < BinaryOp::BitAnd.precedence());
    assert!(BinaryOp::Eq.precedence() < BinaryOp::Add.precedence());
    assert!(BinaryOp::Mul.precedence() < BinaryOp::Interval.precedence());
    assert!(BinaryOp::Interval.precedence() < BinaryOp::Power.precedence());
}
