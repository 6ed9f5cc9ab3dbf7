#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use vela_ir::ast::{BinaryOp, ExprKind, MemberKind, ParsedTypeKind, UnaryOp};
use vela_ir::{Literal, VersionNumber};

fn parse_ok(source: &str) -> (Script, StringInterner) {
    let interner = StringInterner::new();
    let script = parse_source(source, &interner, ParseOptions::default())
        .unwrap_or_else(|d| panic!("{source}: {d}"));
    (script, interner)
}

fn parse_err(source: &str) -> Diagnostic {
    let interner = StringInterner::new();
    parse_source(source, &interner, ParseOptions::default()).unwrap_err()
}

fn body(script: &Script) -> &ExprKind {
    &script.arena.get(script.body.unwrap()).kind
}

fn binary(script: &Script, kind: &ExprKind) -> (Vec<ExprId>, Vec<BinaryOp>) {
    match kind {
        ExprKind::Binary { operands, ops } => (
            script.arena.list(*operands).to_vec(),
            script.arena.ops(*ops).to_vec(),
        ),
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_subtraction() {
    let (script, _) = parse_ok("5 - 10 * 3");
    let (operands, ops) = binary(&script, body(&script));
    assert_eq!(ops, vec![BinaryOp::Sub]);
    let (inner, inner_ops) = binary(&script, &script.arena.get(operands[1]).kind);
    assert_eq!(inner_ops, vec![BinaryOp::Mul]);
    assert_eq!(inner.len(), 2);
}

#[test]
fn same_level_operators_flatten_into_one_node() {
    let (script, _) = parse_ok("1 + 2 - 3 + 4");
    let (operands, ops) = binary(&script, body(&script));
    assert_eq!(operands.len(), 4);
    assert_eq!(
        ops,
        vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Add]
    );
}

#[test]
fn interval_binds_tighter_than_multiplication() {
    let (script, _) = parse_ok("1..3 * 2");
    let (operands, ops) = binary(&script, body(&script));
    assert_eq!(ops, vec![BinaryOp::Mul]);
    let (_, inner_ops) = binary(&script, &script.arena.get(operands[0]).kind);
    assert_eq!(inner_ops, vec![BinaryOp::Interval]);
}

#[test]
fn adjacent_greater_thans_shift_right() {
    let (script, _) = parse_ok("8 >> 1");
    let (_, ops) = binary(&script, body(&script));
    assert_eq!(ops, vec![BinaryOp::Shr]);

    // Separated `>` tokens are two comparisons with a missing operand.
    assert_eq!(parse_err("8 > > 1").code, ErrorCode::E1002);
}

#[test]
fn successor_is_two_adjacent_pluses() {
    let (script, _) = parse_ok("++x");
    assert!(matches!(
        body(&script),
        ExprKind::Unary {
            op: UnaryOp::Successor,
            ..
        }
    ));
}

#[test]
fn braces_with_named_attribute_are_a_tuple() {
    let (script, _) = parse_ok("{x: 2 y: 'hello' key{x}}");
    match body(&script) {
        ExprKind::Tuple(tuple) => {
            assert_eq!(tuple.attrs.len(), 2);
            assert_eq!(tuple.keys.len(), 1);
            assert_eq!(tuple.keys[0].attrs.len(), 1);
        }
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn braces_without_names_are_a_set() {
    let (script, _) = parse_ok("{10, 20 30}");
    match body(&script) {
        ExprKind::Set(items) => assert_eq!(items.len(), 3),
        other => panic!("expected set, got {other:?}"),
    }
    let (script, _) = parse_ok("{}");
    assert!(matches!(body(&script), ExprKind::Set(items) if items.is_empty()));
    let (script, _) = parse_ok("{:}");
    assert!(matches!(body(&script), ExprKind::Tuple(t) if t.attrs.is_empty()));
}

#[test]
fn clause_expression_parts() {
    let (script, _) = parse_ok(
        "for i in {2 4} for j in [0 1] let k := i + j where k > 2 order(k desc, i) return k",
    );
    match body(&script) {
        ExprKind::Clause(clause) => {
            assert_eq!(clause.fors.len(), 2);
            assert_eq!(clause.lets.len(), 1);
            assert!(clause.filter.is_some());
            assert_eq!(clause.order.len(), 2);
            assert!(clause.order[0].descending);
            assert!(!clause.order[1].descending);
        }
        other => panic!("expected clause, got {other:?}"),
    }
}

#[test]
fn nested_clause_as_return_value() {
    let (script, _) = parse_ok("let x := 5 return let x := 10 return x");
    match body(&script) {
        ExprKind::Clause(outer) => {
            assert!(matches!(
                script.arena.get(outer.body).kind,
                ExprKind::Clause(_)
            ));
        }
        other => panic!("expected clause, got {other:?}"),
    }
}

#[test]
fn order_without_for_is_rejected() {
    assert_eq!(parse_err("order(1) return 1").code, ErrorCode::E1007);
}

#[test]
fn missing_return_is_rejected() {
    assert_eq!(parse_err("for x in {1} where x > 1 x").code, ErrorCode::E1007);
}

#[test]
fn restrict_and_projection_postfix() {
    let (script, _) = parse_ok("[10 20 30 40](index >= 2)");
    assert!(matches!(body(&script), ExprKind::Call { .. }));
    let (script, _) = parse_ok("{10 20}.(value + index)");
    assert!(matches!(body(&script), ExprKind::Deref { .. }));
}

#[test]
fn detached_parenthesis_is_not_a_call() {
    let (script, _) = parse_ok("[a (b)]");
    match body(&script) {
        ExprKind::List(items) => assert_eq!(items.len(), 2),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn explicit_type_arguments() {
    let (script, _) = parse_ok("Default<Integer>()");
    match body(&script) {
        ExprKind::Call { type_args, args, .. } => {
            assert_eq!(type_args.len(), 1);
            assert!(args.is_empty());
        }
        other => panic!("expected call, got {other:?}"),
    }
    // Not followed by a call: an ordinary comparison.
    let (script, _) = parse_ok("a<b");
    let (_, ops) = binary(&script, body(&script));
    assert_eq!(ops, vec![BinaryOp::Lt]);
}

#[test]
fn function_selector_with_return_type() {
    let (script, _) = parse_ok("(x: Integer, y: Integer): Integer => return x + y");
    match body(&script) {
        ExprKind::Function(func) => {
            assert_eq!(func.params.len(), 2);
            assert!(func.ret.is_some());
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn qualified_and_rooted_identifiers() {
    let (script, interner) = parse_ok("\\Acme\\Hr\\Staff");
    match body(&script) {
        ExprKind::Ident(name) => {
            assert!(name.is_rooted());
            assert_eq!(name.display(&interner), "\\Acme\\Hr\\Staff");
        }
        other => panic!("expected identifier, got {other:?}"),
    }
}

#[test]
fn script_statements_in_order() {
    let source = "
        using hr := Acme\\Hr 1.0
        module Shop 2.1.0 {
            Item : typedef {id: Integer name: String key{id}}
            Color : enum { Red Green Blue }
            Limit : const 10
            Items : {Item}
            Cheap : (max: Integer) : {Item} => return Items(id < max)
        }
        var threshold : Integer := 3
        Shop\\Items := {}
        threshold
    ";
    let (script, interner) = parse_ok(source);
    assert_eq!(script.usings.len(), 1);
    let using = &script.usings[0];
    assert_eq!(interner.lookup(using.alias.unwrap().name).as_ref(), "hr");
    assert_eq!(using.version, VersionNumber::parse("1.0"));

    let module = &script.modules[0];
    assert_eq!(module.version, VersionNumber::parse("2.1").unwrap());
    let kinds: Vec<&str> = module.members.iter().map(|m| m.kind.describe()).collect();
    assert_eq!(
        kinds,
        vec!["type definition", "enumeration", "constant", "variable", "function"]
    );
    match &module.members[0].kind {
        MemberKind::Typedef(ty) => {
            assert!(matches!(script.arena.ty(*ty).kind, ParsedTypeKind::Tuple(_)));
        }
        other => panic!("expected typedef, got {other:?}"),
    }

    assert_eq!(script.vars.len(), 1);
    assert_eq!(script.assignments.len(), 1);
    assert!(matches!(body(&script), ExprKind::Ident(_)));
}

#[test]
fn types_nest_and_take_optional_suffix() {
    let (script, _) = parse_ok("var f : ({Integer}, [String?]) -> Integer? f");
    let ty = script.vars[0].ty.unwrap();
    match &script.arena.ty(ty).kind {
        ParsedTypeKind::Function { params, ret } => {
            assert_eq!(params.len(), 2);
            assert!(matches!(
                script.arena.ty(params[0]).kind,
                ParsedTypeKind::Set(_)
            ));
            assert!(matches!(
                script.arena.ty(*ret).kind,
                ParsedTypeKind::Optional(_)
            ));
        }
        other => panic!("expected function type, got {other:?}"),
    }
}

#[test]
fn case_if_try_forms() {
    let (script, _) = parse_ok("case x when 1 then 'one' when 2 then 'two' else 'many' end");
    match body(&script) {
        ExprKind::Case(case) => {
            assert!(case.subject.is_some());
            assert_eq!(case.arms.len(), 2);
            assert!(case.else_branch.is_some());
        }
        other => panic!("expected case, got {other:?}"),
    }
    let (script, _) = parse_ok("if a then 1 else 2");
    assert!(matches!(body(&script), ExprKind::If { .. }));
    let (script, _) = parse_ok("try 1 / 0 catch -1");
    assert!(matches!(body(&script), ExprKind::Try { .. }));
}

#[test]
fn literal_payloads_survive() {
    let (script, _) = parse_ok("0x11");
    assert!(matches!(body(&script), ExprKind::Literal(Literal::Integer(17))));
}

#[test]
fn unexpected_end_of_input() {
    let diag = parse_err("1 +");
    assert_eq!(diag.code, ErrorCode::E0008);
    let diag = parse_err("[1 2");
    assert_eq!(diag.code, ErrorCode::E0008);
}

#[test]
fn strict_mode_rejects_trailing_input() {
    let diag = parse_err("1 2");
    assert_eq!(diag.code, ErrorCode::E1005);

    let interner = StringInterner::new();
    let lenient = parse_source("1 2", &interner, ParseOptions { strict: false }).unwrap();
    assert!(lenient.body.is_some());
}

#[test]
fn lexical_errors_surface_with_lexical_codes() {
    assert_eq!(parse_err("'open").code, ErrorCode::E0001);
}

#[test]
fn unexpected_token_reports_expected() {
    let diag = parse_err("if 1 then 2");
    assert_eq!(diag.code, ErrorCode::E0008);
    let diag = parse_err("if 1 2 else 3");
    assert_eq!(diag.code, ErrorCode::E1001);
    assert!(diag.message.contains("`then`"));
}

#[test]
fn modules_parse_into_an_existing_arena() {
    let interner = StringInterner::new();
    let mut script = parse_source("1 + 2", &interner, ParseOptions::default()).unwrap();
    let before = script.arena.expr_count();
    let modules = parse_modules(
        "module Shop 1.2 { Tax: const 0.2 } module Shop\\Audit 1.0 { Log: [String] }",
        &interner,
        &mut script.arena,
    )
    .unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[1].name.display(&interner), "Shop\\Audit");
    assert!(script.arena.expr_count() > before);
    let MemberKind::Const(tax) = modules[0].members[0].kind else {
        panic!("expected a constant");
    };
    assert!(tax.index() >= before);

    let err = parse_modules("1 + 2", &interner, &mut script.arena).unwrap_err();
    assert_eq!(err.code, ErrorCode::E1001);
}
