#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{ExprId, ExprKind, Script};
use vela_ir::{StringInterner, VersionNumber};
use vela_parse::{parse_source, ParseOptions};

struct Planned {
    script: Script,
    plan: Plan,
    interner: StringInterner,
}

fn try_plan_with(
    source: &str,
    catalog: &Catalog,
    usings: &[&str],
) -> Result<Planned, Diagnostic> {
    let interner = StringInterner::new();
    let mut script = parse_source(source, &interner, ParseOptions::default())
        .unwrap_or_else(|d| panic!("{source}: {d}"));
    let usings: Vec<String> = usings.iter().map(|u| (*u).to_owned()).collect();
    let plan = plan(&mut script, catalog, &interner, &usings)?;
    Ok(Planned {
        script,
        plan,
        interner,
    })
}

fn plan_ok(source: &str) -> Planned {
    try_plan_with(source, &Catalog::new(), &["System"])
        .unwrap_or_else(|d| panic!("{source}: {d}"))
}

fn plan_err(source: &str) -> Diagnostic {
    match try_plan_with(source, &Catalog::new(), &["System"]) {
        Ok(_) => panic!("{source}: planned without error"),
        Err(d) => d,
    }
}

impl Planned {
    /// Identifier nodes named `name`, in allocation order.
    fn idents(&self, name: &str) -> Vec<ExprId> {
        self.script
            .arena
            .ids()
            .filter(|id| match &self.script.arena.get(*id).kind {
                ExprKind::Ident(q) => q.display(&self.interner) == name,
                _ => false,
            })
            .collect()
    }

    fn resolved(&self, name: &str) -> &Resolved {
        let ids = self.idents(name);
        assert_eq!(ids.len(), 1, "expected one `{name}`");
        self.plan.resolution(ids[0]).unwrap()
    }

    fn symbol_of(&self, name: &str) -> &Symbol {
        match self.resolved(name) {
            Resolved::Symbol(id) => self.plan.symbol(*id),
            other => panic!("`{name}` resolved to {other:?}"),
        }
    }

    fn full_name(&self, symbol: &Symbol) -> String {
        symbol.name.display(&self.interner)
    }
}

const SHOP: &str = "
    module Shop 2.1.0 {
        Item : typedef {id: Integer name: String key{id}}
        Color : enum { Red Green Blue }
        Limit : const 10
        Items : {Item}
        Cheap : (max: Integer) : {Item} => return Items(id < max)
    }
";

#[test]
fn clause_variables_shadow_outer_names() {
    let planned = plan_ok("let x := 5 return let y := x + 1 return y");
    let x = planned.symbol_of("x");
    assert_eq!(x.kind, SymbolKind::Local);
    assert!(!x.implicit);
    assert_eq!(planned.plan.frame(x.frame).kind, FrameKind::Clause);
}

#[test]
fn unknown_identifier_is_reported_at_its_span() {
    let diag = plan_err("1 + missing");
    assert_eq!(diag.code, ErrorCode::E2001);
    assert!(diag.message.contains("`missing`"));
    assert_eq!(diag.labels[0].span.start, 4);
}

#[test]
fn for_binds_implicit_value_and_index() {
    let planned = plan_ok("for x in [10 20] return value + index + x");
    let value = planned.symbol_of("value");
    assert!(value.implicit);
    let x = planned.symbol_of("x");
    assert!(!x.implicit);

    let clause = planned.plan.clause(planned.script.body.unwrap()).unwrap();
    assert_eq!(clause.fors.len(), 1);
    assert_eq!(planned.plan.symbol(clause.fors[0].var).name, x.name);
}

#[test]
fn explicit_value_wins_over_implicit_value() {
    let planned = plan_ok("for value in {1} for y in {2} return value");
    let value = planned.symbol_of("value");
    assert!(!value.implicit);
}

#[test]
fn duplicate_let_is_a_conflict() {
    let diag = plan_err("let a := 1 let a := 2 return a");
    assert_eq!(diag.code, ErrorCode::E2002);
    assert_eq!(diag.labels.len(), 2);
}

#[test]
fn restriction_argument_stays_open_to_attributes() {
    let planned = plan_ok("let limit := 3 return {{n: 1} {n: 5}}(n < limit)");
    match planned.resolved("n") {
        Resolved::Member { scopes, fallback } => {
            assert_eq!(scopes.len(), 1);
            assert_eq!(fallback, &None);
        }
        other => panic!("expected member, got {other:?}"),
    }
    match planned.resolved("limit") {
        Resolved::Member { fallback, .. } => assert!(fallback.is_some()),
        other => panic!("expected member, got {other:?}"),
    }
}

#[test]
fn module_members_resolve_by_unique_suffix() {
    let planned = plan_ok(&format!("{SHOP} Limit"));
    let limit = planned.symbol_of("Limit");
    assert_eq!(planned.full_name(limit), "Shop\\Limit");
    let SymbolKind::Member(member) = limit.kind else {
        panic!("expected a member");
    };
    assert_eq!(planned.plan.member(member).kind.describe(), "constant");
    assert_eq!(planned.plan.dependencies(Owner::Script)[0].member, member);
}

#[test]
fn enum_values_resolve_qualified() {
    let planned = plan_ok(&format!("{SHOP} Color\\Green"));
    let green = planned.symbol_of("Color\\Green");
    assert!(matches!(green.kind, SymbolKind::EnumValue { ordinal: 1, .. }));
}

#[test]
fn rooted_names_need_an_exact_global_match() {
    let planned = plan_ok(&format!("{SHOP} \\Shop\\Limit"));
    assert_eq!(planned.full_name(planned.symbol_of("\\Shop\\Limit")), "Shop\\Limit");
    let diag = plan_err(&format!("{SHOP} \\Limit"));
    assert_eq!(diag.code, ErrorCode::E2001);
}

#[test]
fn ambiguous_suffix_lists_candidates() {
    let source = "
        module A 1.0 { Rate : const 1 }
        module B 1.0 { Rate : const 2 }
        Rate
    ";
    let diag = plan_err(source);
    assert_eq!(diag.code, ErrorCode::E3007);
    assert!(diag.notes.iter().any(|n| n.contains("A\\Rate")));
    assert!(diag.notes.iter().any(|n| n.contains("B\\Rate")));
}

#[test]
fn type_names_must_name_types() {
    let diag = plan_err(&format!("{SHOP} var x : Limit x"));
    assert_eq!(diag.code, ErrorCode::E2004);
    let diag = plan_err(&format!("{SHOP} Item"));
    assert_eq!(diag.code, ErrorCode::E2004);
}

#[test]
fn module_function_records_dependencies() {
    let planned = plan_ok(&format!("{SHOP} Cheap(5)"));
    let shop = &planned.plan.modules()[0];
    assert_eq!(shop.display.as_ref(), "Shop");
    assert_eq!(shop.origin, ModuleOrigin::Script);
    let cheap = MemberRef {
        module: ModuleId::new(0),
        index: 4,
    };
    let deps: Vec<usize> = planned
        .plan
        .dependencies(Owner::Member(cheap))
        .iter()
        .map(|d| d.member.index)
        .collect();
    // `Item` through the return type, then `Items`.
    assert_eq!(deps, vec![0, 3]);
}

#[test]
fn key_must_name_an_attribute() {
    let diag = plan_err("module M 1.0 { T : typedef {a: Integer key{b}} } 1");
    assert_eq!(diag.code, ErrorCode::E2007);
    let diag = plan_err("{a: 1 key{b}}");
    assert_eq!(diag.code, ErrorCode::E2007);
}

#[test]
fn duplicate_tuple_attribute_is_a_conflict() {
    let diag = plan_err("{a: 1 a: 2}");
    assert_eq!(diag.code, ErrorCode::E2002);
    let diag = plan_err("module M 1.0 { T : typedef {a: Integer a: String} } 1");
    assert_eq!(diag.code, ErrorCode::E2002);
}

#[test]
fn function_parameters_are_locals() {
    let planned = plan_ok("(a: Integer, b: Integer) => return a * b");
    let body = planned.script.body.unwrap();
    assert_eq!(planned.plan.params(body).len(), 2);
    let diag = plan_err("(a: Integer, a: Integer) => return a");
    assert_eq!(diag.code, ErrorCode::E2002);
}

#[test]
fn only_variables_can_be_assigned() {
    let planned = plan_ok(&format!("{SHOP} var n : Integer := 1 n := 2 Items := {{}} n"));
    assert_eq!(planned.plan.assignments().len(), 2);
    assert_eq!(planned.plan.script_vars().len(), 1);

    let diag = plan_err(&format!("{SHOP} Limit := 3"));
    assert_eq!(diag.code, ErrorCode::E3010);
}

#[test]
fn builtins_need_the_system_import() {
    let planned = plan_ok("Count({1 2})");
    assert!(planned.plan.imports_system());
    assert!(matches!(planned.symbol_of("Count").kind, SymbolKind::Builtin(_)));

    let err = try_plan_with("Count({1 2})", &Catalog::new(), &[]).err().unwrap();
    assert_eq!(err.code, ErrorCode::E2001);
}

#[test]
fn using_alias_prefixes_members() {
    let planned = plan_ok(&format!("using s := Shop {SHOP} s\\Limit"));
    assert_eq!(planned.full_name(planned.symbol_of("s\\Limit")), "Shop\\Limit");
    let planned = plan_ok("using sys := System sys\\Count({1})");
    assert!(matches!(planned.symbol_of("sys\\Count").kind, SymbolKind::Builtin(_)));
}

#[test]
fn unknown_module_and_version_mismatch() {
    let diag = plan_err("using Nowhere 1");
    assert_eq!(diag.code, ErrorCode::E2006);
    let diag = plan_err(&format!("using Shop 3.0 {SHOP} 1"));
    assert_eq!(diag.code, ErrorCode::E2006);
    assert!(diag.notes[0].contains("2.1"));
    let diag = plan_err("using System 2.0 1");
    assert_eq!(diag.code, ErrorCode::E2006);
}

#[test]
fn rooted_module_name_is_rejected() {
    let diag = plan_err("module \\Root 1.0 { A : const 1 } 1");
    assert_eq!(diag.code, ErrorCode::E2003);
}

#[test]
fn catalog_modules_link_the_highest_compatible_version() {
    let mut catalog = Catalog::new();
    let added = catalog
        .add("module Rates 1.0 { Base : const 1 } module Rates 1.4 { Base : const 14 }")
        .unwrap();
    assert_eq!(added, 2);
    catalog.add("module Rates 2.0 { Base : const 20 }").unwrap();
    assert_eq!(catalog.len(), 3);

    let planned = try_plan_with("using Rates 1.1 Base", &catalog, &[]).unwrap();
    let module = &planned.plan.modules()[0];
    assert_eq!(module.version, VersionNumber::parse("1.4").unwrap());
    assert_eq!(module.origin, ModuleOrigin::Catalog);
    assert_eq!(planned.full_name(planned.symbol_of("Base")), "Rates\\Base");
}

#[test]
fn catalog_rejects_duplicates_and_rooted_names() {
    let mut catalog = Catalog::new();
    catalog.add("module Rates 1.0 { Base : const 1 }").unwrap();
    let diag = catalog.add("module Rates 1.0 { Base : const 2 }").unwrap_err();
    assert_eq!(diag.code, ErrorCode::E2002);
    let diag = catalog.add("module \\Rates 3.0 { Base : const 2 }").unwrap_err();
    assert_eq!(diag.code, ErrorCode::E2003);
    assert_eq!(catalog.versions("Rates").count(), 1);
}

#[test]
fn catalog_errors_name_the_module() {
    let mut catalog = Catalog::new();
    catalog.add("module Broken 1.0 { Value : const Missing }").unwrap();
    let diag = try_plan_with("using Broken 1", &catalog, &[]).err().unwrap();
    assert_eq!(diag.code, ErrorCode::E2001);
    assert!(diag.notes.iter().any(|n| n.contains("catalog module `Broken`")));
}

#[test]
fn version_selection_respects_major() {
    let v = |s: &str| VersionNumber::parse(s).unwrap();
    let available = [v("1.0"), v("1.5"), v("2.0")];
    assert_eq!(select_version(available, Some(v("1.2"))), Some(v("1.5")));
    assert_eq!(select_version(available, None), Some(v("2.0")));
    assert_eq!(select_version(available, Some(v("1.6"))), None);
}

#[test]
fn dereference_opens_a_member_frame() {
    let planned = plan_ok("{10 20}.(value * 2)");
    let body = planned.script.body.unwrap();
    let frame = planned.plan.member_frame(body).unwrap();
    assert_eq!(planned.plan.frame(frame).kind, FrameKind::Member);
    match planned.resolved("value") {
        Resolved::Member { scopes, fallback } => {
            assert_eq!(scopes.as_slice(), &[frame]);
            assert_eq!(fallback, &None);
        }
        other => panic!("expected member, got {other:?}"),
    }
}
