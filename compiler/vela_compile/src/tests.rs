#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use super::*;
use pretty_assertions::assert_eq;
use vela_diagnostic::ErrorCode;
use vela_parse::{parse_source, ParseOptions};
use vela_plan::Catalog;
use vela_runtime::{
    CancellationToken, MemoryStore, RuntimeError, RuntimeErrorKind, ShapeCache, Value,
};
use vela_types::Type;

fn try_compile(source: &str) -> Result<Executable, Diagnostic> {
    let interner = StringInterner::new();
    let mut script = parse_source(source, &interner, ParseOptions::default())
        .unwrap_or_else(|d| panic!("{source}: {d}"));
    let plan = vela_plan::plan(&mut script, &Catalog::new(), &interner, &["System".to_owned()])?;
    compile(&script, &plan, &interner, &ShapeCache::default())
}

fn compile_ok(source: &str) -> Executable {
    try_compile(source).unwrap_or_else(|d| panic!("{source}: {d}"))
}

fn compile_err(source: &str) -> Diagnostic {
    match try_compile(source) {
        Ok(_) => panic!("{source}: compiled without error"),
        Err(d) => d,
    }
}

struct Host {
    store: MemoryStore,
    args: Arguments,
    cancel: CancellationToken,
    max_rows: usize,
}

impl Default for Host {
    fn default() -> Self {
        Host {
            store: MemoryStore::new(),
            args: Arguments::new(),
            cancel: CancellationToken::new(),
            max_rows: 5000,
        }
    }
}

impl Host {
    fn run(&self, source: &str) -> Result<Value, RuntimeError> {
        let executable = compile_ok(source);
        executable.run(&ExecutionContext {
            args: &self.args,
            factory: &self.store,
            shapes: Arc::new(ShapeCache::default()),
            cancel: self.cancel.clone(),
            max_rows: self.max_rows,
        })
    }
}

fn eval(source: &str) -> Value {
    Host::default()
        .run(source)
        .unwrap_or_else(|e| panic!("{source}: {e}"))
}

fn eval_err(source: &str) -> RuntimeError {
    match Host::default().run(source) {
        Ok(v) => panic!("{source}: evaluated to {v}"),
        Err(e) => e,
    }
}

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().map(|&v| Value::Integer(v)).collect()
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Value::Integer(7));
    assert_eq!(eval("(1 + 2) * 3"), Value::Integer(9));
}

#[test]
fn integer_widens_to_double() {
    assert_eq!(compile_ok("1 + 2.5").result_type(), &Type::Double);
    assert_eq!(eval("1 + 2.5"), Value::Double(3.5));
}

#[test]
fn and_skips_its_right_operand() {
    assert_eq!(eval("false and 1 / 0 = 1"), Value::Boolean(false));
    assert_eq!(eval("true or 1 / 0 = 1"), Value::Boolean(true));
}

#[test]
fn if_null_is_lazy() {
    assert_eq!(
        eval("(if true then 5 else null) ifnull 1 / 0"),
        Value::Integer(5)
    );
    assert_eq!(eval("null ifnull 7"), Value::Integer(7));
    assert_eq!(eval("(if false then 5 else null) ifnull 8"), Value::Integer(8));
}

#[test]
fn ordered_clause_yields_a_list() {
    let exe = compile_ok("for x in {3 1 2} order (x desc) return x * 10");
    assert_eq!(exe.result_type(), &Type::list(Type::Integer));
    assert_eq!(
        eval("for x in {3 1 2} order (x desc) return x * 10"),
        Value::list_from(ints(&[30, 20, 10]))
    );
}

#[test]
fn unordered_clause_over_sets_yields_a_set() {
    let exe = compile_ok("for x in {1 2 3} where x > 1 return x");
    assert_eq!(exe.result_type(), &Type::set(Type::Integer));
    assert_eq!(
        eval("for x in {1 2 3} where x > 1 return x"),
        Value::set_from(ints(&[2, 3]))
    );
}

#[test]
fn order_is_stable_across_dimensions() {
    let source = "
        for p in [{n: 'b' a: 1} {n: 'a' a: 2} {n: 'c' a: 1}]
        order (p.a, p.n desc)
        return p.n
    ";
    assert_eq!(
        eval(source),
        Value::list_from(["c", "b", "a"].map(Value::string))
    );
}

#[test]
fn implicit_index_counts_from_zero() {
    assert_eq!(
        eval("for x in [10 20 30] return index"),
        Value::list_from(ints(&[0, 1, 2]))
    );
}

#[test]
fn nested_fors_see_outer_variables() {
    assert_eq!(
        eval("for a in [1 2] for b in [10 20] return a + b"),
        Value::list_from(ints(&[11, 21, 12, 22]))
    );
}

#[test]
fn lets_bind_in_order() {
    assert_eq!(eval("let a := 2 let b := a * a return b + 1"), Value::Integer(5));
}

#[test]
fn filtered_rows_skip_lets_the_filter_does_not_read() {
    assert_eq!(
        eval("for x in [0 1] let y := 10 / x where x > 0 return y"),
        Value::list_from(ints(&[10]))
    );
    assert_eq!(
        eval("for x in [0 1 2] let d := x * 2 let q := 10 / x where d > 0 return q"),
        Value::list_from(ints(&[10, 5]))
    );
    assert_eq!(eval("let y := 1 / 0 where false return y"), Value::Null);
}

#[test]
fn where_without_for_yields_null_when_false() {
    let exe = compile_ok("let a := 1 where a > 5 return a");
    assert_eq!(exe.result_type(), &Type::optional(Type::Integer));
    assert_eq!(eval("let a := 1 where a > 5 return a"), Value::Null);
    assert_eq!(eval("let a := 9 where a > 5 return a"), Value::Integer(9));
}

#[test]
fn restriction_reads_tuple_attributes() {
    let source = "{ {id: 1 name: 'a'} {id: 2 name: 'b'} {id: 3 name: 'c'} }(id > 1).name";
    assert_eq!(eval(source), Value::set_from(["b", "c"].map(Value::string)));
}

#[test]
fn restriction_falls_back_to_outer_names() {
    let source = "let limit := 2 return [1 2 3 4](value > limit)";
    assert_eq!(eval(source), Value::list_from(ints(&[3, 4])));
}

#[test]
fn unknown_attribute_in_restriction() {
    let diag = compile_err("{ {id: 1} }(nope > 1)");
    assert_eq!(diag.code, ErrorCode::E3011);
    assert!(diag.message.contains("nope"), "{}", diag.message);
}

#[test]
fn tuple_shorthand_takes_the_identifier_name() {
    let value = eval("let id := 4 return {name: 'x' id}.id");
    assert_eq!(value, Value::Integer(4));
}

#[test]
fn tuple_shorthand_needs_an_identifier() {
    let diag = compile_err("{a: 1 2 + 3}");
    assert_eq!(diag.code, ErrorCode::E3006);
}

#[test]
fn list_index_and_range_errors() {
    assert_eq!(eval("[5 6 7][1]"), Value::Integer(6));
    assert_eq!(eval_err("[5 6 7][3]").kind, RuntimeErrorKind::IndexOutOfRange);
    assert_eq!(compile_err("{1 2}[0]").code, ErrorCode::E3001);
}

#[test]
fn mixed_collection_items_must_convert() {
    assert_eq!(compile_ok("[1L 2]").result_type(), &Type::list(Type::Long));
    assert_eq!(compile_err("[1 'x']").code, ErrorCode::E3008);
}

#[test]
fn function_selectors_capture_enclosing_bindings() {
    let source = "let k := 3 return let f := (x: Integer) => x * k return f(2)";
    assert_eq!(eval(source), Value::Integer(6));
}

#[test]
fn nested_closures_capture_through_each_level() {
    let source = "
        let a := 1
        return let f := (x: Integer) => let g := (y: Integer) => x + y + a return g(10)
        return f(100)
    ";
    assert_eq!(eval(source), Value::Integer(111));
}

#[test]
fn call_arity_is_checked() {
    let diag = compile_err("let f := (x: Integer) => x return f(1, 2)");
    assert_eq!(diag.code, ErrorCode::E3009);
}

#[test]
fn calling_a_non_function() {
    assert_eq!(compile_err("let x := 5 return x(1)").code, ErrorCode::E3004);
}

#[test]
fn builtins_choose_an_overload() {
    assert_eq!(eval("Count({1 2 3})"), Value::Integer(3));
    assert_eq!(eval("Sum([1.5 2.5])"), Value::Double(4.0));
    assert_eq!(eval("Length('abc')"), Value::Integer(3));
}

#[test]
fn builtin_errors_are_classified() {
    assert_eq!(compile_err("Length('a', 'b')").code, ErrorCode::E3009);
    assert_eq!(compile_err("Sum({'a'})").code, ErrorCode::E3002);
    assert_eq!(compile_err("let f := Count return f").code, ErrorCode::E3002);
}

#[test]
fn plain_builtins_are_values() {
    assert_eq!(eval("let f := Upper return f('ab')"), Value::string("AB"));
}

#[test]
fn case_compares_against_the_subject() {
    let source = "case 2 when 1 then 'one' when 2 then 'two' else 'many' end";
    assert_eq!(eval(source), Value::string("two"));
}

#[test]
fn case_without_else_is_optional() {
    let exe = compile_ok("case 5 when 1 then 'a' end");
    assert_eq!(exe.result_type(), &Type::optional(Type::String));
    assert_eq!(eval("case 5 when 1 then 'a' end"), Value::Null);
    assert_eq!(eval("case when 1 > 2 then 1 when true then 2 end"), Value::Integer(2));
}

#[test]
fn if_branches_must_agree() {
    assert_eq!(compile_err("if true then 1 else 'x'").code, ErrorCode::E3008);
    assert_eq!(compile_ok("if true then 1 else 2.0").result_type(), &Type::Double);
}

#[test]
fn try_catches_evaluation_faults() {
    assert_eq!(eval("try 1 / 0 catch -1"), Value::Integer(-1));
}

#[test]
fn cancellation_is_not_catchable() {
    let host = Host::default();
    host.cancel.cancel();
    let err = host.run("try for x in [1 2 3] return x catch [0]").unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::Cancelled);
}

#[test]
fn function_calls_observe_cancellation() {
    let host = Host::default();
    host.cancel.cancel();
    let source = "
        module M 1.0.0 {
            Loop : (x: Integer) : Integer => Loop(x + 1)
        }
        Loop(1)
    ";
    assert_eq!(host.run(source).unwrap_err().kind, RuntimeErrorKind::Cancelled);
    let closure = "let f := (x: Integer) => x + 1 return f(1)";
    assert_eq!(host.run(closure).unwrap_err().kind, RuntimeErrorKind::Cancelled);
}

#[test]
fn recursive_function_with_declared_return_type() {
    let source = "
        module M 1.0.0 {
            Fact : (n: Integer) : Integer => if n <= 1 then 1 else n * Fact(n - 1)
        }
        Fact(5)
    ";
    assert_eq!(eval(source), Value::Integer(120));
}

#[test]
fn mutual_recursion_through_declared_functions() {
    let source = "
        module M 1.0.0 {
            Even : (n: Integer) : Boolean => if n = 0 then true else Odd(n - 1)
            Odd : (n: Integer) : Boolean => if n = 0 then false else Even(n - 1)
        }
        Even(10)
    ";
    assert_eq!(eval(source), Value::Boolean(true));
}

#[test]
fn recursion_without_return_type_is_rejected() {
    let diag = compile_err("module M 1.0.0 { Loop : (n: Integer) => Loop(n) } Loop(1)");
    assert_eq!(diag.code, ErrorCode::E3003);
    assert!(diag.notes.iter().any(|n| n.contains("return type")));
}

#[test]
fn constant_cycles_are_rejected() {
    let diag = compile_err("module M 1.0.0 { A : const B + 1  B : const A } A");
    assert_eq!(diag.code, ErrorCode::E3003);
}

#[test]
fn constants_and_inferred_functions_compile_in_dependency_order() {
    let source = "
        module M 1.0.0 {
            Twice : (x: Integer) => x * Base
            Base : const 2
            Answer : const Twice(21)
        }
        Answer
    ";
    assert_eq!(eval(source), Value::Integer(42));
}

#[test]
fn enumeration_values_carry_ordinals() {
    let source = "module M 1.0.0 { Color : enum { Red Green Blue } } Color\\Green";
    match eval(source) {
        Value::Enum(value) => {
            assert_eq!(value.ordinal, 1);
            assert_eq!(value.name(), "Green");
        }
        other => panic!("expected an enumeration value, got {other}"),
    }
}

#[test]
fn typedef_cycles_are_rejected() {
    let diag = compile_err("module M 1.0.0 { A : typedef {B}  B : typedef [A]  V : A } V");
    assert_eq!(diag.code, ErrorCode::E3003);
}

#[test]
fn module_variables_are_read_through_the_factory() {
    let host = Host::default();
    host.store
        .insert("Shop", "Items", Value::set_from(ints(&[1, 2, 3])));
    let source = "module Shop 1.0.0 { Items : {Integer} } Count(Items(value > 1))";
    assert_eq!(host.run(source).unwrap(), Value::Integer(2));
}

#[test]
fn restriction_on_storage_honours_the_row_limit() {
    let host = Host {
        max_rows: 2,
        ..Host::default()
    };
    host.store
        .insert("Shop", "Items", Value::set_from(ints(&[1, 2, 3, 4])));
    let source = "module Shop 1.0.0 { Items : {Integer} } Items(value > 0)";
    let err = host.run(source).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::RowLimitExceeded { limit: 2 });
}

#[test]
fn assignments_write_module_variables() {
    let host = Host::default();
    let source = "module Shop 1.0.0 { Total : Integer } Total := 5";
    assert_eq!(host.run(source).unwrap(), Value::Void);
    assert_eq!(host.store.get("Shop", "Total"), Some(Value::Integer(5)));
}

#[test]
fn script_variables_take_arguments_then_initializers() {
    let mut host = Host::default();
    assert_eq!(
        host.run("var x : Integer var y := 2 x + y").unwrap(),
        Value::Integer(2)
    );
    host.args = Arguments::new().with("x", Value::Integer(40));
    assert_eq!(
        host.run("var x : Integer var y := 2 x + y").unwrap(),
        Value::Integer(42)
    );
}

#[test]
fn arguments_are_converted_to_the_declared_type() {
    let host = Host {
        args: Arguments::new().with("x", Value::Integer(3)),
        ..Host::default()
    };
    assert_eq!(host.run("var x : Double x / 2.0").unwrap(), Value::Double(1.5));
}

#[test]
fn script_assignment_updates_the_variable() {
    assert_eq!(eval("var x := 1 x := x + 10 x"), Value::Integer(11));
}

#[test]
fn parameters_list_script_variables() {
    let exe = compile_ok("var a : Integer var b := 'x' a");
    let params: Vec<(String, Type)> = exe
        .parameters()
        .map(|(name, ty)| (name.to_owned(), ty.clone()))
        .collect();
    assert_eq!(
        params,
        vec![("a".to_owned(), Type::Integer), ("b".to_owned(), Type::String)]
    );
}

#[test]
fn script_without_body_is_void() {
    assert_eq!(compile_ok("var x := 1").result_type(), &Type::Void);
}

#[test]
fn storage_targets_name_module_and_member() {
    let exe = compile_ok("module Shop 1.0.0 { Items : {Integer} } Count(Items)");
    let targets: Vec<String> = exe.storage().iter().map(ToString::to_string).collect();
    assert_eq!(targets, vec!["Shop\\Items".to_owned()]);
}
