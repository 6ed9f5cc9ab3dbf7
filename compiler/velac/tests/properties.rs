//! End-to-end behaviour of the processor, driven through its public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use vela_types::Type;
use velac::{Arguments, MemoryStore, Processor, ProcessorOptions, ScriptError, Value};

fn evaluate(script: &str) -> Value {
    Processor::builder()
        .build()
        .evaluate(script, &Arguments::new(), &ProcessorOptions::default())
        .unwrap_or_else(|err| panic!("{script}: {err}"))
}

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().map(|&v| Value::Integer(v)).collect()
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(evaluate("5 - 10*3"), Value::Integer(-25));
    assert_eq!(evaluate("5*3 + 1"), Value::Integer(16));
}

#[test]
fn tuples_with_a_shared_key_compare_by_key() {
    assert_eq!(
        evaluate("{x:2 y:'hello' key{x}} = {x:2 y:'other' key{x}}"),
        Value::Boolean(true)
    );
    assert_eq!(
        evaluate("{x:2 y:'hello'} = {x:2 y:'other'}"),
        Value::Boolean(false)
    );
    assert_eq!(
        evaluate("{x:1 y:'a' key{x}} = {x:1 y:'b'}"),
        Value::Boolean(false)
    );
    assert_eq!(
        evaluate("{x:1 y:'a' key{x}} = {x:1 y:'a'}"),
        Value::Boolean(true)
    );
}

#[test]
fn sets_deduplicate_by_key() {
    assert_eq!(
        evaluate("Count({ {x:1 y:'a' key{x}}, {x:1 y:'b' key{x}} })"),
        Value::Integer(1)
    );
}

#[test]
fn any_list_source_makes_the_result_a_list() {
    assert_eq!(
        evaluate("for i in {2 4} for j in [0 1] return i+j"),
        Value::list_from(ints(&[2, 3, 4, 5]))
    );
    let processor = Processor::builder().build();
    let executable = processor
        .prepare("for i in {2 4} for j in {0 1} return i+j", &ProcessorOptions::default())
        .unwrap();
    assert_eq!(executable.result_type(), &Type::set(Type::Integer));
}

#[test]
fn restriction_and_projection_bind_value_and_index() {
    assert_eq!(
        evaluate("[10 20 30 40](index >= 2)"),
        Value::list_from(ints(&[30, 40]))
    );
    assert_eq!(
        evaluate("{10 20 30 40}.(value+index)"),
        Value::set_from(ints(&[10, 21, 32, 43]))
    );
}

#[test]
fn empty_selectors_have_no_members() {
    assert_eq!(evaluate("Count({})"), Value::Integer(0));
    assert_eq!(evaluate("Count([])"), Value::Integer(0));
    assert_eq!(evaluate("{}"), Value::empty_set());
    assert_eq!(evaluate("[]"), Value::empty_list());
}

#[test]
fn inner_lets_shadow_outer_ones() {
    assert_eq!(
        evaluate("let x := 5 return let x := 10 return x"),
        Value::Integer(10)
    );
}

#[test]
fn where_runs_before_the_lets_it_does_not_need() {
    assert_eq!(
        evaluate("for x in [0 1] let y := 10 / x where x > 0 return y"),
        Value::list_from(ints(&[10]))
    );
}

#[test]
fn hex_literals_are_integers() {
    assert_eq!(evaluate("0x11"), Value::Integer(17));
}

#[test]
fn long_runs_end_with_a_time_limit() {
    let processor = Processor::builder().build();
    let options = ProcessorOptions::default().with_maximum_time(Duration::from_millis(50));
    let err = processor
        .evaluate(
            "for a in 1..1000000 for b in 1..1000000 where a = b return a",
            &Arguments::new(),
            &options,
        )
        .unwrap_err();
    assert!(err.is_limit(), "{err:?}");
    assert!(matches!(err, ScriptError::TimeLimitExceeded(_)));
}

#[test]
fn unbounded_recursion_ends_with_a_time_limit() {
    let processor = Processor::builder().build();
    let options = ProcessorOptions::default().with_maximum_time(Duration::from_millis(50));
    let script = "
        module Shop 1.0.0 {
            Loop : (x: Integer) : Integer => Loop(x + 1)
        }
        Loop(1)
    ";
    let err = processor
        .evaluate(script, &Arguments::new(), &options)
        .unwrap_err();
    assert!(matches!(err, ScriptError::TimeLimitExceeded(_)), "{err:?}");
}

#[test]
fn repository_reads_respect_the_row_limit() {
    let store = Arc::new(MemoryStore::new());
    store.insert("Hr", "People", Value::set_from(ints(&[1, 2, 3, 4, 5, 6])));
    let processor = Processor::builder().factory(store).build();
    let options = ProcessorOptions::default().with_maximum_rows(3);
    let script = "module Hr 1.0.0 { People : {Integer} } Count(People)";
    let err = processor
        .evaluate(script, &Arguments::new(), &options)
        .unwrap_err();
    assert!(matches!(err, ScriptError::RowLimitExceeded { limit: 3 }), "{err:?}");
}

#[test]
fn executed_assignments_are_visible_to_later_scripts() {
    let store = Arc::new(MemoryStore::new());
    let processor = Processor::builder().factory(store.clone()).build();
    let options = ProcessorOptions::default();
    let module = "module Hr 1.0.0 { Names : {String} }";
    processor
        .execute(
            &format!("{module} Names := {{'ann' 'bob'}}"),
            &Arguments::new(),
            &options,
        )
        .unwrap();
    let count = processor
        .evaluate(&format!("{module} Count(Names)"), &Arguments::new(), &options)
        .unwrap();
    assert_eq!(count, Value::Integer(2));
    assert_eq!(
        store.get("Hr", "Names"),
        Some(Value::set_from(["ann", "bob"].map(Value::string)))
    );
}

#[test]
fn arguments_fill_script_variables() {
    let processor = Processor::builder().build();
    let args = Arguments::new().with("n", Value::Integer(6));
    let value = processor
        .evaluate("var n : Integer n * 7", &args, &ProcessorOptions::default())
        .unwrap();
    assert_eq!(value, Value::Integer(42));
}

#[test]
fn batches_keep_script_order() {
    let processor = Processor::builder().build();
    let values = processor
        .evaluate_batch(
            &["1 + 1", "2 * 3", "Count({1 2 3})"],
            &Arguments::new(),
            &ProcessorOptions::default(),
        )
        .unwrap();
    assert_eq!(values, ints(&[2, 6, 3]));
}

#[test]
fn batch_failures_are_aggregated() {
    let processor = Processor::builder().build();
    let err = processor
        .evaluate_batch(
            &["1", "1 / 0", "nope", "2"],
            &Arguments::new(),
            &ProcessorOptions::default(),
        )
        .unwrap_err();
    let ScriptError::Aggregate(errors) = err else {
        panic!("expected an aggregate, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| matches!(e, ScriptError::Runtime(_))));
    assert!(errors.iter().any(|e| matches!(e, ScriptError::Diagnostic(_))));
}

#[test]
fn execute_discards_the_result() {
    let processor = Processor::builder().build();
    assert!(processor
        .execute("1 + 1", &Arguments::new(), &ProcessorOptions::default())
        .is_ok());
}
