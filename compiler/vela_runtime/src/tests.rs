#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use vela_ir::ast::{BinaryOp, UnaryOp};
use vela_types::{Attribute, Key, TupleType, Type};

use super::*;

fn run_state() -> RunState {
    RunState::new(
        0,
        Vec::new(),
        Vec::new(),
        Arc::new(ShapeCache::new()),
        CancellationToken::new(),
        100,
    )
}

fn point_type(keyed: bool) -> Arc<TupleType> {
    let keys = if keyed {
        vec![Key::new(vec![Arc::from("x")])]
    } else {
        Vec::new()
    };
    Arc::new(
        TupleType::new(
            vec![
                Attribute {
                    name: "x".into(),
                    ty: Type::Integer,
                },
                Attribute {
                    name: "y".into(),
                    ty: Type::String,
                },
            ],
            keys,
            Vec::new(),
        )
        .unwrap(),
    )
}

fn point(shapes: &ShapeCache, keyed: bool, x: i32, y: &str) -> Value {
    let shape = shapes.shape(&point_type(keyed));
    Value::Tuple(Row::new(shape, vec![Value::Integer(x), Value::string(y)]))
}

fn ints(items: &[i32]) -> Vec<Value> {
    items.iter().copied().map(Value::Integer).collect()
}

#[test]
fn keyed_tuples_compare_by_key() {
    let shapes = ShapeCache::new();
    assert_eq!(point(&shapes, true, 2, "hello"), point(&shapes, true, 2, "other"));
    assert!(point(&shapes, false, 2, "hello") != point(&shapes, false, 2, "other"));
    assert_eq!(point(&shapes, false, 2, "a"), point(&shapes, false, 2, "a"));
}

#[test]
fn sets_deduplicate_by_key() {
    let shapes = ShapeCache::new();
    let set = Value::set_from([point(&shapes, true, 1, "a"), point(&shapes, true, 1, "b")]);
    assert_eq!(set.count(), Some(1));
    let set = Value::set_from([point(&shapes, false, 1, "a"), point(&shapes, false, 1, "b")]);
    assert_eq!(set.count(), Some(2));
}

#[test]
fn shapes_are_shared_by_structure() {
    let shapes = ShapeCache::new();
    let a = shapes.shape(&point_type(true));
    let b = shapes.shape(&point_type(true));
    assert!(Arc::ptr_eq(&a, &b));
    shapes.shape(&point_type(false));
    assert_eq!(shapes.len(), 2);
}

#[test]
fn set_equality_ignores_order() {
    assert_eq!(Value::set_from(ints(&[1, 2, 3])), Value::set_from(ints(&[3, 1, 2])));
    assert!(Value::list_from(ints(&[1, 2])) != Value::list_from(ints(&[2, 1])));
}

#[test]
fn display_uses_literal_syntax() {
    let shapes = ShapeCache::new();
    assert_eq!(Value::Long(7).to_string(), "7L");
    assert_eq!(Value::string("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(Value::set_from(ints(&[10, 21])).to_string(), "{10, 21}");
    assert_eq!(Value::list_from(ints(&[])).to_string(), "[]");
    assert_eq!(point(&shapes, false, 2, "a").to_string(), "{x: 2, y: \"a\"}");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::string("plain").to_plain_string(), "plain");
}

#[test]
fn arithmetic() {
    let add = ops::binary(BinaryOp::Add, &Value::Integer(5), &Value::Integer(-30)).unwrap();
    assert_eq!(add, Value::Integer(-25));
    let err = ops::binary(BinaryOp::Div, &Value::Integer(1), &Value::Integer(0)).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
    let err =
        ops::binary(BinaryOp::Add, &Value::Integer(i32::MAX), &Value::Integer(1)).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::Overflow);
    let pow = ops::binary(BinaryOp::Power, &Value::Integer(2), &Value::Integer(10)).unwrap();
    assert_eq!(pow, Value::Integer(1024));
}

#[test]
fn compare_yields_sign() {
    let cmp =
        |a, b| ops::binary(BinaryOp::Compare, &Value::Integer(a), &Value::Integer(b)).unwrap();
    assert_eq!(cmp(1, 2), Value::Integer(-1));
    assert_eq!(cmp(2, 2), Value::Integer(0));
    assert_eq!(cmp(3, 2), Value::Integer(1));
}

#[test]
fn set_operators() {
    let a = Value::set_from(ints(&[1, 2, 3]));
    let b = Value::set_from(ints(&[2, 3, 4]));
    assert_eq!(
        ops::binary(BinaryOp::BitAnd, &a, &b).unwrap(),
        Value::set_from(ints(&[2, 3]))
    );
    assert_eq!(
        ops::binary(BinaryOp::Add, &a, &b).unwrap(),
        Value::set_from(ints(&[1, 2, 3, 4]))
    );
    assert_eq!(ops::binary(BinaryOp::Sub, &a, &b).unwrap(), Value::set_from(ints(&[1])));
    assert_eq!(
        ops::binary(BinaryOp::In, &Value::Integer(4), &b).unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn time_span_arithmetic() {
    let hour = Value::TimeSpan(TimeDelta::hours(1));
    let doubled = ops::binary(BinaryOp::Mul, &hour, &Value::Double(2.0)).unwrap();
    assert_eq!(doubled, Value::TimeSpan(TimeDelta::hours(2)));
    assert_eq!(
        ops::unary(UnaryOp::Neg, &hour).unwrap(),
        Value::TimeSpan(TimeDelta::hours(-1))
    );
}

#[test]
fn unary_operators() {
    assert_eq!(ops::unary(UnaryOp::Successor, &Value::Integer(1)).unwrap(), Value::Integer(2));
    assert_eq!(ops::unary(UnaryOp::BitNot, &Value::Integer(0)).unwrap(), Value::Integer(-1));
    assert_eq!(
        ops::unary(UnaryOp::Exists, &Value::empty_set()).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(ops::unary(UnaryOp::IsNull, &Value::Null).unwrap(), Value::Boolean(true));
}

#[test]
fn like_wildcards() {
    assert!(ops::like("hello", "h%o"));
    assert!(ops::like("hello", "_ello"));
    assert!(ops::like("hello", "%l%"));
    assert!(ops::like("", "%"));
    assert!(!ops::like("hello", "h_o"));
    assert!(!ops::like("hello", "hello_"));
}

#[test]
fn matches_uses_regular_expressions() {
    let yes = ops::binary(
        BinaryOp::Matches,
        &Value::string("abc123"),
        &Value::string("^[a-c]+\\d+$"),
    );
    assert_eq!(yes.unwrap(), Value::Boolean(true));
    let bad = ops::binary(BinaryOp::Matches, &Value::string("x"), &Value::string("("));
    assert_eq!(bad.unwrap_err().kind, RuntimeErrorKind::InvalidArgument);
}

#[test]
fn interval_is_inclusive() {
    let run = run_state();
    let list = ops::interval(&Value::Integer(1), &Value::Integer(4), &run).unwrap();
    assert_eq!(list, Value::list_from(ints(&[1, 2, 3, 4])));
    let empty = ops::interval(&Value::Integer(4), &Value::Integer(1), &run).unwrap();
    assert_eq!(empty.count(), Some(0));
}

#[test]
fn interval_observes_cancellation() {
    let cancel = CancellationToken::new();
    let run = RunState::new(
        0,
        Vec::new(),
        Vec::new(),
        Arc::new(ShapeCache::new()),
        cancel.clone(),
        1,
    );
    cancel.cancel();
    let err = ops::interval(&Value::Long(0), &Value::Long(i64::MAX), &run).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::Cancelled);
    assert!(!err.is_catchable());
}

#[test]
fn coerce_widens_and_checks() {
    assert_eq!(coerce(Value::Integer(3), &Type::Long).unwrap(), Value::Long(3));
    assert_eq!(
        coerce(Value::Null, &Type::optional(Type::String)).unwrap(),
        Value::Null
    );
    assert_eq!(
        coerce(Value::list_from(ints(&[1])), &Type::list(Type::Double)).unwrap(),
        Value::list_from([Value::Double(1.0)])
    );
    let err = coerce(Value::string("x"), &Type::Integer).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::InvalidArgument);
}

#[test]
fn zero_values() {
    let shapes = ShapeCache::new();
    assert_eq!(zero_value(&Type::Integer, &shapes), Value::Integer(0));
    assert_eq!(zero_value(&Type::optional(Type::Integer), &shapes), Value::Null);
    assert_eq!(zero_value(&Type::set(Type::Integer), &shapes), Value::empty_set());
    let row = zero_value(&Type::Tuple(point_type(false)), &shapes);
    assert_eq!(row.to_string(), "{x: 0, y: \"\"}");
}

#[test]
fn aggregate_unwraps_single_error() {
    let one = RuntimeError::aggregate(vec![RuntimeError::host("boom")]);
    assert_eq!(one.kind, RuntimeErrorKind::Host);
    let two = RuntimeError::aggregate(vec![RuntimeError::host("a"), RuntimeError::host("b")]);
    assert!(matches!(two.kind, RuntimeErrorKind::Aggregate(ref inner) if inner.len() == 2));
    assert_eq!(two.to_diagnostic().notes.len(), 2);
}

#[test]
fn memory_repository_filters_and_limits() {
    let repo = MemoryRepository::new(Value::set_from(ints(&[1, 2, 3, 4])));
    let even = |v: &Value| -> Result<bool, RuntimeError> { Ok(v.as_i64().unwrap() % 2 == 0) };
    let got = repo.get(Some(&even), 10).unwrap();
    assert_eq!(got, Value::set_from(ints(&[2, 4])));
    let err = repo.get(None, 3).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::RowLimitExceeded { limit: 3 });
    assert!(repo.get(Some(&even), 2).is_ok());
}

#[test]
fn memory_repository_conditional_set_replaces_matches() {
    let repo = MemoryRepository::new(Value::set_from(ints(&[1, 2, 3])));
    let two = |v: &Value| -> Result<bool, RuntimeError> { Ok(*v == Value::Integer(2)) };
    repo.set(Some(&two), Value::set_from(ints(&[20]))).unwrap();
    assert_eq!(repo.snapshot(), Value::set_from(ints(&[1, 3, 20])));
    repo.set(None, Value::empty_set()).unwrap();
    assert_eq!(repo.snapshot().count(), Some(0));
}

#[test]
fn memory_store_seeds_zero_values() {
    let store = MemoryStore::new();
    let target = StorageTarget {
        module: "Shop".into(),
        version: vela_ir::VersionNumber::parse("1.0").unwrap(),
        member: "Orders".into(),
        ty: Type::set(Type::Integer),
    };
    let repo = store.repository(&target).unwrap();
    assert_eq!(repo.get(None, 10).unwrap(), Value::empty_set());
    repo.set(None, Value::set_from(ints(&[5]))).unwrap();
    assert_eq!(store.get("Shop", "Orders"), Some(Value::set_from(ints(&[5]))));
}

mod builtin_functions {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: Vec<Value>, type_args: &[Type]) -> EvalResult {
        let run = run_state();
        let builtin = builtins::get(builtins::lookup(name).unwrap()).unwrap();
        (builtin.func)(&builtins::BuiltinCall {
            args,
            type_args,
            run: &run,
        })
    }

    #[test]
    fn aggregates() {
        let items = Value::list_from(ints(&[3, 1, 2]));
        assert_eq!(
            call("Count", vec![items.clone()], &[Type::Integer]).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(call("Sum", vec![items.clone()], &[Type::Integer]).unwrap(), Value::Integer(6));
        assert_eq!(call("Min", vec![items.clone()], &[Type::Integer]).unwrap(), Value::Integer(1));
        assert_eq!(call("Max", vec![items.clone()], &[Type::Integer]).unwrap(), Value::Integer(3));
        assert_eq!(call("Avg", vec![items], &[Type::Integer]).unwrap(), Value::Double(2.0));
        assert_eq!(call("Max", vec![Value::empty_list()], &[Type::Integer]).unwrap(), Value::Null);
        assert_eq!(call("Sum", vec![Value::empty_set()], &[Type::Long]).unwrap(), Value::Long(0));
    }

    #[test]
    fn collection_reshaping() {
        let items = Value::list_from(ints(&[1, 1, 2]));
        assert_eq!(
            call("Distinct", vec![items.clone()], &[Type::Integer]).unwrap(),
            Value::list_from(ints(&[1, 2]))
        );
        assert_eq!(
            call("ToSet", vec![items.clone()], &[Type::Integer]).unwrap().count(),
            Some(2)
        );
        assert_eq!(call("First", vec![items], &[Type::Integer]).unwrap(), Value::Integer(1));
    }

    #[test]
    fn strings() {
        let s = || Value::string("Hello World");
        assert_eq!(call("Length", vec![s()], &[]).unwrap(), Value::Integer(11));
        assert_eq!(call("Upper", vec![s()], &[]).unwrap(), Value::string("HELLO WORLD"));
        assert_eq!(
            call("Substring", vec![s(), Value::Integer(6), Value::Integer(3)], &[]).unwrap(),
            Value::string("Wor")
        );
        assert_eq!(
            call("Substring", vec![s(), Value::Integer(6)], &[]).unwrap(),
            Value::string("World")
        );
        assert_eq!(
            call("IndexOf", vec![s(), Value::string("o")], &[]).unwrap(),
            Value::Integer(4)
        );
        assert_eq!(
            call("Split", vec![Value::string("a,b"), Value::string(",")], &[]).unwrap(),
            Value::list_from([Value::string("a"), Value::string("b")])
        );
        let err = call("Substring", vec![s(), Value::Integer(20)], &[]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidArgument);
    }

    #[test]
    fn time_span_components() {
        let span = Value::TimeSpan(TimeDelta::hours(26) + TimeDelta::minutes(5));
        assert_eq!(call("Hours", vec![span.clone()], &[]).unwrap(), Value::Integer(2));
        assert_eq!(call("Minutes", vec![span], &[]).unwrap(), Value::Integer(5));
    }

    #[test]
    fn type_directed() {
        assert_eq!(call("Default", Vec::new(), &[Type::Integer]).unwrap(), Value::Integer(0));
        assert_eq!(call("Empty", Vec::new(), &[Type::String]).unwrap(), Value::empty_set());
    }

    #[test]
    fn count_signatures_cover_sets_and_lists() {
        let count = builtins::get(builtins::lookup("Count").unwrap()).unwrap();
        let list = Type::list(Type::String);
        let picked = count
            .signatures
            .iter()
            .find_map(|sig| sig.instantiate(&[], std::slice::from_ref(&list)).ok())
            .unwrap();
        assert_eq!(picked.params, vec![list]);
        assert_eq!(picked.ret, Type::Integer);
    }
}
