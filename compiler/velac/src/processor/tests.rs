#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn prepared_scripts_are_cached() {
    let processor = Processor::builder().build();
    let options = ProcessorOptions::default();
    let first = processor.prepare("1 + 1", &options).unwrap();
    let second = processor.prepare("1 + 1", &options).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn row_shapes_are_shared_across_processors() {
    let first = Processor::builder().build();
    let second = Processor::builder().cache(false).build();
    assert!(Arc::ptr_eq(&first.shapes, &second.shapes));
}

#[test]
fn cache_key_includes_options() {
    let processor = Processor::builder().build();
    let first = processor.prepare("1", &ProcessorOptions::default()).unwrap();
    let other = ProcessorOptions {
        default_usings: Vec::new(),
        ..ProcessorOptions::default()
    };
    let second = processor.prepare("1", &other).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn disabled_cache_compiles_every_time() {
    let processor = Processor::builder().cache(false).build();
    let options = ProcessorOptions::default();
    let first = processor.prepare("1", &options).unwrap();
    let second = processor.prepare("1", &options).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn compile_errors_carry_a_location() {
    let processor = Processor::builder().build();
    let err = processor
        .evaluate("var x := 1\n  y", &Arguments::new(), &ProcessorOptions::default())
        .unwrap_err();
    let ScriptError::Diagnostic(diagnostic) = err else {
        panic!("expected a diagnostic, got {err:?}");
    };
    let location = diagnostic.location.expect("located");
    assert_eq!((location.line, location.column), (2, 3));
}

#[test]
fn catalog_modules_are_importable() {
    let processor = Processor::builder()
        .module("module Geo 1.0.0 { Pi : const 3.5 }")
        .unwrap()
        .build();
    let options = ProcessorOptions::default().with_using("Geo");
    let value = processor.evaluate("Pi * 2.0", &Arguments::new(), &options).unwrap();
    assert_eq!(value, Value::Double(7.0));
}

#[test]
fn bad_catalog_source_is_rejected() {
    assert!(matches!(
        Processor::builder().module("module { }"),
        Err(ScriptError::Diagnostic(_))
    ));
}

#[test]
fn runs_past_the_time_limit_are_cancelled() {
    let processor = Processor::builder().build();
    let options = ProcessorOptions::default().with_maximum_time(Duration::from_millis(20));
    let script = "Count(for a in 1..100000 for b in 1..100000 return a + b)";
    let err = processor.evaluate(script, &Arguments::new(), &options).unwrap_err();
    assert!(
        matches!(err, ScriptError::TimeLimitExceeded(limit) if limit == Duration::from_millis(20)),
        "{err:?}"
    );
}

#[test]
fn connections_use_their_own_storage() {
    let processor = Arc::new(Processor::builder().build());
    let store = Arc::new(MemoryStore::new());
    store.insert("Shop", "Stock", Value::Integer(3));
    let connection = processor.connect(store.clone());
    let script = "module Shop 1.0.0 { Stock : Integer } Stock := Stock + 1";
    connection.execute(script, &Arguments::new()).unwrap();
    assert_eq!(store.get("Shop", "Stock"), Some(Value::Integer(4)));
}
