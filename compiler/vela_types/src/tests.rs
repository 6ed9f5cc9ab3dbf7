#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use vela_ir::ast::{BinaryOp, UnaryOp};

use super::*;

fn attr(name: &str, ty: Type) -> Attribute {
    Attribute {
        name: name.into(),
        ty,
    }
}

fn key(names: &[&str]) -> Key {
    Key::new(names.iter().map(|n| Arc::from(*n)).collect())
}

fn point() -> TupleType {
    TupleType::new(
        vec![attr("y", Type::String), attr("x", Type::Integer)],
        vec![key(&["x"])],
        Vec::new(),
    )
    .unwrap()
}

#[test]
fn optional_never_nests() {
    let once = Type::optional(Type::Integer);
    assert_eq!(Type::optional(once.clone()), once);
    assert_eq!(once.to_string(), "Integer?");
}

#[test]
fn tuple_attributes_are_order_insensitive() {
    let a = point();
    let b = TupleType::new(
        vec![attr("x", Type::Integer), attr("y", Type::String)],
        vec![key(&["x"])],
        Vec::new(),
    )
    .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.index_of("x"), Some(0));
    assert_eq!(a.index_of("y"), Some(1));
    assert_eq!(a.primary_key(), Some(vec![0]));
    assert_eq!(a.to_string(), "{x: Integer, y: String key{x}}");
}

#[test]
fn tuple_rejects_duplicates_and_unknown_key_attributes() {
    let dup = TupleType::new(
        vec![attr("x", Type::Integer), attr("x", Type::Long)],
        Vec::new(),
        Vec::new(),
    );
    assert_eq!(dup, Err(TupleError::DuplicateAttribute("x".into())));

    let bad_key = TupleType::new(vec![attr("x", Type::Integer)], vec![key(&["z"])], Vec::new());
    assert_eq!(bad_key, Err(TupleError::UnknownKeyAttribute("z".into())));
}

#[test]
fn numeric_widening() {
    assert_eq!(
        conversion(&Type::Integer, &Type::Long),
        Some(Conversion::IntegerToLong)
    );
    assert_eq!(
        conversion(&Type::Long, &Type::Double),
        Some(Conversion::LongToDouble)
    );
    assert_eq!(conversion(&Type::Double, &Type::Integer), None);
    assert_eq!(conversion(&Type::Long, &Type::Integer), None);
}

#[test]
fn optional_and_null_conversions() {
    let opt_long = Type::optional(Type::Long);
    assert_eq!(
        conversion(&Type::Integer, &opt_long),
        Some(Conversion::IntegerToLong)
    );
    assert_eq!(
        conversion(&Type::optional(Type::Integer), &opt_long),
        Some(Conversion::Optional(Box::new(Conversion::IntegerToLong)))
    );
    assert_eq!(conversion(&Type::null(), &opt_long), Some(Conversion::Identity));
    assert_eq!(conversion(&Type::null(), &Type::Long), None);
}

#[test]
fn empty_and_element_wise_collections() {
    let empty = Type::set(Type::Void);
    assert!(is_assignable(&empty, &Type::set(Type::String)));
    assert!(!is_assignable(&empty, &Type::list(Type::String)));
    assert_eq!(
        conversion(&Type::list(Type::Integer), &Type::list(Type::Double)),
        Some(Conversion::Elements(Box::new(Conversion::IntegerToDouble)))
    );
}

#[test]
fn common_types() {
    assert_eq!(common_type(&Type::Integer, &Type::Double), Some(Type::Double));
    assert_eq!(
        common_type(&Type::null(), &Type::String),
        Some(Type::optional(Type::String))
    );
    assert_eq!(
        common_type(&Type::optional(Type::Integer), &Type::Long),
        Some(Type::optional(Type::Long))
    );
    assert_eq!(
        common_type(&Type::set(Type::Void), &Type::set(Type::Integer)),
        Some(Type::set(Type::Integer))
    );
    assert_eq!(common_type(&Type::String, &Type::Integer), None);
}

#[test]
fn arithmetic_promotes_mixed_operands() {
    let sig = binary(BinaryOp::Add, &Type::Integer, &Type::Double).unwrap();
    assert_eq!(sig.left, Type::Double);
    assert_eq!(sig.result, Type::Double);
    assert!(binary(BinaryOp::Add, &Type::Integer, &Type::String).is_none());
    assert!(binary(BinaryOp::Mod, &Type::String, &Type::String).is_none());
}

#[test]
fn temporal_arithmetic() {
    let diff = binary(BinaryOp::Sub, &Type::DateTime, &Type::DateTime).unwrap();
    assert_eq!(diff.result, Type::TimeSpan);
    let shifted = binary(BinaryOp::Add, &Type::DateTime, &Type::TimeSpan).unwrap();
    assert_eq!(shifted.result, Type::DateTime);
    let scaled = binary(BinaryOp::Mul, &Type::TimeSpan, &Type::Integer).unwrap();
    assert_eq!(scaled.right, Type::Double);
    assert!(binary(BinaryOp::Add, &Type::DateTime, &Type::DateTime).is_none());
}

#[test]
fn collection_operators() {
    let ints = Type::set(Type::Integer);
    let union = binary(BinaryOp::BitOr, &ints, &Type::set(Type::Void)).unwrap();
    assert_eq!(union.result, ints);
    let concat =
        binary(BinaryOp::Add, &Type::list(Type::Integer), &Type::list(Type::Long)).unwrap();
    assert_eq!(concat.result, Type::list(Type::Long));
    assert!(
        binary(BinaryOp::Sub, &Type::list(Type::Integer), &Type::list(Type::Integer)).is_none()
    );

    let member = binary(BinaryOp::In, &Type::Integer, &Type::set(Type::Long)).unwrap();
    assert_eq!(member.left, Type::Long);
    assert_eq!(member.result, Type::Boolean);
}

#[test]
fn comparisons_need_ordered_types() {
    assert!(binary(BinaryOp::Lt, &Type::Guid, &Type::Guid).is_none());
    assert!(binary(BinaryOp::Eq, &Type::Guid, &Type::Guid).is_some());
    assert_eq!(
        binary(BinaryOp::Compare, &Type::String, &Type::String)
            .unwrap()
            .result,
        Type::Integer
    );
    let tuple = Type::Tuple(Arc::new(point()));
    assert!(binary(BinaryOp::Eq, &tuple, &tuple).is_some());
    assert!(binary(BinaryOp::Lt, &tuple, &tuple).is_none());
    let func = Type::function(vec![], Type::Integer);
    assert!(binary(BinaryOp::Eq, &func, &func).is_none());
}

#[test]
fn tuples_with_different_keys_still_compare() {
    let keyed = Type::Tuple(Arc::new(point()));
    let plain = TupleType::new(
        vec![attr("x", Type::Integer), attr("y", Type::String)],
        Vec::new(),
        Vec::new(),
    )
    .unwrap();
    let plain = Type::Tuple(Arc::new(plain));
    let sig = binary(BinaryOp::Eq, &keyed, &plain).unwrap();
    assert_eq!(sig.left, keyed);
    assert_eq!(sig.right, plain);
    assert_eq!(sig.result, Type::Boolean);
    assert!(binary(BinaryOp::NotEq, &plain, &keyed).is_some());

    let other = TupleType::new(vec![attr("x", Type::Integer)], Vec::new(), Vec::new()).unwrap();
    assert!(binary(BinaryOp::Eq, &keyed, &Type::Tuple(Arc::new(other))).is_none());
}

#[test]
fn interval_and_ifnull() {
    let range = binary(BinaryOp::Interval, &Type::Integer, &Type::Long).unwrap();
    assert_eq!(range.result, Type::list(Type::Long));
    let fallback =
        binary(BinaryOp::IfNull, &Type::optional(Type::Integer), &Type::Integer).unwrap();
    assert_eq!(fallback.result, Type::Integer);
    assert!(binary(BinaryOp::IfNull, &Type::Integer, &Type::Integer).is_none());
}

#[test]
fn unary_operators() {
    assert_eq!(unary(UnaryOp::Neg, &Type::TimeSpan).unwrap().result, Type::TimeSpan);
    assert!(unary(UnaryOp::Successor, &Type::Double).is_none());
    assert_eq!(
        unary(UnaryOp::Exists, &Type::list(Type::String)).unwrap().result,
        Type::Boolean
    );
    assert!(unary(UnaryOp::IsNull, &Type::Integer).is_none());
    assert!(unary(UnaryOp::Not, &Type::Integer).is_none());
}

#[test]
fn generic_instantiation_by_unification() {
    // Count(x: {T}) : Integer
    let count = Signature::generic(
        vec![TypeFlags::empty()],
        vec![Type::set(Type::Param(0))],
        Type::Integer,
    );
    let inst = count.instantiate(&[], &[Type::set(Type::String)]).unwrap();
    assert_eq!(inst.type_args, vec![Type::String]);

    // Sum over the empty set has no numeric element.
    let sum = Signature::generic(
        vec![TypeFlags::NUMERIC],
        vec![Type::set(Type::Param(0))],
        Type::Param(0),
    );
    assert_eq!(
        sum.instantiate(&[], &[Type::set(Type::Void)]),
        Err(SignatureError::Constraint {
            param: 0,
            ty: Type::Void
        })
    );
    let inst = sum.instantiate(&[], &[Type::set(Type::Long)]).unwrap();
    assert_eq!(inst.ret, Type::Long);
}

#[test]
fn repeated_parameter_widens() {
    // Pick(a: T, b: T) : T
    let pick = Signature::generic(
        vec![TypeFlags::empty()],
        vec![Type::Param(0), Type::Param(0)],
        Type::Param(0),
    );
    let inst = pick.instantiate(&[], &[Type::Integer, Type::Double]).unwrap();
    assert_eq!(inst.ret, Type::Double);
    assert!(matches!(
        pick.instantiate(&[], &[Type::Integer, Type::String]),
        Err(SignatureError::Mismatch { index: 1, .. })
    ));
}

#[test]
fn explicit_type_arguments() {
    // Default<T>() : T
    let default = Signature::generic(vec![TypeFlags::empty()], Vec::new(), Type::Param(0));
    assert_eq!(
        default.instantiate(&[], &[]),
        Err(SignatureError::Unresolved(0))
    );
    let inst = default.instantiate(&[Type::Version], &[]).unwrap();
    assert_eq!(inst.ret, Type::Version);
    assert!(matches!(
        default.instantiate(&[Type::Version, Type::Guid], &[]),
        Err(SignatureError::TypeArgCount { expected: 1, found: 2 })
    ));
}

#[test]
fn plain_signatures_check_arity() {
    let upper = Signature::plain(vec![Type::String], Type::String);
    assert!(matches!(
        upper.instantiate(&[], &[]),
        Err(SignatureError::Arity { expected: 1, found: 0 })
    ));
    assert!(upper.instantiate(&[], &[Type::String]).is_ok());
}
