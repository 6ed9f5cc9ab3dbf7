//! Implicit conversions between types.
//!
//! The allowed widenings are `Integer -> Long -> Double`, `T -> T?`,
//! `null -> T?`, the empty selectors `{}`/`[]` to any element type, and
//! element-wise conversion of sets and lists.

use crate::Type;

/// How to turn a value of one type into a value of another.
///
/// Optionals share the representation of their inner type and the empty
/// collections carry no elements, so most conversions are
/// [`Conversion::Identity`] at run time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    IntegerToLong,
    IntegerToDouble,
    LongToDouble,
    /// Convert the value inside an optional; `null` passes through.
    Optional(Box<Conversion>),
    /// Convert every element, rebuilding the collection.
    Elements(Box<Conversion>),
}

impl Conversion {
    pub fn is_identity(&self) -> bool {
        matches!(self, Conversion::Identity)
    }
}

/// The conversion from `from` to `to`, if one exists.
pub fn conversion(from: &Type, to: &Type) -> Option<Conversion> {
    if from == to {
        return Some(Conversion::Identity);
    }
    match (from, to) {
        (Type::Integer, Type::Long) => Some(Conversion::IntegerToLong),
        (Type::Integer, Type::Double) => Some(Conversion::IntegerToDouble),
        (Type::Long, Type::Double) => Some(Conversion::LongToDouble),
        (Type::Optional(inner), Type::Optional(target)) => {
            if **inner == Type::Void {
                return Some(Conversion::Identity);
            }
            let conv = conversion(inner, target)?;
            Some(if conv.is_identity() {
                conv
            } else {
                Conversion::Optional(Box::new(conv))
            })
        }
        (_, Type::Optional(target)) => conversion(from, target),
        (Type::Set(from_elem), Type::Set(to_elem))
        | (Type::List(from_elem), Type::List(to_elem)) => {
            if **from_elem == Type::Void {
                return Some(Conversion::Identity);
            }
            let conv = conversion(from_elem, to_elem)?;
            Some(if conv.is_identity() {
                conv
            } else {
                Conversion::Elements(Box::new(conv))
            })
        }
        _ => None,
    }
}

pub fn is_assignable(from: &Type, to: &Type) -> bool {
    conversion(from, to).is_some()
}

/// The narrowest type both `a` and `b` convert to.
pub fn common_type(a: &Type, b: &Type) -> Option<Type> {
    if is_assignable(a, b) {
        return Some(b.clone());
    }
    if is_assignable(b, a) {
        return Some(a.clone());
    }
    match (a, b) {
        (Type::Optional(_), _) | (_, Type::Optional(_)) => {
            let (x, y) = (a.strip_optional(), b.strip_optional());
            let inner = match (x, y) {
                (Type::Void, other) | (other, Type::Void) => other.clone(),
                _ => common_type(x, y)?,
            };
            Some(Type::optional(inner))
        }
        (Type::Set(x), Type::Set(y)) => common_type(x, y).map(Type::set),
        (Type::List(x), Type::List(y)) => common_type(x, y).map(Type::list),
        _ => None,
    }
}
