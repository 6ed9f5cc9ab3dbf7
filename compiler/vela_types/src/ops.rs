//! Operator typing.
//!
//! For each operator and pair of operand types this decides the types
//! the operands are converted to and the result type. A `None` answer is
//! reported by the compiler as "operator not supported".

use vela_ir::ast::{BinaryOp, UnaryOp};

use crate::{common_type, is_assignable, Type, TypeFlags};

/// Typing of one binary operator application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinarySig {
    /// Type the left operand is converted to before the operation.
    pub left: Type,
    pub right: Type,
    pub result: Type,
}

impl BinarySig {
    fn same(operand: Type, result: Type) -> Self {
        BinarySig {
            left: operand.clone(),
            right: operand,
            result,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnarySig {
    pub operand: Type,
    pub result: Type,
}

fn has(ty: &Type, flags: TypeFlags) -> bool {
    ty.flags().contains(flags)
}

/// Common type of two operands that both satisfy `flags`.
fn common_with(left: &Type, right: &Type, flags: TypeFlags) -> Option<Type> {
    common_type(left, right).filter(|t| has(t, flags))
}

/// Tuples with the same heading compare even when their keys differ;
/// rows then compare on a shared key, else on every attribute.
fn tuple_equality(left: &Type, right: &Type) -> Option<BinarySig> {
    let (Type::Tuple(a), Type::Tuple(b)) = (left, right) else {
        return None;
    };
    (a != b && a.same_heading(b) && has(left, TypeFlags::EQUATABLE)).then(|| BinarySig {
        left: left.clone(),
        right: right.clone(),
        result: Type::Boolean,
    })
}

/// Typing of `left op right`.
pub fn binary(op: BinaryOp, left: &Type, right: &Type) -> Option<BinarySig> {
    match op {
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            (is_assignable(left, &Type::Boolean) && is_assignable(right, &Type::Boolean))
                .then(|| BinarySig::same(Type::Boolean, Type::Boolean))
        }
        BinaryOp::Eq | BinaryOp::NotEq => {
            if let Some(sig) = tuple_equality(left, right) {
                return Some(sig);
            }
            let common = common_with(left, right, TypeFlags::EQUATABLE)?;
            Some(BinarySig::same(common, Type::Boolean))
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let common = common_with(left, right, TypeFlags::ORDERED)?;
            Some(BinarySig::same(common, Type::Boolean))
        }
        BinaryOp::Compare => {
            let common = common_with(left, right, TypeFlags::ORDERED)?;
            Some(BinarySig::same(common, Type::Integer))
        }
        BinaryOp::Add => additive(left, right, true),
        BinaryOp::Sub => additive(left, right, false),
        BinaryOp::Mul | BinaryOp::Div => {
            if *left == Type::TimeSpan && has(right, TypeFlags::NUMERIC) {
                return Some(BinarySig {
                    left: Type::TimeSpan,
                    right: Type::Double,
                    result: Type::TimeSpan,
                });
            }
            numeric(left, right)
        }
        BinaryOp::Mod | BinaryOp::Power => numeric(left, right),
        BinaryOp::BitAnd | BinaryOp::BitOr => {
            if let Some(set) = set_pair(left, right) {
                return Some(BinarySig::same(set.clone(), set));
            }
            integral(left, right)
        }
        BinaryOp::BitXor => integral(left, right),
        BinaryOp::Shl | BinaryOp::Shr => {
            (has(left, TypeFlags::INTEGRAL) && is_assignable(right, &Type::Integer)).then(|| {
                BinarySig {
                    left: left.clone(),
                    right: Type::Integer,
                    result: left.clone(),
                }
            })
        }
        BinaryOp::Interval => {
            let common = common_with(left, right, TypeFlags::INTEGRAL)?;
            Some(BinarySig::same(common.clone(), Type::list(common)))
        }
        BinaryOp::In => {
            let element = right.element()?;
            let common = if *element == Type::Void {
                left.clone()
            } else {
                common_with(left, element, TypeFlags::EQUATABLE)?
            };
            Some(BinarySig {
                left: common.clone(),
                right: right.with_element(common)?,
                result: Type::Boolean,
            })
        }
        BinaryOp::Like | BinaryOp::Matches => (*left == Type::String && *right == Type::String)
            .then(|| BinarySig::same(Type::String, Type::Boolean)),
        BinaryOp::IfNull => {
            let Type::Optional(inner) = left else {
                return None;
            };
            let result = if **inner == Type::Void {
                right.clone()
            } else {
                common_type(inner, right)?
            };
            Some(BinarySig {
                left: Type::optional(result.clone()),
                right: result.clone(),
                result,
            })
        }
    }
}

fn numeric(left: &Type, right: &Type) -> Option<BinarySig> {
    let common = common_with(left, right, TypeFlags::NUMERIC)?;
    Some(BinarySig::same(common.clone(), common))
}

fn integral(left: &Type, right: &Type) -> Option<BinarySig> {
    let common = common_with(left, right, TypeFlags::INTEGRAL)?;
    Some(BinarySig::same(common.clone(), common))
}

fn set_pair(left: &Type, right: &Type) -> Option<Type> {
    match (left, right) {
        (Type::Set(_), Type::Set(_)) => common_type(left, right),
        _ => None,
    }
}

/// `+` and `-`: numbers, strings (`+` only), temporal arithmetic and
/// collections.
fn additive(left: &Type, right: &Type, add: bool) -> Option<BinarySig> {
    match (left, right) {
        (Type::String, Type::String) if add => {
            Some(BinarySig::same(Type::String, Type::String))
        }
        (Type::DateTime, Type::DateTime) if !add => {
            Some(BinarySig::same(Type::DateTime, Type::TimeSpan))
        }
        (Type::DateTime, Type::TimeSpan) => Some(BinarySig {
            left: Type::DateTime,
            right: Type::TimeSpan,
            result: Type::DateTime,
        }),
        (Type::TimeSpan, Type::TimeSpan) => Some(BinarySig::same(Type::TimeSpan, Type::TimeSpan)),
        (Type::Set(_), Type::Set(_)) => {
            let set = common_type(left, right)?;
            Some(BinarySig::same(set.clone(), set))
        }
        (Type::List(_), Type::List(_)) if add => {
            let list = common_type(left, right)?;
            Some(BinarySig::same(list.clone(), list))
        }
        _ => numeric(left, right),
    }
}

/// Typing of `op operand`.
pub fn unary(op: UnaryOp, operand: &Type) -> Option<UnarySig> {
    let same = |ty: &Type| UnarySig {
        operand: ty.clone(),
        result: ty.clone(),
    };
    let boolean = |ty: &Type| UnarySig {
        operand: ty.clone(),
        result: Type::Boolean,
    };
    match op {
        UnaryOp::Not => (*operand == Type::Boolean).then(|| same(operand)),
        UnaryOp::Neg => {
            (has(operand, TypeFlags::NUMERIC) || *operand == Type::TimeSpan).then(|| same(operand))
        }
        UnaryOp::BitNot | UnaryOp::Successor => {
            has(operand, TypeFlags::INTEGRAL).then(|| same(operand))
        }
        UnaryOp::Exists => has(operand, TypeFlags::COLLECTION).then(|| boolean(operand)),
        UnaryOp::IsNull => operand.is_optional().then(|| boolean(operand)),
    }
}
