//! Operator evaluation.
//!
//! Operands arrive already converted to the types chosen by
//! [`vela_types::binary`], so dispatch is a match on the value pair.
//! `and`, `or` and `ifnull` never reach this module: the compiler emits
//! them with short-circuit evaluation.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::TimeDelta;
use regex::Regex;
use vela_ir::ast::{BinaryOp, UnaryOp};

use crate::{EvalResult, RunState, RuntimeError, Value};

/// Elements built between cancellation checks in [`interval`].
const CANCEL_STRIDE: usize = 4096;

fn unsupported(op: &str, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::invalid_argument(format!("cannot apply `{op}` to {left} and {right}"))
}

/// Evaluate `left op right`.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Eq => Ok(Value::Boolean(left == right)),
        BinaryOp::NotEq => Ok(Value::Boolean(left != right)),
        BinaryOp::Lt => Ok(Value::Boolean(left.compare(right) == Ordering::Less)),
        BinaryOp::LtEq => Ok(Value::Boolean(left.compare(right) != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::Boolean(left.compare(right) == Ordering::Greater)),
        BinaryOp::GtEq => Ok(Value::Boolean(left.compare(right) != Ordering::Less)),
        BinaryOp::Compare => Ok(Value::Integer(match left.compare(right) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        })),
        BinaryOp::Xor => match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a ^ b)),
            _ => Err(unsupported("xor", left, right)),
        },
        BinaryOp::In => contains(right, left),
        BinaryOp::Like => match (left, right) {
            (Value::String(text), Value::String(pattern)) => {
                Ok(Value::Boolean(like(text, pattern)))
            }
            _ => Err(unsupported("like", left, right)),
        },
        BinaryOp::Matches => match (left, right) {
            (Value::String(text), Value::String(pattern)) => {
                let re = Regex::new(pattern).map_err(|e| {
                    RuntimeError::invalid_argument(format!("invalid regular expression: {e}"))
                })?;
                Ok(Value::Boolean(re.is_match(text)))
            }
            _ => Err(unsupported("matches", left, right)),
        },
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => sub(left, right),
        BinaryOp::Mul => mul(left, right),
        BinaryOp::Div => div(left, right),
        BinaryOp::Mod => rem(left, right),
        BinaryOp::Power => power(left, right),
        BinaryOp::BitAnd => match (left, right) {
            (Value::Set(a), Value::Set(b)) => {
                Ok(Value::set_from(a.iter().filter(|v| b.contains(*v)).cloned()))
            }
            _ => integral(op, left, right, |a, b| Some(a & b), |a, b| Some(a & b)),
        },
        BinaryOp::BitOr => match (left, right) {
            (Value::Set(a), Value::Set(b)) => {
                Ok(Value::set_from(a.iter().chain(b.iter()).cloned()))
            }
            _ => integral(op, left, right, |a, b| Some(a | b), |a, b| Some(a | b)),
        },
        BinaryOp::BitXor => integral(op, left, right, |a, b| Some(a ^ b), |a, b| Some(a ^ b)),
        BinaryOp::Shl => shift(op, left, right, i32::checked_shl, i64::checked_shl),
        BinaryOp::Shr => shift(op, left, right, i32::checked_shr, i64::checked_shr),
        BinaryOp::And | BinaryOp::Or | BinaryOp::IfNull | BinaryOp::Interval => {
            Err(RuntimeError::invalid_argument(format!(
                "`{}` is evaluated by its caller",
                op.as_symbol()
            )))
        }
    }
}

fn contains(collection: &Value, item: &Value) -> EvalResult {
    match collection {
        Value::Set(items) => Ok(Value::Boolean(items.contains(item))),
        Value::List(items) => Ok(Value::Boolean(items.contains(item))),
        _ => Err(unsupported("in", item, collection)),
    }
}

fn add(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => checked(a.checked_add(*b), Value::Integer, "+"),
        (Value::Long(a), Value::Long(b)) => checked(a.checked_add(*b), Value::Long, "+"),
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a + b)),
        (Value::String(a), Value::String(b)) => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Ok(Value::String(Arc::from(out)))
        }
        (Value::DateTime(a), Value::TimeSpan(b)) => {
            checked(a.checked_add_signed(*b), Value::DateTime, "+")
        }
        (Value::TimeSpan(a), Value::TimeSpan(b)) => checked(a.checked_add(b), Value::TimeSpan, "+"),
        (Value::Set(a), Value::Set(b)) => Ok(Value::set_from(a.iter().chain(b.iter()).cloned())),
        (Value::List(a), Value::List(b)) => Ok(Value::list_from(a.iter().chain(b.iter()).cloned())),
        _ => Err(unsupported("+", left, right)),
    }
}

fn sub(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => checked(a.checked_sub(*b), Value::Integer, "-"),
        (Value::Long(a), Value::Long(b)) => checked(a.checked_sub(*b), Value::Long, "-"),
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a - b)),
        (Value::DateTime(a), Value::DateTime(b)) => {
            Ok(Value::TimeSpan(a.signed_duration_since(*b)))
        }
        (Value::DateTime(a), Value::TimeSpan(b)) => {
            checked(a.checked_sub_signed(*b), Value::DateTime, "-")
        }
        (Value::TimeSpan(a), Value::TimeSpan(b)) => checked(a.checked_sub(b), Value::TimeSpan, "-"),
        (Value::Set(a), Value::Set(b)) => {
            Ok(Value::set_from(a.iter().filter(|v| !b.contains(*v)).cloned()))
        }
        _ => Err(unsupported("-", left, right)),
    }
}

fn mul(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => checked(a.checked_mul(*b), Value::Integer, "*"),
        (Value::Long(a), Value::Long(b)) => checked(a.checked_mul(*b), Value::Long, "*"),
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a * b)),
        (Value::TimeSpan(span), Value::Double(factor)) => scale(*span, *factor, "*"),
        _ => Err(unsupported("*", left, right)),
    }
}

fn div(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Integer(_) | Value::Long(_), Value::Integer(0) | Value::Long(0)) => {
            Err(RuntimeError::division_by_zero())
        }
        (Value::Integer(a), Value::Integer(b)) => checked(a.checked_div(*b), Value::Integer, "/"),
        (Value::Long(a), Value::Long(b)) => checked(a.checked_div(*b), Value::Long, "/"),
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a / b)),
        (Value::TimeSpan(_), Value::Double(d)) if *d == 0.0 => {
            Err(RuntimeError::division_by_zero())
        }
        (Value::TimeSpan(span), Value::Double(d)) => scale(*span, 1.0 / d, "/"),
        _ => Err(unsupported("/", left, right)),
    }
}

fn rem(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Integer(_) | Value::Long(_), Value::Integer(0) | Value::Long(0)) => {
            Err(RuntimeError::division_by_zero())
        }
        (Value::Integer(a), Value::Integer(b)) => checked(a.checked_rem(*b), Value::Integer, "%"),
        (Value::Long(a), Value::Long(b)) => checked(a.checked_rem(*b), Value::Long, "%"),
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a % b)),
        _ => Err(unsupported("%", left, right)),
    }
}

fn power(left: &Value, right: &Value) -> EvalResult {
    let exponent = |b: i64| {
        u32::try_from(b).map_err(|_| {
            RuntimeError::invalid_argument(format!(
                "integer exponent must be non-negative, found {b}"
            ))
        })
    };
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            checked(a.checked_pow(exponent(i64::from(*b))?), Value::Integer, "**")
        }
        (Value::Long(a), Value::Long(b)) => {
            checked(a.checked_pow(exponent(*b)?), Value::Long, "**")
        }
        (Value::Double(a), Value::Double(b)) => Ok(Value::Double(a.powf(*b))),
        _ => Err(unsupported("**", left, right)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale(span: TimeDelta, factor: f64, op: &str) -> EvalResult {
    let nanos = span.num_nanoseconds().ok_or_else(|| RuntimeError::overflow(op))? as f64 * factor;
    if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
        return Err(RuntimeError::overflow(op));
    }
    Ok(Value::TimeSpan(TimeDelta::nanoseconds(nanos.round() as i64)))
}

fn integral(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    on_i32: fn(i32, i32) -> Option<i32>,
    on_i64: fn(i64, i64) -> Option<i64>,
) -> EvalResult {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            checked(on_i32(*a, *b), Value::Integer, op.as_symbol())
        }
        (Value::Long(a), Value::Long(b)) => checked(on_i64(*a, *b), Value::Long, op.as_symbol()),
        _ => Err(unsupported(op.as_symbol(), left, right)),
    }
}

fn shift(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    on_i32: fn(i32, u32) -> Option<i32>,
    on_i64: fn(i64, u32) -> Option<i64>,
) -> EvalResult {
    let Value::Integer(amount) = right else {
        return Err(unsupported(op.as_symbol(), left, right));
    };
    let amount = u32::try_from(*amount).map_err(|_| RuntimeError::overflow(op.as_symbol()))?;
    match left {
        Value::Integer(a) => checked(on_i32(*a, amount), Value::Integer, op.as_symbol()),
        Value::Long(a) => checked(on_i64(*a, amount), Value::Long, op.as_symbol()),
        _ => Err(unsupported(op.as_symbol(), left, right)),
    }
}

#[inline]
fn checked<T>(result: Option<T>, wrap: fn(T) -> Value, op: &str) -> EvalResult {
    result.map(wrap).ok_or_else(|| RuntimeError::overflow(op))
}

/// `a..b`: the inclusive list of integers, empty when `a > b`.
pub fn interval(left: &Value, right: &Value, run: &RunState) -> EvalResult {
    let (Some(from), Some(to)) = (left.as_i64(), right.as_i64()) else {
        return Err(unsupported("..", left, right));
    };
    let long = matches!(left, Value::Long(_));
    let mut items = Vec::new();
    for (i, n) in (from..=to).enumerate() {
        if i % CANCEL_STRIDE == 0 {
            run.check_cancelled()?;
        }
        items.push(if long {
            Value::Long(n)
        } else {
            Value::Integer(i32::try_from(n).map_err(|_| RuntimeError::overflow(".."))?)
        });
    }
    Ok(Value::list_from(items))
}

/// Evaluate `op operand`.
pub fn unary(op: UnaryOp, operand: &Value) -> EvalResult {
    let fail = || {
        RuntimeError::invalid_argument(format!("cannot apply `{}` to {operand}", op.as_symbol()))
    };
    match (op, operand) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Neg, Value::Integer(n)) => checked(n.checked_neg(), Value::Integer, "-"),
        (UnaryOp::Neg, Value::Long(n)) => checked(n.checked_neg(), Value::Long, "-"),
        (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Neg, Value::TimeSpan(ts)) => Ok(Value::TimeSpan(-*ts)),
        (UnaryOp::BitNot, Value::Integer(n)) => Ok(Value::Integer(!n)),
        (UnaryOp::BitNot, Value::Long(n)) => Ok(Value::Long(!n)),
        (UnaryOp::Successor, Value::Integer(n)) => checked(n.checked_add(1), Value::Integer, "++"),
        (UnaryOp::Successor, Value::Long(n)) => checked(n.checked_add(1), Value::Long, "++"),
        (UnaryOp::Exists, v) => v
            .count()
            .map(|n| Value::Boolean(n > 0))
            .ok_or_else(fail),
        (UnaryOp::IsNull, v) => Ok(Value::Boolean(v.is_null())),
        _ => Err(fail()),
    }
}

/// SQL-style pattern match: `%` matches any run of characters, `_`
/// exactly one.
pub fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    // Position after the last `%` and the text position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                p += 1;
                backtrack = Some((p, t));
            }
            Some('_') => {
                p += 1;
                t += 1;
            }
            Some(c) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}
