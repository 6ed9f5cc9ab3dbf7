//! The closure tree.
//!
//! Every expression lowers to a [`Code`]: a shareable closure evaluating
//! it against the locals of the invocation it runs in. Types are settled
//! at compile time, so the closures never inspect a [`Type`].

use std::sync::Arc;

use vela_ir::Span;
use vela_runtime::{Env, EvalResult, RuntimeError, Value};
use vela_types::Type;

pub(crate) type Code = Arc<dyn Fn(&mut Env<'_>) -> EvalResult + Send + Sync>;

/// Box a closure as [`Code`], fixing its signature for inference.
pub(crate) fn code(f: impl Fn(&mut Env<'_>) -> EvalResult + Send + Sync + 'static) -> Code {
    Arc::new(f)
}

pub(crate) fn constant(value: Value) -> Code {
    code(move |_| Ok(value.clone()))
}

pub(crate) fn read_slot(slot: usize) -> Code {
    code(move |env| Ok(env.get(slot)))
}

/// Attach `span` to faults raised by `inner` that carry no position yet.
pub(crate) fn at(inner: Code, span: Span) -> Code {
    code(move |env| inner(env).map_err(|e| e.at(span)))
}

/// An expression's code and static type.
#[derive(Clone)]
pub(crate) struct Compiled {
    pub(crate) code: Code,
    pub(crate) ty: Type,
}

impl Compiled {
    pub(crate) fn new(code: Code, ty: Type) -> Self {
        Compiled { code, ty }
    }
}

/// Evaluate `code` and require a Boolean.
pub(crate) fn eval_bool(code: &Code, env: &mut Env<'_>) -> Result<bool, RuntimeError> {
    match code(env)? {
        Value::Boolean(b) => Ok(b),
        other => Err(RuntimeError::invalid_argument(format!(
            "expected a Boolean, found {other}"
        ))),
    }
}

/// Clone the elements of a Set or List out of `value`.
pub(crate) fn elements(value: &Value) -> Result<Vec<Value>, RuntimeError> {
    value
        .elements()
        .map(|items| items.cloned().collect())
        .ok_or_else(|| {
            RuntimeError::invalid_argument(format!("expected a Set or List, found {value}"))
        })
}

/// Zero-based position as an `Integer` value.
pub(crate) fn position(index: usize) -> Result<Value, RuntimeError> {
    i32::try_from(index)
        .map(Value::Integer)
        .map_err(|_| RuntimeError::overflow("index"))
}
