//! The `System` module.
//!
//! Every script imports `System` unless its options say otherwise. Each
//! built-in carries one or more signatures; the compiler picks the first
//! that instantiates against the call's argument types and hands the
//! bound type arguments back at run time through [`BuiltinCall`].

use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Local, NaiveTime, TimeDelta};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use uuid::Uuid;
use vela_ir::ast::BinaryOp;
use vela_ir::VersionNumber;
use vela_types::{Signature, Type, TypeFlags};

use crate::{ops, zero_value, EvalResult, RunState, RuntimeError, Value};

/// Name of the built-in module.
pub const MODULE_NAME: &str = "System";

/// Version the built-in module reports to `using`.
pub fn version() -> VersionNumber {
    VersionNumber::new(&[1, 0, 0]).unwrap_or_default()
}

/// Index into [`table`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltinId(u16);

impl BuiltinId {
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Arguments of one built-in invocation.
pub struct BuiltinCall<'a> {
    /// Already converted to the instantiated parameter types.
    pub args: Vec<Value>,
    pub type_args: &'a [Type],
    pub run: &'a RunState,
}

impl BuiltinCall<'_> {
    fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&Value::Void)
    }

    fn str_arg(&self, index: usize) -> Result<&str, RuntimeError> {
        self.arg(index)
            .as_str()
            .ok_or_else(|| RuntimeError::invalid_argument("expected a String argument"))
    }

    fn int_arg(&self, index: usize) -> Result<i64, RuntimeError> {
        self.arg(index)
            .as_i64()
            .ok_or_else(|| RuntimeError::invalid_argument("expected an Integer argument"))
    }

    fn f64_arg(&self, index: usize) -> Result<f64, RuntimeError> {
        self.arg(index)
            .as_f64()
            .ok_or_else(|| RuntimeError::invalid_argument("expected a numeric argument"))
    }

    fn elements(&self, index: usize) -> Result<Vec<Value>, RuntimeError> {
        let collection = self.arg(index);
        let items = collection
            .elements()
            .ok_or_else(|| RuntimeError::invalid_argument("expected a Set or List argument"))?;
        Ok(items.cloned().collect())
    }
}

pub type BuiltinFn = fn(&BuiltinCall<'_>) -> EvalResult;

pub struct Builtin {
    pub name: &'static str,
    /// Overloads, tried in order.
    pub signatures: Vec<Signature>,
    pub func: BuiltinFn,
}

/// All built-ins, in a fixed order.
pub fn table() -> &'static [Builtin] {
    static TABLE: OnceLock<Vec<Builtin>> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

pub fn lookup(name: &str) -> Option<BuiltinId> {
    table()
        .iter()
        .position(|b| b.name == name)
        .and_then(|i| u16::try_from(i).ok())
        .map(BuiltinId)
}

pub fn get(id: BuiltinId) -> Option<&'static Builtin> {
    table().get(id.index())
}

fn t0() -> Type {
    Type::Param(0)
}

/// `{T}` and `[T]` overloads of a collection built-in.
fn over_collections(
    constraint: TypeFlags,
    ret: impl Fn(Type, bool) -> Type,
    extra: &[Type],
) -> Vec<Signature> {
    [false, true]
        .into_iter()
        .map(|is_list| {
            let collection = if is_list {
                Type::list(t0())
            } else {
                Type::set(t0())
            };
            let mut params = vec![collection];
            params.extend_from_slice(extra);
            Signature::generic(vec![constraint], params, ret(t0(), is_list))
        })
        .collect()
}

fn plain(params: Vec<Type>, ret: Type) -> Vec<Signature> {
    vec![Signature::plain(params, ret)]
}

fn builtin(name: &'static str, signatures: Vec<Signature>, func: BuiltinFn) -> Builtin {
    Builtin {
        name,
        signatures,
        func,
    }
}

fn build_table() -> Vec<Builtin> {
    let any = TypeFlags::empty();
    let numeric = TypeFlags::NUMERIC;
    let ordered = TypeFlags::ORDERED;
    vec![
        // Collections
        builtin("Count", over_collections(any, |_, _| Type::Integer, &[]), count),
        builtin("Sum", over_collections(numeric, |t, _| t, &[]), sum),
        builtin("Min", over_collections(ordered, |t, _| Type::optional(t), &[]), min),
        builtin("Max", over_collections(ordered, |t, _| Type::optional(t), &[]), max),
        builtin(
            "Avg",
            over_collections(numeric, |_, _| Type::optional(Type::Double), &[]),
            avg,
        ),
        builtin("IsEmpty", over_collections(any, |_, _| Type::Boolean, &[]), is_empty),
        builtin("ToList", over_collections(any, |t, _| Type::list(t), &[]), to_list),
        builtin("ToSet", over_collections(any, |t, _| Type::set(t), &[]), to_set),
        builtin("First", over_collections(any, |t, _| Type::optional(t), &[]), first),
        builtin(
            "Distinct",
            over_collections(
                any,
                |t, is_list| if is_list { Type::list(t) } else { Type::set(t) },
                &[],
            ),
            distinct,
        ),
        // Strings
        builtin("Length", plain(vec![Type::String], Type::Integer), length),
        builtin("Upper", plain(vec![Type::String], Type::String), upper),
        builtin("Lower", plain(vec![Type::String], Type::String), lower),
        builtin("Trim", plain(vec![Type::String], Type::String), trim),
        builtin(
            "Substring",
            vec![
                Signature::plain(vec![Type::String, Type::Integer, Type::Integer], Type::String),
                Signature::plain(vec![Type::String, Type::Integer], Type::String),
            ],
            substring,
        ),
        builtin("IndexOf", plain(vec![Type::String, Type::String], Type::Integer), index_of),
        builtin(
            "Split",
            plain(vec![Type::String, Type::String], Type::list(Type::String)),
            split,
        ),
        builtin(
            "ToString",
            vec![Signature::generic(vec![any], vec![t0()], Type::String)],
            to_string,
        ),
        // Numbers
        builtin("Abs", vec![Signature::generic(vec![numeric], vec![t0()], t0())], abs),
        builtin("Round", plain(vec![Type::Double], Type::Double), round),
        builtin("Floor", plain(vec![Type::Double], Type::Double), floor),
        builtin("Ceiling", plain(vec![Type::Double], Type::Double), ceiling),
        builtin("Sqrt", plain(vec![Type::Double], Type::Double), sqrt),
        // Time and identity
        builtin("Now", plain(Vec::new(), Type::DateTime), now),
        builtin("Today", plain(Vec::new(), Type::DateTime), today),
        builtin("NewGuid", plain(Vec::new(), Type::Guid), new_guid),
        builtin("Year", plain(vec![Type::DateTime], Type::Integer), year),
        builtin("Month", plain(vec![Type::DateTime], Type::Integer), month),
        builtin("Day", plain(vec![Type::DateTime], Type::Integer), day),
        builtin("Hours", plain(vec![Type::TimeSpan], Type::Integer), hours),
        builtin("Minutes", plain(vec![Type::TimeSpan], Type::Integer), minutes),
        builtin("Seconds", plain(vec![Type::TimeSpan], Type::Integer), seconds),
        // Type-directed
        builtin(
            "Default",
            vec![Signature::generic(vec![any], Vec::new(), t0())],
            default_value,
        ),
        builtin(
            "Empty",
            vec![Signature::generic(vec![any], Vec::new(), Type::set(t0()))],
            empty,
        ),
    ]
}

fn to_integer(n: i64, op: &str) -> EvalResult {
    i32::try_from(n)
        .map(Value::Integer)
        .map_err(|_| RuntimeError::overflow(op))
}

fn len_value(n: usize, op: &str) -> EvalResult {
    i32::try_from(n)
        .map(Value::Integer)
        .map_err(|_| RuntimeError::overflow(op))
}

fn count(call: &BuiltinCall<'_>) -> EvalResult {
    let n = call.arg(0).count().unwrap_or(0);
    len_value(n, "Count")
}

fn sum(call: &BuiltinCall<'_>) -> EvalResult {
    let ty = call.type_args.first().unwrap_or(&Type::Integer);
    let mut total = zero_value(ty, call.run.shapes());
    for item in call.elements(0)? {
        total = ops::binary(BinaryOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn extreme(call: &BuiltinCall<'_>, keep: std::cmp::Ordering) -> EvalResult {
    let mut best: Option<Value> = None;
    for item in call.elements(0)? {
        best = match best {
            Some(current) if item.compare(&current) != keep => Some(current),
            _ => Some(item),
        };
    }
    Ok(best.unwrap_or(Value::Null))
}

fn min(call: &BuiltinCall<'_>) -> EvalResult {
    extreme(call, std::cmp::Ordering::Less)
}

fn max(call: &BuiltinCall<'_>) -> EvalResult {
    extreme(call, std::cmp::Ordering::Greater)
}

#[allow(clippy::cast_precision_loss)]
fn avg(call: &BuiltinCall<'_>) -> EvalResult {
    let items = call.elements(0)?;
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let total: f64 = items.iter().filter_map(Value::as_f64).sum();
    Ok(Value::Double(total / items.len() as f64))
}

fn is_empty(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Boolean(call.arg(0).count().unwrap_or(0) == 0))
}

fn to_list(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::list_from(call.elements(0)?))
}

fn to_set(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::set_from(call.elements(0)?))
}

fn first(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(call.elements(0)?.into_iter().next().unwrap_or(Value::Null))
}

fn distinct(call: &BuiltinCall<'_>) -> EvalResult {
    let unique: IndexSet<Value, FxBuildHasher> = call.elements(0)?.into_iter().collect();
    Ok(call.arg(0).same_kind(unique.into_iter().collect()))
}

fn length(call: &BuiltinCall<'_>) -> EvalResult {
    len_value(call.str_arg(0)?.chars().count(), "Length")
}

fn upper(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::string(&call.str_arg(0)?.to_uppercase()))
}

fn lower(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::string(&call.str_arg(0)?.to_lowercase()))
}

fn trim(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::string(call.str_arg(0)?.trim()))
}

/// `Substring(s, start[, length])`, counted in characters.
fn substring(call: &BuiltinCall<'_>) -> EvalResult {
    let text = call.str_arg(0)?;
    let total = text.chars().count();
    let start = usize::try_from(call.int_arg(1)?)
        .ok()
        .filter(|&s| s <= total)
        .ok_or_else(|| RuntimeError::invalid_argument("substring start is out of range"))?;
    let length = if call.args.len() > 2 {
        usize::try_from(call.int_arg(2)?)
            .ok()
            .filter(|&n| start + n <= total)
            .ok_or_else(|| RuntimeError::invalid_argument("substring length is out of range"))?
    } else {
        total - start
    };
    let piece: String = text.chars().skip(start).take(length).collect();
    Ok(Value::String(Arc::from(piece)))
}

/// Character position of the first occurrence, or -1.
fn index_of(call: &BuiltinCall<'_>) -> EvalResult {
    let text = call.str_arg(0)?;
    match text.find(call.str_arg(1)?) {
        Some(byte) => len_value(text[..byte].chars().count(), "IndexOf"),
        None => Ok(Value::Integer(-1)),
    }
}

fn split(call: &BuiltinCall<'_>) -> EvalResult {
    let text = call.str_arg(0)?;
    let separator = call.str_arg(1)?;
    if separator.is_empty() {
        return Err(RuntimeError::invalid_argument("split separator is empty"));
    }
    Ok(Value::list_from(text.split(separator).map(Value::string)))
}

fn to_string(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::String(Arc::from(call.arg(0).to_plain_string())))
}

fn abs(call: &BuiltinCall<'_>) -> EvalResult {
    match call.arg(0) {
        Value::Integer(n) => n
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::overflow("Abs")),
        Value::Long(n) => n
            .checked_abs()
            .map(Value::Long)
            .ok_or_else(|| RuntimeError::overflow("Abs")),
        other => Ok(Value::Double(other.as_f64().unwrap_or_default().abs())),
    }
}

fn round(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Double(call.f64_arg(0)?.round()))
}

fn floor(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Double(call.f64_arg(0)?.floor()))
}

fn ceiling(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Double(call.f64_arg(0)?.ceil()))
}

fn sqrt(call: &BuiltinCall<'_>) -> EvalResult {
    let x = call.f64_arg(0)?;
    if x < 0.0 {
        return Err(RuntimeError::invalid_argument(format!(
            "square root of negative number {x}"
        )));
    }
    Ok(Value::Double(x.sqrt()))
}

fn now(_: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::DateTime(Local::now().naive_local()))
}

fn today(_: &BuiltinCall<'_>) -> EvalResult {
    let date = Local::now().date_naive();
    Ok(Value::DateTime(date.and_time(NaiveTime::MIN)))
}

fn new_guid(_: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::Guid(Uuid::new_v4()))
}

fn date_part(call: &BuiltinCall<'_>, part: fn(&chrono::NaiveDateTime) -> i64) -> EvalResult {
    match call.arg(0) {
        Value::DateTime(dt) => to_integer(part(dt), "date part"),
        other => Err(RuntimeError::invalid_argument(format!(
            "expected a DateTime, found {other}"
        ))),
    }
}

fn year(call: &BuiltinCall<'_>) -> EvalResult {
    date_part(call, |dt| i64::from(dt.year()))
}

fn month(call: &BuiltinCall<'_>) -> EvalResult {
    date_part(call, |dt| i64::from(dt.month()))
}

fn day(call: &BuiltinCall<'_>) -> EvalResult {
    date_part(call, |dt| i64::from(dt.day()))
}

/// Hours/minutes/seconds components, not totals.
fn span_part(call: &BuiltinCall<'_>, part: fn(TimeDelta) -> i64) -> EvalResult {
    match call.arg(0) {
        Value::TimeSpan(span) => to_integer(part(*span), "time span part"),
        other => Err(RuntimeError::invalid_argument(format!(
            "expected a TimeSpan, found {other}"
        ))),
    }
}

fn hours(call: &BuiltinCall<'_>) -> EvalResult {
    span_part(call, |span| span.num_hours() % 24)
}

fn minutes(call: &BuiltinCall<'_>) -> EvalResult {
    span_part(call, |span| span.num_minutes() % 60)
}

fn seconds(call: &BuiltinCall<'_>) -> EvalResult {
    span_part(call, |span| span.num_seconds() % 60)
}

fn default_value(call: &BuiltinCall<'_>) -> EvalResult {
    let ty = call.type_args.first().unwrap_or(&Type::Void);
    Ok(zero_value(ty, call.run.shapes()))
}

fn empty(_: &BuiltinCall<'_>) -> EvalResult {
    Ok(Value::empty_set())
}
