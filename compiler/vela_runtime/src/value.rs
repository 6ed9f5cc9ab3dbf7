//! The runtime value representation.
//!
//! Sets and lists are immutable and shared (`Arc`), so copying a value
//! is cheap and "modification" always produces a new collection. An
//! optional value is represented by its inner value, or [`Value::Null`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHasher};
use uuid::Uuid;
use vela_ir::literal::{format_datetime, format_double, format_timespan, quote};
use vela_ir::{Literal, StringInterner, VersionNumber};
use vela_types::EnumType;

use crate::{EvalResult, RowShape, RunState};

pub type ValueSet = IndexSet<Value, FxBuildHasher>;

#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    String(Arc<str>),
    Char(char),
    DateTime(NaiveDateTime),
    TimeSpan(TimeDelta),
    Version(VersionNumber),
    Guid(Uuid),
    Name(Arc<str>),
    Enum(EnumValue),
    /// Insertion-ordered, deduplicated by [`Value`] equality.
    Set(Arc<ValueSet>),
    List(Arc<Vec<Value>>),
    Tuple(Row),
    Function(FunctionValue),
    Null,
    Void,
}

impl Value {
    pub fn string(text: &str) -> Value {
        Value::String(Arc::from(text))
    }

    pub fn set_from(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(Arc::new(items.into_iter().collect()))
    }

    pub fn list_from(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(Arc::new(items.into_iter().collect()))
    }

    pub fn empty_set() -> Value {
        Value::Set(Arc::default())
    }

    pub fn empty_list() -> Value {
        Value::List(Arc::default())
    }

    /// The value a literal denotes.
    pub fn from_literal(literal: &Literal, interner: &StringInterner) -> Value {
        match *literal {
            Literal::Boolean(b) => Value::Boolean(b),
            Literal::Integer(n) => Value::Integer(n),
            Literal::Long(n) => Value::Long(n),
            Literal::Double(d) => Value::Double(d),
            Literal::String(s) => Value::String(interner.lookup(s)),
            Literal::Char(c) => Value::Char(c),
            Literal::Name(n) => Value::Name(interner.lookup(n)),
            Literal::DateTime(dt) => Value::DateTime(dt),
            Literal::TimeSpan(ts) => Value::TimeSpan(ts),
            Literal::Version(v) => Value::Version(v),
            Literal::Guid(g) => Value::Guid(g),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer or Long as `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Any numeric value as `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(f64::from(*n)),
            Value::Long(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a set or list, in iteration order.
    pub fn elements(&self) -> Option<Box<dyn Iterator<Item = &Value> + '_>> {
        match self {
            Value::Set(items) => Some(Box::new(items.iter())),
            Value::List(items) => Some(Box::new(items.iter())),
            _ => None,
        }
    }

    /// Element count of a set or list.
    pub fn count(&self) -> Option<usize> {
        match self {
            Value::Set(items) => Some(items.len()),
            Value::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Rebuild a collection of the same kind from `items`.
    pub fn same_kind(&self, items: Vec<Value>) -> Value {
        match self {
            Value::Set(_) => Value::set_from(items),
            _ => Value::List(Arc::new(items)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) | Value::Long(_) | Value::Double(_) => 2,
            Value::String(_) => 3,
            Value::Char(_) => 4,
            Value::DateTime(_) => 5,
            Value::TimeSpan(_) => 6,
            Value::Version(_) => 7,
            Value::Guid(_) => 8,
            Value::Name(_) => 9,
            Value::Enum(_) => 10,
            Value::Set(_) => 11,
            Value::List(_) => 12,
            Value::Tuple(_) => 13,
            Value::Function(_) => 14,
            Value::Void => 15,
        }
    }

    /// Total order used by comparisons and `order(...)`.
    ///
    /// `null` sorts first. Values of different kinds never meet in a
    /// well-typed program; they order by kind.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => {
                match (a.as_i64(), b.as_i64()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => a
                        .as_f64()
                        .unwrap_or_default()
                        .total_cmp(&b.as_f64().unwrap_or_default()),
                }
            }
            (Value::String(a), Value::String(b)) | (Value::Name(a), Value::Name(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::TimeSpan(a), Value::TimeSpan(b)) => a.cmp(b),
            (Value::Version(a), Value::Version(b)) => a.cmp(b),
            (Value::Guid(a), Value::Guid(b)) => a.cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a.ordinal.cmp(&b.ordinal),
            (Value::List(a), Value::List(b)) => compare_seq(a.iter(), b.iter()),
            (Value::Set(a), Value::Set(b)) => compare_seq(a.iter(), b.iter()),
            (Value::Tuple(a), Value::Tuple(b)) => compare_seq(a.fields.iter(), b.fields.iter()),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Display form without quotes, as produced by `ToString`.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::String(s) | Value::Name(s) => s.to_string(),
            Value::Char(c) => c.to_string(),
            Value::DateTime(dt) => format_datetime(*dt),
            Value::TimeSpan(ts) => format_timespan(*ts),
            Value::Guid(g) => g.to_string(),
            Value::Long(n) => n.to_string(),
            other => other.to_string(),
        }
    }
}

fn compare_seq<'a>(
    mut a: impl Iterator<Item = &'a Value>,
    mut b: impl Iterator<Item = &'a Value>,
) -> Ordering {
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.compare(y) {
                Ordering::Equal => {}
                unequal => return unequal,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits() || a == b,
            (Value::String(a), Value::String(b)) | (Value::Name(a), Value::Name(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::TimeSpan(a), Value::TimeSpan(b)) => a == b,
            (Value::Version(a), Value::Version(b)) => a == b,
            (Value::Guid(a), Value::Guid(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b) || a.as_ref() == b.as_ref(),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Boolean(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Long(n) => n.hash(state),
            // 0.0 and -0.0 compare equal.
            Value::Double(d) => {
                if *d == 0.0 {
                    0u64.hash(state);
                } else {
                    d.to_bits().hash(state);
                }
            }
            Value::String(s) | Value::Name(s) => s.hash(state),
            Value::Char(c) => c.hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::TimeSpan(ts) => ts.hash(state),
            Value::Version(v) => v.hash(state),
            Value::Guid(g) => g.hash(state),
            Value::Enum(e) => e.ordinal.hash(state),
            Value::Set(items) => {
                // Order-independent, like set equality.
                let mut sum = 0u64;
                for item in items.iter() {
                    let mut h = FxHasher::default();
                    item.hash(&mut h);
                    sum = sum.wrapping_add(h.finish());
                }
                items.len().hash(state);
                sum.hash(state);
            }
            Value::List(items) => items.as_slice().hash(state),
            Value::Tuple(row) => row.hash(state),
            Value::Function(f) => f.address().hash(state),
            Value::Null | Value::Void => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}L"),
            Value::Double(d) => f.write_str(&format_double(*d)),
            Value::String(s) => f.write_str(&quote(s)),
            Value::Char(c) => write!(f, "{}c", quote(&c.to_string())),
            Value::DateTime(dt) => write!(f, "{}dt", quote(&format_datetime(*dt))),
            Value::TimeSpan(ts) => write!(f, "{}ts", quote(&format_timespan(*ts))),
            Value::Version(v) => write!(f, "{v}"),
            Value::Guid(g) => write!(f, "{}g", quote(&g.to_string())),
            Value::Name(n) => write!(f, "{}n", quote(n)),
            Value::Enum(e) => f.write_str(e.name()),
            Value::Set(items) => write_items(f, "{", items.iter(), "}"),
            Value::List(items) => write_items(f, "[", items.iter(), "]"),
            Value::Tuple(row) => row.fmt(f),
            Value::Function(_) => f.write_str("<function>"),
            Value::Null => f.write_str("null"),
            Value::Void => Ok(()),
        }
    }
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

/// A value of an enumeration type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: Arc<EnumType>,
    pub ordinal: u32,
}

impl EnumValue {
    pub fn name(&self) -> &str {
        usize::try_from(self.ordinal)
            .ok()
            .and_then(|i| self.ty.values.get(i))
            .map_or("", |v| v.as_ref())
    }
}

/// A tuple value: a shape and one field per attribute.
#[derive(Clone, Debug)]
pub struct Row {
    shape: Arc<RowShape>,
    fields: Arc<[Value]>,
}

impl Row {
    /// `fields` must be in the shape's attribute order.
    pub fn new(shape: Arc<RowShape>, fields: Vec<Value>) -> Self {
        debug_assert_eq!(shape.len(), fields.len());
        Row {
            shape,
            fields: fields.into(),
        }
    }

    pub fn shape(&self) -> &Arc<RowShape> {
        &self.shape
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.shape.index_of(name).and_then(|i| self.fields.get(i))
    }

    /// Key positions shared by both rows: the primary key when both
    /// shapes declare the same one.
    fn shared_key(&self, other: &Row) -> Option<&[usize]> {
        let key = self.shape.key()?;
        (self.shape.ty().keys().first() == other.shape.ty().keys().first()).then_some(key)
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Row) -> bool {
        if self.shape.len() != other.shape.len()
            || (0..self.shape.len()).any(|i| self.shape.name(i) != other.shape.name(i))
        {
            return false;
        }
        match self.shared_key(other) {
            Some(key) => key.iter().all(|&i| self.fields[i] == other.fields[i]),
            None => self.fields == other.fields,
        }
    }
}

impl Eq for Row {}

impl Hash for Row {
    /// Hashes the key fields when the shape has a key. Rows stored in one
    /// collection share a shape, which keeps this consistent with `eq`.
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.shape.key() {
            Some(key) => {
                for &i in key {
                    self.fields[i].hash(state);
                }
            }
            None => self.fields.hash(state),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("{:}");
        }
        f.write_str("{")?;
        for (i, value) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {value}", self.shape.name(i))?;
        }
        f.write_str("}")
    }
}

type Callable = dyn Fn(&RunState, Vec<Value>) -> EvalResult + Send + Sync;

/// A first-class function: a compiled closure or a wrapped built-in.
#[derive(Clone)]
pub struct FunctionValue {
    func: Arc<Callable>,
}

impl FunctionValue {
    pub fn new(func: impl Fn(&RunState, Vec<Value>) -> EvalResult + Send + Sync + 'static) -> Self {
        FunctionValue {
            func: Arc::new(func),
        }
    }

    pub fn call(&self, run: &RunState, args: Vec<Value>) -> EvalResult {
        (self.func)(run, args)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.func).cast::<()>() as usize
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({:#x})", self.address())
    }
}
