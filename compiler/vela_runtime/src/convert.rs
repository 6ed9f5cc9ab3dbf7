//! Applying conversions, zero values and argument coercion.

use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use uuid::Uuid;
use vela_ir::VersionNumber;
use vela_types::{Conversion, Type};

use crate::{EnumValue, Row, RuntimeError, ShapeCache, Value};

/// Apply a conversion produced by [`vela_types::conversion`].
#[allow(clippy::cast_precision_loss)]
pub fn convert(value: Value, conversion: &Conversion) -> Value {
    match (conversion, value) {
        (Conversion::Identity, v) | (_, v @ Value::Null) => v,
        (Conversion::IntegerToLong, Value::Integer(n)) => Value::Long(i64::from(n)),
        (Conversion::IntegerToDouble, Value::Integer(n)) => Value::Double(f64::from(n)),
        (Conversion::LongToDouble, Value::Long(n)) => Value::Double(n as f64),
        (Conversion::Optional(inner), v) => convert(v, inner),
        (Conversion::Elements(inner), Value::Set(items)) => {
            Value::set_from(items.iter().map(|v| convert(v.clone(), inner)))
        }
        (Conversion::Elements(inner), Value::List(items)) => {
            Value::list_from(items.iter().map(|v| convert(v.clone(), inner)))
        }
        (_, v) => v,
    }
}

/// The value an uninitialised variable of type `ty` holds.
pub fn zero_value(ty: &Type, shapes: &ShapeCache) -> Value {
    match ty {
        Type::Boolean => Value::Boolean(false),
        Type::Integer => Value::Integer(0),
        Type::Long => Value::Long(0),
        Type::Double => Value::Double(0.0),
        Type::String => Value::string(""),
        Type::Char => Value::Char('\0'),
        Type::DateTime => Value::DateTime(NaiveDateTime::default()),
        Type::TimeSpan => Value::TimeSpan(TimeDelta::zero()),
        Type::Version => Value::Version(VersionNumber::new(&[0, 0, 0]).unwrap_or_default()),
        Type::Guid => Value::Guid(Uuid::nil()),
        Type::Name => Value::Name(Arc::from("")),
        Type::Enum(e) => Value::Enum(EnumValue {
            ty: Arc::clone(e),
            ordinal: 0,
        }),
        Type::Set(_) => Value::empty_set(),
        Type::List(_) => Value::empty_list(),
        Type::Optional(_) => Value::Null,
        Type::Tuple(t) => {
            let shape = shapes.shape(t);
            let fields = t.attrs().iter().map(|a| zero_value(&a.ty, shapes)).collect();
            Value::Tuple(Row::new(shape, fields))
        }
        Type::Function(_) | Type::Param(_) | Type::Void => Value::Void,
    }
}

/// Check a host-supplied value against `ty`, widening numbers.
#[allow(clippy::cast_precision_loss)]
pub fn coerce(value: Value, ty: &Type) -> Result<Value, RuntimeError> {
    let coerced = match (value, ty) {
        (Value::Null, Type::Optional(_)) => Value::Null,
        (v, Type::Optional(inner)) => coerce(v, inner)?,
        (Value::Integer(n), Type::Long) => Value::Long(i64::from(n)),
        (Value::Integer(n), Type::Double) => Value::Double(f64::from(n)),
        (Value::Long(n), Type::Double) => Value::Double(n as f64),
        (Value::Set(items), Type::Set(element)) => {
            let items: Result<Vec<_>, _> =
                items.iter().map(|v| coerce(v.clone(), element)).collect();
            Value::set_from(items?)
        }
        (Value::List(items), Type::List(element)) => {
            let items: Result<Vec<_>, _> =
                items.iter().map(|v| coerce(v.clone(), element)).collect();
            Value::list_from(items?)
        }
        (v, ty) if conforms(&v, ty) => v,
        (v, ty) => {
            return Err(RuntimeError::invalid_argument(format!(
                "{v} is not a value of type `{ty}`"
            )))
        }
    };
    Ok(coerced)
}

fn conforms(value: &Value, ty: &Type) -> bool {
    match (value, ty) {
        (Value::Boolean(_), Type::Boolean)
        | (Value::Integer(_), Type::Integer)
        | (Value::Long(_), Type::Long)
        | (Value::Double(_), Type::Double)
        | (Value::String(_), Type::String)
        | (Value::Char(_), Type::Char)
        | (Value::DateTime(_), Type::DateTime)
        | (Value::TimeSpan(_), Type::TimeSpan)
        | (Value::Version(_), Type::Version)
        | (Value::Guid(_), Type::Guid)
        | (Value::Name(_), Type::Name)
        | (Value::Function(_), Type::Function(_))
        | (Value::Void, Type::Void) => true,
        (Value::Enum(v), Type::Enum(e)) => v.ty == *e,
        (Value::Tuple(row), Type::Tuple(t)) => row.shape().ty().same_heading(t),
        _ => false,
    }
}
