use crate::{DaoError, Error, Result, Value, value::*};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{any, str::FromStr};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// `try_from_value` accepts the canonical variant for the type and, where it is
/// lossless, the variants a backend may hand back instead (an `Int64` for an
/// `i32` column, a `Varchar` for a date). Use [`Value::coerce`] first when the
/// value comes from an engine that stores everything in a few storage classes.
///
/// ```rust
/// use trove_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed NULL for this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn unexpected<T>(value: Value) -> Error {
    Error::new(DaoError::TypeCoercion {
        value: format!("{:?}", value),
        target: any::type_name::<T>().into(),
    })
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    value => match value.clone().coerce(&Self::as_empty_value()) {
                        Ok($destination(Some(v))) => Ok(v.into()),
                        _ => Err(unexpected::<Self>(value)),
                    },
                }
            }
        }
    };
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(f64, Value::Float64);
impl_as_value!(Decimal, Value::Decimal);
impl_as_value!(String, Value::Varchar);
impl_as_value!(Box<[u8]>, Value::Blob);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(Uuid, Value::Uuid);

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}

impl Value {
    /// Convert `self` into the type of the `desired` prototype.
    pub fn coerce(self, desired: &Value) -> Result<Value> {
        if self.same_type(desired) || matches!(desired, Value::Null) {
            return Ok(self);
        }
        if self.is_null() {
            return Ok(desired.as_null());
        }
        let failure = |value: &Value| {
            Error::new(DaoError::TypeCoercion {
                value: value.to_string(),
                target: desired.type_name().into(),
            })
        };
        let result = match (&self, desired) {
            (Value::Int64(Some(v)), Value::Int32(..)) => {
                i32::try_from(*v).ok().map(|v| Value::Int32(Some(v)))
            }
            (Value::Int32(Some(v)), Value::Int64(..)) => Some(Value::Int64(Some(*v as i64))),
            (Value::Int32(..) | Value::Int64(..), Value::Boolean(..)) => {
                match self.as_i128() {
                    Some(0) => Some(Value::Boolean(Some(false))),
                    Some(1) => Some(Value::Boolean(Some(true))),
                    _ => None,
                }
            }
            (Value::Int32(..) | Value::Int64(..), Value::Float64(..)) => {
                self.as_f64().map(|v| Value::Float64(Some(v)))
            }
            (Value::Int32(..) | Value::Int64(..), Value::Decimal(..)) => self
                .as_i128()
                .and_then(Decimal::from_i128)
                .map(|v| Value::Decimal(Some(v))),
            (Value::Float64(Some(v)), Value::Decimal(..)) => {
                Decimal::from_f64(*v).map(|v| Value::Decimal(Some(v)))
            }
            // The upper bound is 2^63, one past i64::MAX
            (Value::Float64(Some(v)), Value::Int64(..))
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Some(Value::Int64(Some(*v as i64)))
            }
            (Value::Decimal(Some(v)), Value::Float64(..)) => {
                v.to_f64().map(|v| Value::Float64(Some(v)))
            }
            (Value::Decimal(..), Value::Int32(..) | Value::Int64(..)) => self
                .as_i128()
                .and_then(|v| i64::try_from(v).ok())
                .map(|v| Value::Int64(Some(v)))
                .map(|v| v.coerce(desired))
                .transpose()?,
            (Value::Varchar(Some(v)), desired) => parse_text(v, desired),
            (Value::Blob(Some(v)), Value::Uuid(..)) => {
                Uuid::from_slice(v).ok().map(|v| Value::Uuid(Some(v)))
            }
            (Value::Blob(Some(v)), Value::Varchar(..)) => String::from_utf8(v.to_vec())
                .ok()
                .map(|v| Value::Varchar(Some(v))),
            (Value::Boolean(Some(v)), Value::Int32(..)) => Some(Value::Int32(Some(*v as i32))),
            (Value::Boolean(Some(v)), Value::Int64(..)) => Some(Value::Int64(Some(*v as i64))),
            (_, Value::Varchar(..)) => Some(Value::Varchar(Some(
                self.to_canonical_string()
                    .unwrap_or_else(|| self.to_string()),
            ))),
            _ => None,
        };
        result.ok_or_else(|| failure(&self))
    }
}

fn parse_text(text: &str, desired: &Value) -> Option<Value> {
    Some(match desired {
        Value::Boolean(..) => Value::Boolean(Some(match text {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return None,
        })),
        Value::Int32(..) => Value::Int32(Some(text.parse().ok()?)),
        Value::Int64(..) => Value::Int64(Some(text.parse().ok()?)),
        Value::Float64(..) => Value::Float64(Some(text.parse().ok()?)),
        Value::Decimal(..) => Value::Decimal(Some(Decimal::from_str(text).ok()?)),
        Value::Blob(..) => Value::Blob(Some(text.as_bytes().into())),
        Value::Date(..) => Value::Date(Some(Date::parse(text, DATE_FORMAT).ok()?)),
        Value::Time(..) => Value::Time(Some(Time::parse(text, TIME_FORMAT).ok()?)),
        Value::Timestamp(..) => {
            Value::Timestamp(Some(PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT).ok()?))
        }
        Value::Uuid(..) => Value::Uuid(Some(Uuid::parse_str(text).ok()?)),
        Value::Null | Value::Varchar(..) => return None,
    })
}
