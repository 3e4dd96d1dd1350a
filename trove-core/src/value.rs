use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};
use time::{Date, PrimitiveDateTime, Time, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
pub(crate) const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond]");
pub(crate) const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

/// A dynamically typed cell.
///
/// Typed variants wrap an `Option` so that a NULL keeps its type: column
/// prototypes are typed NULLs (`Value::Int64(None)`), `Value::Null` is a NULL
/// whose type is not known (for example a NULL coming straight from a driver).
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
}

/// Hashable normalization of a non-null value.
///
/// Two values comparing equal through [`Value::compare`] always produce the
/// same key, distinct values may collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Boolean(bool),
    Integer(i128),
    Float(u64),
    Text(String),
    Blob(Box<[u8]>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// The typed NULL of the same variant.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::Uuid(..) => Value::Uuid(None),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "BIGINT",
            Value::Float64(..) => "DOUBLE",
            Value::Decimal(..) => "DECIMAL",
            Value::Varchar(..) => "VARCHAR",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "DATE",
            Value::Time(..) => "TIME",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::Uuid(..) => "UUID",
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int32(Some(v)) => Some(*v as i128),
            Value::Int64(Some(v)) => Some(*v as i128),
            Value::Decimal(Some(v)) if v.fract().is_zero() => v.to_i128(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(Some(v)) => Some(*v as f64),
            Value::Int64(Some(v)) => Some(*v as f64),
            Value::Float64(Some(v)) => Some(*v),
            Value::Decimal(Some(v)) => v.to_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// SQL-like comparison: `None` when either side is NULL or the types are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (self, other) {
            (Value::Boolean(Some(l)), Value::Boolean(Some(r))) => Some(l.cmp(r)),
            (Value::Varchar(Some(l)), Value::Varchar(Some(r))) => Some(l.cmp(r)),
            (Value::Blob(Some(l)), Value::Blob(Some(r))) => Some(l.cmp(r)),
            (Value::Date(Some(l)), Value::Date(Some(r))) => Some(l.cmp(r)),
            (Value::Time(Some(l)), Value::Time(Some(r))) => Some(l.cmp(r)),
            (Value::Timestamp(Some(l)), Value::Timestamp(Some(r))) => Some(l.cmp(r)),
            (Value::Uuid(Some(l)), Value::Uuid(Some(r))) => Some(l.cmp(r)),
            (Value::Decimal(Some(l)), Value::Decimal(Some(r))) => Some(l.cmp(r)),
            _ => match (self.as_i128(), other.as_i128()) {
                (Some(l), Some(r)) => Some(l.cmp(&r)),
                (Some(l), None) => integer_cmp(l, other.as_f64()?),
                (None, Some(r)) => integer_cmp(r, self.as_f64()?).map(Ordering::reverse),
                (None, None) => self.as_f64()?.partial_cmp(&other.as_f64()?),
            },
        }
    }

    /// Total order used for sorting, NULLs come first.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .compare(other)
                .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank())),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(..) => 1,
            Value::Int32(..) | Value::Int64(..) | Value::Float64(..) | Value::Decimal(..) => 2,
            Value::Varchar(..) => 3,
            Value::Blob(..) => 4,
            Value::Date(..) => 5,
            Value::Time(..) => 6,
            Value::Timestamp(..) => 7,
            Value::Uuid(..) => 8,
        }
    }

    pub fn join_key(&self) -> Option<JoinKey> {
        if self.is_null() {
            return None;
        }
        if let Some(v) = self.as_i128() {
            return Some(JoinKey::Integer(v));
        }
        Some(match self {
            Value::Boolean(Some(v)) => JoinKey::Boolean(*v),
            Value::Float64(Some(v)) => float_key(*v),
            Value::Decimal(Some(v)) => float_key(v.to_f64()?),
            Value::Varchar(Some(v)) => JoinKey::Text(v.clone()),
            Value::Blob(Some(v)) => JoinKey::Blob(v.clone()),
            _ => JoinKey::Text(self.to_string()),
        })
    }

    /// Canonical textual form of temporal and uuid values, as stored by text based engines.
    pub fn to_canonical_string(&self) -> Option<String> {
        match self {
            Value::Date(Some(v)) => v.format(DATE_FORMAT).ok(),
            Value::Time(Some(v)) => v.format(TIME_FORMAT).ok(),
            Value::Timestamp(Some(v)) => v.format(TIMESTAMP_FORMAT).ok(),
            Value::Uuid(Some(v)) => Some(v.to_string()),
            _ => None,
        }
    }
}

/// Exact ordering of an integer against a float, agrees with [`Value::join_key`].
fn integer_cmp(integer: i128, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    // Both bounds are powers of two, exact in f64
    if float >= i128::MAX as f64 {
        return Some(Ordering::Less);
    }
    if float < i128::MIN as f64 {
        return Some(Ordering::Greater);
    }
    let floor = float.floor();
    Some(integer.cmp(&(floor as i128)).then(if float > floor {
        Ordering::Less
    } else {
        Ordering::Equal
    }))
}

fn float_key(value: f64) -> JoinKey {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e36 {
        JoinKey::Integer(value as i128)
    } else {
        JoinKey::Float(value.to_bits())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Decimal(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => write!(f, "'{}'", v),
            Value::Blob(Some(v)) => {
                f.write_str("X'")?;
                for b in v.iter() {
                    write!(f, "{:02X}", b)?;
                }
                f.write_str("'")
            }
            _ => match self.to_canonical_string() {
                Some(v) => write!(f, "'{}'", v),
                None => write!(f, "{:?}", self),
            },
        }
    }
}
