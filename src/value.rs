//! Scalar value types used by constants, parameters, and column definitions.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A SQL scalar type, drawn from the fixed set the catalog and expression
/// model can describe a value as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Decimal { scale: u8 },
    Text,
    Bytes,
    Boolean,
    Date,
    Time,
    Timestamp,
    Uuid,
    Json,
}

impl ValueType {
    /// Returns true if every value of `other` can be represented in `self`
    /// without loss of precision.
    ///
    /// Used by the filter normalizer's PRECISION check (spec.md §4.1): an
    /// indexed column/expression may only absorb a comparison if its type
    /// can exactly hold the other side's type. Widening integer casts are
    /// fine; narrowing or cross-family casts are not.
    pub fn exactly_represents(self, other: ValueType) -> bool {
        use ValueType::{BigInt, Integer, SmallInt, TinyInt};

        if self == other {
            return true;
        }
        match self {
            SmallInt => matches!(other, TinyInt),
            Integer => matches!(other, TinyInt | SmallInt),
            BigInt => matches!(other, TinyInt | SmallInt | Integer),
            ValueType::Decimal { scale } => {
                matches!(other, ValueType::Decimal { scale: s } if s == scale)
            }
            _ => false,
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::TinyInt => write!(f, "tinyint"),
            ValueType::SmallInt => write!(f, "smallint"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::BigInt => write!(f, "bigint"),
            ValueType::Real => write!(f, "real"),
            ValueType::Decimal { scale } => write!(f, "decimal({scale})"),
            ValueType::Text => write!(f, "text"),
            ValueType::Bytes => write!(f, "bytes"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Date => write!(f, "date"),
            ValueType::Time => write!(f, "time"),
            ValueType::Timestamp => write!(f, "timestamp"),
            ValueType::Uuid => write!(f, "uuid"),
            ValueType::Json => write!(f, "json"),
        }
    }
}

/// A literal scalar value.
///
/// Comparisons use total ordering for `Real` (positive NaN sorts above all
/// other values, matching IEEE 754 `totalOrder`'s sign-then-magnitude key)
/// so values remain usable as index search keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f64),
    /// Fixed-precision decimal: raw value in smallest units, plus scale.
    Decimal(i128, u8),
    Text(String),
    Bytes(Vec<u8>),
    Boolean(bool),
    /// Days since Unix epoch.
    Date(i32),
    /// Nanoseconds within day.
    Time(i64),
    /// Nanoseconds since Unix epoch.
    Timestamp(i64),
    Uuid([u8; 16]),
    Json(serde_json::Value),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::TinyInt(a), Value::TinyInt(b)) => a == b,
            (Value::SmallInt(a), Value::SmallInt(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a, ascale), Value::Decimal(b, bscale)) => a == b && ascale == bscale,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

fn total_cmp_f64(a: f64, b: f64) -> Ordering {
    let a_bits = a.to_bits();
    let b_bits = b.to_bits();
    let a_key = if a.is_sign_negative() { !a_bits } else { a_bits ^ (1u64 << 63) };
    let b_key = if b.is_sign_negative() { !b_bits } else { b_bits ^ (1u64 << 63) };
    a_key.cmp(&b_key)
}

impl Value {
    /// Returns the type of this value, or `None` for `Null` (no concrete type).
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::TinyInt(_) => Some(ValueType::TinyInt),
            Value::SmallInt(_) => Some(ValueType::SmallInt),
            Value::Integer(_) => Some(ValueType::Integer),
            Value::BigInt(_) => Some(ValueType::BigInt),
            Value::Real(_) => Some(ValueType::Real),
            Value::Decimal(_, scale) => Some(ValueType::Decimal { scale: *scale }),
            Value::Text(_) => Some(ValueType::Text),
            Value::Bytes(_) => Some(ValueType::Bytes),
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::Date(_) => Some(ValueType::Date),
            Value::Time(_) => Some(ValueType::Time),
            Value::Timestamp(_) => Some(ValueType::Timestamp),
            Value::Uuid(_) => Some(ValueType::Uuid),
            Value::Json(_) => Some(ValueType::Json),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values. `Null` sorts below everything; different
    /// non-null types are incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::TinyInt(a), Value::TinyInt(b)) => Some(a.cmp(b)),
            (Value::SmallInt(a), Value::SmallInt(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => Some(total_cmp_f64(*a, *b)),
            (Value::Decimal(a, ascale), Value::Decimal(b, bscale)) if ascale == bscale => {
                Some(a.cmp(b))
            }
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::TinyInt(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Decimal(v, scale) => {
                let divisor = 10_i128.pow(u32::from(*scale));
                write!(f, "{}.{:0width$}", v / divisor, (v % divisor).abs(), width = *scale as usize)
            }
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "DATE({d})"),
            Value::Time(t) => write!(f, "TIME({t})"),
            Value::Timestamp(ts) => write!(f, "TIMESTAMP({ts})"),
            Value::Uuid(u) => {
                write!(f, "{}", u.iter().map(|b| format!("{b:02x}")).collect::<String>())
            }
            Value::Json(j) => write!(f, "{j}"),
        }
    }
}
