//! Scalar values and dynamically typed record values.

use std::cmp::Ordering;

use derive_more::{Display, From};
use thiserror::Error;

use crate::{array::Array, kind::RecordKind};

/// A single record element.
#[derive(Clone, Debug, PartialEq, From)]
pub enum Scalar {
    /// A 32-bit signed integer.
    Integer(i32),
    /// A 64-bit signed integer.
    Integer64(i64),
    /// A double precision number.
    Double(f64),
    /// A boolean.
    Logical(bool),
    /// A string.
    Character(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Character(value.to_string())
    }
}

/// A value which is incompatible with the requested kind or type.
#[derive(Debug, Error)]
#[error("{value} is not compatible with {expected}")]
pub struct IncompatibleValueError {
    value: String,
    expected: String,
}

impl IncompatibleValueError {
    /// Create a new incompatible value error.
    #[must_use]
    pub fn new(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expected: expected.into(),
        }
    }
}

impl Scalar {
    /// The kind of the scalar.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Integer(_) => RecordKind::Integer,
            Self::Integer64(_) => RecordKind::Integer64,
            Self::Double(_) => RecordKind::Double,
            Self::Logical(_) => RecordKind::Logical,
            Self::Character(_) => RecordKind::Character,
        }
    }

    /// Returns the value as an [`i64`] if the scalar is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value as i64),
            Self::Integer64(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as an [`f64`] if the scalar is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Integer64(value) => Some(*value as f64),
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a [`bool`] if the scalar is logical.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Logical(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a string slice if the scalar is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Character(value) => Some(value),
            _ => None,
        }
    }

    /// Convert the scalar to `kind`.
    ///
    /// Conversions never lose information:
    ///  - integers convert to doubles and to the other integer kind if in range,
    ///  - doubles convert to integers only if they are integral and in range,
    ///  - the strings `T`, `F`, `true` and `false` (case insensitive) convert to logicals,
    ///  - any scalar converts to a string through its [repr](Scalar::repr), strings are trimmed and must not
    ///    contain a line break.
    ///
    /// # Errors
    /// Returns [`IncompatibleValueError`] if the scalar cannot be represented as `kind`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn coerce(self, kind: RecordKind) -> Result<Self, IncompatibleValueError> {
        let incompatible =
            |value: &Self| IncompatibleValueError::new(value.repr(), kind.to_string());
        match (kind, self) {
            (RecordKind::Integer, Self::Integer(value)) => Ok(Self::Integer(value)),
            (RecordKind::Integer, Self::Integer64(value)) => i32::try_from(value)
                .map(Self::Integer)
                .map_err(|_| incompatible(&Self::Integer64(value))),
            (RecordKind::Integer64, Self::Integer(value)) => Ok(Self::Integer64(i64::from(value))),
            (RecordKind::Integer64, Self::Integer64(value)) => Ok(Self::Integer64(value)),
            (RecordKind::Integer, Self::Double(value))
                if value.fract() == 0.0
                    && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value) =>
            {
                Ok(Self::Integer(value as i32))
            }
            (RecordKind::Integer64, Self::Double(value))
                if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
            {
                Ok(Self::Integer64(value as i64))
            }
            (RecordKind::Double, Self::Double(value)) => Ok(Self::Double(value)),
            (RecordKind::Double, Self::Integer(value)) => Ok(Self::Double(f64::from(value))),
            (RecordKind::Double, Self::Integer64(value)) => Ok(Self::Double(value as f64)),
            (RecordKind::Logical, Self::Logical(value)) => Ok(Self::Logical(value)),
            (RecordKind::Logical, Self::Character(value)) => {
                crate::codec::parse_logical(&value)
                    .map(Self::Logical)
                    .ok_or_else(|| incompatible(&Self::Character(value)))
            }
            (RecordKind::Character, Self::Character(value)) => {
                let trimmed = value.trim();
                // A record holds one string per line.
                if trimmed.contains(['\n', '\r']) {
                    Err(incompatible(&Self::Character(value)))
                } else {
                    Ok(Self::Character(trimmed.to_string()))
                }
            }
            (RecordKind::Character, value) => Ok(Self::Character(value.repr())),
            (_, value) => Err(incompatible(&value)),
        }
    }

    /// A Python style representation of the scalar, as printed by the command line tool.
    ///
    /// Strings are quoted, logicals are `True`/`False` and doubles use the shortest representation which
    /// round trips.
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Integer64(value) => value.to_string(),
            Self::Double(value) => float_repr(*value),
            Self::Logical(true) => "True".to_string(),
            Self::Logical(false) => "False".to_string(),
            Self::Character(value) => string_repr(value),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Logical(a), Self::Logical(b)) => a.partial_cmp(b),
            (Self::Character(a), Self::Character(b)) => a.partial_cmp(b),
            _ => {
                if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
                    a.partial_cmp(&b)
                } else if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
                    a.partial_cmp(&b)
                } else {
                    None
                }
            }
        }
    }
}

/// The shortest round trip representation of a double, with an exponent in the Python style (`1e-07`).
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    } else if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = exponent
                .strip_prefix('-')
                .map_or(("+", exponent), |digits| ("-", digits));
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// A Python style quoted string.
fn string_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut repr = String::with_capacity(value.len() + 2);
    repr.push(quote);
    for c in value.chars() {
        match c {
            '\\' => repr.push_str("\\\\"),
            '\n' => repr.push_str("\\n"),
            '\r' => repr.push_str("\\r"),
            '\t' => repr.push_str("\\t"),
            c if c == quote => {
                repr.push('\\');
                repr.push(c);
            }
            c => repr.push(c),
        }
    }
    repr.push(quote);
    repr
}

/// A record value as read from the store: a scalar or a dense array.
#[derive(Clone, Debug, PartialEq, From, Display)]
pub enum Value {
    /// A scalar record.
    #[display("{}", _0.repr())]
    Scalar(Scalar),
    /// An array record.
    #[display("{}", _0.to_nested().repr())]
    Array(Array),
}

impl Value {
    /// The kind of the value.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Scalar(scalar) => scalar.kind(),
            Self::Array(array) => array.kind(),
        }
    }

    /// Returns the scalar if the value is a scalar.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::Array(_) => None,
        }
    }

    /// Returns the array if the value is an array.
    #[must_use]
    pub const fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Scalar(_) => None,
            Self::Array(array) => Some(array),
        }
    }

    /// Convert into an array, if the value is an array.
    #[must_use]
    pub fn into_array(self) -> Option<Array> {
        match self {
            Self::Scalar(_) => None,
            Self::Array(array) => Some(array),
        }
    }
}

macro_rules! impl_value_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

impl_value_from_primitive!(i32, i64, f64, bool, String, &str);

macro_rules! impl_try_from_value {
    ($t:ty, $expected:literal, $scalar:ident => $convert:expr) => {
        impl TryFrom<Value> for $t {
            type Error = IncompatibleValueError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                let converted = match &value {
                    Value::Scalar($scalar) => $convert,
                    Value::Array(_) => None,
                };
                converted.ok_or_else(|| IncompatibleValueError::new(value.to_string(), $expected))
            }
        }
    };
}

impl_try_from_value!(i32, "i32", scalar => scalar.as_i64().and_then(|v| i32::try_from(v).ok()));
impl_try_from_value!(i64, "i64", scalar => scalar.as_i64());
impl_try_from_value!(f64, "f64", scalar => scalar.as_f64());
impl_try_from_value!(bool, "bool", scalar => scalar.as_bool());
impl_try_from_value!(String, "String", scalar => scalar.as_str().map(str::to_string));

impl TryFrom<Value> for Array {
    type Error = IncompatibleValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(array) => Ok(array),
            Value::Scalar(scalar) => Err(IncompatibleValueError::new(scalar.repr(), "an array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_repr() {
        assert_eq!(Scalar::from(42).repr(), "42");
        assert_eq!(Scalar::from(1.0).repr(), "1.0");
        assert_eq!(Scalar::from(3.141_592_653_589_79).repr(), "3.14159265358979");
        assert_eq!(Scalar::from(1e-7).repr(), "1e-07");
        assert_eq!(Scalar::from(1.5e20).repr(), "1.5e+20");
        assert_eq!(Scalar::from(true).repr(), "True");
        assert_eq!(Scalar::from("Mu").repr(), "'Mu'");
        assert_eq!(Scalar::from("it's").repr(), "\"it's\"");
        assert_eq!(Scalar::from("a'\"b").repr(), "'a\\'\"b'");
    }

    #[test]
    fn scalar_coerce() {
        assert_eq!(
            Scalar::from(3).coerce(RecordKind::Double).unwrap(),
            Scalar::Double(3.0)
        );
        assert_eq!(
            Scalar::from(3.0).coerce(RecordKind::Integer).unwrap(),
            Scalar::Integer(3)
        );
        assert!(Scalar::from(3.5).coerce(RecordKind::Integer).is_err());
        assert!(Scalar::from(i64::MAX).coerce(RecordKind::Integer).is_err());
        assert_eq!(
            Scalar::from(7).coerce(RecordKind::Integer64).unwrap(),
            Scalar::Integer64(7)
        );
        assert_eq!(
            Scalar::from("t").coerce(RecordKind::Logical).unwrap(),
            Scalar::Logical(true)
        );
        assert!(Scalar::from("maybe").coerce(RecordKind::Logical).is_err());
        assert!(Scalar::from(1).coerce(RecordKind::Logical).is_err());
        assert_eq!(
            Scalar::from(42).coerce(RecordKind::Character).unwrap(),
            Scalar::from("42")
        );
        assert_eq!(
            Scalar::from("  Mu \n").coerce(RecordKind::Character).unwrap(),
            Scalar::from("Mu")
        );
        assert!(Scalar::from("Jastrow\nBoys").coerce(RecordKind::Character).is_err());
        assert!(Scalar::from("O\rH").coerce(RecordKind::Character).is_err());
    }

    #[test]
    fn scalar_ordering() {
        assert!(Scalar::from(2) < Scalar::from(3_i64));
        assert!(Scalar::from(2.5) > Scalar::from(2));
        assert!(Scalar::from("a") < Scalar::from("b"));
        assert_eq!(Scalar::from("a").partial_cmp(&Scalar::from(1)), None);
    }

    #[test]
    fn value_try_from() {
        assert_eq!(i32::try_from(Value::from(5)).unwrap(), 5);
        assert_eq!(f64::try_from(Value::from(5)).unwrap(), 5.0);
        assert_eq!(String::try_from(Value::from("Mu")).unwrap(), "Mu");
        assert!(bool::try_from(Value::from("Mu")).is_err());
        assert_eq!(
            i32::try_from(Value::from("Mu")).unwrap_err().to_string(),
            "'Mu' is not compatible with i32"
        );
    }
}
