use core::fmt;

use serde::{Deserialize, Serialize};

/// A scalar value that can be bound as a query parameter or carried in a cursor.
///
/// Serializes as the bare JSON value (`null`, `true`, `42`, `1.5`, `"text"`).
/// Integers that fit in an `i64` deserialize as [`Primitive::Int`]; every other
/// JSON number becomes [`Primitive::Float`].
///
/// # Examples
///
/// ```
/// use dynlist_types::Primitive;
///
/// let value: Primitive = serde_json::from_str("42").unwrap();
/// assert_eq!(value, Primitive::Int(42));
///
/// let value: Primitive = serde_json::from_str("null").unwrap();
/// assert!(value.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Primitive {
    /// Returns `true` for [`Primitive::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }

    /// Converts a JSON value into a primitive.
    ///
    /// Returns `None` for arrays and objects, which cannot be carried in a cursor
    /// or bound as a single parameter.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Primitive::Null),
            serde_json::Value::Bool(b) => Some(Primitive::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Primitive::Int(i)),
                None => n.as_f64().filter(|f| f.is_finite()).map(Primitive::Float),
            },
            serde_json::Value::String(s) => Some(Primitive::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Converts this primitive into a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Primitive::Null => serde_json::Value::Null,
            Primitive::Bool(b) => serde_json::Value::Bool(*b),
            Primitive::Int(i) => serde_json::Value::from(*i),
            Primitive::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Primitive::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool(_) => "boolean",
            Primitive::Int(_) => "integer",
            Primitive::Float(_) => "float",
            Primitive::Text(_) => "string",
        }
    }
}

impl fmt::Display for Primitive {
    /// Text form used when building `LIKE` patterns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => f.write_str("null"),
            Primitive::Bool(b) => write!(f, "{b}"),
            Primitive::Int(i) => write!(f, "{i}"),
            Primitive::Float(v) => write!(f, "{v}"),
            Primitive::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Int(i64::from(value))
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Int(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Float(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Text(value.to_owned())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Text(value)
    }
}

impl<T: Into<Primitive>> From<Option<T>> for Primitive {
    fn from(value: Option<T>) -> Self {
        value.map_or(Primitive::Null, Into::into)
    }
}
