//! Opaque continuation cursors.
//!
//! A cursor is the JSON form of a [`GlobalKey`], base64url encoded without
//! padding. Decoding also accepts padded input.

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use dynlist_types::{Primitive, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Decode bound for untrusted cursor input.
const MAX_CURSOR_LEN: usize = 4096;

const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The position of one row in a list's effective ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalKey {
    pub entity: String,
    /// Values of the entity's key fields, in key order.
    pub key: Vec<Primitive>,
    /// Values of every `ORDER BY` entry, in statement order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("cursor is empty")]
    Empty,

    #[error("cursor exceeds max length: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("cursor is not valid base64url")]
    InvalidEncoding,

    #[error("cursor is not valid UTF-8")]
    InvalidUtf8,

    #[error("cursor payload is malformed: {0}")]
    InvalidPayload(String),

    #[error("cursor value {0} is not a finite number")]
    NonFinite(String),
}

impl From<CursorError> for ValidationError {
    fn from(err: CursorError) -> Self {
        ValidationError::for_field("pagination", format!("invalid cursor: {err}"))
    }
}

impl From<CursorError> for crate::ListError {
    fn from(err: CursorError) -> Self {
        crate::ListError::Validation(err.into())
    }
}

/// Encodes a key as an opaque cursor.
///
/// Fails with [`CursorError::NonFinite`] for infinite or NaN floats, which
/// JSON cannot carry.
pub fn encode_global_key(key: &GlobalKey) -> Result<String, CursorError> {
    let mut object = Map::new();
    object.insert("entity".into(), Value::String(key.entity.clone()));
    object.insert("key".into(), json_values(&key.key)?);
    if !key.sort.is_empty() {
        object.insert("sort".into(), json_values(&key.sort)?);
    }
    Ok(CURSOR_ENGINE.encode(Value::Object(object).to_string()))
}

fn json_values(values: &[Primitive]) -> Result<Value, CursorError> {
    values
        .iter()
        .map(|value| match value {
            Primitive::Float(f) if !f.is_finite() => Err(CursorError::NonFinite(f.to_string())),
            value => Ok(value.to_json()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Decodes a cursor produced by [`encode_global_key`].
///
/// Surrounding whitespace is trimmed.
pub fn decode_global_key(cursor: &str) -> Result<GlobalKey, CursorError> {
    let cursor = cursor.trim();

    if cursor.is_empty() {
        return Err(CursorError::Empty);
    }

    if cursor.len() > MAX_CURSOR_LEN {
        return Err(CursorError::TooLong {
            len: cursor.len(),
            max: MAX_CURSOR_LEN,
        });
    }

    let bytes = CURSOR_ENGINE
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;
    let json = String::from_utf8(bytes).map_err(|_| CursorError::InvalidUtf8)?;

    serde_json::from_str(&json).map_err(|e| CursorError::InvalidPayload(e.to_string()))
}
