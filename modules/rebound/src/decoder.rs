//! Payload decoders.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Turns raw payload bytes into a handler's input type.
///
/// One decoder is active per `Rebound`. It is consulted on every dispatch,
/// so implementations should not keep per-call state.
pub trait Decoder: Send + Sync {
    fn decode<T>(&self, payload: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// JSON payloads, the default.
///
/// Field names in the payload map to the field names of the input struct.
/// Missing fields are an error unless the struct opts into
/// `#[serde(default)]`; unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonDecoder {
    strict: bool,
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Reject anything that is not a JSON object before decoding.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Decoder for JsonDecoder {
    fn decode<T>(&self, payload: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        if !self.strict {
            return Ok(serde_json::from_slice(payload)?);
        }

        let value: serde_json::Value = serde_json::from_slice(payload)?;
        match value {
            serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(DecodeError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Shared decoders
// ---------------------------------------------------------------------------

impl<D: Decoder> Decoder for &D {
    fn decode<T>(&self, payload: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        (**self).decode(payload)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<D: Decoder> Decoder for Box<D> {
    fn decode<T>(&self, payload: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        (**self).decode(payload)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<D: Decoder> Decoder for Arc<D> {
    fn decode<T>(&self, payload: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        (**self).decode(payload)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
