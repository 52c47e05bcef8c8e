//! Payload decoding.
//!
//! Inbound payloads are UTF-8 text, usually a JSON object carrying a
//! `raw_output` and an `input` field. Anything else is still displayable:
//! non-JSON text becomes the output verbatim and JSON without the known
//! fields becomes the output as a whole. Decoding never fails.

use serde::Deserialize;
use serde_json::Value;

/// A displayable output or input value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedValue {
    Text(String),
    Structured(Value),
}

impl FeedValue {
    /// JSON strings collapse to text; everything else stays structured.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => FeedValue::Text(s),
            other => FeedValue::Structured(other),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, FeedValue::Structured(_))
    }

    /// Text for display: strings verbatim, structured values as indented JSON.
    pub fn render(&self) -> String {
        match self {
            FeedValue::Text(s) => s.clone(),
            FeedValue::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }
}

/// Known fields of an agent message.
#[derive(Debug, Default, Deserialize)]
struct AgentEnvelope {
    #[serde(default)]
    raw_output: Option<Value>,
    #[serde(default)]
    input: Option<Value>,
}

/// `null`, `false`, `0` and `""` count as a missing field.
fn present(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other),
    }
}

/// Decoded JSON value with the recognised fields pulled out.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPayload {
    pub raw_output: Option<Value>,
    pub input: Option<Value>,
    /// The full decoded value.
    pub whole: Value,
}

/// Result of decoding one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    /// Non-JSON text, or a bare JSON string.
    Primitive(String),
    Structured(StructuredPayload),
}

impl DecodedPayload {
    /// Decode raw payload text.
    pub fn decode(raw: &str) -> Self {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(s)) => return DecodedPayload::Primitive(s),
            Ok(v) => v,
            Err(_) => return DecodedPayload::Primitive(raw.to_string()),
        };

        let envelope = if value.is_object() {
            AgentEnvelope::deserialize(&value).unwrap_or_default()
        } else {
            AgentEnvelope::default()
        };

        DecodedPayload::Structured(StructuredPayload {
            raw_output: present(envelope.raw_output),
            input: present(envelope.input),
            whole: value,
        })
    }

    /// Whether decoding fell back to the raw text.
    pub fn is_primitive(&self) -> bool {
        matches!(self, DecodedPayload::Primitive(_))
    }

    /// Split into the entry's (output, input).
    pub fn into_output_input(self) -> (FeedValue, Option<FeedValue>) {
        match self {
            DecodedPayload::Primitive(text) => (FeedValue::Text(text), None),
            DecodedPayload::Structured(payload) => {
                let output = match payload.raw_output {
                    Some(raw) => FeedValue::from_json(raw),
                    None => FeedValue::from_json(payload.whole),
                };
                (output, payload.input.map(FeedValue::from_json))
            }
        }
    }
}
