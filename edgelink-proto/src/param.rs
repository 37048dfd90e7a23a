//! Tagged parameter codec.
//!
//! Every dynamic field exchanged with the transfer bot is a single
//! (identifier, value) pair. Both halves are self-describing on the wire:
//! a one-key JSON object whose key is the kind tag and whose value is the
//! payload.
//!
//! # Wire layout
//!
//! ```text
//! {
//!   "identifier": {"string": "WantSomePI?"},     — or {"number": 12345}
//!   "value":      {"double": 3.14159}
//! }
//! ```
//!
//! Value kind tags: `bool`, `int64`, `uint64`, `float`, `double`,
//! `string`, `bytes` (payload: array of 0–255 integers, length implicit
//! in the array, interior zeros allowed).
//!
//! The tag — not JSON number inference — selects the decoded variant, so
//! `float` vs `double` and `int64` vs `uint64` survive a round trip
//! exactly. An unrecognized tag fails with [`Error::UnknownType`]; a
//! decoder must never substitute a default for either half.

use serde_json::{Value as Json, json};

use crate::error::{Error, ParamPosition, Result};

/// The key half of a tagged parameter.
///
/// A string identifier and a numeric identifier never compare equal,
/// even when textually coincident (`Str("7") != Num(7)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Identifier {
    /// Free-form textual identifier.
    Str(String),
    /// Compact numeric identifier.
    Num(u32),
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::Str(id.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Self::Num(id)
    }
}

/// The value half of a tagged parameter. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit float, used for spatial/orientation quantities.
    Float(f32),
    /// 64-bit float, used for generic numeric payloads.
    Double(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw byte buffer with explicit length; may contain `0x00`.
    Bytes(Vec<u8>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

/// An (identifier, value) pair. The pair is only meaningful together.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedParam {
    /// The key half.
    pub id: Identifier,
    /// The value half.
    pub value: Value,
}

impl TaggedParam {
    /// Builds a parameter from anything convertible into the two halves.
    pub fn new(id: impl Into<Identifier>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Encodes a parameter into its self-describing JSON representation.
pub fn encode(param: &TaggedParam) -> Json {
    let id = match &param.id {
        Identifier::Str(s) => json!({ "string": s }),
        Identifier::Num(n) => json!({ "number": n }),
    };
    let value = match &param.value {
        Value::Bool(v) => json!({ "bool": v }),
        Value::Int64(v) => json!({ "int64": v }),
        Value::UInt64(v) => json!({ "uint64": v }),
        Value::Float(v) => json!({ "float": v }),
        Value::Double(v) => json!({ "double": v }),
        Value::Str(v) => json!({ "string": v }),
        Value::Bytes(v) => json!({ "bytes": v }),
    };
    json!({ "identifier": id, "value": value })
}

/// Decodes a parameter from its self-describing JSON representation.
///
/// Reads the identifier-kind tag, the identifier payload, the value-kind
/// tag, then the value payload. Fails rather than defaulting when either
/// half cannot be resolved.
pub fn decode(raw: &Json) -> Result<TaggedParam> {
    let obj = raw.as_object().ok_or(Error::InvalidParameter {
        position: ParamPosition::Identifier,
    })?;
    let id = obj.get("identifier").ok_or(Error::RequiredFieldMissing {
        field: "identifier",
    })?;
    let value = obj
        .get("value")
        .ok_or(Error::RequiredFieldMissing { field: "value" })?;
    Ok(TaggedParam {
        id: decode_identifier(id)?,
        value: decode_value(value)?,
    })
}

/// Splits a one-key `{"tag": payload}` object into its tag and payload.
fn tag_entry(raw: &Json, position: ParamPosition) -> Result<(&str, &Json)> {
    raw.as_object()
        .filter(|m| m.len() == 1)
        .and_then(|m| m.iter().next())
        .map(|(tag, payload)| (tag.as_str(), payload))
        .ok_or(Error::InvalidParameter { position })
}

fn decode_identifier(raw: &Json) -> Result<Identifier> {
    const POS: ParamPosition = ParamPosition::Identifier;
    let (tag, payload) = tag_entry(raw, POS)?;
    match tag {
        "string" => payload
            .as_str()
            .map(|s| Identifier::Str(s.to_owned()))
            .ok_or(Error::InvalidParameter { position: POS }),
        "number" => payload
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Identifier::Num)
            .ok_or(Error::InvalidParameter { position: POS }),
        other => Err(Error::UnknownType {
            position: POS,
            tag: other.to_owned(),
        }),
    }
}

fn decode_value(raw: &Json) -> Result<Value> {
    const POS: ParamPosition = ParamPosition::Value;
    let (tag, payload) = tag_entry(raw, POS)?;
    let value = match tag {
        "bool" => payload.as_bool().map(Value::Bool),
        "int64" => payload.as_i64().map(Value::Int64),
        "uint64" => payload.as_u64().map(Value::UInt64),
        // f64 -> f32 is exact here: the payload was printed from an f32.
        "float" => payload.as_f64().map(|v| Value::Float(v as f32)),
        "double" => payload.as_f64().map(Value::Double),
        "string" => payload.as_str().map(|s| Value::Str(s.to_owned())),
        "bytes" => decode_bytes(payload),
        other => {
            return Err(Error::UnknownType {
                position: POS,
                tag: other.to_owned(),
            });
        }
    };
    value.ok_or(Error::InvalidParameter { position: POS })
}

fn decode_bytes(payload: &Json) -> Option<Value> {
    let raw = payload.as_array()?;
    let mut bytes = Vec::with_capacity(raw.len());
    for entry in raw {
        bytes.push(u8::try_from(entry.as_u64()?).ok()?);
    }
    Some(Value::Bytes(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn roundtrip(param: TaggedParam) {
        let encoded = encode(&param);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, param);
    }

    #[test]
    fn roundtrip_every_value_kind() {
        for value in [
            Value::Bool(true),
            Value::Bool(false),
            Value::Int64(-42),
            Value::Int64(i64::MIN),
            Value::UInt64(u64::MAX),
            Value::Float(45.5),
            Value::Double(3.141_592_653_589_793),
            Value::Str(String::new()),
            Value::Str("héllo".to_owned()),
            Value::Bytes(vec![]),
            Value::Bytes(vec![0x00, 0xDE, 0x00, 0xAD]),
        ] {
            roundtrip(TaggedParam {
                id: Identifier::Str("k".to_owned()),
                value: value.clone(),
            });
            roundtrip(TaggedParam {
                id: Identifier::Num(u32::MAX),
                value,
            });
        }
    }

    #[test]
    fn uint64_above_i64_max_keeps_its_kind() {
        let param = TaggedParam::new(1u32, u64::MAX);
        let decoded = decode(&encode(&param)).unwrap();
        assert_eq!(decoded.value, Value::UInt64(u64::MAX));
    }

    #[test]
    fn float_and_double_stay_distinct() {
        let f = decode(&encode(&TaggedParam::new("f", 1.5f32))).unwrap();
        assert_eq!(f.value, Value::Float(1.5));
        let d = decode(&encode(&TaggedParam::new("d", 1.5f64))).unwrap();
        assert_eq!(d.value, Value::Double(1.5));
    }

    #[test]
    fn string_and_numeric_ids_never_equal() {
        assert_ne!(Identifier::from("7"), Identifier::from(7u32));
    }

    #[test]
    fn unknown_value_tag_is_a_hard_error() {
        let raw = serde_json::json!({
            "identifier": {"string": "x"},
            "value": {"decimal128": 1},
        });
        match decode(&raw) {
            Err(Error::UnknownType { position, tag }) => {
                assert_eq!(position, ParamPosition::Value);
                assert_eq!(tag, "decimal128");
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn unknown_identifier_tag_is_a_hard_error() {
        let raw = serde_json::json!({
            "identifier": {"uuid": "x"},
            "value": {"bool": true},
        });
        assert!(matches!(
            decode(&raw),
            Err(Error::UnknownType {
                position: ParamPosition::Identifier,
                ..
            })
        ));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        // "bytes" payload with an out-of-range element.
        let raw = serde_json::json!({
            "identifier": {"number": 1},
            "value": {"bytes": [0, 256]},
        });
        assert!(matches!(
            decode(&raw),
            Err(Error::InvalidParameter {
                position: ParamPosition::Value,
            })
        ));
    }

    #[test]
    fn missing_half_is_rejected() {
        let raw = serde_json::json!({ "identifier": {"number": 1} });
        assert!(matches!(
            decode(&raw),
            Err(Error::RequiredFieldMissing { field: "value" })
        ));
    }
}
