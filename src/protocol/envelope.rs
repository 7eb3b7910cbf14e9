//! Inbound envelope parsing
//!
//! Clients in the wild disagree on field casing: some send `to`/`from`,
//! others `To`/`From`. Casing is resolved once here so routing only ever
//! sees the canonical fields.
//!
//! Lookup order for each routed field:
//! 1. the exact lower-case key (`to`)
//! 2. the first key that matches ignoring ASCII case (`To`, `TO`)

use serde_json::{Map, Value};

use super::constants::{
    FIELD_DATA, FIELD_FROM, FIELD_TO, FIELD_TYPE, PEERS_REQUEST, TYPE_BROADCAST,
};

/// Reasons a frame could not be turned into an envelope
#[derive(Debug)]
pub enum ParseError {
    /// Frame is not valid JSON
    Json(serde_json::Error),
    /// Frame is valid JSON but not an object
    NotAnObject,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Json(e) => write!(f, "Invalid JSON: {}", e),
            ParseError::NotAnObject => write!(f, "Envelope is not a JSON object"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed signaling envelope
///
/// Holds the canonicalised routing fields alongside the frame exactly as it
/// arrived, which is what gets forwarded on unicast and broadcast.
#[derive(Debug, Clone)]
pub struct Envelope {
    raw: String,

    /// Unicast target
    pub to: Option<String>,

    /// Sender-asserted id (not verified against the connection)
    pub from: Option<String>,

    /// Message tag
    pub kind: Option<String>,

    /// Application payload
    pub data: Option<Value>,
}

impl Envelope {
    /// Parse a text frame
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(text).map_err(ParseError::Json)?;

        let Value::Object(mut fields) = value else {
            return Err(ParseError::NotAnObject);
        };

        Ok(Self {
            raw: text.to_owned(),
            to: take_string(&mut fields, FIELD_TO),
            from: take_string(&mut fields, FIELD_FROM),
            kind: take_string(&mut fields, FIELD_TYPE),
            data: take_field(&mut fields, FIELD_DATA),
        })
    }

    /// The frame text as received
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this frame is a peer list query
    pub fn is_peers_request(&self) -> bool {
        matches!(&self.data, Some(Value::String(s)) if s == PEERS_REQUEST)
    }

    /// Whether this frame asks for fan-out
    pub fn is_broadcast(&self) -> bool {
        self.kind.as_deref() == Some(TYPE_BROADCAST)
    }
}

fn take_field(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    if let Some(value) = fields.remove(name) {
        return Some(value);
    }

    let key = fields
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))?
        .clone();
    fields.remove(&key)
}

// Non-string values are treated as absent, same as an unknown id.
fn take_string(fields: &mut Map<String, Value>, name: &str) -> Option<String> {
    match take_field(fields, name)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}
