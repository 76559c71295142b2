//! Stub response model.
//!
//! A response body is exactly one of raw text, structured JSON or a reference
//! to a file in the mock server's `__files` store. On the wire WireMock only
//! knows three independent optional fields (`body`, `jsonBody`,
//! `bodyFileName`), so the union is flattened on encode and rebuilt on decode.
//!
//! `jsonBody` is written as a *string* holding serialized JSON. When reading,
//! a string `jsonBody` is parsed as embedded JSON text and any other JSON value
//! is taken as-is, so mappings returned by a stock WireMock server decode too.
//!
//! Response attributes this crate does not model (`base64Body`, `fault`,
//! `transformers`, ...) are carried along verbatim. So are `headers` and
//! `fixedDelayMilliseconds` values in a shape the typed fields cannot hold,
//! such as multi-value headers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

const HEADERS_KEY: &str = "headers";
const FIXED_DELAY_KEY: &str = "fixedDelayMilliseconds";

/// Response body of a stub mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    /// No body
    #[default]
    Empty,
    /// Opaque text payload
    Text(String),
    /// Structured JSON payload
    Json(Value),
    /// Name of a body file known to the mock server
    FileReference(String),
}

impl ResponseBody {
    /// Replace the body with a text payload.
    pub fn set_text(&mut self, text: impl Into<String>) {
        *self = ResponseBody::Text(text.into());
    }

    /// Replace the body with a JSON payload.
    pub fn set_json(&mut self, json: Value) {
        *self = ResponseBody::Json(json);
    }

    /// Replace the body with the JSON form of `value`.
    ///
    /// On serialization failure the current body is left untouched.
    pub fn set_json_value<T: Serialize>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(value)?;
        self.set_json(json);
        Ok(())
    }

    /// Replace the body with a file reference.
    pub fn set_file_reference(&mut self, name: impl Into<String>) {
        *self = ResponseBody::FileReference(name.into());
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn file_reference(&self) -> Option<&str> {
        match self {
            ResponseBody::FileReference(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    /// Bytes the mock server would send for this body.
    ///
    /// File references have no local payload.
    pub fn encoded_payload(&self) -> Option<Vec<u8>> {
        match self {
            ResponseBody::Text(text) => Some(text.as_bytes().to_vec()),
            ResponseBody::Json(json) => serde_json::to_vec(json).ok(),
            ResponseBody::FileReference(_) | ResponseBody::Empty => None,
        }
    }

    /// Best-effort decode of the payload into `T`.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Option<T> {
        let payload = self.encoded_payload()?;
        serde_json::from_slice(&payload).ok()
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_string())
    }
}

impl From<Value> for ResponseBody {
    fn from(json: Value) -> Self {
        ResponseBody::Json(json)
    }
}

/// Response half of a stub mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResponseWire", into = "ResponseWire")]
pub struct StubResponse {
    /// HTTP status code (not restricted to the success range)
    pub status: u16,
    /// Fixed delay before responding, in milliseconds
    pub fixed_delay: Option<u64>,
    /// Response headers
    pub headers: Option<HashMap<String, String>>,
    /// Response body
    pub body: ResponseBody,
    /// Unmodelled response attributes
    other: Map<String, Value>,
}

impl Default for StubResponse {
    fn default() -> Self {
        Self::new(default_status())
    }
}

impl StubResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            fixed_delay: None,
            headers: None,
            body: ResponseBody::Empty,
            other: Map::new(),
        }
    }

    pub fn with_fixed_delay(mut self, delay_ms: u64) -> Self {
        self.fixed_delay = Some(delay_ms);
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_body(mut self, body: impl Into<ResponseBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Decode the body into `T`, `None` if absent or malformed.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Option<T> {
        self.body.decode_as()
    }

    /// Replace the body with the JSON form of `value`.
    pub fn update_json<T: Serialize>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        self.body.set_json_value(value)
    }
}

fn default_status() -> u16 {
    200
}

/// WireMock's flat representation of a response.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseWire {
    #[serde(default = "default_status")]
    status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_delay_milliseconds: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    headers: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    json_body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_file_name: Option<String>,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<ResponseWire> for StubResponse {
    fn from(wire: ResponseWire) -> Self {
        let mut other = wire.other;

        // bodyFileName > jsonBody > body
        let body = if let Some(name) = wire.body_file_name {
            ResponseBody::FileReference(name)
        } else if let Some(json) = wire.json_body {
            ResponseBody::Json(embedded_json(json))
        } else if let Some(text) = wire.body {
            ResponseBody::Text(text)
        } else {
            ResponseBody::Empty
        };

        Self {
            status: wire.status,
            fixed_delay: typed_or_kept(wire.fixed_delay_milliseconds, FIXED_DELAY_KEY, &mut other),
            headers: typed_or_kept(wire.headers, HEADERS_KEY, &mut other),
            body,
            other,
        }
    }
}

impl From<StubResponse> for ResponseWire {
    fn from(response: StubResponse) -> Self {
        let mut other = response.other;
        // A typed value set locally replaces whatever raw shape was decoded
        let kept_delay = other.remove(FIXED_DELAY_KEY);
        let kept_headers = other.remove(HEADERS_KEY);
        let fixed_delay_milliseconds = response.fixed_delay.map(Value::from).or(kept_delay);
        let headers = response
            .headers
            .and_then(|headers| serde_json::to_value(headers).ok())
            .or(kept_headers);

        let mut wire = ResponseWire {
            status: response.status,
            fixed_delay_milliseconds,
            headers,
            body: None,
            json_body: None,
            body_file_name: None,
            other,
        };

        match response.body {
            ResponseBody::Empty => {}
            ResponseBody::Text(text) => wire.body = Some(text),
            ResponseBody::Json(json) => wire.json_body = Some(Value::String(json.to_string())),
            ResponseBody::FileReference(name) => wire.body_file_name = Some(name),
        }

        wire
    }
}

/// Decode `raw` into the typed field, or keep it under `key` in `other`.
fn typed_or_kept<T: DeserializeOwned>(
    raw: Option<Value>,
    key: &str,
    other: &mut Map<String, Value>,
) -> Option<T> {
    let raw = raw?;
    match serde_json::from_value(raw.clone()) {
        Ok(typed) => Some(typed),
        Err(_) => {
            other.insert(key.to_string(), raw);
            None
        }
    }
}

/// Unwrap a `jsonBody` that was transmitted as serialized JSON text.
fn embedded_json(json: Value) -> Value {
    match json {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}
