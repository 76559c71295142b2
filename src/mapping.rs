//! Stub mapping model: request matchers paired with a response.
//!
//! Matchers are passed through to the mock server untouched. Request
//! attributes this crate does not model (query parameters, body patterns,
//! mapping names, metadata, ...) are carried along so a fetched mapping can be
//! pushed back without losing them.

use crate::response::StubResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// HTTP method a stub matches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    #[default]
    Any,
    /// Any other method registered on the server (`PATCH`, `HEAD`, ...)
    #[serde(untagged)]
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Any => "ANY",
            HttpMethod::Other(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL matching strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlMatcher {
    /// Exact path and query (`url`)
    Url(String),
    /// Exact path, any query (`urlPath`)
    UrlPath(String),
    /// Regex over path and query (`urlPattern`)
    UrlPattern(String),
    /// Regex over the path (`urlPathPattern`)
    UrlPathPattern(String),
}

/// Header value matcher, in WireMock's `{ "<operator>": <operand> }` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderMatcher {
    EqualTo(String),
    Contains(String),
    Matches(String),
    DoesNotMatch(String),
    Absent(bool),
    /// Any other matcher the server supports, kept verbatim
    #[serde(untagged)]
    Other(Value),
}

impl HeaderMatcher {
    pub fn equal_to(value: impl Into<String>) -> Self {
        HeaderMatcher::EqualTo(value.into())
    }
}

/// Request half of a stub mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RequestWire", into = "RequestWire")]
pub struct StubRequest {
    pub method: HttpMethod,
    pub url: Option<UrlMatcher>,
    pub headers: Option<BTreeMap<String, HeaderMatcher>>,
    /// Unmodelled request attributes
    other: Map<String, Value>,
}

impl StubRequest {
    pub fn new(method: HttpMethod, url: UrlMatcher) -> Self {
        Self {
            method,
            url: Some(url),
            headers: None,
            other: Map::new(),
        }
    }

    /// Match any method on an exact path.
    pub fn for_path(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Any, UrlMatcher::UrlPath(path.into()))
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, matcher: HeaderMatcher) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), matcher);
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestWire {
    #[serde(default)]
    method: HttpMethod,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_path_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    headers: Option<BTreeMap<String, HeaderMatcher>>,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<RequestWire> for StubRequest {
    fn from(wire: RequestWire) -> Self {
        let url = wire
            .url
            .map(UrlMatcher::Url)
            .or(wire.url_path.map(UrlMatcher::UrlPath))
            .or(wire.url_pattern.map(UrlMatcher::UrlPattern))
            .or(wire.url_path_pattern.map(UrlMatcher::UrlPathPattern));

        Self {
            method: wire.method,
            url,
            headers: wire.headers,
            other: wire.other,
        }
    }
}

impl From<StubRequest> for RequestWire {
    fn from(request: StubRequest) -> Self {
        let mut wire = RequestWire {
            method: request.method,
            url: None,
            url_path: None,
            url_pattern: None,
            url_path_pattern: None,
            headers: request.headers,
            other: request.other,
        };

        match request.url {
            Some(UrlMatcher::Url(url)) => wire.url = Some(url),
            Some(UrlMatcher::UrlPath(path)) => wire.url_path = Some(path),
            Some(UrlMatcher::UrlPattern(pattern)) => wire.url_pattern = Some(pattern),
            Some(UrlMatcher::UrlPathPattern(pattern)) => wire.url_path_pattern = Some(pattern),
            None => {}
        }

        wire
    }
}

/// A stub registered (or to be registered) with the mock server.
///
/// The id is fixed at construction; submitting a mapping whose id the server
/// already knows updates it instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MappingWire")]
pub struct StubMapping {
    id: Uuid,
    pub request: StubRequest,
    pub response: StubResponse,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl StubMapping {
    /// Create a mapping with a freshly generated id.
    pub fn new(request: StubRequest, response: StubResponse) -> Self {
        Self::with_id(Uuid::new_v4(), request, response)
    }

    pub fn with_id(id: Uuid, request: StubRequest, response: StubResponse) -> Self {
        Self {
            id,
            request,
            response,
            other: Map::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Decode the response body into `T`, `None` if absent or malformed.
    pub fn decode_response_json<T: DeserializeOwned>(&self) -> Option<T> {
        self.response.decode_json()
    }

    /// Replace the response body with the JSON form of `value`.
    pub fn update_response_json<T: Serialize>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        self.response.update_json(value)
    }
}

#[derive(Deserialize)]
struct MappingWire {
    #[serde(default)]
    id: Option<Uuid>,
    // Older servers and clients key the identity as `uuid`
    #[serde(default)]
    uuid: Option<Uuid>,
    request: StubRequest,
    response: StubResponse,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<MappingWire> for StubMapping {
    fn from(wire: MappingWire) -> Self {
        Self {
            id: wire.id.or(wire.uuid).unwrap_or_else(Uuid::new_v4),
            request: wire.request,
            response: wire.response,
            other: wire.other,
        }
    }
}

/// Body of `GET __admin/mappings`.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingsEnvelope {
    pub meta: MappingsMeta,
    pub mappings: Vec<StubMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingsMeta {
    pub total: usize,
}
