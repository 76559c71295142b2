//! Fluent stub registration.
//!
//! ```no_run
//! use wiremock_stubs::{AdminClient, HttpMethod, StubBuilder, WireMockConfig};
//!
//! let client = AdminClient::new(WireMockConfig::default()).unwrap();
//! let mapping = StubBuilder::new(&client, "/users/1")
//!     .for_method(HttpMethod::Get)
//!     .with_status(200)
//!     .with_delay(50)
//!     .returning_json(&serde_json::json!({"id": 1, "name": "Ada"}));
//! println!("registered {}", mapping.id());
//! ```

use crate::client::AdminClient;
use crate::mapping::{HeaderMatcher, HttpMethod, StubMapping, StubRequest, UrlMatcher};
use crate::response::{ResponseBody, StubResponse};
use serde::Serialize;
use std::collections::HashMap;

/// Accumulates request matchers and response settings, then registers a stub.
///
/// Every `returning_*` call submits a new mapping with a fresh id, so reusing
/// a builder registers one stub per call. Failures are logged, never
/// returned; the mapping is handed back either way.
pub struct StubBuilder<'a> {
    client: &'a AdminClient,
    request: StubRequest,
    status: u16,
    delay: Option<u64>,
    headers: Option<HashMap<String, String>>,
}

impl<'a> StubBuilder<'a> {
    /// Stub any method on an exact path.
    pub fn new(client: &'a AdminClient, path: impl Into<String>) -> Self {
        Self::for_request(client, StubRequest::for_path(path))
    }

    pub fn for_request(client: &'a AdminClient, request: StubRequest) -> Self {
        Self {
            client,
            request,
            status: 200,
            delay: None,
            headers: None,
        }
    }

    pub fn for_method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    pub fn with_url_matcher(mut self, url: UrlMatcher) -> Self {
        self.request.url = Some(url);
        self
    }

    /// Only match requests whose header satisfies `matcher`.
    pub fn matching_header(mut self, name: impl Into<String>, matcher: HeaderMatcher) -> Self {
        self.request = self.request.with_header(name, matcher);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Fixed response delay in milliseconds.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Some(delay_ms);
        self
    }

    /// Replace all response headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn request(&self) -> &StubRequest {
        &self.request
    }

    pub fn returning_nothing(&self) -> StubMapping {
        self.returning_body(ResponseBody::Empty)
    }

    pub fn returning_text(&self, text: impl Into<String>) -> StubMapping {
        self.returning_body(ResponseBody::Text(text.into()))
    }

    /// Respond with the JSON form of `value`.
    ///
    /// If `value` cannot be serialized the error is logged and the stub is
    /// registered with an empty body.
    pub fn returning_json<T: Serialize + ?Sized>(&self, value: &T) -> StubMapping {
        let body = match serde_json::to_value(value) {
            Ok(json) => ResponseBody::Json(json),
            Err(e) => {
                self.client.report("serialize stub body", &e);
                ResponseBody::Empty
            }
        };
        self.returning_body(body)
    }

    /// Respond with a file from the server's `__files` store.
    pub fn returning_file(&self, file_name: impl Into<String>) -> StubMapping {
        self.returning_body(ResponseBody::FileReference(file_name.into()))
    }

    pub fn returning_body(&self, body: impl Into<ResponseBody>) -> StubMapping {
        self.returning_response(self.response().with_body(body))
    }

    /// Register `response` as is, ignoring the builder's response settings.
    pub fn returning_response(&self, response: StubResponse) -> StubMapping {
        let mapping = StubMapping::new(self.request.clone(), response);
        if let Err(e) = self.client.create_mapping(&mapping) {
            self.client.report("create mapping", &e);
        }
        mapping
    }

    fn response(&self) -> StubResponse {
        let mut response = StubResponse::new(self.status);
        response.fixed_delay = self.delay;
        response.headers = self.headers.clone();
        response
    }
}
