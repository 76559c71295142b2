//! Blocking client for the WireMock admin API.
//!
//! Every public call issues exactly one admin request, waits for it through
//! the [`SyncBridge`] and classifies the answer the same way: transport
//! failures become [`AdminError::InvalidResponse`], non-2xx statuses
//! [`AdminError::ServerError`], and undecodable bodies [`AdminError::Parse`].

use crate::bridge::SyncBridge;
use crate::config::WireMockConfig;
use crate::error::{AdminError, Result};
use crate::mapping::{MappingsEnvelope, StubMapping};
use crate::transport::{AdminRequest, AdminResponse, AdminTransport, ReqwestTransport};
use reqwest::Method;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAPPINGS_PATH: &str = "__admin/mappings";
const RESET_PATH: &str = "__admin/reset";

fn mapping_path(id: Uuid) -> String {
    format!("{}/{}", MAPPINGS_PATH, id)
}

/// Admin API client.
///
/// Tracks the ids of mappings it has seen the server acknowledge (created,
/// listed or fetched) so [`AdminClient::create_or_update`] can choose between
/// `POST` and `PUT`.
pub struct AdminClient {
    config: WireMockConfig,
    transport: Arc<dyn AdminTransport>,
    bridge: SyncBridge,
    known_ids: Mutex<HashSet<Uuid>>,
}

impl AdminClient {
    /// Create a client talking HTTP to the configured server.
    pub fn new(config: WireMockConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(config: WireMockConfig, transport: Arc<dyn AdminTransport>) -> Result<Self> {
        let bridge = SyncBridge::new()?;

        debug!(
            host = %config.host,
            port = config.port,
            timeout_ms = config.timeout_ms,
            "WireMock admin client created"
        );

        Ok(Self {
            config,
            transport,
            bridge,
            known_ids: Mutex::new(HashSet::new()),
        })
    }

    pub fn config(&self) -> &WireMockConfig {
        &self.config
    }

    /// Reset the server, then list its mappings to confirm it is reachable.
    ///
    /// Stops at the first failure; whatever the reset did is left in place.
    pub fn initialize(&self) -> Result<()> {
        self.reset()?;
        let mappings = self.list_mappings()?;
        info!(
            host = %self.config.host,
            port = self.config.port,
            mappings = mappings.len(),
            "WireMock session initialized"
        );
        Ok(())
    }

    /// All mappings currently registered on the server.
    pub fn list_mappings(&self) -> Result<Vec<StubMapping>> {
        let body = self.send(AdminRequest::new(Method::GET, MAPPINGS_PATH))?;
        let envelope: MappingsEnvelope = serde_json::from_slice(&body)?;

        debug!(
            total = envelope.meta.total,
            returned = envelope.mappings.len(),
            "Listed mappings"
        );
        self.remember(envelope.mappings.iter().map(StubMapping::id));
        Ok(envelope.mappings)
    }

    /// Fetch one mapping; `None` if the server does not know the id.
    pub fn get_mapping(&self, id: Uuid) -> Result<Option<StubMapping>> {
        let body = match self.send(AdminRequest::new(Method::GET, mapping_path(id))) {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                debug!(%id, "Mapping not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mapping: StubMapping = serde_json::from_slice(&body)?;
        self.remember([mapping.id()]);
        Ok(Some(mapping))
    }

    /// Register a new mapping (`POST`).
    pub fn create_mapping(&self, mapping: &StubMapping) -> Result<()> {
        let request = AdminRequest::new(Method::POST, MAPPINGS_PATH).with_body(self.encode(mapping));
        self.send(request)?;

        debug!(id = %mapping.id(), "Created mapping");
        self.remember([mapping.id()]);
        Ok(())
    }

    /// Replace an existing mapping (`PUT`).
    pub fn update_mapping(&self, mapping: &StubMapping) -> Result<()> {
        let request =
            AdminRequest::new(Method::PUT, mapping_path(mapping.id())).with_body(self.encode(mapping));
        self.send(request)?;

        debug!(id = %mapping.id(), "Updated mapping");
        self.remember([mapping.id()]);
        Ok(())
    }

    /// Update the mapping if this client has seen it on the server, create it otherwise.
    pub fn create_or_update(&self, mapping: &StubMapping) -> Result<()> {
        if self.is_known(mapping.id()) {
            self.update_mapping(mapping)
        } else {
            self.create_mapping(mapping)
        }
    }

    /// Remove one mapping.
    pub fn delete_mapping(&self, id: Uuid) -> Result<()> {
        self.send(AdminRequest::new(Method::DELETE, mapping_path(id)))?;
        self.known().remove(&id);
        debug!(%id, "Deleted mapping");
        Ok(())
    }

    /// Remove every mapping. Succeeds when there is nothing to delete.
    pub fn delete_all(&self) -> Result<()> {
        self.send(AdminRequest::new(Method::DELETE, MAPPINGS_PATH))?;
        self.known().clear();
        debug!("Deleted all mappings");
        Ok(())
    }

    /// Restore the server's mappings to their startup state.
    pub fn reset(&self) -> Result<()> {
        self.send(AdminRequest::new(Method::POST, RESET_PATH))?;
        // Surviving file-backed mappings are relearned on the next list
        self.known().clear();
        debug!("Reset mappings");
        Ok(())
    }

    /// Whether the server has acknowledged a mapping with this id.
    pub fn is_known(&self, id: Uuid) -> bool {
        self.known().contains(&id)
    }

    /// Log a failure swallowed by a lenient caller, if logging is enabled.
    pub(crate) fn report(&self, operation: &str, error: &dyn Display) {
        if self.config.logging_enabled {
            warn!(operation, error = %error, "WireMock admin call failed");
        }
    }

    fn send(&self, request: AdminRequest) -> Result<Vec<u8>> {
        debug!(method = %request.method, path = %request.path, "Sending admin request");

        let transport = Arc::clone(&self.transport);
        let response = self.bridge.run_blocking(self.config.timeout(), move |done| {
            tokio::spawn(async move {
                done.complete(transport.execute(request).await);
            });
        })??;

        classify(response)
    }

    /// Serialize a mapping; failures are reported and an empty body is sent.
    fn encode(&self, mapping: &StubMapping) -> Vec<u8> {
        serde_json::to_vec(mapping).unwrap_or_else(|e| {
            self.report("encode mapping", &e);
            Vec::new()
        })
    }

    fn known(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.known_ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remember(&self, ids: impl IntoIterator<Item = Uuid>) {
        self.known().extend(ids);
    }
}

/// Single response classifier shared by every operation.
fn classify(response: AdminResponse) -> Result<Vec<u8>> {
    if (200..300).contains(&response.status) {
        Ok(response.body)
    } else {
        Err(AdminError::ServerError {
            status: response.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::StubRequest;
    use crate::response::StubResponse;
    use crate::testing::RecordingTransport;
    use std::time::Duration;

    const ID: &str = "76ada7b0-49ae-4229-91c4-396a36f18e09";

    fn client_over(transport: &Arc<RecordingTransport>) -> AdminClient {
        AdminClient::with_transport(WireMockConfig::default(), transport.clone()).unwrap()
    }

    fn mapping_json() -> String {
        format!(
            r#"{{"id":"{}","request":{{"method":"GET","urlPath":"/hello"}},"response":{{"status":200,"body":"hi"}}}}"#,
            ID
        )
    }

    fn sample_mapping() -> StubMapping {
        StubMapping::new(StubRequest::for_path("/hello"), StubResponse::default().with_body("hi"))
    }

    #[test]
    fn test_list_mappings() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, &format!(r#"{{"meta":{{"total":1}},"mappings":[{}]}}"#, mapping_json()));
        let client = client_over(&transport);

        let mappings = client.list_mappings().unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].response.body.text(), Some("hi"));
        assert!(client.is_known(Uuid::parse_str(ID).unwrap()));
        assert_eq!(transport.calls(), vec![("GET".to_string(), MAPPINGS_PATH.to_string())]);
    }

    #[test]
    fn test_list_empty_and_malformed_envelopes() {
        let transport = Arc::new(RecordingTransport::new());
        transport
            .respond(200, r#"{"meta":{"total":0},"mappings":[]}"#)
            .respond(200, r#"{"mappings":"nope"}"#)
            .respond(200, "");
        let client = client_over(&transport);

        assert!(client.list_mappings().unwrap().is_empty());
        assert!(matches!(client.list_mappings(), Err(AdminError::Parse(_))));
        assert!(matches!(client.list_mappings(), Err(AdminError::Parse(_))));
    }

    #[test]
    fn test_get_mapping() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, &mapping_json());
        let client = client_over(&transport);
        let id = Uuid::parse_str(ID).unwrap();

        let mapping = client.get_mapping(id).unwrap().unwrap();
        assert_eq!(mapping.id(), id);
        assert_eq!(transport.calls()[0].1, format!("__admin/mappings/{}", ID));
    }

    #[test]
    fn test_get_mapping_not_found_is_none() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(404, "No mapping found");
        let client = client_over(&transport);

        assert!(client.get_mapping(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_get_mapping_failures() {
        let transport = Arc::new(RecordingTransport::new());
        transport
            .respond(500, "")
            .respond(200, "{not json")
            .fail("connection reset");
        let client = client_over(&transport);
        let id = Uuid::new_v4();

        assert!(matches!(
            client.get_mapping(id),
            Err(AdminError::ServerError { status: 500 })
        ));
        assert!(matches!(client.get_mapping(id), Err(AdminError::Parse(_))));
        assert!(matches!(
            client.get_mapping(id),
            Err(AdminError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_create_then_update() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client_over(&transport);
        let mut mapping = sample_mapping();

        assert!(!client.is_known(mapping.id()));
        client.create_or_update(&mapping).unwrap();
        assert!(client.is_known(mapping.id()));

        mapping.response.status = 503;
        client.create_or_update(&mapping).unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0], ("POST".to_string(), MAPPINGS_PATH.to_string()));
        assert_eq!(calls[1], ("PUT".to_string(), mapping_path(mapping.id())));
        assert_eq!(transport.json_body(0)["id"], mapping.id().to_string());
        assert_eq!(transport.json_body(1)["response"]["status"], 503);
    }

    #[test]
    fn test_failed_create_is_not_remembered() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(422, r#"{"errors":[]}"#);
        let client = client_over(&transport);
        let mapping = sample_mapping();

        assert!(matches!(
            client.create_mapping(&mapping),
            Err(AdminError::ServerError { status: 422 })
        ));
        assert!(!client.is_known(mapping.id()));
    }

    #[test]
    fn test_reset_and_delete_all_are_idempotent() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client_over(&transport);
        let mapping = sample_mapping();
        client.create_mapping(&mapping).unwrap();

        client.delete_all().unwrap();
        client.delete_all().unwrap();
        assert!(!client.is_known(mapping.id()));

        client.reset().unwrap();
        client.reset().unwrap();

        let calls = transport.calls();
        assert_eq!(calls[1], ("DELETE".to_string(), MAPPINGS_PATH.to_string()));
        assert_eq!(calls[3], ("POST".to_string(), RESET_PATH.to_string()));
        assert_eq!(calls.len(), 5);

        // Forgotten ids go back to POST
        client.create_or_update(&mapping).unwrap();
        assert_eq!(transport.calls()[5].0, "POST");
    }

    #[test]
    fn test_delete_mapping_forgets_id() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client_over(&transport);
        let mapping = sample_mapping();

        client.create_mapping(&mapping).unwrap();
        client.delete_mapping(mapping.id()).unwrap();

        assert!(!client.is_known(mapping.id()));
        assert_eq!(
            transport.calls()[1],
            ("DELETE".to_string(), mapping_path(mapping.id()))
        );
    }

    #[test]
    fn test_initialize_resets_then_lists() {
        let transport = Arc::new(RecordingTransport::new());
        transport
            .respond(200, "")
            .respond(200, r#"{"meta":{"total":0},"mappings":[]}"#);
        let client = client_over(&transport);

        client.initialize().unwrap();
        assert_eq!(
            transport.calls(),
            vec![
                ("POST".to_string(), RESET_PATH.to_string()),
                ("GET".to_string(), MAPPINGS_PATH.to_string()),
            ]
        );
    }

    #[test]
    fn test_initialize_stops_at_first_failure() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(500, "");
        let client = client_over(&transport);

        assert!(matches!(
            client.initialize(),
            Err(AdminError::ServerError { status: 500 })
        ));
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn test_initialize_surfaces_list_failure() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, "").respond(200, "garbage");
        let client = client_over(&transport);

        assert!(matches!(client.initialize(), Err(AdminError::Parse(_))));
    }

    #[test]
    fn test_list_tolerates_shapes_it_does_not_model() {
        let listed = format!(
            r#"{{"meta":{{"total":2}},"mappings":[{},{}]}}"#,
            r#"{"id":"0b7a5a4e-6f5c-4a52-9a43-5b0c8b1e9f10","request":{"method":"PATCH","urlPath":"/cart"},"response":{"status":204}}"#,
            r#"{"id":"c1f8e2d4-3b6a-4d8e-8f1a-2e7c9b0d5a61","request":{"method":"GET","urlPath":"/login"},"response":{"status":200,"headers":{"Set-Cookie":["a=1","b=2"]}}}"#
        );
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, "").respond(200, &listed).respond(200, &listed);
        let client = client_over(&transport);

        client.initialize().unwrap();
        let mappings = client.list_mappings().unwrap();
        assert_eq!(mappings.len(), 2);

        // Pushed back untouched
        client.create_or_update(&mappings[1]).unwrap();
        let pushed = transport.json_body(3);
        assert_eq!(transport.calls()[3].0, "PUT");
        assert_eq!(
            pushed["response"]["headers"],
            serde_json::json!({"Set-Cookie": ["a=1", "b=2"]})
        );
    }

    #[test]
    fn test_fetched_mapping_keeps_unmodelled_response_fields() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(
            200,
            &format!(
                r#"{{"id":"{}","request":{{"method":"GET","urlPath":"/img"}},"response":{{"status":200,"base64Body":"aGk=","transformers":["response-template"]}}}}"#,
                ID
            ),
        );
        let client = client_over(&transport);

        let mut mapping = client.get_mapping(Uuid::parse_str(ID).unwrap()).unwrap().unwrap();
        mapping.response.status = 201;
        client.update_mapping(&mapping).unwrap();

        assert_eq!(
            transport.json_body(1)["response"],
            serde_json::json!({
                "status": 201,
                "base64Body": "aGk=",
                "transformers": ["response-template"]
            })
        );
    }

    #[test]
    fn test_known_ids_shared_across_threads() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client_over(&transport);
        let mappings: Vec<StubMapping> = (0..8).map(|_| sample_mapping()).collect();

        std::thread::scope(|scope| {
            for mapping in &mappings {
                let client = &client;
                scope.spawn(move || {
                    client.create_or_update(mapping).unwrap();
                    client.create_or_update(mapping).unwrap();
                });
            }
        });

        assert!(mappings.iter().all(|m| client.is_known(m.id())));
        let calls = transport.calls();
        assert_eq!(calls.len(), 16);
        for mapping in &mappings {
            let put = ("PUT".to_string(), mapping_path(mapping.id()));
            assert_eq!(calls.iter().filter(|c| **c == put).count(), 1);
        }
        assert_eq!(calls.iter().filter(|c| c.0 == "POST").count(), 8);
    }

    #[test]
    fn test_slow_server_times_out() {
        let transport = Arc::new(RecordingTransport::new().with_delay(Duration::from_millis(300)));
        let config = WireMockConfig {
            timeout_ms: 30,
            ..WireMockConfig::default()
        };
        let client = AdminClient::with_transport(config, transport.clone()).unwrap();

        assert!(matches!(client.reset(), Err(AdminError::Timeout { .. })));
    }
}
