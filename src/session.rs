//! Test-suite session over one mock server.
//!
//! A session is created at suite start and dropped at suite end. Apart from
//! [`WireMockSession::initialize`], its helpers are lenient: failures are
//! logged (when enabled in the config) and turned into empty results, so a
//! missing stub and an unreachable server look the same. Use
//! [`WireMockSession::client`] where that difference matters.

use crate::client::AdminClient;
use crate::config::WireMockConfig;
use crate::error::Result;
use crate::mapping::{StubMapping, StubRequest};
use crate::stub::StubBuilder;
use uuid::Uuid;

pub struct WireMockSession {
    client: AdminClient,
}

impl WireMockSession {
    pub fn new(config: WireMockConfig) -> Result<Self> {
        Ok(Self::with_client(AdminClient::new(config)?))
    }

    pub fn with_client(client: AdminClient) -> Self {
        Self { client }
    }

    /// Reset the server and check it answers. Failure is fatal to the session.
    pub fn initialize(&self) -> Result<()> {
        self.client.initialize().inspect_err(|e| {
            self.client.report("initialize session", e);
        })
    }

    /// Strict admin API.
    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    /// Start a stub for any method on an exact path.
    pub fn stub(&self, path: impl Into<String>) -> StubBuilder<'_> {
        StubBuilder::new(&self.client, path)
    }

    pub fn stub_request(&self, request: StubRequest) -> StubBuilder<'_> {
        StubBuilder::for_request(&self.client, request)
    }

    /// All mappings, or none if they could not be fetched.
    pub fn mappings(&self) -> Vec<StubMapping> {
        self.client.list_mappings().unwrap_or_else(|e| {
            self.client.report("list mappings", &e);
            Vec::new()
        })
    }

    /// One mapping, or `None` if it is missing or could not be fetched.
    pub fn mapping(&self, id: Uuid) -> Option<StubMapping> {
        self.client.get_mapping(id).unwrap_or_else(|e| {
            self.client.report("get mapping", &e);
            None
        })
    }

    /// Push local changes to a mapping back to the server.
    pub fn update_mapping(&self, mapping: &StubMapping) {
        if let Err(e) = self.client.create_or_update(mapping) {
            self.client.report("update mapping", &e);
        }
    }

    /// Delete every stub, then restore the server's startup mappings.
    pub fn reset_stubs(&self) {
        if let Err(e) = self.client.delete_all() {
            self.client.report("delete mappings", &e);
        }
        if let Err(e) = self.client.reset() {
            self.client.report("reset mappings", &e);
        }
    }
}
