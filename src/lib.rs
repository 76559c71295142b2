//! WireMock Stubs
//!
//! A blocking client for the admin API of a separately running WireMock
//! server, for use from ordinary test code. Declare "when a request matching X
//! arrives, respond with Y", register it, and later fetch, update or clear it.
//!
//! # Features
//!
//! - **Fluent Stubbing**: build a stub for a path and return text, JSON, a
//!   server-side body file or nothing
//! - **Mapping Management**: list, fetch, create, update, delete and reset
//!   mappings through the `__admin` API
//! - **Bounded Waits**: every call blocks for at most the configured timeout
//!   and resumes exactly once
//! - **Lenient Sessions**: a suite-scoped session whose helpers log failures
//!   instead of returning them
//!
//! # Example
//!
//! ```no_run
//! use wiremock_stubs::{HttpMethod, WireMockConfig, WireMockSession};
//!
//! let session = WireMockSession::new(WireMockConfig::with_port(8080))?;
//! session.initialize()?;
//!
//! let mapping = session
//!     .stub("/hello")
//!     .for_method(HttpMethod::Get)
//!     .with_status(200)
//!     .returning_text("Hello, World!");
//!
//! assert!(session.mapping(mapping.id()).is_some());
//! session.reset_stubs();
//! # Ok::<(), wiremock_stubs::AdminError>(())
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod mapping;
pub mod response;
pub mod session;
pub mod stub;
pub mod transport;

#[cfg(test)]
mod testing;

pub use bridge::{Completion, SyncBridge, DEFAULT_TIMEOUT};
pub use client::AdminClient;
pub use config::WireMockConfig;
pub use error::{AdminError, Result};
pub use mapping::{HeaderMatcher, HttpMethod, StubMapping, StubRequest, UrlMatcher};
pub use response::{ResponseBody, StubResponse};
pub use session::WireMockSession;
pub use stub::StubBuilder;
