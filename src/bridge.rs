//! Blocking bridge over asynchronous admin calls.
//!
//! Test code is synchronous, the admin transport is not. [`SyncBridge`] runs
//! the asynchronous side on its own runtime and parks the caller until a
//! [`Completion`] fires or the bounded wait runs out. Only the first signal is
//! delivered; anything after it, including signals arriving once the caller
//! has given up, is dropped.

use crate::error::{AdminError, Result};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tracing::debug;

/// Bounded wait used when no override is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-use completion signal handed to the asynchronous side.
///
/// Clones share the same slot, so any number of threads may race to
/// complete it; exactly one wins.
pub struct Completion<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Completion<T> {
    fn new(sender: oneshot::Sender<T>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// Deliver `value` to the waiting caller.
    ///
    /// Returns `false` if the signal was already used or the caller stopped
    /// waiting.
    pub fn complete(&self, value: T) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(sender) => sender.send(value).is_ok(),
            None => false,
        }
    }
}

/// Runs callback-style asynchronous work as blocking, timeout-bounded calls.
pub struct SyncBridge {
    runtime: Option<Runtime>,
}

impl SyncBridge {
    /// Start the runtime backing the bridge.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("wiremock-admin")
            .enable_all()
            .build()
            .map_err(|e| AdminError::runtime(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            runtime: Some(runtime),
        })
    }

    /// Run `body` and block until it signals completion or `timeout` elapses.
    ///
    /// `body` executes inside the bridge's runtime context and may
    /// `tokio::spawn` the work that eventually calls
    /// [`Completion::complete`].
    ///
    /// # Panics
    ///
    /// Like `Runtime::block_on`, panics when called from an asynchronous
    /// execution context. Async tests should call it through
    /// `tokio::task::spawn_blocking`.
    pub fn run_blocking<T, F>(&self, timeout: Duration, body: F) -> Result<T>
    where
        F: FnOnce(Completion<T>),
    {
        let runtime = self.runtime()?;
        let (sender, receiver) = oneshot::channel();

        // The budget covers the body itself, not just the wait after it
        let started = Instant::now();
        {
            let _guard = runtime.enter();
            body(Completion::new(sender));
        }

        let remaining = timeout.saturating_sub(started.elapsed());
        let outcome =
            runtime.block_on(async move { tokio::time::timeout(remaining, receiver).await });
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => {
                // Every completion handle was dropped unsignalled
                debug!(elapsed_ms, "Completion abandoned before signalling");
                Err(AdminError::Timeout { elapsed_ms })
            }
            Err(_) => {
                debug!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Bounded wait elapsed"
                );
                Err(AdminError::Timeout { elapsed_ms })
            }
        }
    }

    fn runtime(&self) -> Result<&Runtime> {
        self.runtime
            .as_ref()
            .ok_or_else(|| AdminError::runtime("Runtime already shut down"))
    }
}

impl Drop for SyncBridge {
    fn drop(&mut self) {
        // In-flight stragglers are abandoned; safe to call from async contexts
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
