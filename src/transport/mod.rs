//! Serial connection lifecycle.
//!
//! The display can be unplugged and replugged at any time. The manager owns
//! the open/write/close cycle as a small explicit state machine so that
//! writing while closed is an ordinary error, a write failure always resolves
//! back to `Closed` within the failing call, and nothing here is ever fatal
//! to the process.

pub mod serial;

pub use serial::{SerialEndpoint, TokioSerialEndpoint};

use crate::error::{Result, TelemetryError};
use crate::notify::Notifier;
use std::sync::Arc;
use tracing::{debug, warn};

/// Connection lifecycle state. `Faulted` is transitional: it is entered on a
/// write failure and resolved to `Closed` before the failing call returns,
/// so between calls the connection is only ever `Closed` or `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
    Faulted,
}

/// Owns one serial endpoint and its reconnect cycle.
pub struct TransportManager<E: SerialEndpoint> {
    endpoint: E,
    state: ConnectionState,
    notifier: Arc<dyn Notifier>,
}

impl<E: SerialEndpoint> TransportManager<E> {
    pub fn new(endpoint: E, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            endpoint,
            state: ConnectionState::Closed,
            notifier,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Open the endpoint if it is not already open. On success the notifier
    /// hears about it once; on failure the state stays `Closed` and the
    /// caller decides how long to back off.
    pub async fn ensure_open(&mut self) -> Result<()> {
        if self.state == ConnectionState::Open {
            return Ok(());
        }

        match self.endpoint.open().await {
            Ok(()) => {
                self.state = ConnectionState::Open;
                self.notifier.connected(self.endpoint.endpoint_name());
                Ok(())
            }
            Err(err) => {
                self.state = ConnectionState::Closed;
                debug!(endpoint = self.endpoint.endpoint_name(), error = %err, "open failed");
                Err(retryable(err))
            }
        }
    }

    /// Write one line. Only valid while open. A write failure faults the
    /// connection, closes it best-effort and reports a retryable error; the
    /// cleanup can never mask the original failure.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        if self.state != ConnectionState::Open {
            return Err(TelemetryError::transport(
                "cannot send: connection is not open",
            ));
        }

        match self.endpoint.write_line(line).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.state = ConnectionState::Faulted;
                warn!(endpoint = self.endpoint.endpoint_name(), error = %err, "write failed, closing");
                self.endpoint.close().await;
                self.state = ConnectionState::Closed;
                Err(retryable(err))
            }
        }
    }

    /// Release the endpoint. Callable from any state, idempotent.
    pub async fn close(&mut self) {
        self.endpoint.close().await;
        self.state = ConnectionState::Closed;
    }
}

/// Every failure leaving the manager is retryable by contract.
fn retryable(err: TelemetryError) -> TelemetryError {
    if err.is_transport() {
        err
    } else {
        TelemetryError::transport(err.to_string())
    }
}
