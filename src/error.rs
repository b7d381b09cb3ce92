//! Error types used by the dispatcher runtime.
//!
//! The dispatcher has exactly one recoverable failure: constructing it. Every
//! other failure mode is deliberately unrecoverable:
//!
//! - tearing a dispatcher down while events are still queued aborts the
//!   process (see [`Dispatcher`](crate::Dispatcher));
//! - a subscriber that fails during delivery panics, which kills the worker
//!   and surfaces as a panic from the blocked `commit` call.
//!
//! [`SpawnError`] provides helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use thiserror::Error;

/// # Errors produced while constructing a dispatcher.
///
/// Construction spawns the background worker and blocks until the worker
/// signals readiness. If that handshake never completes, no partially-usable
/// dispatcher is returned.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The worker exited before signalling readiness.
    #[error("dispatcher worker exited before signalling readiness")]
    ReadyLost,
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchbus::SpawnError;
    ///
    /// assert_eq!(SpawnError::ReadyLost.as_label(), "spawn_ready_lost");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::ReadyLost => "spawn_ready_lost",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SpawnError::ReadyLost => {
                "worker exited before signalling readiness; dispatcher was not constructed"
                    .to_string()
            }
        }
    }
}
