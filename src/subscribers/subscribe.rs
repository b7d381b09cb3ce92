//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging event observers into the
//! dispatcher. Each registered subscriber is offered every queued event
//! during a commit cycle, on the dispatcher's worker, never on the caller.
//!
//! ## Contract
//! - [`Subscribe::is_suitable`] is a **pure predicate**: no side effects, no
//!   I/O. It lets a subscriber opt out of specific events; the default
//!   accepts everything.
//! - [`Subscribe::handle`] performs the delivery side effect. A handler that
//!   cannot deliver (e.g. its sink is not ready) must **panic**: that is
//!   programmer error, not a recoverable condition. The dispatcher does not
//!   catch subscriber panics: the worker dies and the blocked `commit` call
//!   panics instead of silently dropping the event.
//! - Implementations may be slow (file I/O, batching); they delay the commit
//!   cycle, never corrupt it.
//!
//! ## Example (skeleton)
//! ```rust
//! // use batchbus::{Event, Subscribe};
//! //
//! // struct Audit;
//! // #[async_trait::async_trait]
//! // impl Subscribe for Audit {
//! //     fn is_suitable(&self, ev: &Event) -> bool { ev.kind() == "order" }
//! //     async fn handle(&self, ev: &Event) {
//! //         // write audit record...
//! //     }
//! //     fn name(&self) -> &'static str { "audit" }
//! // }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from the dispatcher's worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Decides whether this subscriber wants the event at all.
    ///
    /// Pure predicate: must not have side effects. Defaults to accepting
    /// every event.
    fn is_suitable(&self, event: &Event) -> bool {
        let _ = event;
        true
    }

    /// Handles a single event for this subscriber.
    ///
    /// Failure to deliver is programmer error: panic, do not swallow the
    /// event.
    ///
    /// # Parameters
    /// - `event`: Reference to the event (does not transfer ownership)
    async fn handle(&self, event: &Event);

    /// Human-readable name (for logs and panic messages).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
