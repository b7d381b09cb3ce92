//! # Event subscribers for the dispatcher.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for consuming events delivered during a commit cycle.
//!
//! ## Architecture
//! ```text
//! Delivery flow (one commit cycle, on the dispatcher worker):
//!   queue ── pop (most recent first) ──► event
//!                                          │
//!                    per registered subscriber, in registration order:
//!                                          │
//!                               is_suitable(&event)?
//!                                    │yes        │no
//!                                    ▼           └─► skipped
//!                               handle(&event)
//!                                    │
//!                          ┌─────────┼─────────────┐
//!                          ▼         ▼             ▼
//!                    StreamWriter  UniqueFileWriter  Custom ...
//! ```
//!
//! ## Subscriber types
//! - [`StreamWriter`] — renders every event into one shared writer
//! - [`UniqueFileWriter`] — renders batches into explicitly-rotated files
//! - `LogWriter` — one-line stdout summaries (behind the `logging` feature)
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use batchbus::{Event, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn handle(&self, event: &Event) {
//!         let _ = event; // increment counters keyed by event.kind()...
//!     }
//! }
//! ```

mod file;
mod stream;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use file::UniqueFileWriter;
pub use stream::StreamWriter;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
