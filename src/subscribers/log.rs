//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints a one-line summary of every delivered event to
//! stdout. This is primarily useful for development, debugging, and the
//! bundled demos.
//!
//! ## Output format
//! ```text
//! [event] seq=0 kind=rhombus label=figure-1
//! [event] seq=1 kind=pentagon
//! ```

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Subscribe`] for structured logging or metrics
/// collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.label() {
            Some(label) => println!("[event] seq={} kind={} label={label}", e.seq, e.kind()),
            None => println!("[event] seq={} kind={}", e.seq, e.kind()),
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
