//! # Subscriber that renders every event into one shared writer.
//!
//! [`StreamWriter`] is the simplest useful subscriber: it owns a single
//! [`Sink`] (locked stdout, a log file, a byte buffer) and renders each
//! delivered event into it, in delivery order.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::events::{Event, Sink};
use crate::subscribers::Subscribe;

/// Renders delivered events into a caller-supplied writer.
///
/// The writer is behind a `Mutex` so the subscriber itself is `Sync`;
/// delivery is already serialized by the dispatcher's worker, so the lock is
/// never contended during a drain.
///
/// ## Example
/// ```no_run
/// use batchbus::StreamWriter;
///
/// let to_stdout = StreamWriter::new(std::io::stdout());
/// # let _ = to_stdout;
/// ```
pub struct StreamWriter<W: Sink> {
    out: Mutex<W>,
}

impl<W: Sink> StreamWriter<W> {
    /// Wraps the given writer.
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Consumes the subscriber and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Sink + 'static> Subscribe for StreamWriter<W> {
    async fn handle(&self, event: &Event) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = event.render_to(&mut *out) {
            panic!("{}: rendering event seq={} failed: {err}", self.name(), event.seq);
        }
    }

    fn name(&self) -> &'static str {
        "stream_writer"
    }
}
