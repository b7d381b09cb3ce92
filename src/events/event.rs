//! # The event handle queued and delivered by the dispatcher.
//!
//! An [`Event`] is an immutable, cheaply-cloneable handle to one payload.
//! Cloning shares the payload (`Arc`); the payload is dropped when the last
//! clone (queue copy, in-flight delivery copy, caller copy) goes away.
//!
//! ## Ordering
//! Each event carries a globally unique sequence number (`seq`) that
//! increases monotonically across the process. Within one commit cycle the
//! dispatcher delivers events most-recent-first, so `seq` is what lets a
//! subscriber reconstruct push order when it needs it.
//!
//! ## Example
//! ```
//! use std::io::Write;
//! use std::sync::Arc;
//! use batchbus::{Event, Render, Sink};
//!
//! struct Greeting(&'static str);
//!
//! impl Render for Greeting {
//!     fn render(&self, out: &mut dyn Sink) -> std::io::Result<()> {
//!         writeln!(out, "{}", self.0)
//!     }
//! }
//!
//! let ev = Event::new(Arc::new(Greeting("hello"))).with_label("greeting-1");
//! assert_eq!(ev.label(), Some("greeting-1"));
//!
//! let mut out: Vec<u8> = Vec::new();
//! ev.render_to(&mut out).unwrap();
//! assert_eq!(out, b"hello\n");
//! ```

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::events::{Render, Sink};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// An immutable, shared handle to a payload awaiting delivery.
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp taken at construction.
    pub at: SystemTime,
    /// Optional human-readable label (for logs and subscriber filters).
    pub label: Option<Arc<str>>,

    payload: Arc<dyn Render>,
}

impl Event {
    /// Wraps a payload with the next sequence number and current timestamp.
    pub fn new(payload: Arc<dyn Render>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            label: None,
            payload,
        }
    }

    /// Attaches a human-readable label.
    #[inline]
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Payload classification, as reported by [`Render::kind`].
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    /// The label attached via [`with_label`](Self::with_label), if any.
    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Borrow of the carried payload.
    #[inline]
    pub fn payload(&self) -> &dyn Render {
        self.payload.as_ref()
    }

    /// Renders the payload into `out`.
    #[inline]
    pub fn render_to(&self, out: &mut dyn Sink) -> io::Result<()> {
        self.payload.render(out)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("kind", &self.kind())
            .field("label", &self.label)
            .field("at", &self.at)
            .finish_non_exhaustive()
    }
}
