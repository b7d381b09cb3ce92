//! # batchbus
//!
//! **Batchbus** is a small commit-batched event dispatch library for Rust.
//!
//! Producer tasks accumulate typed events with a non-waiting `push` and
//! periodically force a synchronous flush with `commit`: a blocking
//! rendezvous that only resolves after every queued event has been offered
//! to every registered subscriber. All delivery happens on one background
//! worker, off the producers' critical path.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌────────────┐   ┌────────────┐   ┌────────────┐
//!  │ producer 1 │   │ producer 2 │   │ producer N │
//!  └─────┬──────┘   └─────┬──────┘   └─────┬──────┘
//!        │ push(Event)    │ push(Event)    │ commit()
//!        ▼                ▼                ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │ Dispatcher                                                │
//! │  - queue (unbounded, drained whole by each commit cycle)  │
//! │  - registry (ordered, stable SubscriberId handles)        │
//! │  - control channel (one message per commit request)       │
//! └───────────────────────────┬───────────────────────────────┘
//!                             ▼
//!                    ┌─────────────────┐
//!                    │  worker task    │  pops most-recent-first,
//!                    │  (drain loop)   │  offers to each subscriber
//!                    └───┬─────────┬───┘  in registration order
//!                        ▼         ▼
//!                 is_suitable?  handle()
//!                        │         │
//!                 ┌──────┴───┬─────┴──────┐
//!                 ▼          ▼            ▼
//!           StreamWriter  UniqueFileWriter  custom Subscribe impls
//! ```
//!
//! ### Delivery guarantees
//! - **No loss**: `commit` resolves only after every event queued at its
//!   invocation has been offered to every registered subscriber, exactly
//!   once.
//! - **LIFO within a cycle**: inside one commit cycle events are delivered
//!   most recently pushed first; across cycles, cycle order is preserved.
//! - **No startup race**: construction completes only after the worker is
//!   waiting for work.
//! - **No silent teardown loss**: destroying a dispatcher with uncommitted
//!   events aborts the process.
//!
//! ## Features
//! | Area            | Description                                          | Key types / traits          |
//! |-----------------|------------------------------------------------------|-----------------------------|
//! | **Dispatch**    | Queue, registry, worker, commit handshake.           | [`Dispatcher`]              |
//! | **Events**      | Immutable shared payload handles.                    | [`Event`]                   |
//! | **Payloads**    | Render-to-destination capability contracts.          | [`Render`], [`Sink`]        |
//! | **Subscribers** | Filter + handle observers, built-in writers.         | [`Subscribe`], [`StreamWriter`], [`UniqueFileWriter`] |
//! | **Errors**      | Construction failure; everything else fails loudly.  | [`SpawnError`]              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` subscriber
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::io::Write;
//! use std::sync::Arc;
//! use batchbus::{Dispatcher, DispatcherConfig, Event, Render, Sink, StreamWriter};
//!
//! struct Greeting(&'static str);
//!
//! impl Render for Greeting {
//!     fn render(&self, out: &mut dyn Sink) -> std::io::Result<()> {
//!         writeln!(out, "{}", self.0)
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::spawn(DispatcherConfig::default()).await?;
//!     dispatcher
//!         .subscribe(Arc::new(StreamWriter::new(std::io::stdout())))
//!         .await;
//!
//!     dispatcher.push(Event::new(Arc::new(Greeting("hello")))).await;
//!     dispatcher.push(Event::new(Arc::new(Greeting("world")))).await;
//!
//!     // Resolves only after both greetings have been rendered.
//!     dispatcher.commit().await;
//!
//!     dispatcher.shutdown().await;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Dispatcher, DispatcherConfig, SubscriberId};
pub use error::SpawnError;
pub use events::{Event, Render, Sink};
pub use subscribers::{StreamWriter, Subscribe, UniqueFileWriter};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
