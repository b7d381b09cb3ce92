//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait with a filter predicate.
//! - Inspect [`Event`] metadata (`seq`, label) during delivery.
//! - Observe that `commit` resolves only after delivery finished.
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use batchbus::{Dispatcher, DispatcherConfig, Event, Render, Sink, Subscribe};

struct Note(&'static str);

impl Render for Note {
    fn render(&self, out: &mut dyn Sink) -> io::Result<()> {
        writeln!(out, "{}", self.0)
    }

    fn kind(&self) -> &'static str {
        "note"
    }
}

/// Counts accepted events and prints them; skips anything labelled "skip".
/// In real life, you could export metrics, ship logs, or trigger alerts.
struct Tally {
    accepted: AtomicUsize,
}

#[async_trait]
impl Subscribe for Tally {
    fn is_suitable(&self, event: &Event) -> bool {
        event.label() != Some("skip")
    }

    async fn handle(&self, event: &Event) {
        let n = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;
        println!(
            "[tally] #{n} seq={} label={}",
            event.seq,
            event.label().unwrap_or("<none>")
        );
    }

    fn name(&self) -> &'static str {
        "tally"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let dispatcher = Dispatcher::spawn(DispatcherConfig::default()).await?;
    let tally = Arc::new(Tally {
        accepted: AtomicUsize::new(0),
    });
    dispatcher.subscribe(tally.clone()).await;

    for label in ["keep-1", "skip", "keep-2"] {
        dispatcher
            .push(Event::new(Arc::new(Note(label))).with_label(label))
            .await;
    }
    dispatcher.commit().await;

    println!(
        "accepted {} of 3 events",
        tally.accepted.load(Ordering::Relaxed)
    );

    dispatcher.shutdown().await;
    Ok(())
}
