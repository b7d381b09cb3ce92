//! # The background worker: owns the drain loop.
//!
//! Exactly one worker task runs per dispatcher. It is the only code that
//! ever removes events from the queue, and every subscriber `handle` call
//! happens on it, never on a caller.
//!
//! ## Lifecycle
//! ```text
//! Starting ──ready──► Waiting ──commit──► Draining ──ack──► Waiting ──► … ──► Stopped
//!                        ▲                                                     ▲
//!                        └──────────── control channel open ──────────┐        │
//!                                                     control channel closed ──┘
//! ```
//!
//! ## Locking discipline
//! The worker holds the shared state lock for the **whole** drain, not per
//! event. `push`/`subscribe` calls issued mid-drain therefore wait and take
//! effect in the next cycle; nothing can mutate the queue or the notified
//! set while a cycle is in flight.

use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::core::dispatcher::Shared;

/// Requests accepted by the worker over the control channel.
pub(crate) enum Command {
    /// Drain the queue against every registered subscriber, then ack with
    /// the number of delivered events.
    Commit { done: oneshot::Sender<usize> },
}

pub(crate) struct Worker {
    shared: Arc<Shared>,
    control: mpsc::Receiver<Command>,
}

impl Worker {
    pub(crate) fn new(shared: Arc<Shared>, control: mpsc::Receiver<Command>) -> Self {
        Self { shared, control }
    }

    /// Worker entry point: signal readiness, then serve commit requests
    /// until the control channel closes.
    pub(crate) async fn run(mut self, ready: oneshot::Sender<()>) {
        if ready.send(()).is_err() {
            // spawn() gave up before we got here; nothing to serve.
            return;
        }
        debug!("dispatcher worker ready");

        while let Some(command) = self.control.recv().await {
            match command {
                Command::Commit { done } => {
                    let delivered = self.drain().await;
                    debug!(delivered, "commit cycle drained");
                    // A committer that dropped its future mid-cycle just
                    // doesn't observe the ack; the drain still happened.
                    let _ = done.send(delivered);
                }
            }
        }
        debug!("dispatcher worker stopped");
    }

    /// One commit cycle: empty the queue, most recently pushed event first,
    /// offering each to every subscriber in registration order.
    async fn drain(&self) -> usize {
        let mut state = self.shared.state.lock().await;
        let mut delivered = 0usize;

        while let Some(event) = state.queue.pop() {
            // The event has left the queue; it no longer counts against the
            // teardown precondition even while subscribers are running.
            self.shared.pending.fetch_sub(1, AtomicOrdering::Relaxed);

            for subscriber in state.registry.iter() {
                if subscriber.is_suitable(&event) {
                    subscriber.handle(&event).await;
                }
            }
            delivered += 1;
        }

        delivered
    }
}
