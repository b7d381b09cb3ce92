//! # Dispatcher: push / commit / subscribe over a single worker.
//!
//! The [`Dispatcher`] owns the event queue, the subscriber registry, and one
//! background worker task. Callers accumulate events with [`push`] (no wait
//! on delivery) and force a synchronous flush with [`commit`], which only
//! resolves once every queued event has been offered to every registered
//! subscriber.
//!
//! ## Handshake protocol
//! The rendezvous between callers and the worker is two channels:
//! ```text
//! spawn():                         worker:
//!   tokio::spawn(worker)  ───────►   Starting
//!   await ready ◄────ready oneshot── signal readiness
//!   Dispatcher returned              Waiting on control channel
//!
//! commit():
//!   send Commit{done} ──control──►   Draining (state lock held)
//!   await done        ◄─done ack──   queue empty, ack this cycle
//!
//! shutdown() / Drop:
//!   close control channel ────────►  recv() → None → Stopped
//! ```
//! One control message per commit, one ack per cycle: commits from separate
//! tasks serialize through the channel, each acked after its own drain, so
//! overlapping commits can never lose or double-deliver events.
//!
//! ## Teardown
//! Destroying a dispatcher that still has queued events is a fatal usage
//! error: the process is aborted rather than letting data vanish silently.
//! Commit everything you push, then [`shutdown`] (or drop) the dispatcher.
//!
//! [`push`]: Dispatcher::push
//! [`commit`]: Dispatcher::commit
//! [`shutdown`]: Dispatcher::shutdown

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::error;

use crate::core::config::DispatcherConfig;
use crate::core::registry::{Registry, SubscriberId};
use crate::core::worker::{Command, Worker};
use crate::error::SpawnError;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Queue + registry, guarded by one lock (see `worker.rs` for the locking
/// discipline).
pub(crate) struct State {
    pub(crate) queue: Vec<Event>,
    pub(crate) registry: Registry,
}

/// State shared between the dispatcher handle and its worker.
pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    /// Mirror of `state.queue.len()`, maintained under the state lock but
    /// readable without it: `Drop` is synchronous and must check the
    /// teardown precondition without blocking.
    pub(crate) pending: AtomicUsize,
}

/// Owns the queue, the registry, and the worker; exposes
/// `push`/`commit`/`subscribe`.
///
/// All methods take `&self`; share the dispatcher between producer tasks
/// with `Arc`. See the module docs above for the handshake protocol and the
/// teardown contract.
pub struct Dispatcher {
    shared: Arc<Shared>,
    /// `Some` until `shutdown()` consumes it; `Drop` uses `None` to tell a
    /// completed shutdown apart from a plain drop.
    control: Option<mpsc::Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns the worker and waits until it is ready to serve commits.
    ///
    /// The readiness handshake guarantees no `push`/`commit` can ever race
    /// worker startup: once `spawn` returns, the worker is waiting on the
    /// control channel. On failure no partially-usable dispatcher escapes.
    pub async fn spawn(cfg: DispatcherConfig) -> Result<Self, SpawnError> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: Vec::with_capacity(cfg.queue_reserve),
                registry: Registry::new(),
            }),
            pending: AtomicUsize::new(0),
        });

        let (control_tx, control_rx) = mpsc::channel(cfg.commit_backlog_clamped());
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = tokio::spawn(Worker::new(Arc::clone(&shared), control_rx).run(ready_tx));
        ready_rx.await.map_err(|_| SpawnError::ReadyLost)?;

        Ok(Self {
            shared,
            control: Some(control_tx),
            worker: Some(worker),
        })
    }

    /// Appends an event to the queue.
    ///
    /// Never waits on delivery of a commit it did not join. A `push` issued
    /// while a drain cycle is in flight does wait for that cycle's lock and
    /// lands in the *next* cycle. The queue is unbounded; there is no error
    /// path.
    pub async fn push(&self, event: Event) {
        let mut state = self.shared.state.lock().await;
        state.queue.push(event);
        self.shared.pending.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Registers a subscriber and returns its stable id.
    ///
    /// Registrations settle before the next commit cycle: they take the same
    /// lock the worker holds for a drain, so the notified set can never
    /// change mid-cycle.
    pub async fn subscribe(&self, subscriber: Arc<dyn Subscribe>) -> SubscriberId {
        self.shared.state.lock().await.registry.insert(subscriber)
    }

    /// Removes a registration. Returns `false` if the id is unknown.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared.state.lock().await.registry.remove(id)
    }

    /// Forces a drain cycle and waits until it completes.
    ///
    /// Resolves only after every event queued at the time of this call has
    /// been offered to every registered subscriber. Commits from separate
    /// tasks serialize; each resolves after its own cycle.
    ///
    /// # Panics
    /// When the worker died mid-delivery, i.e. a subscriber failed. That is
    /// programmer error and is surfaced loudly instead of hanging or
    /// dropping events.
    pub async fn commit(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        let request = Command::Commit { done: done_tx };

        if self.control().send(request).await.is_err() {
            panic!("commit failed: dispatcher worker is gone (a subscriber failed during an earlier delivery)");
        }
        if done_rx.await.is_err() {
            panic!("commit failed: dispatcher worker died mid-cycle (a subscriber failed during delivery)");
        }
    }

    /// Number of events pushed but not yet taken by a drain cycle.
    pub fn pending(&self) -> usize {
        self.shared.pending.load(AtomicOrdering::Relaxed)
    }

    /// Number of currently registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.shared.state.lock().await.registry.len()
    }

    /// Graceful teardown: close the control channel and wait for the worker
    /// to exit.
    ///
    /// # Aborts
    /// The queue must be empty (every pushed event committed). Violating
    /// that precondition aborts the process.
    pub async fn shutdown(mut self) {
        self.abort_if_pending();
        drop(self.control.take());
        if let Some(worker) = self.worker.take() {
            // A worker killed by a subscriber panic yields a join error;
            // that failure already surfaced through commit.
            let _ = worker.await;
        }
    }

    fn control(&self) -> &mpsc::Sender<Command> {
        // Some until shutdown(), which consumes self.
        self.control
            .as_ref()
            .expect("dispatcher used after shutdown")
    }

    /// Fatal-usage check shared by `shutdown` and `Drop`.
    fn abort_if_pending(&self) {
        let pending = self.pending();
        if pending != 0 {
            error!(pending, "dispatcher torn down with uncommitted events");
            eprintln!("fatal: dispatcher torn down with {pending} uncommitted event(s); commit before dropping");
            std::process::abort();
        }
    }
}

impl Drop for Dispatcher {
    /// Signals the worker to stop by closing the control channel.
    ///
    /// Dropping with a non-empty queue aborts the process: silently losing
    /// committed-but-undelivered data is never an option. Prefer
    /// [`Dispatcher::shutdown`] to also join the worker deterministically.
    fn drop(&mut self) {
        if self.control.is_none() {
            return; // shutdown() already ran
        }
        self.abort_if_pending();
        // The worker drains its receive loop and stops once the sender is
        // gone; without a runtime to join on here, it winds down on its own.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Render, Sink};
    use async_trait::async_trait;
    use std::io::{self, Write};
    use std::sync::Mutex as StdMutex;
    use std::time::{Duration, Instant};

    const ABORT_CHILD_ENV: &str = "BATCHBUS_ABORT_CHILD";

    struct Note(&'static str);

    impl Render for Note {
        fn render(&self, out: &mut dyn Sink) -> io::Result<()> {
            writeln!(out, "{}", self.0)
        }

        fn kind(&self) -> &'static str {
            "note"
        }
    }

    fn note(label: &'static str) -> Event {
        Event::new(Arc::new(Note(label))).with_label(label)
    }

    async fn dispatcher() -> Dispatcher {
        Dispatcher::spawn(DispatcherConfig::default()).await.unwrap()
    }

    /// Records delivered labels; optionally rejects one label via the
    /// filter predicate.
    #[derive(Default)]
    struct Recorder {
        seen: StdMutex<Vec<String>>,
        reject: Option<&'static str>,
    }

    impl Recorder {
        fn rejecting(label: &'static str) -> Self {
            Self {
                seen: StdMutex::new(Vec::new()),
                reject: Some(label),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        fn is_suitable(&self, event: &Event) -> bool {
            self.reject.is_none() || event.label() != self.reject
        }

        async fn handle(&self, event: &Event) {
            self.seen
                .lock()
                .unwrap()
                .push(event.label().unwrap_or("?").to_string());
        }
    }

    /// Sleeps during handle so tests can observe commit blocking.
    struct Slow(Duration);

    #[async_trait]
    impl Subscribe for Slow {
        async fn handle(&self, _event: &Event) {
            tokio::time::sleep(self.0).await;
        }
    }

    #[tokio::test]
    async fn test_spawn_yields_ready_dispatcher() {
        let d = dispatcher().await;
        assert_eq!(d.pending(), 0);
        assert_eq!(d.subscriber_count().await, 0);
        // Committing an empty queue is a no-op cycle, not an error.
        d.commit().await;
        d.shutdown().await;
    }

    #[tokio::test]
    async fn test_commit_delivers_every_event_exactly_once() {
        let d = dispatcher().await;
        let rec = Arc::new(Recorder::default());
        d.subscribe(rec.clone()).await;

        for label in ["a", "b", "c", "d"] {
            d.push(note(label)).await;
        }
        assert_eq!(d.pending(), 4);

        d.commit().await;
        assert_eq!(d.pending(), 0);
        assert_eq!(rec.seen().len(), 4);

        // A second commit must not re-deliver anything.
        d.commit().await;
        assert_eq!(rec.seen().len(), 4);
        d.shutdown().await;
    }

    #[tokio::test]
    async fn test_delivery_is_lifo_within_cycle() {
        let d = dispatcher().await;
        let rec = Arc::new(Recorder::default());
        d.subscribe(rec.clone()).await;

        d.push(note("e1")).await;
        d.push(note("e2")).await;
        d.push(note("e3")).await;
        d.commit().await;

        assert_eq!(rec.seen(), ["e3", "e2", "e1"]);
        d.shutdown().await;
    }

    #[tokio::test]
    async fn test_cycles_deliver_in_fifo_order_across_commits() {
        let d = dispatcher().await;
        let rec = Arc::new(Recorder::default());
        d.subscribe(rec.clone()).await;

        d.push(note("e1")).await;
        d.push(note("e2")).await;
        d.commit().await;
        d.push(note("e3")).await;
        d.push(note("e4")).await;
        d.commit().await;

        // LIFO inside each cycle, cycle order preserved across cycles.
        assert_eq!(rec.seen(), ["e2", "e1", "e4", "e3"]);
        d.shutdown().await;
    }

    #[tokio::test]
    async fn test_filtered_subscriber_never_handles_rejected_event() {
        let d = dispatcher().await;
        let s1 = Arc::new(Recorder::default());
        let s2 = Arc::new(Recorder::rejecting("B"));
        d.subscribe(s1.clone()).await;
        d.subscribe(s2.clone()).await;

        d.push(note("A")).await;
        d.push(note("B")).await;
        d.push(note("C")).await;
        d.commit().await;

        assert_eq!(s1.seen(), ["C", "B", "A"]);
        assert_eq!(s2.seen(), ["C", "A"]);
        d.shutdown().await;
    }

    #[tokio::test]
    async fn test_commit_blocks_until_slow_subscriber_finishes() {
        let delay = Duration::from_millis(150);
        let d = dispatcher().await;
        d.subscribe(Arc::new(Slow(delay))).await;
        d.push(note("slow")).await;

        let started = Instant::now();
        d.commit().await;
        assert!(
            started.elapsed() >= delay,
            "commit returned after {:?}, before the subscriber finished",
            started.elapsed()
        );
        d.shutdown().await;
    }

    /// Signals once when a drain cycle reaches it, then stalls briefly so a
    /// test can push *while* the drain provably holds the state lock.
    struct Gate {
        entered: StdMutex<Option<oneshot::Sender<()>>>,
    }

    #[async_trait]
    impl Subscribe for Gate {
        async fn handle(&self, _event: &Event) {
            if let Some(tx) = self.entered.lock().unwrap().take() {
                let _ = tx.send(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[tokio::test]
    async fn test_push_during_drain_lands_in_next_cycle() {
        let (entered_tx, entered_rx) = oneshot::channel();
        let d = Arc::new(dispatcher().await);
        let rec = Arc::new(Recorder::default());
        d.subscribe(Arc::new(Gate {
            entered: StdMutex::new(Some(entered_tx)),
        }))
        .await;
        d.subscribe(rec.clone()).await;

        d.push(note("first")).await;

        let pusher = {
            let d = Arc::clone(&d);
            tokio::spawn(async move {
                entered_rx.await.unwrap();
                // The drain is inside handle() and holds the state lock, so
                // this push serializes behind the active cycle.
                d.push(note("late")).await;
            })
        };

        d.commit().await;
        assert_eq!(rec.seen(), ["first"]);

        pusher.await.unwrap();
        assert_eq!(d.pending(), 1);

        d.commit().await;
        assert_eq!(rec.seen(), ["first", "late"]);
    }

    #[tokio::test]
    async fn test_concurrent_commits_serialize_without_double_delivery() {
        let d = Arc::new(dispatcher().await);
        let rec = Arc::new(Recorder::default());
        d.subscribe(rec.clone()).await;

        d.push(note("a")).await;
        d.push(note("b")).await;

        let first = {
            let d = Arc::clone(&d);
            tokio::spawn(async move { d.commit().await })
        };
        let second = {
            let d = Arc::clone(&d);
            tokio::spawn(async move { d.commit().await })
        };
        first.await.unwrap();
        second.await.unwrap();

        // One cycle drained everything; the other acked an empty queue.
        assert_eq!(rec.seen(), ["b", "a"]);
        assert_eq!(d.pending(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_future_delivery() {
        let d = dispatcher().await;
        let rec = Arc::new(Recorder::default());
        let id = d.subscribe(rec.clone()).await;

        d.push(note("before")).await;
        d.commit().await;
        assert_eq!(rec.seen(), ["before"]);

        assert!(d.unsubscribe(id).await);
        assert!(!d.unsubscribe(id).await);
        assert_eq!(d.subscriber_count().await, 0);

        d.push(note("after")).await;
        d.commit().await;
        assert_eq!(rec.seen(), ["before"]);
        d.shutdown().await;
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn handle(&self, _event: &Event) {
            panic!("sink not ready");
        }
    }

    #[tokio::test]
    async fn test_subscriber_panic_fails_commit_loudly() {
        let d = Arc::new(dispatcher().await);
        d.subscribe(Arc::new(Exploder)).await;
        d.push(note("doomed")).await;

        let commit = {
            let d = Arc::clone(&d);
            tokio::spawn(async move { d.commit().await })
        };
        let err = commit.await.unwrap_err();
        assert!(err.is_panic(), "commit must panic, not hang or succeed");
    }

    #[tokio::test]
    async fn test_clean_teardown_after_commit() {
        let d = dispatcher().await;
        d.push(note("x")).await;
        d.commit().await;
        // Empty queue: plain drop must not abort either.
        drop(d);
    }

    /// Re-execs the test binary so the abort can be observed as a child
    /// process exit instead of taking the whole test run down.
    #[test]
    fn test_drop_with_pending_events_aborts_process() {
        if std::env::var_os(ABORT_CHILD_ENV).is_some() {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let d = Dispatcher::spawn(DispatcherConfig::default()).await.unwrap();
                d.push(note("pending")).await;
                drop(d); // must abort here
            });
            std::process::exit(0); // not reached if the contract holds
        }

        let exe = std::env::current_exe().unwrap();
        let status = std::process::Command::new(exe)
            .args([
                "core::dispatcher::tests::test_drop_with_pending_events_aborts_process",
                "--exact",
                "--test-threads=1",
            ])
            .env(ABORT_CHILD_ENV, "1")
            .status()
            .unwrap();
        assert!(
            !status.success(),
            "dropping a dispatcher with pending events must abort the process"
        );
    }
}
