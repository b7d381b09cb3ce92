//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`], the centralized settings for one
//! dispatcher instance, consumed by
//! [`Dispatcher::spawn`](crate::Dispatcher::spawn).
//!
//! ## Sentinel values
//! - `queue_reserve = 0` → no up-front queue allocation
//! - `commit_backlog` is clamped to a minimum of 1 (the control channel
//!   cannot be unbuffered)

/// Configuration for one dispatcher instance.
///
/// ## Field semantics
/// - `commit_backlog`: how many commit requests may sit in the control
///   channel before additional committers wait to even enqueue theirs.
///   Commits are processed one at a time regardless; this only bounds the
///   request queue. Minimum 1 (clamped).
/// - `queue_reserve`: initial capacity reserved for the event queue. The
///   queue itself is unbounded; this only avoids early reallocation for
///   workloads with a known batch size. `0` = no reservation.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Capacity of the control channel carrying commit requests.
    pub commit_backlog: usize,

    /// Initial capacity reserved for the event queue (`0` = none).
    pub queue_reserve: usize,
}

impl DispatcherConfig {
    /// Returns the commit backlog clamped to a minimum of 1.
    ///
    /// The dispatcher uses this value so an invalid channel capacity can
    /// never be constructed.
    #[inline]
    pub fn commit_backlog_clamped(&self) -> usize {
        self.commit_backlog.max(1)
    }
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `commit_backlog = 16` (plenty for a handful of committing tasks)
    /// - `queue_reserve = 0` (grow on demand)
    fn default() -> Self {
        Self {
            commit_backlog: 16,
            queue_reserve: 0,
        }
    }
}
