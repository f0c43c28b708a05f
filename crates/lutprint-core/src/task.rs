//! Cooperative execution: cancellation and progress.
//!
//! Every long-running loop in lutprint is single-threaded and structured as
//! "do bounded work, hit a checkpoint, continue". A checkpoint reports
//! progress and yields the thread. It is the only place an operation pauses.
//!
//! Cancellation is polled, never preemptive. A [`CancellationToken`] is
//! cloned to whoever may request cancellation; the running loop observes it
//! through [`TaskContext::check_cancelled`] and fails with
//! [`Error::Cancelled`], discarding its partial output.
//!
//! ```
//! use lutprint_core::{CancellationToken, TaskContext};
//!
//! let token = CancellationToken::new();
//! let ctx = TaskContext::new()
//!     .with_cancel(token.clone())
//!     .with_progress(|p| eprintln!("{:.0}%", p.fraction() * 100.0));
//!
//! assert!(ctx.check_cancelled().is_ok());
//! token.cancel();
//! assert!(ctx.check_cancelled().is_err());
//! ```

use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tiles (or lattice cells) processed between checkpoints.
pub const TILE_YIELD_INTERVAL: u64 = 5_000;

/// Pixels processed between checkpoints in the pixel filter.
pub const PIXEL_YIELD_INTERVAL: u64 = 150_000;

/// Token for cooperative cancellation.
///
/// Clones share the same flag.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clears the flag so the token can be reused for the next operation.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Progress reported at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Units of work finished.
    pub completed: u64,
    /// Total units of work.
    pub total: u64,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0) as f32
        }
    }
}

type ProgressFn = Box<dyn Fn(Progress) + Send + Sync>;

/// Control context passed into every long-running operation.
///
/// Holds an optional cancellation token and an optional progress callback.
/// The default context never cancels and reports nowhere.
#[derive(Default)]
pub struct TaskContext {
    cancel: Option<CancellationToken>,
    progress: Option<ProgressFn>,
}

impl TaskContext {
    /// Creates a context with no token and no progress callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attaches a progress callback, invoked at every checkpoint.
    pub fn with_progress(mut self, callback: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// True if a cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Fails with [`Error::Cancelled`] if cancellation has been requested.
    #[inline]
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reports progress and yields the current thread to the host scheduler.
    pub fn checkpoint(&self, completed: u64, total: u64) {
        if let Some(cb) = &self.progress {
            cb(Progress { completed, total });
        }
        std::thread::yield_now();
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
        other.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn default_context_never_cancels() {
        let ctx = TaskContext::new();
        assert!(ctx.check_cancelled().is_ok());
        ctx.checkpoint(1, 2);
    }

    #[test]
    fn checkpoint_reports_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = TaskContext::new().with_progress(move |p| sink.lock().unwrap().push(p));
        ctx.checkpoint(5_000, 20_000);
        ctx.checkpoint(20_000, 20_000);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_relative_eq!(seen[0].fraction(), 0.25);
        assert_relative_eq!(seen[1].fraction(), 1.0);
    }

    #[test]
    fn empty_work_is_complete() {
        assert_relative_eq!(Progress { completed: 0, total: 0 }.fraction(), 1.0);
    }

    #[test]
    fn cancelled_context_errors() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = TaskContext::new().with_cancel(token);
        assert!(matches!(ctx.check_cancelled(), Err(Error::Cancelled)));
    }
}
