#![forbid(unsafe_code)]

//! Trailing-edge resize debounce.
//!
//! The first non-empty size observed is applied at once so the view never
//! starts blank; zero-area sizes before it are ignored. Every later change is held until no further resize has arrived for
//! the configured delay; each new event restarts the wait and replaces the
//! pending size (latest wins).
//!
//! ```
//! use std::time::{Duration, Instant};
//! use pv_runtime::resize::{ResizeAction, ResizeDebouncer};
//!
//! let start = Instant::now();
//! let mut debouncer = ResizeDebouncer::new(Duration::from_millis(500));
//! assert_eq!(
//!     debouncer.handle_resize_at(80, 24, start),
//!     ResizeAction::Apply { width: 80, height: 24 }
//! );
//! assert_eq!(debouncer.handle_resize_at(100, 30, start), ResizeAction::Deferred);
//! let later = start + Duration::from_millis(500);
//! assert_eq!(
//!     debouncer.tick_at(later),
//!     ResizeAction::Apply { width: 100, height: 30 }
//! );
//! ```

use std::time::{Duration, Instant};

/// What the caller should do after feeding the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAction {
    /// Nothing changed.
    None,
    /// A size is pending; keep ticking.
    Deferred,
    /// Commit this size and lay out again.
    Apply { width: u16, height: u16 },
}

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    applied: Option<(u16, u16)>,
    pending: Option<(u16, u16)>,
    last_event: Option<Instant>,
    commits: u64,
}

fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier).unwrap_or(Duration::ZERO)
}

impl ResizeDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            applied: None,
            pending: None,
            last_event: None,
            commits: 0,
        }
    }

    /// Feed a resize notification.
    pub fn handle_resize_at(&mut self, width: u16, height: u16, now: Instant) -> ResizeAction {
        let size = (width, height);
        if self.applied.is_none() {
            if width == 0 || height == 0 {
                tracing::trace!(width, height, "empty size before first commit ignored");
                return ResizeAction::None;
            }
            return self.commit(size);
        }
        if self.pending.is_none() && self.applied == Some(size) {
            return ResizeAction::None;
        }
        self.pending = Some(size);
        self.last_event = Some(now);
        tracing::trace!(width, height, "resize deferred");
        ResizeAction::Deferred
    }

    /// Commit the pending size once the quiet period has elapsed.
    pub fn tick_at(&mut self, now: Instant) -> ResizeAction {
        let (Some(size), Some(last_event)) = (self.pending, self.last_event) else {
            return ResizeAction::None;
        };
        if duration_since_or_zero(now, last_event) < self.delay {
            return ResizeAction::Deferred;
        }
        self.pending = None;
        self.last_event = None;
        if self.applied == Some(size) {
            return ResizeAction::None;
        }
        self.commit(size)
    }

    /// Remaining wait before [`tick_at`](Self::tick_at) commits.
    #[must_use]
    pub fn time_until_apply(&self, now: Instant) -> Option<Duration> {
        self.pending?;
        let last_event = self.last_event?;
        Some(
            self.delay
                .saturating_sub(duration_since_or_zero(now, last_event)),
        )
    }

    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending size without committing it.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("pending resize cancelled");
        }
        self.last_event = None;
    }

    /// Last committed size.
    #[inline]
    #[must_use]
    pub fn applied(&self) -> Option<(u16, u16)> {
        self.applied
    }

    /// Number of sizes committed so far.
    #[inline]
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    fn commit(&mut self, (width, height): (u16, u16)) -> ResizeAction {
        self.applied = Some((width, height));
        self.commits += 1;
        tracing::debug!(width, height, commits = self.commits, "resize committed");
        ResizeAction::Apply { width, height }
    }
}
