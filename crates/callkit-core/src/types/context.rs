//! Cooperative cancellation context passed as the first argument of wrapped functions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something that can be asked whether work should stop.
pub trait Cancellable {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);
}

/// Cancellation context wrapping a shared `AtomicBool` and an optional deadline.
///
/// The invocation layer never inspects the context while coercing arguments.
/// It only hands it, unchanged, to functions whose first argument is a `Context`.
/// Clones share the same cancellation flag.
#[derive(Debug, Clone)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A fresh context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Derive a context sharing this context's flag with a deadline at `deadline`.
    /// An earlier existing deadline is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled) && self.deadline == other.deadline
    }
}

impl Cancellable for Context {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.is_expired()
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_not_cancelled() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_clones_share_flag() {
        let ctx = Context::background();
        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx, clone);
    }

    #[test]
    fn test_expired_deadline_reports_cancelled() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_with_deadline_keeps_earlier() {
        let now = Instant::now();
        let early = Context::background().with_deadline(now);
        let later = early.with_deadline(now + Duration::from_secs(60));
        assert_eq!(later.deadline(), Some(now));
    }
}
