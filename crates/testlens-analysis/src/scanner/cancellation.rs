//! Scan cancellation: an explicit cancel flag plus an optional deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use testlens_core::errors::Interruption;

/// Shared cancellation handle. Clones share the cancel flag; each clone may
/// carry its own deadline.
///
/// Explicit cancellation takes precedence over an expired deadline so callers
/// can tell the two apart.
#[derive(Debug, Clone, Default)]
pub struct ScanCancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl ScanCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle sharing this flag that additionally expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(deadline),
        }
    }

    /// A handle sharing this flag that expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Request cancellation. Work already started is allowed to finish.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Clear an earlier cancellation request.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn as_atomic(&self) -> &AtomicBool {
        &self.flag
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// The reason work should stop, if any.
    pub fn interruption(&self) -> Option<Interruption> {
        if self.is_cancelled() {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interruption::DeadlineExceeded),
            _ => None,
        }
    }

    /// `Err` once the scan has been cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), Interruption> {
        match self.interruption() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handle_is_live() {
        let c = ScanCancellation::new();
        assert!(c.check().is_ok());
        assert!(c.remaining().is_none());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let parent = ScanCancellation::new();
        let child = parent.with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert_eq!(child.check(), Err(Interruption::Cancelled));
        parent.reset();
        assert!(child.check().is_ok());
    }

    #[test]
    fn expired_deadline_reports_deadline() {
        let c = ScanCancellation::new().with_deadline(Instant::now());
        assert_eq!(c.check(), Err(Interruption::DeadlineExceeded));
    }

    #[test]
    fn explicit_cancel_wins_over_deadline() {
        let c = ScanCancellation::new().with_deadline(Instant::now());
        c.cancel();
        assert_eq!(c.interruption(), Some(Interruption::Cancelled));
    }
}
