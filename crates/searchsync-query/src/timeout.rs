use searchsync_core::error::InternalError;
use std::{sync::Arc, time::Instant};

///
/// Clock
///
/// Monotonic time source for timeout accounting, in milliseconds. Injected
/// so tests can drive time explicitly.
///

pub trait Clock {
    fn now_millis(&self) -> u64;
}

///
/// MonotonicClock
///
/// Default clock, reading elapsed wall time from a fixed origin.
///

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

///
/// TimeoutMode
///
/// What exceeding the budget means. Exactly one behavior can be configured
/// per query; the manager starts with no budget at all.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimeoutMode {
    /// Stop extraction early and flag the results as partial.
    Limit,

    /// No budget; the query runs to completion.
    #[default]
    None,

    /// Raise a timeout error as soon as the budget is exceeded.
    RaiseException,
}

///
/// TimeoutManager
///
/// Cooperative, poll-based query cancellation. The budget is configured
/// once before the query runs, `start` resets the clock, and extraction
/// polls `check` / `is_timed_out` between steps. There is no preemption: a
/// slow single step cannot be interrupted mid-flight.
///

pub struct TimeoutManager {
    clock: Arc<dyn Clock>,
    mode: TimeoutMode,
    budget_millis: u64,
    started_at: Option<u64>,
}

impl TimeoutManager {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            mode: TimeoutMode::None,
            budget_millis: 0,
            started_at: None,
        }
    }

    /// Raise a timeout error when the budget is exceeded.
    pub fn fail_after(&mut self, budget_millis: u64) -> Result<(), InternalError> {
        self.configure(TimeoutMode::RaiseException, budget_millis)
    }

    /// Truncate results when the budget is exceeded.
    pub fn truncate_after(&mut self, budget_millis: u64) -> Result<(), InternalError> {
        self.configure(TimeoutMode::Limit, budget_millis)
    }

    // Configuring two behaviors for one query is a caller bug; refuse it
    // eagerly rather than guessing which one wins.
    fn configure(&mut self, mode: TimeoutMode, budget_millis: u64) -> Result<(), InternalError> {
        if self.mode != TimeoutMode::None {
            return Err(InternalError::query_config(format!(
                "timeout behavior already configured as {:?}; cannot set {mode:?}",
                self.mode
            )));
        }

        self.mode = mode;
        self.budget_millis = budget_millis;
        Ok(())
    }

    /// Reset the clock. Extraction measures its budget from the last start.
    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now_millis());
    }

    #[must_use]
    pub const fn mode(&self) -> TimeoutMode {
        self.mode
    }

    /// Whether the budget is exhausted. Always false with no budget
    /// configured or before `start`.
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        if self.mode == TimeoutMode::None {
            return false;
        }
        let Some(started_at) = self.started_at else {
            return false;
        };

        self.clock.now_millis().saturating_sub(started_at) >= self.budget_millis
    }

    /// Poll point for extraction loops. Raises in exception mode; in limit
    /// mode the caller consults `is_timed_out` and truncates instead.
    pub fn check(&self) -> Result<(), InternalError> {
        if self.mode == TimeoutMode::RaiseException && self.is_timed_out() {
            return Err(InternalError::query_timeout(format!(
                "query exceeded its {}ms budget",
                self.budget_millis
            )));
        }

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManualClock;

    #[test]
    fn no_budget_never_times_out() {
        let clock = ManualClock::new();
        let mut manager = TimeoutManager::new(Arc::new(clock.clone()));
        manager.start();

        clock.advance(1_000_000);
        assert!(!manager.is_timed_out());
        manager.check().expect("no budget should never raise");
    }

    #[test]
    fn exception_mode_raises_once_the_budget_is_exceeded() {
        let clock = ManualClock::new();
        let mut manager = TimeoutManager::new(Arc::new(clock.clone()));
        manager.fail_after(50).expect("first configuration should succeed");
        manager.start();

        clock.advance(49);
        manager.check().expect("under budget should not raise");

        clock.advance(1);
        let err = manager.check().expect_err("at budget should raise");
        assert!(err.is_timeout());
    }

    #[test]
    fn limit_mode_reports_but_never_raises() {
        let clock = ManualClock::new();
        let mut manager = TimeoutManager::new(Arc::new(clock.clone()));
        manager
            .truncate_after(50)
            .expect("first configuration should succeed");
        manager.start();

        clock.advance(60);
        assert!(manager.is_timed_out());
        manager.check().expect("limit mode should not raise");
    }

    #[test]
    fn configuring_both_behaviors_is_an_eager_error() {
        let clock = ManualClock::new();
        let mut manager = TimeoutManager::new(Arc::new(clock));
        manager.fail_after(50).expect("first configuration should succeed");

        let err = manager
            .truncate_after(100)
            .expect_err("second behavior should be refused");
        assert!(err.message.contains("already configured"));
    }

    #[test]
    fn start_resets_the_clock() {
        let clock = ManualClock::new();
        let mut manager = TimeoutManager::new(Arc::new(clock.clone()));
        manager.fail_after(50).expect("configuration should succeed");
        manager.start();

        clock.advance(40);
        manager.start();
        clock.advance(40);
        manager
            .check()
            .expect("budget should be measured from the last start");
    }

    #[test]
    fn unstarted_manager_is_not_timed_out() {
        let clock = ManualClock::new();
        let mut manager = TimeoutManager::new(Arc::new(clock.clone()));
        manager.fail_after(50).expect("configuration should succeed");

        clock.advance(500);
        assert!(!manager.is_timed_out());
    }
}
