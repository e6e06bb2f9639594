use crate::timeout::Clock;
use std::{cell::RefCell, rc::Rc};

///
/// ManualClock
///
/// Shared hand-driven clock. Cloning yields a handle onto the same time
/// line, so a test can hold one handle while the manager under test holds
/// another. A ticking clock advances itself on every read, which models
/// time passing during extraction without any real sleeping.
///

#[derive(Clone)]
pub(crate) struct ManualClock {
    state: Rc<RefCell<ClockState>>,
}

struct ClockState {
    now: u64,
    tick: u64,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self::with_tick(0)
    }

    pub(crate) fn ticking(tick: u64) -> Self {
        Self::with_tick(tick)
    }

    fn with_tick(tick: u64) -> Self {
        Self {
            state: Rc::new(RefCell::new(ClockState { now: 0, tick })),
        }
    }

    pub(crate) fn advance(&self, millis: u64) {
        self.state.borrow_mut().now += millis;
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        let now = state.now;
        state.now += state.tick;
        now
    }
}
