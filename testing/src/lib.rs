//! # Pocket Todo Testing
//!
//! Testing utilities for reducers and stores built on Pocket Todo.
//!
//! This crate provides:
//! - Deterministic `Clock` implementations
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for returned effects
//!
//! ## Example
//!
//! ```ignore
//! use pocket_todo_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::for_tests(test_clock()))
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::AddTodo { title: "Buy milk".into() })
//!     .then_state(|state| assert_eq!(state.todos.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use pocket_todo_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use pocket_todo_testing::mocks::FixedClock;
    /// use pocket_todo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every read
    ///
    /// The first call returns `start`, the next `start + step`, and so on.
    /// Useful when a test needs strictly increasing `updated_at` values.
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        step_millis: i64,
        ticks: AtomicI64,
    }

    impl SteppingClock {
        /// Create a stepping clock starting at `start`
        #[must_use]
        pub fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
            Self {
                start,
                step_millis: step.num_milliseconds(),
                ticks: AtomicI64::new(0),
            }
        }

        /// Number of times `now()` has been called
        #[must_use]
        pub fn reads(&self) -> i64 {
            self.ticks.load(Ordering::SeqCst)
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + chrono::Duration::milliseconds(self.step_millis * tick)
        }
    }

    /// The instant every default test clock starts at (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a default fixed clock for tests
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(epoch())
    }

    /// Create a clock that starts at [`epoch`] and advances one second per read
    #[must_use]
    pub fn stepping_clock() -> SteppingClock {
        SteppingClock::new(epoch(), chrono::Duration::seconds(1))
    }
}

pub use mocks::{stepping_clock, test_clock, FixedClock, SteppingClock};
pub use reducer_test::{assertions, ReducerTest};
