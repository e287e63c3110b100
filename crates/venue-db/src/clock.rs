//! Source of "now" for payment timestamps and loyalty month boundaries.

use std::fmt::Debug;

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};

/// Wall-clock abstraction injected into the engine.
pub trait Clock: Send + Sync + Debug {
    /// Current local date and time, whole seconds.
    fn now(&self) -> NaiveDateTime;

    /// Current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(0)
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
