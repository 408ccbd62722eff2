//! Wall-clock source for the engine
//!
//! All month windows and due dates are evaluated in local wall-clock time.
//! Tests pin the clock with `FixedClock`.

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate, NaiveDateTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same instant, so a test can keep a handle and advance the
/// time seen by an engine it has handed a clone to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Pin the clock to midday on the given date
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
        Self::new(date.and_hms_opt(12, 0, 0).unwrap_or_default())
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn set_date(&self, year: i32, month: u32, day: u32) {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.set(date.and_hms_opt(12, 0, 0).unwrap_or_default());
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_shared_between_clones() {
        let clock = FixedClock::at(2024, 3, 20);
        let handle = clock.clone();
        handle.set_date(2024, 4, 2);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
    }

    #[test]
    fn test_fixed_clock_ignores_invalid_date() {
        let clock = FixedClock::at(2024, 2, 10);
        clock.set_date(2024, 2, 30);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    }
}
