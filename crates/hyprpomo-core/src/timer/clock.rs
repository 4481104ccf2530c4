//! Time sources for the phase loop.
//!
//! The loop only ever asks for a monotonic offset and sleeps between polls,
//! so swapping [`SystemClock`] for [`ManualClock`] makes a whole run
//! deterministic.

use chrono::{DateTime, Local};
use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Block for one poll interval.
    fn sleep(&self, duration: Duration);

    /// Local wall-clock time, used for time-of-day bounties and history.
    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Real clock backed by [`Instant`] and `thread::sleep`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when slept on or advanced explicitly.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Duration>,
    wall_origin: DateTime<Local>,
}

impl ManualClock {
    /// Start at offset zero, reporting `wall_origin` as the local time.
    pub fn new(wall_origin: DateTime<Local>) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            wall_origin,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Local::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn local_now(&self) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(self.now.get()).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }

    fn local_now(&self) -> DateTime<Local> {
        (**self).local_now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_moves_only_on_sleep() {
        let clock = ManualClock::default();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.sleep(Duration::from_millis(250));
        clock.sleep(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[test]
    fn manual_clock_wall_time_tracks_offset() {
        let origin = Local.with_ymd_and_hms(2024, 3, 1, 8, 59, 0).unwrap();
        let clock = ManualClock::new(origin);
        clock.advance(Duration::from_secs(120));
        assert_eq!(clock.local_now(), origin + chrono::Duration::seconds(120));
    }
}
