use chrono::{DateTime, Duration, Utc};

/// Where the reducer reads "now" from: the system time, or a pinned instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pinned: Option<DateTime<Utc>>,
}

impl Clock {
    #[must_use]
    pub const fn system() -> Self {
        Self { pinned: None }
    }

    #[must_use]
    pub const fn fixed(at: DateTime<Utc>) -> Self {
        Self { pinned: Some(at) }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.pinned.unwrap_or_else(Utc::now)
    }

    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    /// Pinned clock moved forward by `delta`. The system clock is returned as is.
    #[must_use]
    pub fn later(self, delta: Duration) -> Self {
        Self {
            pinned: self.pinned.map(|at| at + delta),
        }
    }

    /// Time since `earlier`, never negative.
    #[must_use]
    pub fn elapsed_since(&self, earlier: DateTime<Utc>) -> Duration {
        (self.now() - earlier).max(Duration::zero())
    }
}

/// 2023-11-14T22:13:20Z.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Never in practice: the timestamp is a constant well inside chrono's range.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_clock_moves_only_when_asked() {
        let clock = fixed_clock();
        assert!(clock.is_pinned());
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.later(Duration::seconds(3)).now(), fixed_now() + Duration::seconds(3));
        assert_eq!(Clock::system().later(Duration::seconds(3)), Clock::default());
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let clock = fixed_clock().later(Duration::seconds(90));
        assert_eq!(clock.elapsed_since(fixed_now()), Duration::seconds(90));
        let future = fixed_now() + Duration::hours(1);
        assert_eq!(fixed_clock().elapsed_since(future), Duration::zero());
    }
}
