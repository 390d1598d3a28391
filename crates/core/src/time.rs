use chrono::{DateTime, Duration, Utc};

/// Shown instead of an elapsed time when the session has no start time.
pub const NOT_STARTED_DISPLAY: &str = "--:--";

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Time elapsed since `start`, or `None` when the session was never started.
///
/// A start time in the future yields zero rather than a negative span.
#[must_use]
pub fn elapsed_since(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    let start = start?;
    Some((now - start).max(Duration::zero()))
}

/// Formats an elapsed span as `minutes:seconds`, seconds zero-padded.
#[must_use]
pub fn format_elapsed(elapsed: Option<Duration>) -> String {
    match elapsed {
        Some(span) => {
            let secs = span.num_seconds().max(0);
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => NOT_STARTED_DISPLAY.to_string(),
    }
}

/// Epoch milliseconds as used by the snapshot and report wire formats.
#[must_use]
pub fn to_epoch_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Inverse of [`to_epoch_millis`]. Zero and negative values mean "unset".
#[must_use]
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
