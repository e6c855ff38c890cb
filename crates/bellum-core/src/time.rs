//! Integer-minutes time types. Bellum reasons about schedules in whole minutes; the
//! non-goal "fractional task durations below one minute" rules out anything finer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BellumError;

/// A point in time. An alias over `chrono::DateTime<Utc>` rather than a newtype, since
/// Bellum never needs anything `DateTime` doesn't already provide.
pub type Instant = DateTime<Utc>;

/// A non-negative duration, stored as whole minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration {
    minutes: i64,
}

impl Duration {
    pub fn minutes(minutes: i64) -> Result<Self, BellumError> {
        if minutes < 0 {
            return Err(BellumError::validation_single(
                "duration non-negative",
                format!("duration {minutes} minutes is negative"),
            ));
        }
        Ok(Self { minutes })
    }

    /// Construct without validating. Used for sentinel/placeholder durations the GA
    /// decoder assigns internally (spec §4.5 step 2), which are never surfaced as a
    /// genuine estimate.
    pub const fn minutes_unchecked(minutes: i64) -> Self {
        Self { minutes }
    }

    pub const fn zero() -> Self {
        Self { minutes: 0 }
    }

    pub const fn as_minutes(self) -> i64 {
        self.minutes
    }

    pub fn add_to(self, instant: Instant) -> Instant {
        instant + chrono::Duration::minutes(self.minutes)
    }
}

impl std::ops::Add for Duration {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { minutes: self.minutes + rhs.minutes }
    }
}

impl std::ops::Sub for Duration {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { minutes: self.minutes - rhs.minutes }
    }
}
