//! Time and timestamp helpers.

use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};

/// UTC timestamp used for creation dates, last-run times and the reference "now".
pub type Timestamp = DateTime<Utc>;

const SECONDS_PER_DAY: i64 = 86_400;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whole days elapsed from `then` to `now`, floored.
///
/// A `then` slightly in the future yields `-1`, not `0`.
#[must_use]
pub fn days_between(then: Timestamp, now: Timestamp) -> i64 {
    (now - then).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Round to the nearest hour; an exact half hour goes to the even hour.
///
/// Returns `None` only when the result would fall outside chrono's range.
#[must_use]
pub fn round_to_hour(ts: Timestamp) -> Option<Timestamp> {
    let hour = TimeDelta::hours(1);
    let floor = ts.duration_trunc(hour).ok()?;
    let remainder = ts - floor;
    let half = TimeDelta::minutes(30);
    let round_up = match remainder.cmp(&half) {
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => floor.hour() % 2 == 1,
    };
    if round_up {
        floor.checked_add_signed(hour)
    } else {
        Some(floor)
    }
}
