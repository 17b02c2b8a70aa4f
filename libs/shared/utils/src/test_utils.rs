use std::sync::Once;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use crate::date::{Clock, FixedClock};
use crate::logging::init_tracing;

static TEST_LOGGING: Once = Once::new();

/// Route `tracing` output from tests through the fmt subscriber, once per process.
pub fn init_test_logging() {
    TEST_LOGGING.call_once(|| {
        let _ = init_tracing("debug");
    });
}

pub fn offset_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).expect("Test offset should be within a day")
}

/// A clock at the given local wall-clock time in the given offset.
///
/// Panics on an impossible date so a bad fixture never falls back to the real clock.
pub fn fixed_clock(
    offset: FixedOffset,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> FixedClock {
    let local = offset
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("Test clock fixture should be a valid date and time");
    FixedClock::at_local(local)
}

/// Midnight of the clock's current day, as a UTC instant.
pub fn start_of_today_utc(clock: &dyn Clock) -> DateTime<Utc> {
    clock.start_of_day().with_timezone(&Utc)
}

pub fn millis(n: i64) -> Duration {
    Duration::milliseconds(n)
}
