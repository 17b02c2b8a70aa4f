use chrono::{FixedOffset, TimeZone, Timelike, Utc};

use shared_config::AppConfig;
use shared_utils::test_utils::{fixed_clock, init_test_logging, offset_hours, start_of_today_utc};
use shared_utils::{truncate_to_day, Clock, FixedClock, SystemClock};

#[test]
fn test_truncate_to_day_keeps_offset() {
    let offset = offset_hours(5);
    let value = offset
        .with_ymd_and_hms(2024, 7, 14, 23, 59, 59)
        .unwrap()
        + chrono::Duration::milliseconds(999);

    let truncated = truncate_to_day(value);

    assert_eq!(truncated, offset.with_ymd_and_hms(2024, 7, 14, 0, 0, 0).unwrap());
    assert_eq!(truncated.offset(), &offset, "Truncation must not change the offset");
    assert_eq!(truncated.nanosecond(), 0);
}

#[test]
fn test_truncate_midnight_is_identity() {
    let midnight = offset_hours(-4).with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(truncate_to_day(midnight), midnight);
}

#[test]
fn test_fixed_clock_start_of_day_uses_its_offset() {
    init_test_logging();

    // 01:30 on the 2nd in UTC+3 is still the 1st in UTC.
    let clock = fixed_clock(offset_hours(3), 2024, 5, 2, 1, 30);

    assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 5, 1, 22, 30, 0).unwrap());
    assert_eq!(
        clock.start_of_day(),
        offset_hours(3).with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
    );
    assert_eq!(
        start_of_today_utc(&clock),
        Utc.with_ymd_and_hms(2024, 5, 1, 21, 0, 0).unwrap()
    );
}

#[test]
fn test_utc_fixed_clock() {
    let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
    let clock = FixedClock::utc(now);

    assert_eq!(clock.offset(), FixedOffset::east_opt(0).unwrap());
    assert_eq!(clock.local_now(), now);
    assert_eq!(start_of_today_utc(&clock), Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
}

#[test]
fn test_system_clock_prefers_configured_offset() {
    let config = AppConfig {
        clinic_utc_offset: Some(offset_hours(-7)),
        ..AppConfig::default()
    };
    let clock = SystemClock::from_config(&config);

    assert_eq!(clock.offset(), offset_hours(-7));
    let start = clock.start_of_day();
    assert_eq!(start.hour(), 0);
    assert_eq!(start.minute(), 0);
    assert!(start <= clock.local_now());
}

#[test]
#[should_panic(expected = "valid date and time")]
fn test_fixed_clock_rejects_impossible_fixture() {
    fixed_clock(offset_hours(0), 2024, 2, 30, 9, 0);
}

#[test]
#[should_panic(expected = "within a day")]
fn test_offset_hours_rejects_out_of_range() {
    offset_hours(25);
}
