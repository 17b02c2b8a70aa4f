use chrono::{DateTime, FixedOffset, Local, NaiveTime, Offset, Utc};

use shared_config::AppConfig;

/// Source of "now" and of the offset that defines calendar days.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn offset(&self) -> FixedOffset;

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.offset())
    }

    /// Midnight of the current day in this clock's offset.
    fn start_of_day(&self) -> DateTime<FixedOffset> {
        truncate_to_day(self.local_now())
    }
}

/// Drop hours, minutes, seconds and sub-seconds, keeping the value's offset.
pub fn truncate_to_day(value: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    value - value.time().signed_duration_since(NaiveTime::MIN)
}

/// Wall clock. Uses the configured clinic offset, or the host's local offset.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.clinic_utc_offset)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset.unwrap_or_else(|| Local::now().offset().fix())
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    pub fn at_local(local: DateTime<FixedOffset>) -> Self {
        Self::new(local.with_timezone(&Utc), *local.offset())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
