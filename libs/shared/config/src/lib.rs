use std::env;
use chrono::FixedOffset;
use tracing::warn;

pub const DEFAULT_MAX_RECURRING_OCCURRENCES: usize = 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Offset used for day boundaries. `None` means the host's local time zone.
    pub clinic_utc_offset: Option<FixedOffset>,
    pub enforce_status_transitions: bool,
    pub max_recurring_occurrences: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clinic_utc_offset: None,
            enforce_status_transitions: true,
            max_recurring_occurrences: DEFAULT_MAX_RECURRING_OCCURRENCES,
        }
    }
}

impl AppConfig {
    /// Load a `.env` file if present, then read the environment.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let clinic_utc_offset = match env::var("CLINIC_UTC_OFFSET_MINUTES") {
            Ok(raw) => parse_utc_offset_minutes(&raw).or_else(|| {
                warn!("CLINIC_UTC_OFFSET_MINUTES={} is not a valid offset, using local time zone", raw);
                None
            }),
            Err(_) => None,
        };

        let enforce_status_transitions = match env::var("ENFORCE_STATUS_TRANSITIONS") {
            Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
                warn!("ENFORCE_STATUS_TRANSITIONS={} is not a boolean, using default", raw);
                defaults.enforce_status_transitions
            }),
            Err(_) => defaults.enforce_status_transitions,
        };

        let max_recurring_occurrences = match env::var("MAX_RECURRING_OCCURRENCES") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    warn!("MAX_RECURRING_OCCURRENCES={} is not a positive integer, using default", raw);
                    defaults.max_recurring_occurrences
                }
            },
            Err(_) => defaults.max_recurring_occurrences,
        };

        Self {
            clinic_utc_offset,
            enforce_status_transitions,
            max_recurring_occurrences,
        }
    }

    pub fn has_clinic_offset(&self) -> bool {
        self.clinic_utc_offset.is_some()
    }
}

/// Parse a signed minute count (e.g. `"-300"`, `"330"`) into a fixed offset.
pub fn parse_utc_offset_minutes(raw: &str) -> Option<FixedOffset> {
    let minutes = raw.trim().parse::<i32>().ok()?;
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
