// libs/appointment-cell/src/services/recurrence.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc, Weekday};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_utils::{truncate_to_day, Clock};

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentRecurringPattern, RecurrenceType};

/// Expands a template appointment into the occurrences of a recurring series.
pub struct RecurringAppointmentService {
    max_occurrences: usize,
}

impl Default for RecurringAppointmentService {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl RecurringAppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            max_occurrences: config.max_recurring_occurrences,
        }
    }

    /// Build every occurrence of `pattern`, starting with the template's own slot.
    ///
    /// Days are counted in the clock's offset so that an occurrence keeps the same
    /// local time of day as the template.
    pub fn generate_occurrences(
        &self,
        template: &Appointment,
        pattern: Arc<AppointmentRecurringPattern>,
        clock: &dyn Clock,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        pattern.validate()?;
        let start = template
            .start_date_time
            .ok_or(AppointmentError::MissingStartDateTime)?;
        let duration = template.scheduled_duration();

        let offset = clock.offset();
        let local_start = start.with_timezone(&offset);
        let first_day = truncate_to_day(local_start);
        let time_of_day = local_start.signed_duration_since(first_day);

        debug!(
            "Expanding {:?} pattern every {} from {} (frequency {:?}, end {:?})",
            pattern.recurrence_type, pattern.period, local_start, pattern.frequency, pattern.end_date
        );

        let days = match pattern.recurrence_type {
            RecurrenceType::Day => self.daily_days(&pattern, first_day, offset)?,
            RecurrenceType::Week => self.weekly_days(&pattern, first_day, offset)?,
        };

        if days.is_empty() {
            warn!("Recurring pattern ends before the first occurrence at {}", local_start);
        }

        let occurrences: Vec<Appointment> = days
            .into_iter()
            .map(|day| {
                let occurrence_start = (day + time_of_day).with_timezone(&Utc);
                let occurrence_end = duration.map(|d| occurrence_start + d);
                template.occurrence_at(occurrence_start, occurrence_end, Arc::clone(&pattern))
            })
            .collect();

        info!("Generated {} recurring appointment occurrences", occurrences.len());
        Ok(occurrences)
    }

    fn daily_days(
        &self,
        pattern: &AppointmentRecurringPattern,
        first_day: DateTime<FixedOffset>,
        offset: FixedOffset,
    ) -> Result<Vec<DateTime<FixedOffset>>, AppointmentError> {
        let step = Duration::days(i64::from(pattern.period));
        let mut days = Vec::new();
        let mut day = first_day;

        while !self.is_complete(pattern, &days, day, offset) {
            self.push_day(&mut days, day)?;
            day = day + step;
        }

        Ok(days)
    }

    fn weekly_days(
        &self,
        pattern: &AppointmentRecurringPattern,
        first_day: DateTime<FixedOffset>,
        offset: FixedOffset,
    ) -> Result<Vec<DateTime<FixedOffset>>, AppointmentError> {
        let mut weekdays: Vec<Weekday> = pattern.days_of_week.clone();
        weekdays.sort_by_key(|d| d.num_days_from_monday());
        weekdays.dedup();

        let step = Duration::weeks(i64::from(pattern.period));
        let mut week = first_day - Duration::days(i64::from(first_day.weekday().num_days_from_monday()));
        let mut days = Vec::new();

        'weeks: loop {
            for weekday in &weekdays {
                let day = week + Duration::days(i64::from(weekday.num_days_from_monday()));
                if day < first_day {
                    continue;
                }
                if self.is_complete(pattern, &days, day, offset) {
                    break 'weeks;
                }
                self.push_day(&mut days, day)?;
            }
            week = week + step;
        }

        Ok(days)
    }

    fn is_complete(
        &self,
        pattern: &AppointmentRecurringPattern,
        days: &[DateTime<FixedOffset>],
        next_day: DateTime<FixedOffset>,
        offset: FixedOffset,
    ) -> bool {
        if let Some(frequency) = pattern.frequency {
            return days.len() >= frequency as usize;
        }
        match pattern.end_date {
            Some(end_date) => next_day > truncate_to_day(end_date.with_timezone(&offset)),
            None => true,
        }
    }

    fn push_day(
        &self,
        days: &mut Vec<DateTime<FixedOffset>>,
        day: DateTime<FixedOffset>,
    ) -> Result<(), AppointmentError> {
        if days.len() >= self.max_occurrences {
            warn!("Recurring series exceeds the limit of {} occurrences", self.max_occurrences);
            return Err(AppointmentError::TooManyOccurrences {
                limit: self.max_occurrences,
            });
        }
        days.push(day);
        Ok(())
    }
}
