// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_utils::Clock;

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentAudit, AppointmentStatus};

pub struct AppointmentLifecycleService {
    enforce_transitions: bool,
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            enforce_transitions: config.enforce_status_transitions,
        }
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: *current_status,
                to: *new_status,
            });
        }

        Ok(())
    }

    /// Statuses reachable from `current_status`: any later step, nothing from a terminal one.
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        if current_status.is_terminal() {
            return Vec::new();
        }

        AppointmentStatus::all()
            .into_iter()
            .filter(|candidate| candidate.sequence() > current_status.sequence())
            .collect()
    }

    /// Move the appointment to `new_status` and append an audit entry for the change.
    pub fn change_status(
        &self,
        appointment: &mut Appointment,
        new_status: AppointmentStatus,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        let previous = appointment.status;

        if self.enforce_transitions {
            self.validate_status_transition(&previous, &new_status)?;
        }

        appointment.status = new_status;
        appointment.entity.mark_changed(at);
        appointment.record_audit(AppointmentAudit::new(new_status, Some(previous), at, notes));

        info!(
            "Appointment {:?} status changed: {} -> {}",
            appointment.uuid(),
            previous,
            new_status
        );
        Ok(())
    }

    /// Restore the status in effect before the most recently recorded change.
    ///
    /// Audits are ordered by `date_recorded`, not by insertion order.
    ///
    /// The undo itself is audited; earlier entries are left untouched.
    pub fn undo_status_change(
        &self,
        appointment: &mut Appointment,
        at: DateTime<Utc>,
    ) -> Result<AppointmentStatus, AppointmentError> {
        let restored = appointment
            .appointment_audits()
            .iter()
            .filter(|audit| audit.previous_status().is_some())
            .max_by_key(|audit| audit.date_recorded())
            .and_then(|audit| audit.previous_status())
            .ok_or(AppointmentError::NoStatusHistory)?;

        let current = appointment.status;
        appointment.status = restored;
        appointment.entity.mark_changed(at);
        appointment.record_audit(AppointmentAudit::new(
            restored,
            Some(current),
            at,
            Some(format!("Undo status change from {}", current)),
        ));

        info!(
            "Appointment {:?} status change undone: {} -> {}",
            appointment.uuid(),
            current,
            restored
        );
        Ok(restored)
    }

    /// Check if an appointment should be marked as missed
    pub fn should_mark_missed(
        &self,
        appointment: &Appointment,
        clock: &dyn Clock,
    ) -> Result<bool, AppointmentError> {
        if !matches!(
            appointment.status,
            AppointmentStatus::Scheduled | AppointmentStatus::CheckedIn
        ) {
            return Ok(false);
        }

        Ok(!appointment.is_future_appointment(clock)?)
    }
}
