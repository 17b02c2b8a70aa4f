// libs/appointment-cell/src/models.rs
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use uuid::Uuid;

use shared_models::PersistedEntity;
use shared_utils::{truncate_to_day, Clock};

use crate::error::AppointmentError;
use crate::services::PatientAttributeLookup;

// ==============================================================================
// REFERENCES TO EXTERNALLY OWNED RECORDS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(pub Uuid);

/// Appointment service definition (e.g. "Orthopaedic clinic").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTypeId(pub Uuid);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==============================================================================
// CLASSIFICATION
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Requested,
    WaitList,
    #[default]
    Scheduled,
    CheckedIn,
    Completed,
    Cancelled,
    Missed,
}

impl AppointmentStatus {
    /// Position in the lifecycle. Terminal statuses share the last position.
    pub fn sequence(&self) -> u8 {
        match self {
            AppointmentStatus::Requested => 0,
            AppointmentStatus::WaitList => 1,
            AppointmentStatus::Scheduled => 2,
            AppointmentStatus::CheckedIn => 3,
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::Missed => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::Missed
        )
    }

    pub fn all() -> [AppointmentStatus; 7] {
        [
            AppointmentStatus::Requested,
            AppointmentStatus::WaitList,
            AppointmentStatus::Scheduled,
            AppointmentStatus::CheckedIn,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Missed,
        ]
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Requested => write!(f, "requested"),
            AppointmentStatus::WaitList => write!(f, "wait_list"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::CheckedIn => write!(f, "checked_in"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Missed => write!(f, "missed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Scheduled,
    #[serde(alias = "walkin")]
    WalkIn,
    #[serde(alias = "telehealth")]
    Virtual,
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentKind::Scheduled => write!(f, "scheduled"),
            AppointmentKind::WalkIn => write!(f, "walk_in"),
            AppointmentKind::Virtual => write!(f, "virtual"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentPriority {
    Routine,
    Urgent,
    Emergency,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentProviderResponse {
    Accepted,
    Rejected,
    Tentative,
    Awaiting,
    Cancelled,
}

// ==============================================================================
// PROVIDER ASSIGNMENT
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentProvider {
    pub uuid: Option<Uuid>,
    pub provider: ProviderId,
    pub response: AppointmentProviderResponse,
    pub comments: Option<String>,
}

impl AppointmentProvider {
    pub fn new(provider: ProviderId, response: AppointmentProviderResponse) -> Self {
        Self {
            uuid: None,
            provider,
            response,
            comments: None,
        }
    }
}

/// Keep one entry per provider. A later entry replaces an earlier one in place.
fn dedupe_providers(providers: Vec<AppointmentProvider>) -> Vec<AppointmentProvider> {
    let mut unique: Vec<AppointmentProvider> = Vec::with_capacity(providers.len());
    for assignment in providers {
        match unique.iter_mut().find(|p| p.provider == assignment.provider) {
            Some(existing) => *existing = assignment,
            None => unique.push(assignment),
        }
    }
    unique
}

fn deserialize_providers<'de, D>(deserializer: D) -> Result<Option<Vec<AppointmentProvider>>, D::Error>
where
    D: Deserializer<'de>,
{
    let providers = Option::<Vec<AppointmentProvider>>::deserialize(deserializer)?;
    Ok(providers.map(dedupe_providers))
}

// ==============================================================================
// AUDIT TRAIL
// ==============================================================================

/// One historical status change. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentAudit {
    uuid: Uuid,
    status: AppointmentStatus,
    previous_status: Option<AppointmentStatus>,
    date_recorded: DateTime<Utc>,
    notes: Option<String>,
}

impl AppointmentAudit {
    pub fn new(
        status: AppointmentStatus,
        previous_status: Option<AppointmentStatus>,
        date_recorded: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            status,
            previous_status,
            date_recorded,
            notes,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn previous_status(&self) -> Option<AppointmentStatus> {
        self.previous_status
    }

    pub fn date_recorded(&self) -> DateTime<Utc> {
        self.date_recorded
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

// ==============================================================================
// RECURRENCE
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    Day,
    Week,
}

/// Rule shared by every occurrence of a recurring series.
///
/// A series ends either after `frequency` occurrences or on `end_date`, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentRecurringPattern {
    pub id: Option<i64>,
    pub uuid: Option<Uuid>,
    pub recurrence_type: RecurrenceType,
    /// Repeat every `period` days or weeks.
    pub period: u32,
    pub frequency: Option<u32>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
}

impl AppointmentRecurringPattern {
    pub fn daily(period: u32) -> Self {
        Self {
            id: None,
            uuid: None,
            recurrence_type: RecurrenceType::Day,
            period,
            frequency: None,
            end_date: None,
            days_of_week: Vec::new(),
        }
    }

    pub fn weekly(period: u32, days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            recurrence_type: RecurrenceType::Week,
            days_of_week: days.into_iter().collect(),
            ..Self::daily(period)
        }
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn validate(&self) -> Result<(), AppointmentError> {
        if self.period == 0 {
            return Err(AppointmentError::InvalidRecurringPattern(
                "period must be at least 1".to_string(),
            ));
        }

        match (self.frequency, self.end_date) {
            (Some(0), _) => {
                return Err(AppointmentError::InvalidRecurringPattern(
                    "frequency must be at least 1".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(AppointmentError::InvalidRecurringPattern(
                    "set either frequency or end date, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(AppointmentError::InvalidRecurringPattern(
                    "an end date or a frequency is required".to_string(),
                ))
            }
            _ => {}
        }

        if self.recurrence_type == RecurrenceType::Week && self.days_of_week.is_empty() {
            return Err(AppointmentError::InvalidRecurringPattern(
                "weekly patterns need at least one day of week".to_string(),
            ));
        }

        Ok(())
    }
}

// ==============================================================================
// CORE APPOINTMENT MODEL
// ==============================================================================

/// A scheduled clinical encounter.
///
/// Plain owned data: mutation needs `&mut self`, and nothing here is internally
/// synchronised. Callers sharing an appointment across requests must serialise
/// writers themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(flatten)]
    pub entity: PersistedEntity,
    pub appointment_number: Option<String>,
    pub patient: Option<PatientId>,
    pub service: Option<ServiceId>,
    pub service_type: Option<ServiceTypeId>,
    pub provider: Option<ProviderId>,
    pub location: Option<LocationId>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub appointment_kind: Option<AppointmentKind>,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub priority: Option<AppointmentPriority>,
    pub comments: Option<String>,
    pub tele_health_video_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_providers")]
    providers: Option<Vec<AppointmentProvider>>,
    #[serde(default)]
    appointment_audits: Vec<AppointmentAudit>,
    pub appointment_recurring_pattern: Option<Arc<AppointmentRecurringPattern>>,
    /// Uuid of the appointment this one relates to, e.g. the one it reschedules.
    pub related_appointment: Option<Uuid>,
    #[serde(default)]
    pub fulfilling_encounters: BTreeSet<EncounterId>,
}

impl Appointment {
    /// Status `Scheduled`, everything else unset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<i64> {
        self.entity.id
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.entity.uuid
    }

    pub fn assign_uuid(&mut self) -> Uuid {
        self.entity.ensure_uuid()
    }

    pub fn date_created(&self) -> Option<DateTime<Utc>> {
        self.entity.date_created
    }

    pub fn set_date_created(&mut self, date_created: DateTime<Utc>) {
        self.entity.date_created = Some(date_created);
    }

    pub fn void(&mut self, reason: &str, at: DateTime<Utc>) -> Result<(), AppointmentError> {
        self.entity.void(reason, at)?;
        Ok(())
    }

    pub fn unvoid(&mut self, at: DateTime<Utc>) -> Result<(), AppointmentError> {
        self.entity.unvoid(at)?;
        Ok(())
    }

    // --------------------------------------------------------------------------
    // Time window
    // --------------------------------------------------------------------------

    pub fn set_time_window(
        &mut self,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<(), AppointmentError> {
        if let Some(end) = end {
            if end < start {
                return Err(AppointmentError::InvalidTimeWindow { start, end });
            }
        }
        self.start_date_time = Some(start);
        self.end_date_time = end;
        Ok(())
    }

    pub fn scheduled_duration(&self) -> Option<Duration> {
        match (self.start_date_time, self.end_date_time) {
            (Some(start), Some(end)) => Some(end.signed_duration_since(start)),
            _ => None,
        }
    }

    /// Check the invariants that field setters cannot enforce on their own.
    pub fn validate(&self) -> Result<(), AppointmentError> {
        if let (Some(start), Some(end)) = (self.start_date_time, self.end_date_time) {
            if end < start {
                return Err(AppointmentError::InvalidTimeWindow { start, end });
            }
        }
        if let Some(pattern) = &self.appointment_recurring_pattern {
            pattern.validate()?;
        }
        Ok(())
    }

    /// Calendar day of the start, as midnight in `offset`.
    pub fn date_from_start_date_time(
        &self,
        offset: FixedOffset,
    ) -> Result<DateTime<FixedOffset>, AppointmentError> {
        let start = self.start_date_time.ok_or(AppointmentError::MissingStartDateTime)?;
        Ok(truncate_to_day(start.with_timezone(&offset)))
    }

    /// True when the appointment starts at or after midnight of the clock's current day.
    pub fn is_future_appointment(&self, clock: &dyn Clock) -> Result<bool, AppointmentError> {
        self.is_future_relative_to(clock.start_of_day())
    }

    pub fn is_future_relative_to(
        &self,
        start_of_day: DateTime<FixedOffset>,
    ) -> Result<bool, AppointmentError> {
        let start = self.start_date_time.ok_or(AppointmentError::MissingStartDateTime)?;
        Ok(start >= start_of_day.with_timezone(&Utc))
    }

    // --------------------------------------------------------------------------
    // Provider assignment
    // --------------------------------------------------------------------------

    /// `None` means no providers were ever assigned.
    pub fn providers(&self) -> Option<&[AppointmentProvider]> {
        self.providers.as_deref()
    }

    pub fn set_providers(&mut self, providers: Option<Vec<AppointmentProvider>>) {
        self.providers = providers.map(dedupe_providers);
    }

    /// Insert the assignment, replacing any existing one for the same provider.
    pub fn add_provider(&mut self, assignment: AppointmentProvider) {
        let providers = self.providers.get_or_insert_with(Vec::new);
        match providers.iter_mut().find(|p| p.provider == assignment.provider) {
            Some(existing) => *existing = assignment,
            None => providers.push(assignment),
        }
    }

    pub fn remove_provider(&mut self, provider: &ProviderId) -> Option<AppointmentProvider> {
        let providers = self.providers.as_mut()?;
        let index = providers.iter().position(|p| &p.provider == provider)?;
        Some(providers.remove(index))
    }

    pub fn update_provider_response(
        &mut self,
        provider: &ProviderId,
        response: AppointmentProviderResponse,
    ) -> Result<(), AppointmentError> {
        let assignment = self
            .providers
            .as_mut()
            .and_then(|providers| providers.iter_mut().find(|p| &p.provider == provider))
            .ok_or(AppointmentError::ProviderNotAssigned(*provider))?;

        debug!("Provider {} response {:?} -> {:?}", provider, assignment.response, response);
        assignment.response = response;
        Ok(())
    }

    /// Assigned providers whose response equals `response`. Empty when none are assigned.
    pub fn providers_with_response(
        &self,
        response: AppointmentProviderResponse,
    ) -> Vec<&AppointmentProvider> {
        self.providers
            .iter()
            .flatten()
            .filter(|p| p.response == response)
            .collect()
    }

    // --------------------------------------------------------------------------
    // Audit trail
    // --------------------------------------------------------------------------

    pub fn appointment_audits(&self) -> &[AppointmentAudit] {
        &self.appointment_audits
    }

    pub fn record_audit(&mut self, audit: AppointmentAudit) {
        self.appointment_audits.push(audit);
    }

    pub fn latest_audit(&self) -> Option<&AppointmentAudit> {
        self.appointment_audits.iter().max_by_key(|a| a.date_recorded)
    }

    // --------------------------------------------------------------------------
    // Recurrence, relation and identity
    // --------------------------------------------------------------------------

    pub fn is_recurring(&self) -> bool {
        self.appointment_recurring_pattern.is_some()
    }

    /// Same booking details in another slot of a series: fresh uuid, no history.
    /// Provider assignments become new records awaiting a response.
    pub(crate) fn occurrence_at(
        &self,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        pattern: Arc<AppointmentRecurringPattern>,
    ) -> Appointment {
        Appointment {
            entity: PersistedEntity::with_uuid(Uuid::new_v4()),
            appointment_number: None,
            providers: self.providers.as_ref().map(|providers| {
                providers
                    .iter()
                    .map(|p| AppointmentProvider {
                        uuid: None,
                        response: AppointmentProviderResponse::Awaiting,
                        ..p.clone()
                    })
                    .collect()
            }),
            start_date_time: Some(start),
            end_date_time: end,
            status: AppointmentStatus::Scheduled,
            appointment_audits: Vec::new(),
            appointment_recurring_pattern: Some(pattern),
            related_appointment: None,
            fulfilling_encounters: BTreeSet::new(),
            ..self.clone()
        }
    }

    pub fn link_related_appointment(&mut self, related: &Appointment) -> Result<(), AppointmentError> {
        let uuid = related.uuid().ok_or(AppointmentError::MissingIdentifier)?;
        self.related_appointment = Some(uuid);
        Ok(())
    }

    /// Same stable uuid on both sides. An appointment without a uuid matches nothing.
    pub fn is_same_appointment(&self, other: &Appointment) -> bool {
        match (self.uuid(), other.uuid()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }

    /// False without a patient; otherwise whether the patient carries the attribute.
    pub fn has_patient_attribute(&self, name: &str, lookup: &dyn PatientAttributeLookup) -> bool {
        match &self.patient {
            Some(patient) => lookup.attribute(patient, name).is_some(),
            None => false,
        }
    }
}

// ==============================================================================
// NOTIFICATION RESULTS AND RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Success,
    Failed,
}

/// Outcome of one notification channel. Never stored with the appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationResult {
    pub uuid: Option<Uuid>,
    pub medium: String,
    pub status: NotificationStatus,
    pub message: String,
}

impl NotificationResult {
    pub fn success(medium: &str, message: &str) -> Self {
        Self {
            uuid: None,
            medium: medium.to_string(),
            status: NotificationStatus::Success,
            message: message.to_string(),
        }
    }

    pub fn failed(medium: &str, message: &str) -> Self {
        Self {
            status: NotificationStatus::Failed,
            ..Self::success(medium, message)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == NotificationStatus::Success
    }
}

/// Outward representation: the appointment plus any notification outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_results: Vec<NotificationResult>,
}

impl AppointmentResponse {
    pub fn new(appointment: Appointment) -> Self {
        Self {
            appointment,
            notification_results: Vec::new(),
        }
    }

    pub fn with_notification_results(mut self, results: Vec<NotificationResult>) -> Self {
        self.notification_results = results;
        self
    }

    pub fn failed_notifications(&self) -> impl Iterator<Item = &NotificationResult> {
        self.notification_results.iter().filter(|r| !r.is_success())
    }
}
