#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::*;

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// A booked appointment with identity, patient and a time window.
pub fn booked_appointment(start: DateTime<Utc>, minutes: i64) -> Appointment {
    let mut appointment = Appointment::new();
    appointment.assign_uuid();
    appointment.appointment_number = Some("APT-0001".to_string());
    appointment.patient = Some(PatientId(Uuid::new_v4()));
    appointment.provider = Some(ProviderId(Uuid::new_v4()));
    appointment.location = Some(LocationId(Uuid::new_v4()));
    appointment.service = Some(ServiceId(Uuid::new_v4()));
    appointment.appointment_kind = Some(AppointmentKind::Scheduled);
    appointment
        .set_time_window(start, Some(start + Duration::minutes(minutes)))
        .expect("Test appointment window should be valid");
    appointment
}

pub fn assignment(response: AppointmentProviderResponse) -> AppointmentProvider {
    AppointmentProvider::new(ProviderId(Uuid::new_v4()), response)
}
