// libs/appointment-cell/tests/provider_response_test.rs
use std::collections::HashSet;

use assert_matches::assert_matches;
use uuid::Uuid;

use appointment_cell::*;

mod common;
use common::{assignment, booked_appointment, utc};

fn provider_ids<'a>(providers: impl IntoIterator<Item = &'a AppointmentProvider>) -> HashSet<ProviderId> {
    providers.into_iter().map(|p| p.provider).collect()
}

#[test]
fn test_providers_with_response_on_unassigned_appointment() {
    let appointment = Appointment::new();

    for response in [
        AppointmentProviderResponse::Accepted,
        AppointmentProviderResponse::Rejected,
        AppointmentProviderResponse::Awaiting,
    ] {
        assert!(
            appointment.providers_with_response(response).is_empty(),
            "No providers should match {:?}",
            response
        );
    }
}

#[test]
fn test_providers_with_response_on_empty_set() {
    let mut appointment = Appointment::new();
    appointment.set_providers(Some(Vec::new()));

    assert_eq!(appointment.providers().map(|p| p.len()), Some(0));
    assert!(appointment
        .providers_with_response(AppointmentProviderResponse::Accepted)
        .is_empty());
}

#[test]
fn test_providers_with_response_returns_exact_subset() {
    let accepted_a = assignment(AppointmentProviderResponse::Accepted);
    let accepted_b = assignment(AppointmentProviderResponse::Accepted);
    let rejected = assignment(AppointmentProviderResponse::Rejected);
    let awaiting = assignment(AppointmentProviderResponse::Awaiting);
    let tentative = assignment(AppointmentProviderResponse::Tentative);

    let mut appointment = booked_appointment(utc(2024, 7, 1, 10, 0), 30);
    appointment.set_providers(Some(vec![
        accepted_a.clone(),
        rejected.clone(),
        awaiting.clone(),
        accepted_b.clone(),
        tentative.clone(),
    ]));

    let accepted = appointment.providers_with_response(AppointmentProviderResponse::Accepted);
    assert_eq!(
        provider_ids(accepted),
        provider_ids([&accepted_a, &accepted_b]),
        "Only accepted providers should be returned"
    );

    let rejected_only = appointment.providers_with_response(AppointmentProviderResponse::Rejected);
    assert_eq!(provider_ids(rejected_only), provider_ids([&rejected]));

    assert!(appointment
        .providers_with_response(AppointmentProviderResponse::Cancelled)
        .is_empty());

    // Filtering is read-only.
    assert_eq!(appointment.providers().map(|p| p.len()), Some(5));
}

#[test]
fn test_set_providers_keeps_one_entry_per_provider() {
    let provider = ProviderId(Uuid::new_v4());
    let mut appointment = Appointment::new();

    appointment.set_providers(Some(vec![
        AppointmentProvider::new(provider, AppointmentProviderResponse::Awaiting),
        assignment(AppointmentProviderResponse::Accepted),
        AppointmentProvider::new(provider, AppointmentProviderResponse::Rejected),
    ]));

    let providers = appointment.providers().expect("Providers were set");
    assert_eq!(providers.len(), 2);
    let entry = providers
        .iter()
        .find(|p| p.provider == provider)
        .expect("Provider should be present");
    assert_eq!(entry.response, AppointmentProviderResponse::Rejected, "Last entry wins");

    appointment.set_providers(None);
    assert!(appointment.providers().is_none());
}

#[test]
fn test_add_provider_upserts() {
    let provider = ProviderId(Uuid::new_v4());
    let mut appointment = Appointment::new();

    appointment.add_provider(AppointmentProvider::new(provider, AppointmentProviderResponse::Awaiting));
    appointment.add_provider(AppointmentProvider::new(provider, AppointmentProviderResponse::Tentative));

    let providers = appointment.providers().expect("Adding creates the collection");
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].response, AppointmentProviderResponse::Tentative);
}

#[test]
fn test_update_provider_response() {
    let awaiting = assignment(AppointmentProviderResponse::Awaiting);
    let mut appointment = Appointment::new();
    appointment.add_provider(awaiting.clone());

    appointment
        .update_provider_response(&awaiting.provider, AppointmentProviderResponse::Accepted)
        .expect("Provider is assigned");

    assert!(appointment
        .providers_with_response(AppointmentProviderResponse::Awaiting)
        .is_empty());
    assert_eq!(
        appointment
            .providers_with_response(AppointmentProviderResponse::Accepted)
            .len(),
        1
    );
}

#[test]
fn test_update_response_for_unassigned_provider() {
    let stranger = ProviderId(Uuid::new_v4());

    let mut unassigned = Appointment::new();
    assert_matches!(
        unassigned.update_provider_response(&stranger, AppointmentProviderResponse::Accepted),
        Err(AppointmentError::ProviderNotAssigned(id)) if id == stranger
    );

    let mut appointment = Appointment::new();
    appointment.add_provider(assignment(AppointmentProviderResponse::Awaiting));
    assert_matches!(
        appointment.update_provider_response(&stranger, AppointmentProviderResponse::Accepted),
        Err(AppointmentError::ProviderNotAssigned(_))
    );
}

#[test]
fn test_remove_provider() {
    let keep = assignment(AppointmentProviderResponse::Accepted);
    let dropped = assignment(AppointmentProviderResponse::Rejected);
    let mut appointment = Appointment::new();
    appointment.set_providers(Some(vec![keep.clone(), dropped.clone()]));

    let removed = appointment.remove_provider(&dropped.provider);
    assert_eq!(removed, Some(dropped.clone()));
    assert_eq!(appointment.remove_provider(&dropped.provider), None);
    assert_eq!(provider_ids(appointment.providers().unwrap_or_default()), provider_ids([&keep]));

    let mut unassigned = Appointment::new();
    assert_eq!(unassigned.remove_provider(&keep.provider), None);
}

#[test]
fn test_deserialized_providers_are_deduplicated() {
    let provider = Uuid::new_v4();
    let json = format!(
        r#"{{
            "uuid": "{uuid}",
            "providers": [
                {{"uuid": null, "provider": "{provider}", "response": "awaiting", "comments": null}},
                {{"uuid": null, "provider": "{provider}", "response": "accepted", "comments": "confirmed"}}
            ]
        }}"#,
        uuid = Uuid::new_v4(),
        provider = provider,
    );

    let appointment: Appointment = serde_json::from_str(&json).expect("Appointment JSON should parse");

    let providers = appointment.providers().expect("Providers were present");
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].response, AppointmentProviderResponse::Accepted);
    assert_eq!(providers[0].comments.as_deref(), Some("confirmed"));
    assert_eq!(appointment.status, AppointmentStatus::Scheduled, "Missing status defaults to Scheduled");
}
