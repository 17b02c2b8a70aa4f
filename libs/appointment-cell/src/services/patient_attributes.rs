// libs/appointment-cell/src/services/patient_attributes.rs
use std::collections::HashMap;

use crate::models::PatientId;

/// Read access to attributes owned by the patient record.
pub trait PatientAttributeLookup: Send + Sync {
    /// The attribute's value, or `None` when the patient has no such attribute.
    fn attribute(&self, patient: &PatientId, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPatientAttributes {
    attributes: HashMap<PatientId, HashMap<String, String>>,
}

impl InMemoryPatientAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, patient: PatientId, name: &str, value: &str) {
        self.attributes
            .entry(patient)
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, patient: &PatientId, name: &str) -> Option<String> {
        self.attributes.get_mut(patient)?.remove(name)
    }
}

impl PatientAttributeLookup for InMemoryPatientAttributes {
    fn attribute(&self, patient: &PatientId, name: &str) -> Option<String> {
        self.attributes.get(patient)?.get(name).cloned()
    }
}
