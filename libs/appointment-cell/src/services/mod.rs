pub mod lifecycle;
pub mod patient_attributes;
pub mod recurrence;

pub use lifecycle::AppointmentLifecycleService;
pub use patient_attributes::{InMemoryPatientAttributes, PatientAttributeLookup};
pub use recurrence::RecurringAppointmentService;
