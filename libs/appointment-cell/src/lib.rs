pub mod error;
pub mod models;
pub mod services;

pub use error::AppointmentError;
pub use models::*;
pub use services::*;
