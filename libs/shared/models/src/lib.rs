pub mod entity;
pub mod error;

pub use entity::PersistedEntity;
pub use error::ModelError;
