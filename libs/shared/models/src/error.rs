use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("A reason is required to void a record")]
    VoidReasonRequired,

    #[error("Record is already voided")]
    AlreadyVoided,

    #[error("Record is not voided")]
    NotVoided,
}
