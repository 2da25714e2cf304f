//! Error kinds for the group metadata index.
//!
//! One `thiserror` enum covering every subsystem boundary, propagated with
//! `?` rather than panics.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("missing map key: {0}")]
    MissingMapKey(String),

    #[error("operation not valid for this group type: {0}")]
    GroupInvalidType(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
