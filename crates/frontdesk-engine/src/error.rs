//! Error types for frontdesk-engine operations.
//!
//! Booking rejections live in [`crate::conflict::Rejection`]; they are ordinary
//! outcomes of a check, not failures. `EngineError` covers everything else
//! (malformed input, bad configuration, store failures) and wraps a rejection
//! only when a booking attempt is refused.

use thiserror::Error;

use crate::conflict::Rejection;
use crate::model::AppointmentId;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No appointment with id {0}")]
    UnknownAppointment(AppointmentId),

    #[error("No appointment ids left to assign")]
    IdsExhausted,

    #[error("Appointment store lock was poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Rejected(#[from] Rejection),
}

pub type Result<T> = std::result::Result<T, EngineError>;
