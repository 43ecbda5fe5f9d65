//! Logistics Error Types

use thiserror::Error;

use super::types::TransferId;

/// Errors raised by the registry, the transfer state machine and the codec.
///
/// A partial resource exchange is not an error: the exchanger reports it
/// through its return value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogisticsError {
    // === Registry Errors ===
    #[error("Duplicate transfer: {0}")]
    DuplicateTransfer(TransferId),

    #[error("Transfer is not pending: {0}")]
    NotPending(TransferId),

    #[error("Transfer is not expired: {0}")]
    NotExpired(TransferId),

    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    // === State Machine Errors ===
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient transport credits: required {required:.2}, available {available:.2}")]
    InsufficientTransportCredits { required: f64, available: f64 },

    // === Persistence Errors ===
    #[error("Malformed transfer record: {0}")]
    MalformedRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl LogisticsError {
    /// Stable error code for logs and host-side reporting
    pub fn code(&self) -> &'static str {
        match self {
            LogisticsError::DuplicateTransfer(_) => "DUPLICATE_TRANSFER",
            LogisticsError::NotPending(_) => "NOT_PENDING",
            LogisticsError::NotExpired(_) => "NOT_EXPIRED",
            LogisticsError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            LogisticsError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            LogisticsError::InsufficientTransportCredits { .. } => {
                "INSUFFICIENT_TRANSPORT_CREDITS"
            }
            LogisticsError::MalformedRecord(_) => "MALFORMED_RECORD",
            LogisticsError::Serialization(_) => "SERIALIZATION_ERROR",
            LogisticsError::Io(_) => "IO_ERROR",
        }
    }

    /// Lookup misses that `abort_transfer` and `resume_transfer` treat as a no-op
    pub fn is_registry_miss(&self) -> bool {
        matches!(
            self,
            LogisticsError::NotPending(_)
                | LogisticsError::NotExpired(_)
                | LogisticsError::TransferNotFound(_)
        )
    }
}

impl From<std::io::Error> for LogisticsError {
    fn from(e: std::io::Error) -> Self {
        LogisticsError::Io(e.to_string())
    }
}
