//! Domain error types.

use thiserror::Error;

use crate::session::SessionStage;

/// Validation failures for customer-supplied input.
///
/// These are recovered locally: the customer is re-prompted and the
/// session stage does not advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name must contain at least two alphabetic characters.
    #[error("name must contain at least {min} letters")]
    NameTooShort { min: usize },

    /// Phone number must contain at least seven digits.
    #[error("phone number must contain at least {min} digits")]
    PhoneTooShort { min: usize },

    /// Input was empty after trimming.
    #[error("input is empty")]
    EmptyInput,
}

/// Errors raised by the session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The operation is not valid for the session's current stage.
    #[error("operation not valid in stage {stage}")]
    WrongStage { stage: SessionStage },

    /// Finalization requested before the delivery stages.
    #[error("session in stage {stage} cannot be finalized")]
    NotFinalizable { stage: SessionStage },

    /// Inventory bookkeeping would be double-applied.
    #[error("inventory already reserved for this session")]
    AlreadyReserved,
}
