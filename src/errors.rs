use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::LoanId;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("invalid repayment amount: {amount}, remaining balance {remaining}")]
    InvalidAmount { amount: Money, remaining: Money },

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("concurrent update detected on loan {loan_id}")]
    ConflictOnUpdate { loan_id: LoanId },

    #[error("receipt rendering failed: {message}")]
    Receipt { message: String },
}

impl LedgerError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        LedgerError::NotFound { entity, id }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
