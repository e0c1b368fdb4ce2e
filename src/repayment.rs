use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::loan::Loan;
use crate::types::{CustomerId, LoanId, OwnerId, RepaymentId};

/// an immutable repayment record
///
/// Repayments are append-only: once written they are never edited or
/// deleted. The customer id is denormalized from the loan at record time
/// so per-customer history stays a single lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repayment {
    pub id: RepaymentId,
    pub owner_id: OwnerId,
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// input for recording a repayment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRepayment {
    pub loan_id: LoanId,
    pub amount: Money,
    /// defaults to the current time when not supplied
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl NewRepayment {
    pub fn new(loan_id: LoanId, amount: Money) -> Self {
        Self {
            loan_id,
            amount,
            payment_date: None,
            notes: None,
        }
    }

    pub fn on(mut self, payment_date: DateTime<Utc>) -> Self {
        self.payment_date = Some(payment_date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Repayment {
    pub(crate) fn record(
        loan: &Loan,
        amount: Money,
        payment_date: DateTime<Utc>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: loan.owner_id,
            loan_id: loan.id,
            customer_id: loan.customer_id,
            amount,
            payment_date,
            notes,
            created_at: now,
        }
    }
}
