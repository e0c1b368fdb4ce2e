use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CustomerId, LoanId, LoanStatus, RepaymentId};

/// all events that can be emitted by the loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanIssued {
        loan_id: LoanId,
        customer_id: CustomerId,
        amount: Money,
        due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    LoanSettled {
        loan_id: LoanId,
        final_payment: Money,
        timestamp: DateTime<Utc>,
    },
    LoanClosed {
        loan_id: LoanId,
        written_off: Money,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },

    // ledger events
    RepaymentRecorded {
        repayment_id: RepaymentId,
        loan_id: LoanId,
        amount: Money,
        remaining_balance: Money,
        payment_date: DateTime<Utc>,
    },

    // receipt generation is best-effort; a failure is reported here and
    // never rolls back the committed repayment
    ReceiptFailed {
        repayment_id: RepaymentId,
        message: String,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
