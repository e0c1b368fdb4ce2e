use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::lifecycle;
use crate::types::{CustomerId, LoanId, LoanStatus, OwnerId, RepaymentFrequency};

/// loan state
///
/// Invariants, maintained by every mutation on this type:
/// `ZERO <= remaining_amount <= amount`; `status == Paid` exactly when the
/// balance is cleared or the loan was explicitly closed; `is_active` is
/// false exactly when the status is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    // identification and scoping
    pub id: LoanId,
    pub owner_id: OwnerId,
    pub customer_id: CustomerId,
    pub description: String,

    // balances
    pub amount: Money,
    pub remaining_amount: Money,

    // terms
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub frequency: RepaymentFrequency,
    pub interest_rate: Rate,
    pub grace_days: u32,

    // status
    pub status: LoanStatus,
    pub is_active: bool,

    // concurrency token, bumped on every mutation
    pub version: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// input for issuing a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer_id: CustomerId,
    pub description: String,
    pub amount: Money,
    /// derived from the frequency when not supplied
    pub due_date: Option<DateTime<Utc>>,
    pub frequency: RepaymentFrequency,
    pub interest_rate: Rate,
    pub grace_days: u32,
}

impl NewLoan {
    fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(LedgerError::validation("loan description is required"));
        }
        if self.amount.is_negative() {
            return Err(LedgerError::validation(format!(
                "loan amount must not be negative: {}",
                self.amount
            )));
        }
        let pct = self.interest_rate.as_percentage();
        if pct < rust_decimal::Decimal::ZERO || pct > rust_decimal::Decimal::from(100) {
            return Err(LedgerError::validation(format!(
                "interest rate out of range: {}",
                self.interest_rate
            )));
        }
        Ok(())
    }
}

/// manual edit of a loan's terms
///
/// Balances move only through repayments; the principal may be corrected
/// here as long as it does not undercut the outstanding balance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanUpdate {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub due_date: Option<DateTime<Utc>>,
    pub grace_days: Option<u32>,
    pub interest_rate: Option<Rate>,
}

impl Loan {
    /// issue a new loan
    ///
    /// The full amount starts outstanding. The initial status comes from
    /// the lifecycle engine, so a loan issued with a back-dated due date
    /// already past due + grace starts out overdue.
    pub fn issue(owner_id: OwnerId, new: NewLoan, now: DateTime<Utc>) -> Result<Self> {
        new.validate()?;

        let due_date = new
            .due_date
            .unwrap_or_else(|| lifecycle::due_date_after(Some(new.frequency), now));
        let status = lifecycle::status_at(due_date, new.grace_days, new.amount, now);

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            customer_id: new.customer_id,
            description: new.description,
            amount: new.amount,
            remaining_amount: new.amount,
            issue_date: now,
            due_date,
            frequency: new.frequency,
            interest_rate: new.interest_rate,
            grace_days: new.grace_days,
            status,
            is_active: !status.is_terminal(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// apply a repayment against the outstanding balance
    ///
    /// Over-payment is rejected, never clamped or carried as credit.
    /// Returns true when this repayment settled the loan.
    pub(crate) fn apply_repayment(&mut self, amount: Money, now: DateTime<Utc>) -> Result<bool> {
        if !amount.is_positive() || amount > self.remaining_amount {
            return Err(LedgerError::InvalidAmount {
                amount,
                remaining: self.remaining_amount,
            });
        }

        self.remaining_amount -= amount;
        self.status = lifecycle::status_at(self.due_date, self.grace_days, self.remaining_amount, now);
        if self.status.is_terminal() {
            self.is_active = false;
        }
        self.touch(now);
        Ok(self.status.is_terminal())
    }

    /// forced terminal transition: mark paid and inactive regardless of
    /// the remaining balance (write-off). Returns the written-off amount.
    pub(crate) fn close(&mut self, now: DateTime<Utc>) -> Money {
        let written_off = self.remaining_amount;
        self.status = LoanStatus::Paid;
        self.is_active = false;
        self.touch(now);
        written_off
    }

    /// re-derive the status against the current time
    ///
    /// Terminal loans never move. Returns the (old, new) pair when the
    /// status actually changed, so callers persist only real transitions.
    pub(crate) fn refresh_status(
        &mut self,
        now: DateTime<Utc>,
    ) -> Option<(LoanStatus, LoanStatus)> {
        if self.status.is_terminal() {
            return None;
        }
        let next = lifecycle::status_at(self.due_date, self.grace_days, self.remaining_amount, now);
        if next == self.status {
            return None;
        }
        let old = self.status;
        self.status = next;
        if next.is_terminal() {
            self.is_active = false;
        }
        self.touch(now);
        Some((old, next))
    }

    /// apply a manual edit, recomputing status when date or grace fields move
    pub(crate) fn apply_update(&mut self, update: LoanUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(description) = update.description {
            if description.trim().is_empty() {
                return Err(LedgerError::validation("loan description is required"));
            }
            self.description = description;
        }
        if let Some(amount) = update.amount {
            if amount < self.remaining_amount {
                return Err(LedgerError::validation(format!(
                    "principal {} would undercut outstanding balance {}",
                    amount, self.remaining_amount
                )));
            }
            self.amount = amount;
        }
        if let Some(rate) = update.interest_rate {
            let pct = rate.as_percentage();
            if pct < rust_decimal::Decimal::ZERO || pct > rust_decimal::Decimal::from(100) {
                return Err(LedgerError::validation(format!(
                    "interest rate out of range: {rate}"
                )));
            }
            self.interest_rate = rate;
        }

        let mut dates_changed = false;
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
            dates_changed = true;
        }
        if let Some(grace_days) = update.grace_days {
            self.grace_days = grace_days;
            dates_changed = true;
        }
        if dates_changed {
            self.refresh_status(now);
        }

        self.touch(now);
        Ok(())
    }

    /// amount collected so far
    pub fn collected(&self) -> Money {
        self.amount - self.remaining_amount
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}
