use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loan::Loan;
use crate::types::LoanStatus;

/// derived, read-only totals over one owner's book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    /// principal issued across active loans
    pub total_loaned: Money,
    /// collected so far across active loans (loaned minus remaining)
    pub total_collected: Money,
    /// outstanding across active loans
    pub total_remaining: Money,
    /// outstanding across currently-overdue active loans
    pub overdue_amount: Money,
    /// mean days from issuance to settlement over repaid loans, rounded
    /// to 2 places; zero when nothing has been repaid yet
    pub avg_repayment_days: Decimal,
    pub active_loans: usize,
    pub repaid_loans: usize,
}

const SECONDS_PER_DAY: i64 = 86_400;

/// aggregate an owner's refreshed loan sets
///
/// `active` are the currently-active loans, `repaid` every loan that
/// reached paid (including write-offs). Statuses are taken as given:
/// callers refresh against the clock before aggregating.
pub fn summarize(active: &[Loan], repaid: &[Loan]) -> BookSummary {
    let mut total_loaned = Money::ZERO;
    let mut total_remaining = Money::ZERO;
    let mut overdue_amount = Money::ZERO;

    for loan in active {
        total_loaned += loan.amount;
        total_remaining += loan.remaining_amount;
        if loan.status == LoanStatus::Overdue {
            overdue_amount += loan.remaining_amount;
        }
    }

    let avg_repayment_days = if repaid.is_empty() {
        Decimal::ZERO
    } else {
        let total_days: Decimal = repaid
            .iter()
            .map(|loan| {
                let held = (loan.updated_at - loan.created_at).num_seconds();
                Decimal::from(held) / Decimal::from(SECONDS_PER_DAY)
            })
            .sum();
        (total_days / Decimal::from(repaid.len() as u64)).round_dp(2)
    };

    BookSummary {
        total_loaned,
        total_collected: total_loaned - total_remaining,
        total_remaining,
        overdue_amount,
        avg_repayment_days,
        active_loans: active.len(),
        repaid_loans: repaid.len(),
    }
}
