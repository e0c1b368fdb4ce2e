//! Pure status and due-date derivation.
//!
//! Nothing here touches a clock or a store: callers pass the current time
//! explicitly, which keeps every transition auditable and testable in
//! isolation. The ledger re-runs these functions at its defined mutation
//! points; there is no background sweep, so overdue detection happens
//! lazily when a loan is next evaluated.

use chrono::{DateTime, Duration, Months, Utc};

use crate::decimal::Money;
use crate::types::{LoanStatus, RepaymentFrequency};

/// default term in days when the issuer supplied no recognized frequency
const FALLBACK_TERM_DAYS: i64 = 30;

/// derive a due date from the repayment cadence
///
/// `BiWeekly` is issue date + 14 days. `Monthly` advances one calendar
/// month with end-of-month clamping (Jan 31 -> Feb 28, or Feb 29 in a
/// leap year). `None`, i.e. an unrecognized frequency label, falls back
/// to issue date + 30 days rather than erroring.
pub fn due_date_after(
    frequency: Option<RepaymentFrequency>,
    issue_date: DateTime<Utc>,
) -> DateTime<Utc> {
    match frequency {
        Some(RepaymentFrequency::BiWeekly) => issue_date + Duration::days(14),
        Some(RepaymentFrequency::Monthly) => issue_date
            .checked_add_months(Months::new(1))
            .unwrap_or_else(|| issue_date + Duration::days(FALLBACK_TERM_DAYS)),
        None => issue_date + Duration::days(FALLBACK_TERM_DAYS),
    }
}

/// derive a loan's status from its dates and outstanding balance
///
/// A cleared balance wins over everything, independent of dates. Otherwise
/// the loan is overdue strictly after due date + grace days: at exactly
/// `due_date + grace` it is still pending.
pub fn status_at(
    due_date: DateTime<Utc>,
    grace_days: u32,
    remaining_amount: Money,
    now: DateTime<Utc>,
) -> LoanStatus {
    if remaining_amount <= Money::ZERO {
        return LoanStatus::Paid;
    }
    if now > due_date + Duration::days(i64::from(grace_days)) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_bi_weekly_due_date() {
        let issued = at(2024, 3, 1);
        assert_eq!(
            due_date_after(Some(RepaymentFrequency::BiWeekly), issued),
            at(2024, 3, 15)
        );
    }

    #[test]
    fn test_monthly_due_date() {
        let issued = at(2024, 1, 1);
        assert_eq!(
            due_date_after(Some(RepaymentFrequency::Monthly), issued),
            at(2024, 2, 1)
        );
    }

    #[test]
    fn test_monthly_clamps_at_month_end() {
        // leap year: Jan 31 -> Feb 29
        assert_eq!(
            due_date_after(Some(RepaymentFrequency::Monthly), at(2024, 1, 31)),
            at(2024, 2, 29)
        );
        // non-leap year: Jan 31 -> Feb 28
        assert_eq!(
            due_date_after(Some(RepaymentFrequency::Monthly), at(2023, 1, 31)),
            at(2023, 2, 28)
        );
        // Mar 31 -> Apr 30
        assert_eq!(
            due_date_after(Some(RepaymentFrequency::Monthly), at(2024, 3, 31)),
            at(2024, 4, 30)
        );
    }

    #[test]
    fn test_unknown_frequency_falls_back() {
        let issued = at(2024, 6, 1);
        assert_eq!(due_date_after(None, issued), at(2024, 7, 1));
        // the fallback is reached through label parsing, not an error
        assert_eq!(
            due_date_after(RepaymentFrequency::from_label("weekly"), issued),
            at(2024, 7, 1)
        );
    }

    #[test]
    fn test_status_on_due_date_is_pending() {
        let due = at(2024, 2, 1);
        let remaining = Money::from_major(10);
        assert_eq!(status_at(due, 0, remaining, due), LoanStatus::Pending);
    }

    #[test]
    fn test_status_day_after_due_is_overdue() {
        let due = at(2024, 2, 1);
        let remaining = Money::from_major(10);
        assert_eq!(
            status_at(due, 0, remaining, due + Duration::days(1)),
            LoanStatus::Overdue
        );
    }

    #[test]
    fn test_grace_period_holds_pending() {
        let due = at(2024, 2, 1);
        let remaining = Money::from_major(10);
        // end of grace: still pending
        assert_eq!(
            status_at(due, 5, remaining, due + Duration::days(5)),
            LoanStatus::Pending
        );
        // strictly past grace: overdue
        assert_eq!(
            status_at(due, 5, remaining, due + Duration::days(6)),
            LoanStatus::Overdue
        );
    }

    #[test]
    fn test_paid_wins_over_dates() {
        let due = at(2024, 2, 1);
        // far past due + grace but nothing outstanding
        assert_eq!(
            status_at(due, 0, Money::ZERO, due + Duration::days(365)),
            LoanStatus::Paid
        );
    }
}
