use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a repayment record
pub type RepaymentId = Uuid;

/// unique identifier for a customer
pub type CustomerId = Uuid;

/// identifier of the shop owner every record is scoped to
pub type OwnerId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// open and not yet past due + grace
    Pending,
    /// fully repaid or explicitly closed
    Paid,
    /// balance outstanding past due date + grace period
    Overdue,
}

impl LoanStatus {
    /// paid is terminal; pending and overdue can still move
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Paid)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Paid => "paid",
            LoanStatus::Overdue => "overdue",
        };
        write!(f, "{label}")
    }
}

/// repayment cadence agreed at issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentFrequency {
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl RepaymentFrequency {
    /// parse a user-supplied label; unknown labels return None so callers
    /// can fall back to the default 30-day term instead of erroring
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "bi-weekly" => Some(RepaymentFrequency::BiWeekly),
            "monthly" => Some(RepaymentFrequency::Monthly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepaymentFrequency::BiWeekly => "bi-weekly",
            RepaymentFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RepaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// scope for listing repayment history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaymentScope {
    /// all repayments against one loan
    Loan(LoanId),
    /// all repayments by one customer across loans
    Customer(CustomerId),
}

/// filter for loan listings
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanFilter {
    pub status: Option<LoanStatus>,
    /// include loans whose active flag has been cleared (paid / closed)
    pub include_closed: bool,
}

impl LoanFilter {
    /// only currently-overdue active loans
    pub fn overdue() -> Self {
        Self {
            status: Some(LoanStatus::Overdue),
            include_closed: false,
        }
    }

    /// every loan that reached paid, active flag ignored
    pub fn repaid() -> Self {
        Self {
            status: Some(LoanStatus::Paid),
            include_closed: true,
        }
    }
}

/// the slice of the authenticated user the ledger consumes: identity for
/// scoping plus the shop name printed on receipts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopProfile {
    pub owner_id: OwnerId,
    pub shop_name: String,
}

impl ShopProfile {
    pub fn new(owner_id: OwnerId, shop_name: impl Into<String>) -> Self {
        Self {
            owner_id,
            shop_name: shop_name.into(),
        }
    }
}
