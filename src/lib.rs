pub mod customer;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod loan;
pub mod receipt;
pub mod repayment;
pub mod store;
pub mod summary;
pub mod types;

// re-export key types
pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{LoanBook, RepaymentOutcome};
pub use lifecycle::{due_date_after, status_at};
pub use loan::{Loan, LoanUpdate, NewLoan};
pub use receipt::{download_path, ReceiptData, ReceiptRenderer, TextReceiptRenderer};
pub use repayment::{NewRepayment, Repayment};
pub use store::{CustomerStore, LoanStore, MemoryStore, RepaymentStore, Store};
pub use summary::BookSummary;
pub use types::{
    CustomerId, LoanFilter, LoanId, LoanStatus, OwnerId, RepaymentFrequency, RepaymentId,
    RepaymentScope, ShopProfile,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
