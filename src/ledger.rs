use hourglass_rs::SafeTimeProvider;

use crate::customer::{Customer, CustomerUpdate, NewCustomer};
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::{Loan, LoanUpdate, NewLoan};
use crate::receipt::{ReceiptData, ReceiptRenderer};
use crate::repayment::{NewRepayment, Repayment};
use crate::store::Store;
use crate::summary::{self, BookSummary};
use crate::types::{
    CustomerId, LoanFilter, LoanId, OwnerId, RepaymentId, RepaymentScope, ShopProfile,
};

/// result of recording a repayment: the authoritative numbers the caller
/// needs for receipt generation
#[derive(Debug, Clone, PartialEq)]
pub struct RepaymentOutcome {
    pub repayment: Repayment,
    pub loan: Loan,
}

/// the shop's loan book
///
/// One logical operation per call; every operation is scoped to the
/// acting owner. Status recomputation runs at the defined mutation
/// points and on the explicit refresh pass, never in the background.
pub struct LoanBook<S: Store> {
    store: S,
    pub events: EventStore,
}

impl<S: Store> LoanBook<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------
    // customers
    // ------------------------------------------------------------------

    /// register a customer
    pub fn add_customer(
        &mut self,
        owner: OwnerId,
        new: NewCustomer,
        time: &SafeTimeProvider,
    ) -> Result<Customer> {
        let customer = Customer::register(owner, new, time.now())?;
        self.store.insert_customer(customer.clone())?;
        Ok(customer)
    }

    /// fetch one customer
    pub fn customer(&self, owner: OwnerId, id: CustomerId) -> Result<Customer> {
        self.store
            .customer(owner, id)?
            .ok_or_else(|| LedgerError::not_found("customer", id))
    }

    /// all customers, newest first
    pub fn customers(&self, owner: OwnerId) -> Result<Vec<Customer>> {
        self.store.customers(owner)
    }

    /// edit a customer record
    pub fn update_customer(
        &mut self,
        owner: OwnerId,
        id: CustomerId,
        update: CustomerUpdate,
        time: &SafeTimeProvider,
    ) -> Result<Customer> {
        let mut customer = self.customer(owner, id)?;
        customer.apply_update(update, time.now())?;
        self.store.update_customer(&customer)?;
        Ok(customer)
    }

    /// delete a customer; their loans and repayment history stay behind
    pub fn remove_customer(&mut self, owner: OwnerId, id: CustomerId) -> Result<()> {
        if self.store.remove_customer(owner, id)? {
            Ok(())
        } else {
            Err(LedgerError::not_found("customer", id))
        }
    }

    // ------------------------------------------------------------------
    // loans
    // ------------------------------------------------------------------

    /// issue a loan against a customer
    pub fn issue_loan(
        &mut self,
        owner: OwnerId,
        new: NewLoan,
        time: &SafeTimeProvider,
    ) -> Result<Loan> {
        // the customer must exist and belong to the caller
        self.customer(owner, new.customer_id)?;

        let loan = Loan::issue(owner, new, time.now())?;
        self.store.insert_loan(loan.clone())?;

        self.events.emit(Event::LoanIssued {
            loan_id: loan.id,
            customer_id: loan.customer_id,
            amount: loan.amount,
            due_date: loan.due_date,
            timestamp: loan.issue_date,
        });

        Ok(loan)
    }

    /// fetch one loan
    pub fn loan(&self, owner: OwnerId, id: LoanId) -> Result<Loan> {
        self.store
            .loan(owner, id)?
            .ok_or_else(|| LedgerError::not_found("loan", id))
    }

    /// filtered loans, newest first, statuses refreshed against the clock
    pub fn loans(
        &mut self,
        owner: OwnerId,
        filter: &LoanFilter,
        time: &SafeTimeProvider,
    ) -> Result<Vec<Loan>> {
        self.refresh_loans(owner, time)?;
        self.store.loans(owner, filter)
    }

    /// edit a loan's terms
    pub fn update_loan(
        &mut self,
        owner: OwnerId,
        id: LoanId,
        update: LoanUpdate,
        time: &SafeTimeProvider,
    ) -> Result<Loan> {
        let mut loan = self.loan(owner, id)?;
        let expected = loan.version;
        let old_status = loan.status;

        loan.apply_update(update, time.now())?;
        self.store.update_loan(&loan, expected)?;

        if loan.status != old_status {
            self.events.emit(Event::StatusChanged {
                loan_id: loan.id,
                old_status,
                new_status: loan.status,
                timestamp: time.now(),
            });
        }

        Ok(loan)
    }

    /// forced terminal transition: write the balance off and close
    pub fn close_loan(
        &mut self,
        owner: OwnerId,
        id: LoanId,
        time: &SafeTimeProvider,
    ) -> Result<Loan> {
        let mut loan = self.loan(owner, id)?;
        let expected = loan.version;
        let now = time.now();

        let written_off = loan.close(now);
        self.store.update_loan(&loan, expected)?;

        self.events.emit(Event::LoanClosed {
            loan_id: loan.id,
            written_off,
            timestamp: now,
        });

        Ok(loan)
    }

    /// currently-overdue active loans
    pub fn overdue_loans(&mut self, owner: OwnerId, time: &SafeTimeProvider) -> Result<Vec<Loan>> {
        self.loans(owner, &LoanFilter::overdue(), time)
    }

    /// re-evaluate every active loan against the current time
    ///
    /// This is the explicit refresh pass: overdue can only be discovered
    /// by re-checking the clock, so listing and summary paths run it
    /// first. Only loans whose status actually moved are persisted.
    /// Returns how many changed.
    pub fn refresh_loans(&mut self, owner: OwnerId, time: &SafeTimeProvider) -> Result<usize> {
        let now = time.now();
        let mut changed = 0;

        for mut loan in self.store.loans(owner, &LoanFilter::default())? {
            let expected = loan.version;
            if let Some((old_status, new_status)) = loan.refresh_status(now) {
                self.store.update_loan(&loan, expected)?;
                self.events.emit(Event::StatusChanged {
                    loan_id: loan.id,
                    old_status,
                    new_status,
                    timestamp: now,
                });
                changed += 1;
            }
        }

        Ok(changed)
    }

    // ------------------------------------------------------------------
    // repayment ledger
    // ------------------------------------------------------------------

    /// record a repayment against a loan
    ///
    /// The fetch, validation, decrement and persist form one unit of
    /// work: the updated loan and the new repayment are committed
    /// together, and the version check turns a racing writer into
    /// `ConflictOnUpdate` instead of a double-spent balance.
    pub fn record_repayment(
        &mut self,
        owner: OwnerId,
        new: NewRepayment,
        time: &SafeTimeProvider,
    ) -> Result<RepaymentOutcome> {
        let now = time.now();
        let mut loan = self.loan(owner, new.loan_id)?;
        let expected = loan.version;

        let payment_date = new.payment_date.unwrap_or(now);
        let settled = loan.apply_repayment(new.amount, now)?;
        let repayment = Repayment::record(&loan, new.amount, payment_date, new.notes, now);

        self.store.commit_repayment(&loan, &repayment, expected)?;

        self.events.emit(Event::RepaymentRecorded {
            repayment_id: repayment.id,
            loan_id: loan.id,
            amount: repayment.amount,
            remaining_balance: loan.remaining_amount,
            payment_date,
        });
        if settled {
            self.events.emit(Event::LoanSettled {
                loan_id: loan.id,
                final_payment: repayment.amount,
                timestamp: now,
            });
        }

        Ok(RepaymentOutcome { repayment, loan })
    }

    /// repayment history for a loan or a customer, most recent first
    pub fn repayments(&self, owner: OwnerId, scope: RepaymentScope) -> Result<Vec<Repayment>> {
        self.store.repayments(owner, scope)
    }

    // ------------------------------------------------------------------
    // summary
    // ------------------------------------------------------------------

    /// derived totals over the owner's book, refreshed first
    pub fn summary(&mut self, owner: OwnerId, time: &SafeTimeProvider) -> Result<BookSummary> {
        self.refresh_loans(owner, time)?;
        let active = self.store.loans(owner, &LoanFilter::default())?;
        let repaid = self.store.loans(owner, &LoanFilter::repaid())?;
        Ok(summary::summarize(&active, &repaid))
    }

    // ------------------------------------------------------------------
    // receipts
    // ------------------------------------------------------------------

    /// re-assemble the receipt summary for an already-recorded repayment
    pub fn receipt_data(&self, shop: &ShopProfile, repayment_id: RepaymentId) -> Result<ReceiptData> {
        let repayment = self
            .store
            .repayment(shop.owner_id, repayment_id)?
            .ok_or_else(|| LedgerError::not_found("repayment", repayment_id))?;
        let loan = self.loan(shop.owner_id, repayment.loan_id)?;
        let customer = self.customer(shop.owner_id, repayment.customer_id)?;
        Ok(ReceiptData::from_parts(
            &repayment,
            &loan,
            &customer,
            &shop.shop_name,
        ))
    }

    /// render a receipt, best-effort
    ///
    /// Runs strictly after the repayment commit. A renderer failure is
    /// reported through the event stream and returned to the caller but
    /// never invalidates the already-committed repayment.
    pub fn render_receipt<R: ReceiptRenderer>(
        &mut self,
        renderer: &R,
        data: &ReceiptData,
    ) -> Result<Vec<u8>> {
        renderer.render(data).map_err(|err| {
            self.events.emit(Event::ReceiptFailed {
                repayment_id: data.repayment_id,
                message: err.to_string(),
            });
            err
        })
    }

    /// get events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::receipt::TextReceiptRenderer;
    use crate::store::{LoanStore, MemoryStore};
    use crate::types::{LoanStatus, RepaymentFrequency};
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use uuid::Uuid;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn book() -> LoanBook<MemoryStore> {
        LoanBook::new(MemoryStore::new())
    }

    fn seeded_loan(
        book: &mut LoanBook<MemoryStore>,
        owner: OwnerId,
        amount: i64,
        time: &SafeTimeProvider,
    ) -> Loan {
        let customer = book
            .add_customer(
                owner,
                NewCustomer {
                    name: "Asha Devi".to_string(),
                    phone: "98765-43210".to_string(),
                    address: "14 Market Lane".to_string(),
                    trust_score: 7,
                    credit_limit: Money::from_major(10_000),
                },
                time,
            )
            .unwrap();
        book.issue_loan(
            owner,
            NewLoan {
                customer_id: customer.id,
                description: "monthly provisions".to_string(),
                amount: Money::from_major(amount),
                due_date: None,
                frequency: RepaymentFrequency::Monthly,
                interest_rate: Rate::ZERO,
                grace_days: 0,
            },
            time,
        )
        .unwrap()
    }

    #[test]
    fn test_issue_requires_owned_customer() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let loan = seeded_loan(&mut book, owner, 1000, &time);
        assert_eq!(loan.due_date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        // unknown customer
        let err = book
            .issue_loan(
                owner,
                NewLoan {
                    customer_id: Uuid::new_v4(),
                    description: "no such customer".to_string(),
                    amount: Money::from_major(100),
                    due_date: None,
                    frequency: RepaymentFrequency::Monthly,
                    interest_rate: Rate::ZERO,
                    grace_days: 0,
                },
                &time,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "customer", .. }));

        // another owner's customer is invisible
        let err = book
            .issue_loan(
                stranger,
                NewLoan {
                    customer_id: loan.customer_id,
                    description: "cross-owner".to_string(),
                    amount: Money::from_major(100),
                    due_date: None,
                    frequency: RepaymentFrequency::Monthly,
                    interest_rate: Rate::ZERO,
                    grace_days: 0,
                },
                &time,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn test_full_repayment_scenario() {
        // loan of 1000, monthly, issued Jan 1 -> due Feb 1;
        // 400 on Jan 15 -> 600 pending; 600 on Jan 20 -> paid, inactive;
        // any further repayment is invalid
        let mut book = book();
        let time = test_time();
        let controller = time.test_control().unwrap();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        controller.advance(Duration::days(14)); // Jan 15
        let outcome = book
            .record_repayment(
                owner,
                NewRepayment::new(loan.id, Money::from_major(400)),
                &time,
            )
            .unwrap();
        assert_eq!(outcome.loan.remaining_amount, Money::from_major(600));
        assert_eq!(outcome.loan.status, LoanStatus::Pending);
        assert_eq!(outcome.repayment.amount, Money::from_major(400));
        assert_eq!(outcome.repayment.customer_id, loan.customer_id);

        controller.advance(Duration::days(5)); // Jan 20
        let outcome = book
            .record_repayment(
                owner,
                NewRepayment::new(loan.id, Money::from_major(600)),
                &time,
            )
            .unwrap();
        assert_eq!(outcome.loan.remaining_amount, Money::ZERO);
        assert_eq!(outcome.loan.status, LoanStatus::Paid);
        assert!(!outcome.loan.is_active);

        let err = book
            .record_repayment(owner, NewRepayment::new(loan.id, Money::ONE), &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_overpayment_leaves_loan_unmodified() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 500, &time);

        let err = book
            .record_repayment(
                owner,
                NewRepayment::new(loan.id, Money::from_major(501)),
                &time,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));

        // the store still holds the untouched loan and no repayment
        let stored = book.loan(owner, loan.id).unwrap();
        assert_eq!(stored.remaining_amount, Money::from_major(500));
        assert_eq!(stored.version, loan.version);
        assert!(book
            .repayments(owner, RepaymentScope::Loan(loan.id))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_history_is_append_only_and_sums() {
        let mut book = book();
        let time = test_time();
        let controller = time.test_control().unwrap();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        for amount in [150, 250, 100] {
            controller.advance(Duration::days(1));
            book.record_repayment(
                owner,
                NewRepayment::new(loan.id, Money::from_major(amount)),
                &time,
            )
            .unwrap();
        }

        let history = book
            .repayments(owner, RepaymentScope::Loan(loan.id))
            .unwrap();
        assert_eq!(history.len(), 3);

        // most recent first
        assert_eq!(history[0].amount, Money::from_major(100));
        assert_eq!(history[2].amount, Money::from_major(150));

        // amounts reconcile with the balance decrement
        let paid: Money = history
            .iter()
            .fold(Money::ZERO, |sum, r| sum + r.amount);
        let stored = book.loan(owner, loan.id).unwrap();
        assert_eq!(paid, stored.amount - stored.remaining_amount);

        // per-customer scope reaches the same records
        let by_customer = book
            .repayments(owner, RepaymentScope::Customer(loan.customer_id))
            .unwrap();
        assert_eq!(by_customer.len(), 3);
    }

    #[test]
    fn test_close_writes_off_and_blocks_repayments() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        book.record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(300)), &time)
            .unwrap();
        let closed = book.close_loan(owner, loan.id, &time).unwrap();
        assert_eq!(closed.status, LoanStatus::Paid);
        assert!(!closed.is_active);
        assert_eq!(closed.remaining_amount, Money::from_major(700));

        // remaining is written off, not repayable
        let err = book
            .record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(700)), &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));

        let events = book.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::LoanClosed { written_off, .. } if *written_off == Money::from_major(700)
        )));
    }

    #[test]
    fn test_refresh_discovers_overdue_lazily() {
        let mut book = book();
        let time = test_time();
        let controller = time.test_control().unwrap();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        // nothing moves inside the term
        assert_eq!(book.refresh_loans(owner, &time).unwrap(), 0);

        // past due + grace the explicit pass flips it
        controller.advance(Duration::days(45));
        assert_eq!(book.refresh_loans(owner, &time).unwrap(), 1);
        let stored = book.loan(owner, loan.id).unwrap();
        assert_eq!(stored.status, LoanStatus::Overdue);

        // a second pass is a no-op
        assert_eq!(book.refresh_loans(owner, &time).unwrap(), 0);

        let overdue = book.overdue_loans(owner, &time).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, loan.id);
    }

    #[test]
    fn test_partial_payment_on_overdue_loan_stays_overdue() {
        let mut book = book();
        let time = test_time();
        let controller = time.test_control().unwrap();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        controller.advance(Duration::days(45));
        let outcome = book
            .record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(100)), &time)
            .unwrap();
        assert_eq!(outcome.loan.status, LoanStatus::Overdue);

        // clearing the balance settles it even while late
        let outcome = book
            .record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(900)), &time)
            .unwrap();
        assert_eq!(outcome.loan.status, LoanStatus::Paid);
        assert!(!outcome.loan.is_active);
    }

    #[test]
    fn test_update_loan_terms() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        let updated = book
            .update_loan(
                owner,
                loan.id,
                LoanUpdate {
                    due_date: Some(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()),
                    ..Default::default()
                },
                &time,
            )
            .unwrap();
        assert_eq!(updated.status, LoanStatus::Overdue);

        let events = book.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StatusChanged {
                old_status: LoanStatus::Pending,
                new_status: LoanStatus::Overdue,
                ..
            }
        )));
    }

    #[test]
    fn test_backdated_payment_date_is_recorded() {
        let mut book = book();
        let time = test_time();
        let controller = time.test_control().unwrap();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        controller.advance(Duration::days(10));
        let paid_on = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let outcome = book
            .record_repayment(
                owner,
                NewRepayment::new(loan.id, Money::from_major(200))
                    .on(paid_on)
                    .with_notes("cash at counter"),
                &time,
            )
            .unwrap();

        assert_eq!(outcome.repayment.payment_date, paid_on);
        assert_eq!(outcome.repayment.notes.as_deref(), Some("cash at counter"));
        // record time is the clock, not the backdated payment date
        assert_eq!(outcome.repayment.created_at, time.now());
    }

    #[test]
    fn test_summary_over_the_book() {
        let mut book = book();
        let time = test_time();
        let controller = time.test_control().unwrap();
        let owner = Uuid::new_v4();

        let first = seeded_loan(&mut book, owner, 1000, &time);
        let _second = seeded_loan(&mut book, owner, 500, &time);

        // empty history: average must be zero, not a division error
        let summary = book.summary(owner, &time).unwrap();
        assert_eq!(summary.avg_repayment_days, rust_decimal::Decimal::ZERO);
        assert_eq!(summary.repaid_loans, 0);
        assert_eq!(summary.total_loaned, Money::from_major(1500));

        // settle one, drive the other overdue
        controller.advance(Duration::days(10));
        book.record_repayment(owner, NewRepayment::new(first.id, Money::from_major(1000)), &time)
            .unwrap();
        controller.advance(Duration::days(40));

        let summary = book.summary(owner, &time).unwrap();
        assert_eq!(summary.active_loans, 1);
        assert_eq!(summary.repaid_loans, 1);
        assert_eq!(summary.total_loaned, Money::from_major(500));
        assert_eq!(summary.total_remaining, Money::from_major(500));
        assert_eq!(summary.overdue_amount, Money::from_major(500));
        assert_eq!(
            summary.avg_repayment_days,
            rust_decimal::Decimal::from(10)
        );
    }

    #[test]
    fn test_receipt_roundtrip() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);
        let shop = ShopProfile::new(owner, "Devi General Store");

        let outcome = book
            .record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(400)), &time)
            .unwrap();

        let data = book.receipt_data(&shop, outcome.repayment.id).unwrap();
        assert_eq!(data.amount, Money::from_major(400));
        assert_eq!(data.remaining_balance, Money::from_major(600));
        assert_eq!(data.shop_name, "Devi General Store");
        assert_eq!(data.customer_name, "Asha Devi");

        let bytes = book.render_receipt(&TextReceiptRenderer, &data).unwrap();
        assert!(!bytes.is_empty());

        // a stranger cannot reach the receipt
        let stranger = ShopProfile::new(Uuid::new_v4(), "Not My Shop");
        assert!(matches!(
            book.receipt_data(&stranger, outcome.repayment.id),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_receipt_failure_keeps_the_repayment() {
        struct BrokenRenderer;
        impl ReceiptRenderer for BrokenRenderer {
            fn render(&self, _data: &ReceiptData) -> Result<Vec<u8>> {
                Err(LedgerError::Receipt {
                    message: "printer jam".to_string(),
                })
            }
            fn content_type(&self) -> &'static str {
                "application/pdf"
            }
            fn file_extension(&self) -> &'static str {
                "pdf"
            }
        }

        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);
        let shop = ShopProfile::new(owner, "Devi General Store");

        let outcome = book
            .record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(400)), &time)
            .unwrap();
        let data = book.receipt_data(&shop, outcome.repayment.id).unwrap();

        let err = book.render_receipt(&BrokenRenderer, &data).unwrap_err();
        assert!(matches!(err, LedgerError::Receipt { .. }));

        // the failure is reported but the committed repayment stands
        let events = book.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::ReceiptFailed { .. })));
        let stored = book.loan(owner, loan.id).unwrap();
        assert_eq!(stored.remaining_amount, Money::from_major(600));
        assert_eq!(
            book.repayments(owner, RepaymentScope::Loan(loan.id))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_settlement_emits_events() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 300, &time);

        book.record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(300)), &time)
            .unwrap();

        let events = book.take_events();
        assert!(events.iter().any(|e| matches!(e, Event::LoanIssued { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::RepaymentRecorded { remaining_balance, .. } if remaining_balance.is_zero())));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::LoanSettled { final_payment, .. } if *final_payment == Money::from_major(300)
        )));
    }

    #[test]
    fn test_stale_writer_conflicts() {
        let mut book = book();
        let time = test_time();
        let owner = Uuid::new_v4();
        let loan = seeded_loan(&mut book, owner, 1000, &time);

        // a second writer read the loan before this book recorded
        let mut stale = book.loan(owner, loan.id).unwrap();
        let stale_version = stale.version;

        book.record_repayment(owner, NewRepayment::new(loan.id, Money::from_major(900)), &time)
            .unwrap();

        // the stale writer passed its own check against the old balance,
        // but the versioned commit refuses the lost update
        stale
            .apply_repayment(Money::from_major(900), time.now())
            .unwrap();
        let repayment =
            Repayment::record(&stale, Money::from_major(900), time.now(), None, time.now());
        let err = book
            .store()
            .commit_repayment(&stale, &repayment, stale_version)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ConflictOnUpdate { .. }));

        let stored = book.loan(owner, loan.id).unwrap();
        assert_eq!(stored.remaining_amount, Money::from_major(100));
    }
}
