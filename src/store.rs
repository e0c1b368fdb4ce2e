//! Persistence traits and the in-memory reference store.
//!
//! Every lookup takes the owner id: scoping is a mandatory parameter, not
//! ambient state, so a store can never leak one owner's records to
//! another. Loan writes carry the version the caller read; a mismatch
//! means another writer got there first and surfaces as
//! `ConflictOnUpdate` instead of a lost update.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::customer::Customer;
use crate::errors::{LedgerError, Result};
use crate::loan::Loan;
use crate::repayment::Repayment;
use crate::types::{CustomerId, LoanFilter, LoanId, OwnerId, RepaymentId, RepaymentScope};

pub trait CustomerStore {
    fn insert_customer(&self, customer: Customer) -> Result<()>;
    fn customer(&self, owner: OwnerId, id: CustomerId) -> Result<Option<Customer>>;
    /// all customers of one owner, newest first
    fn customers(&self, owner: OwnerId) -> Result<Vec<Customer>>;
    fn update_customer(&self, customer: &Customer) -> Result<()>;
    /// returns false when nothing matched; loans and repayments that
    /// reference the customer are left untouched
    fn remove_customer(&self, owner: OwnerId, id: CustomerId) -> Result<bool>;
}

pub trait LoanStore {
    fn insert_loan(&self, loan: Loan) -> Result<()>;
    fn loan(&self, owner: OwnerId, id: LoanId) -> Result<Option<Loan>>;
    /// filtered loans of one owner, newest first
    fn loans(&self, owner: OwnerId, filter: &LoanFilter) -> Result<Vec<Loan>>;
    /// persist a mutated loan; `expected_version` is the version the
    /// caller read before mutating
    fn update_loan(&self, loan: &Loan, expected_version: u64) -> Result<()>;
    /// persist the updated loan and the new repayment as one unit: a
    /// reader must never observe one without the other
    fn commit_repayment(
        &self,
        loan: &Loan,
        repayment: &Repayment,
        expected_version: u64,
    ) -> Result<()>;
}

pub trait RepaymentStore {
    fn repayment(&self, owner: OwnerId, id: RepaymentId) -> Result<Option<Repayment>>;
    /// repayments in scope, descending by payment date
    fn repayments(&self, owner: OwnerId, scope: RepaymentScope) -> Result<Vec<Repayment>>;
}

/// the full persistence surface the loan book consumes
pub trait Store: CustomerStore + LoanStore + RepaymentStore {}

impl<T: CustomerStore + LoanStore + RepaymentStore> Store for T {}

/// in-memory store
///
/// One mutex guards all three shelves, so `commit_repayment` is a single
/// critical section and the version check serializes racing writers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shelves: Mutex<Shelves>,
}

#[derive(Debug, Default)]
struct Shelves {
    customers: HashMap<CustomerId, Customer>,
    loans: HashMap<LoanId, Loan>,
    repayments: Vec<Repayment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shelves> {
        self.shelves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CustomerStore for MemoryStore {
    fn insert_customer(&self, customer: Customer) -> Result<()> {
        self.lock().customers.insert(customer.id, customer);
        Ok(())
    }

    fn customer(&self, owner: OwnerId, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self
            .lock()
            .customers
            .get(&id)
            .filter(|c| c.owner_id == owner)
            .cloned())
    }

    fn customers(&self, owner: OwnerId) -> Result<Vec<Customer>> {
        let mut matched: Vec<Customer> = self
            .lock()
            .customers
            .values()
            .filter(|c| c.owner_id == owner)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    fn update_customer(&self, customer: &Customer) -> Result<()> {
        let mut shelves = self.lock();
        let stored = shelves
            .customers
            .get_mut(&customer.id)
            .filter(|c| c.owner_id == customer.owner_id)
            .ok_or_else(|| LedgerError::not_found("customer", customer.id))?;
        *stored = customer.clone();
        Ok(())
    }

    fn remove_customer(&self, owner: OwnerId, id: CustomerId) -> Result<bool> {
        let mut shelves = self.lock();
        let owned = shelves
            .customers
            .get(&id)
            .is_some_and(|c| c.owner_id == owner);
        if owned {
            shelves.customers.remove(&id);
        }
        Ok(owned)
    }
}

impl LoanStore for MemoryStore {
    fn insert_loan(&self, loan: Loan) -> Result<()> {
        self.lock().loans.insert(loan.id, loan);
        Ok(())
    }

    fn loan(&self, owner: OwnerId, id: LoanId) -> Result<Option<Loan>> {
        Ok(self
            .lock()
            .loans
            .get(&id)
            .filter(|l| l.owner_id == owner)
            .cloned())
    }

    fn loans(&self, owner: OwnerId, filter: &LoanFilter) -> Result<Vec<Loan>> {
        let mut matched: Vec<Loan> = self
            .lock()
            .loans
            .values()
            .filter(|l| l.owner_id == owner)
            .filter(|l| filter.include_closed || l.is_active)
            .filter(|l| filter.status.map_or(true, |s| l.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    fn update_loan(&self, loan: &Loan, expected_version: u64) -> Result<()> {
        let mut shelves = self.lock();
        let stored = shelves
            .loans
            .get_mut(&loan.id)
            .filter(|l| l.owner_id == loan.owner_id)
            .ok_or_else(|| LedgerError::not_found("loan", loan.id))?;
        if stored.version != expected_version {
            return Err(LedgerError::ConflictOnUpdate { loan_id: loan.id });
        }
        *stored = loan.clone();
        Ok(())
    }

    fn commit_repayment(
        &self,
        loan: &Loan,
        repayment: &Repayment,
        expected_version: u64,
    ) -> Result<()> {
        let mut shelves = self.lock();
        let stored = shelves
            .loans
            .get_mut(&loan.id)
            .filter(|l| l.owner_id == loan.owner_id)
            .ok_or_else(|| LedgerError::not_found("loan", loan.id))?;
        if stored.version != expected_version {
            return Err(LedgerError::ConflictOnUpdate { loan_id: loan.id });
        }
        *stored = loan.clone();
        shelves.repayments.push(repayment.clone());
        Ok(())
    }
}

impl RepaymentStore for MemoryStore {
    fn repayment(&self, owner: OwnerId, id: RepaymentId) -> Result<Option<Repayment>> {
        Ok(self
            .lock()
            .repayments
            .iter()
            .find(|r| r.id == id && r.owner_id == owner)
            .cloned())
    }

    fn repayments(&self, owner: OwnerId, scope: RepaymentScope) -> Result<Vec<Repayment>> {
        let mut matched: Vec<Repayment> = self
            .lock()
            .repayments
            .iter()
            .filter(|r| r.owner_id == owner)
            .filter(|r| match scope {
                RepaymentScope::Loan(loan_id) => r.loan_id == loan_id,
                RepaymentScope::Customer(customer_id) => r.customer_id == customer_id,
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(matched)
    }
}
