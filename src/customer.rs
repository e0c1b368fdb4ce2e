use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{CustomerId, OwnerId};

/// a customer of the shop
///
/// Carries no lifecycle logic of its own; loans and repayments reference
/// it for scoping and receipt data. The trust score is the owner's own
/// 0-10 judgement and the credit limit is advisory bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub owner_id: OwnerId,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub trust_score: u8,
    pub credit_limit: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// input for registering a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub trust_score: u8,
    pub credit_limit: Money,
}

/// manual edit of a customer record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub trust_score: Option<u8>,
    pub credit_limit: Option<Money>,
}

const MAX_TRUST_SCORE: u8 = 10;

impl Customer {
    pub(crate) fn register(owner_id: OwnerId, new: NewCustomer, now: DateTime<Utc>) -> Result<Self> {
        if new.name.trim().is_empty() {
            return Err(LedgerError::validation("customer name is required"));
        }
        if new.trust_score > MAX_TRUST_SCORE {
            return Err(LedgerError::validation(format!(
                "trust score must be 0-{MAX_TRUST_SCORE}: {}",
                new.trust_score
            )));
        }
        if new.credit_limit.is_negative() {
            return Err(LedgerError::validation(format!(
                "credit limit must not be negative: {}",
                new.credit_limit
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name: new.name,
            phone: new.phone,
            address: new.address,
            trust_score: new.trust_score,
            credit_limit: new.credit_limit,
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) fn apply_update(&mut self, update: CustomerUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(LedgerError::validation("customer name is required"));
            }
            self.name = name;
        }
        if let Some(score) = update.trust_score {
            if score > MAX_TRUST_SCORE {
                return Err(LedgerError::validation(format!(
                    "trust score must be 0-{MAX_TRUST_SCORE}: {score}"
                )));
            }
            self.trust_score = score;
        }
        if let Some(limit) = update.credit_limit {
            if limit.is_negative() {
                return Err(LedgerError::validation(format!(
                    "credit limit must not be negative: {limit}"
                )));
            }
            self.credit_limit = limit;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        self.updated_at = now;
        Ok(())
    }
}
