//! Receipt data and the renderer seam.
//!
//! The ledger only supplies the authoritative numbers; turning them into
//! a document (PDF or otherwise) belongs to the renderer behind the
//! trait. Rendering happens strictly after the repayment commit and is
//! best-effort: a failed render is reported, never rolled back into the
//! ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Loan;
use crate::repayment::Repayment;
use crate::types::RepaymentId;

/// flat payment summary handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptData {
    pub repayment_id: RepaymentId,
    pub customer_name: String,
    pub loan_description: String,
    pub amount: Money,
    pub payment_date: DateTime<Utc>,
    pub remaining_balance: Money,
    pub shop_name: String,
}

impl ReceiptData {
    /// assemble the summary from the committed records
    pub fn from_parts(
        repayment: &Repayment,
        loan: &Loan,
        customer: &Customer,
        shop_name: &str,
    ) -> Self {
        Self {
            repayment_id: repayment.id,
            customer_name: customer.name.clone(),
            loan_description: loan.description.clone(),
            amount: repayment.amount,
            payment_date: repayment.payment_date,
            remaining_balance: loan.remaining_amount,
            shop_name: shop_name.to_string(),
        }
    }
}

/// renders a receipt into a downloadable document
pub trait ReceiptRenderer {
    fn render(&self, data: &ReceiptData) -> Result<Vec<u8>>;
    /// content-type header for serving the document
    fn content_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
}

/// download path for a rendered receipt, e.g. `receipts/{id}.pdf`
pub fn download_path(repayment_id: RepaymentId, renderer: &dyn ReceiptRenderer) -> String {
    format!("receipts/{}.{}", repayment_id, renderer.file_extension())
}

/// plain-text reference renderer
///
/// Lays the receipt out the way the shop hands it over the counter. A
/// PDF renderer plugs in through the same trait.
#[derive(Debug, Clone, Default)]
pub struct TextReceiptRenderer;

impl ReceiptRenderer for TextReceiptRenderer {
    fn render(&self, data: &ReceiptData) -> Result<Vec<u8>> {
        let doc = format!(
            "{shop}\n\
             Payment Receipt\n\
             \n\
             Receipt ID: {id}\n\
             Date: {date}\n\
             Customer: {customer}\n\
             Loan Description: {description}\n\
             \n\
             Payment Details\n\
             Amount Paid: {amount}\n\
             Remaining Balance: {remaining}\n\
             \n\
             Thank you for your payment!\n\
             This is an electronically generated receipt.\n",
            shop = data.shop_name,
            id = data.repayment_id,
            date = data.payment_date.format("%Y-%m-%d"),
            customer = data.customer_name,
            description = data.loan_description,
            amount = data.amount,
            remaining = data.remaining_balance,
        );
        Ok(doc.into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }
}
