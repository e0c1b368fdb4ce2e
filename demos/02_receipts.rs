/// receipts - assemble the payment summary and render a document
use chrono::{TimeZone, Utc};
use shop_ledger_rs::{
    download_path, LoanBook, MemoryStore, Money, NewCustomer, NewLoan, NewRepayment, Rate,
    ReceiptRenderer, RepaymentFrequency, SafeTimeProvider, ShopProfile, TextReceiptRenderer,
    TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== receipts ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let shop = ShopProfile::new(Uuid::new_v4(), "Devi General Store");
    let mut book = LoanBook::new(MemoryStore::new());

    let customer = book.add_customer(
        shop.owner_id,
        NewCustomer {
            name: "Asha Devi".to_string(),
            phone: "98765-43210".to_string(),
            address: "14 Market Lane".to_string(),
            trust_score: 8,
            credit_limit: Money::from_major(10_000),
        },
        &time,
    )?;
    let loan = book.issue_loan(
        shop.owner_id,
        NewLoan {
            customer_id: customer.id,
            description: "festival stock".to_string(),
            amount: Money::from_major(2500),
            due_date: None,
            frequency: RepaymentFrequency::Monthly,
            interest_rate: Rate::ZERO,
            grace_days: 0,
        },
        &time,
    )?;

    // the ledger commits first; rendering comes strictly after
    let outcome = book.record_repayment(
        shop.owner_id,
        NewRepayment::new(loan.id, Money::from_major(1000)),
        &time,
    )?;

    let data = book.receipt_data(&shop, outcome.repayment.id)?;
    let renderer = TextReceiptRenderer;
    let bytes = book.render_receipt(&renderer, &data)?;

    println!("download: {}", download_path(data.repayment_id, &renderer));
    println!("content-type: {}\n", renderer.content_type());
    println!("{}", String::from_utf8(bytes)?);

    Ok(())
}
