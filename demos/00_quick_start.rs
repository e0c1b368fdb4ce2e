/// quick start - register a customer, issue a loan, record a repayment
use chrono::{TimeZone, Utc};
use shop_ledger_rs::{
    LoanBook, MemoryStore, Money, NewCustomer, NewLoan, NewRepayment, Rate, RepaymentFrequency,
    SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quick start ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let owner = Uuid::new_v4();
    let mut book = LoanBook::new(MemoryStore::new());

    // 1. register a customer
    let customer = book.add_customer(
        owner,
        NewCustomer {
            name: "Asha Devi".to_string(),
            phone: "98765-43210".to_string(),
            address: "14 Market Lane".to_string(),
            trust_score: 7,
            credit_limit: Money::from_major(10_000),
        },
        &time,
    )?;
    println!("customer: {} (trust {})", customer.name, customer.trust_score);

    // 2. issue a monthly loan
    let loan = book.issue_loan(
        owner,
        NewLoan {
            customer_id: customer.id,
            description: "monthly provisions".to_string(),
            amount: Money::from_major(1000),
            due_date: None, // derived from the frequency
            frequency: RepaymentFrequency::Monthly,
            interest_rate: Rate::from_percentage(2),
            grace_days: 3,
        },
        &time,
    )?;
    println!(
        "loan issued: {} due {}",
        loan.amount,
        loan.due_date.format("%Y-%m-%d")
    );

    // 3. record a repayment
    let outcome = book.record_repayment(
        owner,
        NewRepayment::new(loan.id, Money::from_major(400)).with_notes("cash at counter"),
        &time,
    )?;
    println!(
        "repaid {} -> remaining {} ({})",
        outcome.repayment.amount, outcome.loan.remaining_amount, outcome.loan.status
    );

    Ok(())
}
