/// summary - derived totals over a book of loans
use chrono::{Duration, TimeZone, Utc};
use shop_ledger_rs::{
    LoanBook, MemoryStore, Money, NewCustomer, NewLoan, NewRepayment, Rate, RepaymentFrequency,
    SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== book summary ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let owner = Uuid::new_v4();
    let mut book = LoanBook::new(MemoryStore::new());

    let customer = book.add_customer(
        owner,
        NewCustomer {
            name: "Meena Traders".to_string(),
            phone: "90000-11111".to_string(),
            address: "2 Bazaar Street".to_string(),
            trust_score: 9,
            credit_limit: Money::from_major(50_000),
        },
        &time,
    )?;

    let issue = |book: &mut LoanBook<MemoryStore>, amount: i64, description: &str| {
        book.issue_loan(
            owner,
            NewLoan {
                customer_id: customer.id,
                description: description.to_string(),
                amount: Money::from_major(amount),
                due_date: None,
                frequency: RepaymentFrequency::Monthly,
                interest_rate: Rate::ZERO,
                grace_days: 0,
            },
            &time,
        )
    };

    let settled = issue(&mut book, 1000, "tea and sugar")?;
    let _open = issue(&mut book, 2000, "cooking oil")?;
    let lapsing = issue(&mut book, 500, "soap cartons")?;

    // settle one after ten days
    controller.advance(Duration::days(10));
    book.record_repayment(owner, NewRepayment::new(settled.id, Money::from_major(1000)), &time)?;

    // let the rest run past due
    controller.advance(Duration::days(30));
    book.record_repayment(owner, NewRepayment::new(lapsing.id, Money::from_major(100)), &time)?;

    let summary = book.summary(owner, &time)?;
    println!("as of {}", time.now().format("%Y-%m-%d"));
    println!("  total loaned:    {}", summary.total_loaned);
    println!("  total collected: {}", summary.total_collected);
    println!("  total remaining: {}", summary.total_remaining);
    println!("  overdue amount:  {}", summary.overdue_amount);
    println!("  avg repayment:   {} days", summary.avg_repayment_days);
    println!("  active loans:    {}", summary.active_loans);
    println!("  repaid loans:    {}", summary.repaid_loans);

    let overdue = book.overdue_loans(owner, &time)?;
    println!("\noverdue book:");
    for loan in overdue {
        println!(
            "  {} - {} outstanding (due {})",
            loan.description,
            loan.remaining_amount,
            loan.due_date.format("%Y-%m-%d")
        );
    }

    Ok(())
}
