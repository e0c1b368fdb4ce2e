/// lifecycle - a loan moving through pending, overdue and paid
use chrono::{Duration, TimeZone, Utc};
use shop_ledger_rs::{
    LoanBook, LoanStatus, MemoryStore, Money, NewCustomer, NewLoan, NewRepayment, Rate,
    RepaymentFrequency, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let owner = Uuid::new_v4();
    let mut book = LoanBook::new(MemoryStore::new());

    let customer = book.add_customer(
        owner,
        NewCustomer {
            name: "Ravi Kumar".to_string(),
            phone: "91234-56789".to_string(),
            address: "7 Temple Road".to_string(),
            trust_score: 6,
            credit_limit: Money::from_major(5000),
        },
        &time,
    )?;

    // 1. issuance
    println!("1. issuance");
    println!("-----------");
    let loan = book.issue_loan(
        owner,
        NewLoan {
            customer_id: customer.id,
            description: "bicycle repair parts".to_string(),
            amount: Money::from_major(1200),
            due_date: None,
            frequency: RepaymentFrequency::BiWeekly,
            interest_rate: Rate::ZERO,
            grace_days: 2,
        },
        &time,
    )?;
    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  due:  {}", loan.due_date.format("%Y-%m-%d"));
    println!("  status: {}", loan.status);

    // 2. partial repayment inside the term
    println!("\n2. partial repayment");
    println!("--------------------");
    controller.advance(Duration::days(7));
    let outcome = book.record_repayment(
        owner,
        NewRepayment::new(loan.id, Money::from_major(500)),
        &time,
    )?;
    println!("  paid 500 -> remaining {}", outcome.loan.remaining_amount);
    println!("  status: {}", outcome.loan.status);

    // 3. the term lapses; the refresh pass discovers it
    println!("\n3. past due + grace");
    println!("-------------------");
    controller.advance(Duration::days(10)); // day 17, due day 14 + 2 grace
    let changed = book.refresh_loans(owner, &time)?;
    let loan = book.loan(owner, loan.id)?;
    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  refresh pass flipped {changed} loan(s)");
    println!("  status: {}", loan.status);
    assert_eq!(loan.status, LoanStatus::Overdue);

    // 4. settling late
    println!("\n4. settlement");
    println!("-------------");
    let outcome = book.record_repayment(
        owner,
        NewRepayment::new(loan.id, Money::from_major(700)),
        &time,
    )?;
    println!("  paid 700 -> remaining {}", outcome.loan.remaining_amount);
    println!("  status: {}", outcome.loan.status);
    println!("  active: {}", outcome.loan.is_active);
    assert_eq!(outcome.loan.status, LoanStatus::Paid);

    // 5. terminal: another repayment is refused
    println!("\n5. terminal state");
    println!("-----------------");
    match book.record_repayment(owner, NewRepayment::new(loan.id, Money::ONE), &time) {
        Ok(_) => println!("  error: settled loan accepted a repayment!"),
        Err(e) => println!("  refused as expected: {e}"),
    }

    Ok(())
}
