#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
}

fn expense(category: &str, amount: Decimal, on: &str) -> NewTransaction {
    NewTransaction::new(
        TransactionType::Expense,
        category,
        amount,
        format!("{category} purchase"),
        date(on),
    )
}

fn income(amount: Decimal, on: &str) -> NewTransaction {
    NewTransaction::new(
        TransactionType::Income,
        "parent-payment",
        amount,
        "Monthly fees",
        date(on),
    )
}

fn count_rows(db: &Database) -> usize {
    db.list_transactions(&TransactionFilter::default())
        .unwrap()
        .len()
}

fn setup_test_data(db: &Database) {
    let txns = vec![
        expense("utilities", dec!(150000), "2024-04-05"),
        expense("maintenance", dec!(45000.50), "2024-04-12"),
        expense("toys-and-materials", dec!(30000), "2024-03-28"),
        income(dec!(600000), "2024-04-01"),
        income(dec!(600000), "2024-03-01").with_status(TransactionStatus::Pending),
    ];
    for txn in &txns {
        db.record_transaction(txn).unwrap();
    }
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(count_rows(&db), 0);
    assert!(db.list_budgets(None).unwrap().is_empty());
}

#[test]
fn test_reopen_file_database_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let db = Database::open(&path).unwrap();
        db.record_transaction(&expense("utilities", dec!(10), "2024-04-05"))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(count_rows(&db), 1);
}

#[test]
fn test_open_fails_on_unreadable_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE schema_version (label TEXT);")
            .unwrap();
    }
    assert!(Database::open(&path).is_err());
}

#[test]
fn test_open_treats_empty_schema_version_as_unversioned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    drop(Database::open(&path).unwrap());
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("DELETE FROM schema_version;").unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(count_rows(&db), 0);
}

// ── record ────────────────────────────────────────────────────

#[test]
fn test_record_and_list_preserves_amount() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .record_transaction(&expense("maintenance", dec!(1234567.89), "2024-04-05").created_by(Some(4)))
        .unwrap();
    assert!(id > 0);

    let all = db.list_transactions(&TransactionFilter::default()).unwrap();
    let matching: Vec<_> = all.iter().filter(|t| t.id == id).collect();
    assert_eq!(matching.len(), 1);
    let txn = matching[0];
    assert_eq!(txn.amount, dec!(1234567.89));
    assert_eq!(txn.category, Category::Maintenance);
    assert_eq!(txn.kind, TransactionType::Expense);
    assert_eq!(txn.created_by, Some(4));
    assert_eq!(txn.status, TransactionStatus::Completed);
    assert_eq!(txn.date, date("2024-04-05"));
    assert!(!txn.created_at.is_empty());
}

#[test]
fn test_record_salary_defaults_to_pending() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .record_transaction(
            &expense("babysitter-salaries", dec!(20000), "2024-04-05")
                .with_reference(ReferenceKind::Babysitter, 9),
        )
        .unwrap();
    let txn = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert!(txn.is_pending());
    assert_eq!(
        txn.reference,
        Some(Reference {
            kind: ReferenceKind::Babysitter,
            id: 9
        })
    );
}

#[test]
fn test_record_alias_category_stored_canonically() {
    let db = Database::open_in_memory().unwrap();
    let mut txn = income(dec!(100), "2024-04-05");
    txn.category = "daycare-fees".into();
    let id = db.record_transaction(&txn).unwrap();
    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.category, Category::ParentPayment);
    assert!(stored.is_income());
}

#[test]
fn test_record_rejects_mismatched_category_without_writing() {
    let db = Database::open_in_memory().unwrap();
    let bad = [
        NewTransaction::new(TransactionType::Income, "utilities", dec!(1), "x", date("2024-04-01")),
        NewTransaction::new(TransactionType::Income, "babysitter-salaries", dec!(1), "x", date("2024-04-01")),
        NewTransaction::new(TransactionType::Expense, "parent-payment", dec!(1), "x", date("2024-04-01")),
        NewTransaction::new(TransactionType::Expense, "groceries", dec!(1), "x", date("2024-04-01")),
    ];
    for txn in &bad {
        let err = db.record_transaction(txn).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err}");
    }
    assert_eq!(count_rows(&db), 0);
}

#[test]
fn test_record_rejects_negative_amount() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .record_transaction(&expense("utilities", dec!(-0.01), "2024-04-05"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(count_rows(&db), 0);
}

#[test]
fn test_record_zero_amount_allowed() {
    let db = Database::open_in_memory().unwrap();
    db.record_transaction(&expense("utilities", Decimal::ZERO, "2024-04-05"))
        .unwrap();
    assert_eq!(count_rows(&db), 1);
}

#[test]
fn test_record_requires_date_and_description() {
    let db = Database::open_in_memory().unwrap();
    let mut no_date = expense("utilities", dec!(10), "2024-04-05");
    no_date.date = None;
    assert!(matches!(
        db.record_transaction(&no_date).unwrap_err(),
        LedgerError::Validation(_)
    ));

    let mut blank = expense("utilities", dec!(10), "2024-04-05");
    blank.description = "   ".into();
    assert!(matches!(
        db.record_transaction(&blank).unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert_eq!(count_rows(&db), 0);
}

#[test]
fn test_record_reference_rules() {
    let db = Database::open_in_memory().unwrap();
    let child_on_expense = expense("utilities", dec!(10), "2024-04-05").with_reference(ReferenceKind::Child, 1);
    assert!(db.record_transaction(&child_on_expense).is_err());

    let sitter_on_utilities =
        expense("utilities", dec!(10), "2024-04-05").with_reference(ReferenceKind::Babysitter, 1);
    assert!(db.record_transaction(&sitter_on_utilities).is_err());

    let child_on_income = income(dec!(10), "2024-04-05").with_reference(ReferenceKind::Child, 12);
    let id = db.record_transaction(&child_on_income).unwrap();
    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.reference.unwrap().kind, ReferenceKind::Child);
    assert_eq!(count_rows(&db), 1);
}

// ── list ──────────────────────────────────────────────────────

#[test]
fn test_list_orders_by_date_desc_then_insertion() {
    let db = Database::open_in_memory().unwrap();
    let first = db
        .record_transaction(&expense("utilities", dec!(1), "2024-04-05"))
        .unwrap();
    let newer = db
        .record_transaction(&expense("utilities", dec!(2), "2024-04-20"))
        .unwrap();
    let second = db
        .record_transaction(&expense("maintenance", dec!(3), "2024-04-05"))
        .unwrap();

    let ids: Vec<i64> = db
        .list_transactions(&TransactionFilter::default())
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![newer, first, second]);
}

#[test]
fn test_list_filters_are_conjunctive() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let expenses = db
        .list_transactions(&TransactionFilter::of_type(TransactionType::Expense))
        .unwrap();
    assert_eq!(expenses.len(), 3);

    let april_expenses = db
        .list_transactions(
            &TransactionFilter::of_type(TransactionType::Expense)
                .between(date("2024-04-01"), date("2024-04-30")),
        )
        .unwrap();
    assert_eq!(april_expenses.len(), 2);

    let pending_income = db
        .list_transactions(&TransactionFilter {
            kind: Some(TransactionType::Income),
            status: Some(TransactionStatus::Pending),
            ..TransactionFilter::default()
        })
        .unwrap();
    assert_eq!(pending_income.len(), 1);
    assert_eq!(pending_income[0].date, date("2024-03-01"));

    let utilities = db
        .list_transactions(&TransactionFilter {
            category: Some(Category::Utilities),
            ..TransactionFilter::default()
        })
        .unwrap();
    assert_eq!(utilities.len(), 1);
    assert_eq!(utilities[0].amount, dec!(150000));
}

#[test]
fn test_list_date_range_is_inclusive() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let exact = db
        .list_transactions(&TransactionFilter::default().between(date("2024-04-05"), date("2024-04-05")))
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].category, Category::Utilities);

    let open_start = db
        .list_transactions(&TransactionFilter {
            end_date: Some(date("2024-03-31")),
            ..TransactionFilter::default()
        })
        .unwrap();
    assert_eq!(open_start.len(), 2);
}

#[test]
fn test_record_rejects_quoted_category() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    let mut hostile = expense("utilities' OR '1'='1", dec!(1), "2024-04-05");
    hostile.description = "x".into();
    assert!(db.record_transaction(&hostile).is_err());
    assert_eq!(count_rows(&db), 5);
}

#[test]
fn test_list_no_results() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    let rows = db
        .list_transactions(&TransactionFilter::default().between(date("2030-01-01"), date("2030-12-31")))
        .unwrap();
    assert!(rows.is_empty());
}

// ── update_status ─────────────────────────────────────────────

#[test]
fn test_update_status_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .record_transaction(&expense("babysitter-salaries", dec!(6000), "2024-04-05"))
        .unwrap();

    let first = db.update_status(id, TransactionStatus::Completed).unwrap();
    assert_eq!(first, StatusChange::Completed);
    let second = db.update_status(id, TransactionStatus::Completed).unwrap();
    assert_eq!(second, StatusChange::AlreadyCompleted);

    let txn = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(txn.status, TransactionStatus::Completed);
}

#[test]
fn test_update_status_not_found() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .update_status(4242, TransactionStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { id: 4242, .. }));
}

#[test]
fn test_update_status_cannot_revert() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .record_transaction(&expense("utilities", dec!(10), "2024-04-05"))
        .unwrap();
    let err = db.update_status(id, TransactionStatus::Pending).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(
        db.get_transaction(id).unwrap().unwrap().status,
        TransactionStatus::Completed
    );
}

#[test]
fn test_get_transaction_missing() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_transaction(1).unwrap().is_none());
}

#[test]
fn test_corrupt_amount_is_a_store_error() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .record_transaction(&expense("utilities", dec!(10), "2024-04-05"))
        .unwrap();
    db.conn
        .execute(
            "UPDATE financial_transactions SET amount = 'abc' WHERE id = ?1",
            params![id],
        )
        .unwrap();
    let err = db
        .list_transactions(&TransactionFilter::default())
        .unwrap_err();
    assert!(matches!(err, LedgerError::StoreUnavailable(_)));
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_create_and_list_budget() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .create_budget(&NewBudget::monthly("utilities", dec!(500000), date("2024-04-01")))
        .unwrap();
    let budgets = db.list_budgets(None).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].id, id);
    assert_eq!(budgets[0].amount, dec!(500000));
    assert_eq!(budgets[0].period_type, PeriodType::Monthly);
    assert!(budgets[0].end_date.is_none());

    assert!(db.list_budgets(Some(PeriodType::Weekly)).unwrap().is_empty());
}

#[test]
fn test_create_budget_validation() {
    let db = Database::open_in_memory().unwrap();
    let start = date("2024-04-01");

    let income_cat = NewBudget::monthly("parent-payment", dec!(1), start);
    let unknown = NewBudget::monthly("snacks", dec!(1), start);
    let negative = NewBudget::monthly("utilities", dec!(-1), start);
    let mut bad_period = NewBudget::monthly("utilities", dec!(1), start);
    bad_period.period_type = "daily".into();
    let mut no_start = NewBudget::monthly("utilities", dec!(1), start);
    no_start.start_date = None;
    let inverted = NewBudget::monthly("utilities", dec!(1), start).ending(date("2024-03-31"));

    for b in [income_cat, unknown, negative, bad_period, no_start, inverted] {
        let err = db.create_budget(&b).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err}");
    }
    assert!(db.list_budgets(None).unwrap().is_empty());
}

#[test]
fn test_budget_same_day_end_allowed() {
    let db = Database::open_in_memory().unwrap();
    let start = date("2024-04-01");
    db.create_budget(&NewBudget::monthly("utilities", dec!(1), start).ending(start))
        .unwrap();
}

#[test]
fn test_list_active_budgets_window() {
    let db = Database::open_in_memory().unwrap();
    db.create_budget(&NewBudget::monthly("utilities", dec!(100), date("2024-04-01")))
        .unwrap();
    db.create_budget(
        &NewBudget::monthly("maintenance", dec!(200), date("2024-01-01")).ending(date("2024-03-31")),
    )
    .unwrap();
    db.create_budget(&NewBudget::monthly("toys-and-materials", dec!(300), date("2024-05-01")))
        .unwrap();
    let mut weekly = NewBudget::monthly("utilities", dec!(50), date("2024-01-01"));
    weekly.period_type = "weekly".into();
    db.create_budget(&weekly).unwrap();

    let active = db
        .list_active_budgets(date("2024-04-15"), PeriodType::Monthly)
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].category, Category::Utilities);

    let on_end = db
        .list_active_budgets(date("2024-03-31"), PeriodType::Monthly)
        .unwrap();
    assert_eq!(on_end.len(), 1);
    assert_eq!(on_end[0].category, Category::Maintenance);

    let weekly_active = db
        .list_active_budgets(date("2024-04-15"), PeriodType::Weekly)
        .unwrap();
    assert_eq!(weekly_active.len(), 1);
    assert_eq!(weekly_active[0].amount, dec!(50));
}

#[test]
fn test_total_monthly_budget() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.total_monthly_budget(date("2024-04-15")).unwrap(), Decimal::ZERO);

    db.create_budget(&NewBudget::monthly("utilities", dec!(100.25), date("2024-04-01")))
        .unwrap();
    db.create_budget(&NewBudget::monthly("babysitter-salaries", dec!(1000000), date("2024-04-01")))
        .unwrap();
    let mut weekly = NewBudget::monthly("maintenance", dec!(999), date("2024-04-01"));
    weekly.period_type = "weekly".into();
    db.create_budget(&weekly).unwrap();

    assert_eq!(
        db.total_monthly_budget(date("2024-04-15")).unwrap(),
        dec!(1000100.25)
    );
}

#[test]
fn test_total_monthly_budget_out_of_range_is_error() {
    let db = Database::open_in_memory().unwrap();
    for category in ["utilities", "maintenance"] {
        db.create_budget(&NewBudget::monthly(category, Decimal::MAX, date("2024-04-01")))
            .unwrap();
    }
    let err = db.total_monthly_budget(date("2024-04-15")).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}
