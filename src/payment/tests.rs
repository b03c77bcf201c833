#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::TransactionFilter;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── quote ─────────────────────────────────────────────────────

#[test]
fn test_quote_examples() {
    assert_eq!(quote(SessionType::FullDay, 4), dec!(20000));
    assert_eq!(quote(SessionType::HalfDay, 3), dec!(6000));
}

#[test]
fn test_quote_zero_children_is_zero() {
    assert_eq!(quote(SessionType::FullDay, 0), Decimal::ZERO);
    assert_eq!(quote(SessionType::HalfDay, 0), Decimal::ZERO);
}

#[test]
fn test_quote_is_linear_in_children() {
    for n in 0..50u32 {
        assert_eq!(quote(SessionType::FullDay, n), Decimal::from(5000 * i64::from(n)));
        assert_eq!(quote(SessionType::HalfDay, n), Decimal::from(2000 * i64::from(n)));
    }
}

#[test]
fn test_session_type_parse() {
    assert_eq!(SessionType::parse("full-day").unwrap(), SessionType::FullDay);
    assert_eq!(SessionType::parse("Half-Day").unwrap(), SessionType::HalfDay);
    let err = SessionType::parse("overnight").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
}

// ── PaymentQuote ──────────────────────────────────────────────

#[test]
fn test_payment_quote_fields() {
    let q = PaymentQuote::new(3, date("2024-04-05"), SessionType::FullDay, 4);
    assert_eq!(q.rate, dec!(5000));
    assert_eq!(q.amount, dec!(20000));
    assert_eq!(q.description(), "Babysitter payment: full-day session, 4 children");

    let json = serde_json::to_value(&q).unwrap();
    assert_eq!(json["childrenCount"], 4);
    assert_eq!(json["rate"], "5000");
    assert_eq!(json["amount"], "20000");
    assert_eq!(json["sessionType"], "full-day");
    assert_eq!(json["date"], "2024-04-05");
}

#[test]
fn test_calculate_payment_uses_roster() {
    let roster = StaticRoster::new().assign(3, 3).assign(4, 0);
    let q = calculate_payment(&roster, 3, date("2024-04-05"), SessionType::HalfDay).unwrap();
    assert_eq!(q.children_count, 3);
    assert_eq!(q.amount, dec!(6000));

    let idle = calculate_payment(&roster, 4, date("2024-04-05"), SessionType::FullDay).unwrap();
    assert_eq!(idle.amount, Decimal::ZERO);
}

#[test]
fn test_calculate_payment_unknown_babysitter() {
    let roster = StaticRoster::new();
    let err = calculate_payment(&roster, 99, date("2024-04-05"), SessionType::FullDay).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound {
            entity: "Babysitter",
            id: 99
        }
    ));
}

// ── record_payment ────────────────────────────────────────────

#[test]
fn test_record_payment_creates_pending_salary() {
    let db = Database::open_in_memory().unwrap();
    let q = PaymentQuote::new(8, date("2024-04-05"), SessionType::FullDay, 1);
    let id = record_payment(&db, &q, Some(2)).unwrap();

    let txn = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(txn.kind, TransactionType::Expense);
    assert_eq!(txn.category, Category::BabysitterSalaries);
    assert_eq!(txn.amount, dec!(5000));
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(txn.created_by, Some(2));
    assert_eq!(txn.description, "Babysitter payment: full-day session, 1 child");
    let reference = txn.reference.unwrap();
    assert_eq!(reference.kind, ReferenceKind::Babysitter);
    assert_eq!(reference.id, 8);

    let all = db.list_transactions(&TransactionFilter::default()).unwrap();
    assert_eq!(all.len(), 1);
}
