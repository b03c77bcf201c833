#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::util::*;

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_whole_amount() {
    assert_eq!(format_amount(dec!(150000)), "UGX 150,000");
    assert_eq!(format_amount(dec!(1234567)), "UGX 1,234,567");
    assert_eq!(format_amount(dec!(999)), "UGX 999");
}

#[test]
fn test_format_whole_with_zero_scale_digits() {
    assert_eq!(format_amount(dec!(20000.00)), "UGX 20,000");
}

#[test]
fn test_format_fractional_amount() {
    assert_eq!(format_amount(dec!(45000.5)), "UGX 45,000.50");
    assert_eq!(format_amount(dec!(0.01)), "UGX 0.01");
}

#[test]
fn test_format_negative_amount() {
    assert_eq!(format_amount(dec!(-200000.5)), "-UGX 200,000.50");
    assert_eq!(format_amount(dec!(-5)), "-UGX 5");
}

#[test]
fn test_format_zero() {
    assert_eq!(format_amount(Decimal::ZERO), "UGX 0");
}

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

// ── sum_amounts ───────────────────────────────────────────────

#[test]
fn test_sum_amounts_exact() {
    assert_eq!(sum_amounts([dec!(0.10), dec!(0.20)]).unwrap(), dec!(0.30));
    assert_eq!(sum_amounts(Vec::new()).unwrap(), Decimal::ZERO);
}

#[test]
fn test_sum_amounts_out_of_range() {
    assert!(sum_amounts([Decimal::MAX, Decimal::ONE]).is_err());
    assert!(add_amounts(Decimal::MAX, Decimal::ZERO).is_ok());
}
