use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

pub(crate) const CURRENCY: &str = "UGX";

/// Format an amount with thousand separators and the currency label.
/// Whole amounts print without a fractional part.
/// e.g. `1234567` → `"UGX 1,234,567"`, `-42.5` → `"-UGX 42.50"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs().round_dp(2);
    let formatted = if abs.fract().is_zero() {
        format!("{:.0}", abs.trunc())
    } else {
        format!("{abs:.2}")
    };
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next();

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    let body = match dec_part {
        Some(d) => format!("{with_commas}.{d}"),
        None => with_commas,
    };
    if val < Decimal::ZERO {
        format!("-{CURRENCY} {body}")
    } else {
        format!("{CURRENCY} {body}")
    }
}

/// Adds two amounts, failing instead of overflowing.
pub(crate) fn add_amounts(total: Decimal, amount: Decimal) -> LedgerResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| {
        LedgerError::validation(format!("total out of range: {total} + {amount}"))
    })
}

pub(crate) fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> LedgerResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, add_amounts)
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}
