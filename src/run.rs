mod cli;

pub(crate) use cli::{as_cli, print_usage};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::DATE_FORMAT;

/// Flags that stand alone; every other `--flag` consumes the next argument.
const SWITCHES: [&str; 1] = ["--json"];

pub(crate) fn has_switch(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

pub(crate) fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values, in order.
pub(crate) fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !SWITCHES.contains(&arg.as_str()) {
                iter.next();
            }
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim().replace(',', "").as_str())
        .with_context(|| format!("Invalid amount '{s}'"))
}

pub(crate) fn parse_id(s: &str, what: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid {what} '{s}', expected a number"))
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
