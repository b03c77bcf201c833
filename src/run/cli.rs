use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use tracing::error;

use super::{flag_value, has_switch, parse_amount, parse_date, parse_id, positionals, shellexpand};
use crate::config::Settings;
use crate::db::{Database, StatusChange};
use crate::error::LedgerError;
use crate::ledger::{Ledger, TimeRange, MAX_TREND_PERIODS};
use crate::models::{
    Category, NewBudget, NewTransaction, PeriodType, ReferenceKind, Transaction, TransactionFilter,
    TransactionStatus, TransactionType,
};
use crate::payment::{self, SessionType, StaticRoster};
use crate::report::{self, ReportFormat};
use crate::util::{format_amount, truncate};

const DEFAULT_TREND_PERIODS: usize = 6;

/// Runs one command. Store failures are logged here before they propagate.
pub(crate) fn as_cli(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let result = dispatch(args, db, settings);
    if let Err(err) = &result {
        if let Some(LedgerError::StoreUnavailable(source)) = err.downcast_ref::<LedgerError>() {
            let command = args.get(1).map(String::as_str).unwrap_or_default();
            error!(command, %source, "ledger store unavailable");
        }
    }
    result
}

fn dispatch(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    let rest = args.get(2..).unwrap_or_default();
    match command {
        "record" | "r" => cli_record(rest, db, settings),
        "list" | "ls" => cli_list(rest, db),
        "clear" => cli_clear(rest, db),
        "budget-add" => cli_budget_add(rest, db, settings),
        "budgets" => cli_budgets(rest, db),
        "quote" => cli_quote(rest),
        "pay" => cli_pay(rest, db, settings),
        "summary" | "s" => cli_summary(rest, db),
        "totals" => cli_totals(rest, db),
        "net" => cli_net(rest, db),
        "categories" => cli_categories(rest),
        "budget-status" => cli_budget_status(rest, db),
        "overdue" => cli_overdue(rest, db),
        "trend" => cli_trend(rest, db),
        "export" => cli_export(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("daycare-ledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("daycare-ledger: income, expenses and budgets for a daycare");
    println!();
    println!("Usage: daycare-ledger <command> [options] [--json] [--today YYYY-MM-DD]");
    println!();
    println!("Commands:");
    println!("  record <income|expense> <category> <amount> <description>");
    println!("    --date <YYYY-MM-DD>         Transaction date (default: today)");
    println!("    --status <pending|completed> Override the default status");
    println!("    --child <id>                Reference a child (income only)");
    println!("    --babysitter <id>           Reference a babysitter (salaries only)");
    println!("  list                          List transactions, newest first");
    println!("    --type, --category, --status, --from, --to, --range");
    println!("  clear <id>                    Mark a pending transaction completed");
    println!("  budget-add <category> <amount>");
    println!("    --period <monthly|weekly>   Budget period (default: monthly)");
    println!("    --start, --end <YYYY-MM-DD> Active span (default: from today, open-ended)");
    println!("  budgets [--period <p>]        List budgets");
    println!("  quote <half-day|full-day> <children> [--date <d>]  Price a babysitting session");
    println!("  pay <babysitter-id> <half-day|full-day> --children <n> [--date <d>]");
    println!("                                Record a pending babysitter payment");
    println!("  summary [day|week|month|year] Financial summary for the current window");
    println!("  totals <income|expense> [range]  Per-category totals for one type");
    println!("  net [range]                   Income, expenses and net income");
    println!("  categories                    List categories by transaction type");
    println!("  budget-status [range]         Budget vs actual spending per category");
    println!("  overdue [--as-of <d>]         Parent payments pending over 30 days");
    println!("  trend [range] [--periods <n>] Income and expense for recent windows");
    println!("  export <pdf|csv> [range] [--out <dir>]  Write a report file");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn today(args: &[String]) -> Result<NaiveDate> {
    match flag_value(args, "--today") {
        Some(d) => parse_date(d),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn range_arg(args: &[String], index: usize) -> Result<TimeRange> {
    let pos = positionals(args);
    Ok(TimeRange::from_param(pos.get(index).copied())?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn cli_record(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positionals(args);
    let [kind, category, amount, description, ..] = pos.as_slice() else {
        anyhow::bail!("Usage: daycare-ledger record <income|expense> <category> <amount> <description>");
    };

    let kind = TransactionType::parse(kind)
        .ok_or_else(|| anyhow::anyhow!("Type must be income or expense, got '{kind}'"))?;
    let date = match flag_value(args, "--date") {
        Some(d) => parse_date(d)?,
        None => today(args)?,
    };

    let mut txn = NewTransaction::new(kind, *category, parse_amount(amount)?, *description, date)
        .created_by(settings.acting_user);
    if let Some(status) = flag_value(args, "--status") {
        let status = TransactionStatus::parse(status)
            .ok_or_else(|| anyhow::anyhow!("Status must be pending or completed, got '{status}'"))?;
        txn = txn.with_status(status);
    }
    if let Some(id) = flag_value(args, "--child") {
        txn = txn.with_reference(ReferenceKind::Child, parse_id(id, "child id")?);
    }
    if let Some(id) = flag_value(args, "--babysitter") {
        txn = txn.with_reference(ReferenceKind::Babysitter, parse_id(id, "babysitter id")?);
    }

    let id = db.record_transaction(&txn)?;
    if has_switch(args, "--json") {
        let stored = db
            .get_transaction(id)?
            .ok_or(LedgerError::NotFound { entity: "Transaction", id })?;
        return print_json(&stored);
    }
    println!("Recorded transaction #{id}");
    Ok(())
}

fn cli_list(args: &[String], db: &Database) -> Result<()> {
    let mut filter = TransactionFilter::default();
    if let Some(kind) = flag_value(args, "--type") {
        filter.kind = Some(
            TransactionType::parse(kind)
                .ok_or_else(|| anyhow::anyhow!("Type must be income or expense, got '{kind}'"))?,
        );
    }
    if let Some(category) = flag_value(args, "--category") {
        filter.category = Some(
            Category::parse(category)
                .ok_or_else(|| anyhow::anyhow!("Unknown category '{category}'"))?,
        );
    }
    if let Some(status) = flag_value(args, "--status") {
        filter.status = Some(
            TransactionStatus::parse(status)
                .ok_or_else(|| anyhow::anyhow!("Status must be pending or completed, got '{status}'"))?,
        );
    }
    if let Some(range) = flag_value(args, "--range") {
        let window = TimeRange::parse(range)?.window(today(args)?)?;
        filter = filter.between(window.start, window.end);
    }
    if let Some(from) = flag_value(args, "--from") {
        filter.start_date = Some(parse_date(from)?);
    }
    if let Some(to) = flag_value(args, "--to") {
        filter.end_date = Some(parse_date(to)?);
    }

    let txns = db.list_transactions(&filter)?;
    if has_switch(args, "--json") {
        return print_json(&txns);
    }
    print_transactions(&txns);
    Ok(())
}

fn print_transactions(txns: &[Transaction]) {
    if txns.is_empty() {
        println!("No transactions");
        return;
    }
    println!(
        "{:<5} {:<10} {:<7} {:<19} {:>16} {:<9} Description",
        "ID", "Date", "Type", "Category", "Amount", "Status"
    );
    println!("{}", "─".repeat(100));
    for txn in txns {
        let signed = if txn.is_income() { txn.amount } else { -txn.amount };
        println!(
            "{:<5} {:<10} {:<7} {:<19} {:>16} {:<9} {}",
            txn.id,
            txn.date.to_string(),
            txn.kind.as_str(),
            txn.category.as_str(),
            format_amount(signed),
            txn.status.as_str(),
            truncate(&txn.description, 30),
        );
    }
    let pending = txns.iter().filter(|t| t.is_pending()).count();
    if pending > 0 {
        println!();
        println!("{pending} of {} pending", txns.len());
    }
}

fn cli_clear(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    let Some(id) = pos.first() else {
        anyhow::bail!("Usage: daycare-ledger clear <id>");
    };
    let id = parse_id(id, "transaction id")?;

    match db.update_status(id, TransactionStatus::Completed)? {
        StatusChange::Completed => println!("Transaction #{id} marked completed"),
        StatusChange::AlreadyCompleted => println!("Transaction #{id} was already completed"),
    }
    Ok(())
}

fn cli_budget_add(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positionals(args);
    let [category, amount, ..] = pos.as_slice() else {
        anyhow::bail!("Usage: daycare-ledger budget-add <category> <amount> [--period <p>] [--start <d>] [--end <d>]");
    };

    let start_date = match flag_value(args, "--start") {
        Some(d) => parse_date(d)?,
        None => today(args)?,
    };
    let budget = NewBudget {
        category: category.to_string(),
        amount: parse_amount(amount)?,
        period_type: flag_value(args, "--period")
            .unwrap_or(PeriodType::Monthly.as_str())
            .to_string(),
        start_date: Some(start_date),
        end_date: flag_value(args, "--end").map(parse_date).transpose()?,
        created_by: settings.acting_user,
    };

    let id = db.create_budget(&budget)?;
    println!("Created budget #{id}");
    Ok(())
}

fn cli_budgets(args: &[String], db: &Database) -> Result<()> {
    let period = flag_value(args, "--period")
        .map(|p| {
            PeriodType::parse(p)
                .ok_or_else(|| anyhow::anyhow!("Period must be monthly or weekly, got '{p}'"))
        })
        .transpose()?;

    let today = today(args)?;
    let budgets = db.list_budgets(period)?;
    if has_switch(args, "--json") {
        return print_json(&budgets);
    }
    if budgets.is_empty() {
        println!("No budgets");
        return Ok(());
    }

    println!(
        "{:<4} {:<19} {:>16} {:<8} {:<6} {:<10} End",
        "ID", "Category", "Amount", "Period", "Active", "Start"
    );
    println!("{}", "─".repeat(79));
    for budget in &budgets {
        println!(
            "{:<4} {:<19} {:>16} {:<8} {:<6} {:<10} {}",
            budget.id,
            budget.category.as_str(),
            format_amount(budget.amount),
            budget.period_type.as_str(),
            if budget.is_active_on(today) { "yes" } else { "no" },
            budget.start_date.to_string(),
            budget
                .end_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "open".to_string()),
        );
    }
    println!();
    println!(
        "Active monthly total: {}",
        format_amount(db.total_monthly_budget(today)?)
    );
    Ok(())
}

/// The payment-quote output shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuoteOutput {
    pub(super) children_count: u32,
    pub(super) rate: Decimal,
    pub(super) amount: Decimal,
    pub(super) session_type: SessionType,
    pub(super) date: NaiveDate,
}

impl QuoteOutput {
    pub(super) fn new(session_type: SessionType, children_count: u32, date: NaiveDate) -> Self {
        Self {
            children_count,
            rate: session_type.rate(),
            amount: payment::quote(session_type, children_count),
            session_type,
            date,
        }
    }
}

fn cli_quote(args: &[String]) -> Result<()> {
    let pos = positionals(args);
    let [session, children, ..] = pos.as_slice() else {
        anyhow::bail!("Usage: daycare-ledger quote <half-day|full-day> <children>");
    };
    let session = SessionType::parse(session)?;
    let children: u32 = children
        .trim()
        .parse()
        .with_context(|| format!("Invalid children count '{children}'"))?;

    let date = match flag_value(args, "--date") {
        Some(d) => parse_date(d)?,
        None => today(args)?,
    };

    let quote = QuoteOutput::new(session, children, date);
    if has_switch(args, "--json") {
        return print_json(&quote);
    }
    println!("{session} session, {children} children: {}", format_amount(quote.amount));
    Ok(())
}

fn cli_pay(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positionals(args);
    let ([babysitter, session, ..], Some(children)) = (pos.as_slice(), flag_value(args, "--children"))
    else {
        anyhow::bail!("Usage: daycare-ledger pay <babysitter-id> <half-day|full-day> --children <n> [--date <d>]");
    };

    let babysitter_id = parse_id(babysitter, "babysitter id")?;
    let session = SessionType::parse(session)?;
    let children: u32 = children
        .trim()
        .parse()
        .with_context(|| format!("Invalid children count '{children}'"))?;
    let date = match flag_value(args, "--date") {
        Some(d) => parse_date(d)?,
        None => today(args)?,
    };

    let roster = StaticRoster::new().assign(babysitter_id, children);
    let quote = payment::calculate_payment(&roster, babysitter_id, date, session)?;
    let id = payment::record_payment(db, &quote, settings.acting_user)?;

    if has_switch(args, "--json") {
        return print_json(&serde_json::json!({ "id": id, "payment": quote }));
    }
    println!(
        "Recorded pending payment #{id}: {} for babysitter {babysitter_id}",
        format_amount(quote.amount)
    );
    Ok(())
}

fn cli_summary(args: &[String], db: &Database) -> Result<()> {
    let range = range_arg(args, 0)?;
    let ledger = Ledger::new(db, today(args)?);
    let summary = ledger.financial_summary(range)?;
    if has_switch(args, "--json") {
        return print_json(&summary);
    }

    println!("Daycare ledger: {} ({range})", summary.window.label);
    println!("{}", "─".repeat(44));
    println!("  Income:       {:>20}", format_amount(summary.total_income));
    println!("  Expenses:     {:>20}", format_amount(summary.total_expense));
    println!("  Net:          {:>20}", format_amount(summary.net_income));
    println!("  Volume:       {:>20}", format_amount(summary.total));
    println!("  Transactions: {:>20}", summary.transaction_count);

    let sections = [
        ("Income by category:", &summary.by_category.income),
        ("Expenses by category:", &summary.by_category.expense),
    ];
    for (heading, totals) in sections {
        if totals.is_empty() {
            continue;
        }
        println!();
        println!("{heading}");
        for (category, total) in totals {
            println!(
                "  {:<22} {:>18}  ({} txns)",
                category.as_str(),
                format_amount(total.total),
                total.count
            );
        }
    }
    Ok(())
}

fn cli_totals(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    let Some(kind) = pos.first() else {
        anyhow::bail!("Usage: daycare-ledger totals <income|expense> [range]");
    };
    let kind = TransactionType::parse(kind)
        .ok_or_else(|| anyhow::anyhow!("Type must be income or expense, got '{kind}'"))?;
    let range = range_arg(args, 1)?;

    let summary = Ledger::new(db, today(args)?).summarize(kind, range)?;
    if has_switch(args, "--json") {
        return print_json(&summary);
    }
    println!("{kind} this {range}: {} ({} txns)", format_amount(summary.total), summary.count);
    for category in Category::for_type(kind) {
        let total = summary.category(category);
        println!(
            "  {:<22} {:>18}  ({} txns)",
            category.as_str(),
            format_amount(total.total),
            total.count
        );
    }
    Ok(())
}

fn cli_net(args: &[String], db: &Database) -> Result<()> {
    let range = range_arg(args, 0)?;
    let totals = Ledger::new(db, today(args)?).income_vs_expense(range)?;
    if has_switch(args, "--json") {
        return print_json(&totals);
    }
    println!("Income:   {:>20}", format_amount(totals.total_income));
    println!("Expenses: {:>20}", format_amount(totals.total_expense));
    println!("Net:      {:>20}", format_amount(totals.net_income));
    Ok(())
}

fn cli_categories(args: &[String]) -> Result<()> {
    let kinds = [TransactionType::Income, TransactionType::Expense];
    if has_switch(args, "--json") {
        let listing: std::collections::BTreeMap<&str, Vec<Category>> = kinds
            .iter()
            .map(|k| (k.as_str(), Category::for_type(*k)))
            .collect();
        return print_json(&listing);
    }
    for kind in kinds {
        println!("{kind}:");
        for category in Category::for_type(kind) {
            println!("  {category}");
        }
    }
    Ok(())
}

fn cli_budget_status(args: &[String], db: &Database) -> Result<()> {
    let range = range_arg(args, 0)?;
    let ledger = Ledger::new(db, today(args)?);
    let statuses = ledger.budget_status(range)?;
    if has_switch(args, "--json") {
        return print_json(&statuses);
    }
    if statuses.is_empty() {
        println!("No active monthly budgets");
        return Ok(());
    }

    println!(
        "{:<19} {:>16} {:>16} {:>6} Status",
        "Category", "Budget", "Actual", "Used"
    );
    println!("{}", "─".repeat(70));
    for status in &statuses {
        let used = status
            .utilization_percent()
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<19} {:>16} {:>16} {:>6} {}",
            status.category.as_str(),
            format_amount(status.budgeted_amount),
            format_amount(status.actual_spending),
            used,
            status.status.as_str(),
        );
    }
    Ok(())
}

fn cli_overdue(args: &[String], db: &Database) -> Result<()> {
    let ledger = Ledger::new(db, today(args)?);
    let as_of = match flag_value(args, "--as-of") {
        Some(d) => parse_date(d)?,
        None => ledger.today(),
    };
    let overdue = ledger.overdue_payments(as_of)?;
    if has_switch(args, "--json") {
        return print_json(&overdue);
    }
    if overdue.is_empty() {
        println!("No overdue parent payments");
        return Ok(());
    }
    println!("Overdue parent payments as of {as_of}:");
    print_transactions(&overdue);
    Ok(())
}

fn cli_trend(args: &[String], db: &Database) -> Result<()> {
    let range = range_arg(args, 0)?;
    let periods = match flag_value(args, "--periods") {
        Some(n) => n
            .trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid period count '{n}'"))?,
        None => DEFAULT_TREND_PERIODS,
    };
    if periods > MAX_TREND_PERIODS {
        return Err(LedgerError::invalid_input(format!(
            "--periods must be at most {MAX_TREND_PERIODS}, got {periods}"
        ))
        .into());
    }

    let points = Ledger::new(db, today(args)?).trend(range, periods)?;
    if has_switch(args, "--json") {
        return print_json(&points);
    }

    println!("{:<12} {:>18} {:>18} {:>18}", "Period", "Income", "Expenses", "Net");
    println!("{}", "─".repeat(69));
    for point in &points {
        println!(
            "{:<12} {:>18} {:>18} {:>18}",
            point.label,
            format_amount(point.income),
            format_amount(point.expense),
            format_amount(point.net),
        );
    }
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    let Some(format) = pos.first() else {
        anyhow::bail!("Usage: daycare-ledger export <pdf|csv> [range] [--out <dir>]");
    };
    let format = ReportFormat::parse(format)?;
    let range = range_arg(args, 1)?;
    let today = today(args)?;

    let ledger = Ledger::new(db, today);
    let window = ledger.window(range)?;
    let records = ledger.transactions(range)?;
    let title = format!("Financial report {} ({range})", window.label);
    let bytes = report::export(&records, format, &title)?;

    let filename = report::report_filename(range, today, format)?;
    let out_dir = flag_value(args, "--out")
        .map(shellexpand)
        .unwrap_or_else(|| ".".to_string());
    let path = Path::new(&out_dir).join(&filename);
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    let disposition = report::content_disposition(&filename);
    if has_switch(args, "--json") {
        return print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "contentType": format.content_type(),
            "contentDisposition": disposition,
            "records": records.len(),
        }));
    }
    println!("Exported {} transactions to {}", records.len(), path.display());
    println!("Content-Type: {}", format.content_type());
    println!("Content-Disposition: {disposition}");
    Ok(())
}
