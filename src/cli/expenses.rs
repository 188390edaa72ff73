use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::actions::Ledger;
use crate::cli::{event_log, open_store, parse_date, resolve_period, signed_in_settings, today, PeriodArg};
use crate::currency::Currency;
use crate::error::{OutlayError, Result};
use crate::fmt::money;
use crate::models::{normalize_description, Category, Expense, NewExpense};
use crate::stats::{BudgetLevel, BudgetUtilization};
use crate::store::ExpenseStore;
use crate::telemetry::{Analytics, AnalyticsEvent};
use crate::tracker::{Event, Filter, Tracker};

pub fn add(amount: f64, category: &str, note: Option<String>, date: Option<&str>) -> Result<()> {
    let settings = signed_in_settings()?;
    let currency = settings.currency();
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);

    let category: Category = category.parse()?;
    let date = date.map(parse_date).transpose()?.unwrap_or_else(today);
    let expense = NewExpense::new(amount, category, note, date)?;

    let added = Ledger::new(&store, analytics.as_ref()).add_expense(expense)?;
    println!(
        "Added expense #{}: {} {} on {}",
        added.id,
        category,
        money(amount, currency),
        date
    );
    if let Some(budget) = added.budget {
        print_budget_notice(&budget, currency);
    }
    Ok(())
}

fn print_budget_notice(budget: &BudgetUtilization, currency: &Currency) {
    match budget.level {
        BudgetLevel::OverBudget => {
            let over = money(budget.overage.unwrap_or_default(), currency);
            println!("{}", format!("Over budget by {over} this month.").red().bold());
        }
        BudgetLevel::Critical => {
            let left = money(budget.remaining, currency);
            println!(
                "{}",
                format!("{:.0}% of this month's budget used, {left} left.", budget.ratio * 100.0).yellow()
            );
        }
        BudgetLevel::Comfortable | BudgetLevel::Warning => {}
    }
}

pub fn edit(
    id: i64,
    amount: Option<f64>,
    category: Option<&str>,
    note: Option<String>,
    clear_note: bool,
    date: Option<&str>,
) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);

    let mut expense = store
        .expense(id)?
        .ok_or_else(|| OutlayError::NotFound(format!("Expense {id}")))?;
    if let Some(amount) = amount {
        expense.amount = amount;
    }
    if let Some(category) = category {
        expense.category = category.parse()?;
    }
    if clear_note {
        expense.description = None;
    } else if note.is_some() {
        expense.description = normalize_description(note);
    }
    if let Some(date) = date {
        expense.date = parse_date(date)?;
    }

    Ledger::new(&store, analytics.as_ref()).update_expense(&expense)?;
    println!(
        "Updated expense #{id}: {} {} on {}",
        expense.category,
        money(expense.amount, settings.currency()),
        expense.date
    );
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);
    let removed = Ledger::new(&store, analytics.as_ref()).delete_expense(id)?;
    println!(
        "Deleted expense #{id}: {} {} on {}",
        removed.category,
        money(removed.amount, settings.currency()),
        removed.date
    );
    Ok(())
}

pub fn list(
    period: PeriodArg,
    from_date: Option<&str>,
    to_date: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);
    let period = resolve_period(period, from_date, to_date)?;
    let category = category.map(str::parse::<Category>).transpose()?;

    if period != Filter::default().period {
        analytics.record(AnalyticsEvent::PeriodChanged {
            period: period.name().to_string(),
        });
    }
    if let Some(category) = category {
        analytics.record(AnalyticsEvent::CategoryFiltered { category });
    }

    let mut tracker = Tracker::new(&store, today()).with_filter(Filter { period, category });
    tracker.handle(Event::StoreChanged)?;
    let Some(view) = tracker.view() else {
        return Ok(());
    };
    let currency = settings.currency();

    let heading = match category {
        Some(c) => format!("{c} expenses, {}", view.range),
        None => format!("Expenses, {}", view.range),
    };
    println!("{}", heading.bold());
    if view.expenses.is_empty() {
        println!("No expenses recorded.");
        return Ok(());
    }

    println!("{}", expense_table(&view.expenses, currency));
    println!("Total: {}", money(view.total, currency).bold());

    if !view.breakdown.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%"]);
        for item in &view.breakdown {
            let pct = if view.total > 0.0 { item.total / view.total * 100.0 } else { 0.0 };
            table.add_row(vec![
                Cell::new(item.category),
                Cell::new(money(item.total, currency)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{pct:.1}%")).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("\nBy category\n{table}");
    }
    Ok(())
}

pub(crate) fn expense_table(expenses: &[Expense], currency: &Currency) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Amount", "Note"]);
    for e in expenses {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.date),
            Cell::new(e.category),
            Cell::new(money(e.amount, currency)).set_alignment(CellAlignment::Right),
            Cell::new(e.description.as_deref().unwrap_or_default()),
        ]);
    }
    table
}
