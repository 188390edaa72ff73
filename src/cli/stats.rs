use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_store, parse_month_opt, signed_in_settings};
use crate::error::Result;
use crate::fmt::{gauge, money, signed_pct};
use crate::stats::{category_breakdown, compare_months, monthly_history, sorted_by_total};
use crate::store::ExpenseStore;

const BAR_WIDTH: usize = 24;

pub fn run(months: usize, month: Option<&str>) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let currency = settings.currency();
    let focus = parse_month_opt(month)?;
    let expenses = store.all_expenses()?;

    let history = monthly_history(&expenses, focus, months.max(1));
    let peak = history.iter().map(|m| m.total).fold(0.0, f64::max);
    let mut table = Table::new();
    table.set_header(vec!["Month", "Expenses", "Total", ""]);
    for m in &history {
        let fill = if peak > 0.0 { m.total / peak } else { 0.0 };
        table.add_row(vec![
            Cell::new(m.month.label()),
            Cell::new(m.count).set_alignment(CellAlignment::Right),
            Cell::new(money(m.total, currency)).set_alignment(CellAlignment::Right),
            Cell::new(gauge(fill, BAR_WIDTH)),
        ]);
    }
    println!("{}\n{table}", "Monthly spending".bold());

    let range = focus.range();
    let current: f64 = history.last().map(|m| m.total).unwrap_or_default();
    let previous = crate::stats::range_total(&expenses, focus.previous().range());
    let cmp = compare_months(current, previous);
    println!(
        "\n{} vs {}: {} ({})",
        focus.label(),
        focus.previous().label(),
        money(cmp.delta, currency),
        signed_pct(cmp.percent_change)
    );

    let breakdown = sorted_by_total(category_breakdown(&expenses, range));
    println!("\n{}", format!("By category, {}", focus.label()).bold());
    if breakdown.is_empty() {
        println!("No expenses recorded.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%"]);
    for item in &breakdown {
        let pct = if current > 0.0 { item.total / current * 100.0 } else { 0.0 };
        table.add_row(vec![
            Cell::new(item.category),
            Cell::new(money(item.total, currency)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{pct:.1}%")).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}
