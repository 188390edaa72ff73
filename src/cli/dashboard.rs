use std::time::Duration;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::expenses::expense_table;
use crate::cli::{open_store, signed_in_settings, today};
use crate::currency::Currency;
use crate::error::Result;
use crate::fmt::{gauge, money, signed_pct};
use crate::settings::Settings;
use crate::stats::{BudgetLevel, BudgetUtilization};
use crate::tracker::{Dashboard, Event, Tracker, ViewState};

const GAUGE_WIDTH: usize = 30;

pub fn run() -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let mut tracker = Tracker::new(&store, today());
    tracker.handle(Event::StoreChanged)?;
    if let Some(view) = tracker.view() {
        print!("{}", render(view, &settings));
    }
    Ok(())
}

/// Redraw the dashboard whenever this or another process writes to the store.
pub fn watch(interval: u64) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let mut tracker = Tracker::new(&store, today());
    tracker.handle(Event::StoreChanged)?;
    let interval = Duration::from_secs(interval.max(1));

    loop {
        if let Some(view) = tracker.view() {
            print!("\x1B[2J\x1B[H{}", render(view, &settings));
            println!("\n{}", "Watching for changes. Press Ctrl-C to stop.".dimmed());
        }
        loop {
            std::thread::sleep(interval);
            let now = today();
            let date_changed = tracker.view().is_some_and(|v| v.today != now);
            if date_changed {
                tracker.set_today(now);
                tracker.handle(Event::StoreChanged)?;
                break;
            }
            store.poll_external()?;
            if tracker.sync()? {
                break;
            }
        }
    }
}

fn render(view: &ViewState, settings: &Settings) -> String {
    let currency = settings.currency();
    let dash = &view.dashboard;
    let mut out = String::new();

    out.push_str(&format!("{}\n", format!("Hello, {}", settings.user_name).bold()));
    out.push_str(&format!("{}\n\n", view.today.format("%A, %d %B %Y")));

    let mut table = Table::new();
    table.add_row(vec![Cell::new("Today"), amount_cell(dash.today_total, currency)]);
    table.add_row(vec![Cell::new("This month"), amount_cell(dash.month_total, currency)]);
    table.add_row(vec![Cell::new("Last month"), amount_cell(dash.last_month_total, currency)]);
    table.add_row(vec![Cell::new("Change"), Cell::new(change_label(dash, currency))]);
    if let Some(e) = &dash.highest {
        table.add_row(vec![
            Cell::new("Highest expense"),
            Cell::new(format!("{} ({}, {})", money(e.amount, currency), e.category, e.date)),
        ]);
    }
    out.push_str(&format!("{table}\n"));

    match &dash.budget {
        Some(budget) => out.push_str(&budget_lines(budget, currency)),
        None => out.push_str(&format!(
            "\n{}\n",
            "No budget set for this month. Use `outlay budget set <amount>`.".dimmed()
        )),
    }

    out.push_str(&format!("\n{}\n", "Recent expenses".bold()));
    if dash.recent.is_empty() {
        out.push_str("No expenses this month yet.\n");
    } else {
        out.push_str(&format!("{}\n", expense_table(&dash.recent, currency)));
    }
    out
}

fn amount_cell(val: f64, currency: &Currency) -> Cell {
    Cell::new(money(val, currency)).set_alignment(CellAlignment::Right)
}

fn change_label(dash: &Dashboard, currency: &Currency) -> String {
    let cmp = &dash.comparison;
    let text = format!("{} ({})", money(cmp.delta, currency), signed_pct(cmp.percent_change));
    if cmp.is_increase() {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

pub(crate) fn budget_lines(budget: &BudgetUtilization, currency: &Currency) -> String {
    let bar = gauge(budget.fill, GAUGE_WIDTH);
    let bar = match budget.level {
        BudgetLevel::Comfortable => bar.green(),
        BudgetLevel::Warning => bar.yellow(),
        BudgetLevel::Critical | BudgetLevel::OverBudget => bar.red(),
    };
    let mut out = format!(
        "\nBudget  {bar} {:.0}%\n        {} of {}",
        budget.ratio * 100.0,
        money(budget.spent, currency),
        money(budget.limit, currency)
    );
    match budget.overage {
        Some(over) => out.push_str(&format!(
            ", {}\n",
            format!("over by {}", money(over, currency)).red().bold()
        )),
        None => out.push_str(&format!(", {} left\n", money(budget.remaining, currency))),
    }
    out
}
