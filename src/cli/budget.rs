use crate::actions::{BudgetChange, Ledger};
use crate::cli::dashboard::budget_lines;
use crate::cli::{event_log, open_store, parse_month_opt, signed_in_settings};
use crate::error::Result;
use crate::fmt::money;
use crate::stats::budget_utilization;
use crate::store::ExpenseStore;

pub fn set(amount: f64, month: Option<&str>) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);
    let month = parse_month_opt(month)?;
    let currency = settings.currency();

    match Ledger::new(&store, analytics.as_ref()).set_monthly_budget(amount, month)? {
        BudgetChange::Created(_) => {
            println!("Budget for {} set to {}", month.label(), money(amount, currency));
        }
        BudgetChange::Updated { previous_limit, .. } => println!(
            "Budget for {} changed from {} to {}",
            month.label(),
            money(previous_limit, currency),
            money(amount, currency)
        ),
    }
    Ok(())
}

pub fn show(month: Option<&str>) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);
    let month = parse_month_opt(month)?;
    let currency = settings.currency();

    let Some(budget) = Ledger::new(&store, analytics.as_ref()).monthly_budget(month)? else {
        println!("No budget set for {}.", month.label());
        return Ok(());
    };
    let spent = store.total_in_range(month.range())?;
    println!("Budget for {}: {}", month.label(), money(budget.monthly_limit, currency));
    print!("{}", budget_lines(&budget_utilization(spent, budget.monthly_limit), currency));
    Ok(())
}

pub fn clear(month: Option<&str>) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let analytics = event_log(&settings);
    let month = parse_month_opt(month)?;

    match Ledger::new(&store, analytics.as_ref()).delete_monthly_budget(month)? {
        Some(_) => println!("Removed budget for {}.", month.label()),
        None => println!("No budget set for {}.", month.label()),
    }
    Ok(())
}
