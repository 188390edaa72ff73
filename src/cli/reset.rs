use crate::cli::{open_store, signed_in_settings};
use crate::error::{OutlayError, Result};
use crate::store::ExpenseStore;

pub fn run(yes: bool) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    if !yes {
        return Err(OutlayError::Other(format!(
            "This deletes {} expenses and {} budgets. Re-run with --yes to confirm.",
            store.expense_count()?,
            store.budget_count()?
        )));
    }
    store.clear_all()?;
    println!("All expenses and budgets deleted.");
    Ok(())
}
