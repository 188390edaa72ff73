use crate::db::db_path;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::period::YearMonth;
use crate::settings::load_settings;
use crate::store::{ExpenseStore, SqliteStore};
use crate::telemetry::{Identity, LocalIdentity};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = settings.data_dir();
    let db_path = db_path(&data_dir);
    let currency = settings.currency();
    let signed_in = LocalIdentity::new(&settings).is_authenticated();

    println!("User:       {}", if signed_in { settings.user_name.as_str() } else { "(not signed in)" });
    println!("Currency:   {} {} ({})", currency.flag, currency.name, currency.code);
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let store = SqliteStore::open(&db_path)?;
        let month = YearMonth::from_date(crate::cli::today());
        let month_total = store.total_in_range(month.range())?;

        println!();
        println!("Expenses:      {}", store.expense_count()?);
        println!("Budgets:       {}", store.budget_count()?);
        println!("This month:    {}", money(month_total, currency));
    } else {
        println!();
        println!("Database not found. Run `outlay init` to set up.");
    }

    Ok(())
}
