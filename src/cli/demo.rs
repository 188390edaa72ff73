use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cli::{open_store, signed_in_settings, today};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{Category, NewBudget, NewExpense};
use crate::period::YearMonth;
use crate::store::{ExpenseStore, SqliteStore};

/// Months of history generated, ending at the current month.
const DEMO_MONTHS: u32 = 6;
const DEMO_BUDGET: f64 = 25000.0;

/// Recurring expenses booked every month.
struct Recurring {
    day: u32,
    category: Category,
    note: &'static str,
    amount: f64,
}

const RECURRING: &[Recurring] = &[
    Recurring { day: 1, category: Category::Bills, note: "Rent", amount: 12000.0 },
    Recurring { day: 5, category: Category::Bills, note: "Electricity", amount: 1450.0 },
    Recurring { day: 5, category: Category::Bills, note: "Mobile recharge", amount: 399.0 },
    Recurring { day: 8, category: Category::Entertainment, note: "Streaming subscription", amount: 649.0 },
    Recurring { day: 10, category: Category::Health, note: "Gym membership", amount: 1200.0 },
];

/// Everyday spending: (category, note, low, high).
const EVERYDAY: &[(Category, &str, f64, f64)] = &[
    (Category::Food, "Groceries", 400.0, 1800.0),
    (Category::Food, "Lunch", 120.0, 450.0),
    (Category::Food, "Coffee", 60.0, 220.0),
    (Category::Transport, "Metro card top-up", 200.0, 500.0),
    (Category::Transport, "Cab", 150.0, 700.0),
    (Category::Shopping, "Clothes", 800.0, 3500.0),
    (Category::Shopping, "Household supplies", 250.0, 900.0),
    (Category::Entertainment, "Movie tickets", 300.0, 900.0),
    (Category::Health, "Pharmacy", 90.0, 600.0),
    (Category::Others, "Gift", 500.0, 2000.0),
];

/// Everyday expenses generated per month.
const EVERYDAY_PER_MONTH: usize = 12;

fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let ym = YearMonth { year, month };
    let last = ym.range().end().day();
    NaiveDate::from_ymd_opt(year, month, day.min(last)).unwrap_or_else(|| ym.first_day())
}

/// Build the demo expenses. Nothing is dated after `today`.
fn generate_expenses(today: NaiveDate, seed: u64) -> Vec<NewExpense> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();

    for months_ago in (0..DEMO_MONTHS).rev() {
        let target = today - Months::new(months_ago);
        let (year, month) = (target.year(), target.month());

        for r in RECURRING {
            out.push((clamp_day(year, month, r.day), r.category, r.note, r.amount));
        }
        for _ in 0..EVERYDAY_PER_MONTH {
            let (category, note, low, high) = EVERYDAY[rng.gen_range(0..EVERYDAY.len())];
            let amount = (rng.gen_range(low..high) * 100.0).round() / 100.0;
            let day = rng.gen_range(1..=28);
            out.push((clamp_day(year, month, day), category, note, amount));
        }
    }

    out.into_iter()
        .filter(|(date, ..)| *date <= today)
        .filter_map(|(date, category, note, amount)| {
            NewExpense::new(amount, category, Some(note.to_string()), date).ok()
        })
        .collect()
}

fn insert_demo_data(store: &SqliteStore, today: NaiveDate) -> Result<usize> {
    let expenses = generate_expenses(today, today.num_days_from_ce() as u64);
    let tx = store.connection().unchecked_transaction()?;
    for e in &expenses {
        store.insert_expense(e)?;
    }
    tx.commit()?;
    let month = YearMonth::from_date(today);
    store.upsert_budget(&NewBudget::monthly(DEMO_BUDGET, month.year, month.month0())?)?;
    Ok(expenses.len())
}

pub fn run() -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;

    if store.expense_count()? > 0 {
        println!("Database already has expenses; demo data not loaded.");
        return Ok(());
    }
    let count = insert_demo_data(&store, today())?;
    tracing::info!(count, "loaded demo data");
    println!(
        "Loaded {count} sample expenses and a monthly budget of {}.",
        money(DEMO_BUDGET, settings.currency())
    );
    println!("Try `outlay dashboard` or `outlay stats`.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_generate_expenses_span_six_months() {
        let today = d(2025, 3, 31);
        let expenses = generate_expenses(today, 7);
        assert_eq!(expenses.len(), 6 * (RECURRING.len() + EVERYDAY_PER_MONTH));
        let months: std::collections::BTreeSet<YearMonth> =
            expenses.iter().map(|e| YearMonth::from_date(e.date)).collect();
        assert_eq!(months.len(), 6);
        assert_eq!(months.iter().next(), Some(&YearMonth { year: 2024, month: 10 }));
    }

    #[test]
    fn test_nothing_dated_in_the_future() {
        let today = d(2025, 3, 3);
        assert!(generate_expenses(today, 1).iter().all(|e| e.date <= today));
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let today = d(2025, 3, 31);
        assert_eq!(generate_expenses(today, 42), generate_expenses(today, 42));
    }

    #[test]
    fn test_insert_demo_data() {
        let store = SqliteStore::open_in_memory().unwrap();
        let today = d(2025, 3, 15);
        let count = insert_demo_data(&store, today).unwrap();
        assert_eq!(store.expense_count().unwrap() as usize, count);
        let budget = store.budget_for_category("Monthly", 2025, 2).unwrap().unwrap();
        assert_eq!(budget.monthly_limit, DEMO_BUDGET);
    }
}
