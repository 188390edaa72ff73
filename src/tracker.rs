//! View state for the dashboard and expense list.
//!
//! A [`Tracker`] owns one subscription to its store. Every event reloads a
//! single snapshot and derives the whole [`ViewState`] from it again, so
//! nothing is ever patched in place.

use std::sync::mpsc::{Receiver, TryRecvError};

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Budget, Category, CategoryTotal, Expense, MONTHLY_BUDGET};
use crate::period::{DateRange, Period, YearMonth};
use crate::stats::{self, BudgetUtilization, MonthComparison};
use crate::store::{Change, ExpenseStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub period: Period,
    /// Narrows the selected period to one category.
    pub category: Option<Category>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            period: Period::Month,
            category: None,
        }
    }
}

/// Everything derivation needs, read in one pass from the store.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub expenses: Vec<Expense>,
    /// Budgets of the month containing "today".
    pub budgets: Vec<Budget>,
}

impl Snapshot {
    pub fn load<S: ExpenseStore>(store: &S, today: NaiveDate) -> Result<Self> {
        let month = YearMonth::from_date(today);
        Ok(Self {
            expenses: store.all_expenses()?,
            budgets: store.budgets_for_month(month.year, month.month0())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub today_total: f64,
    pub month_total: f64,
    pub last_month_total: f64,
    pub comparison: MonthComparison,
    pub recent: Vec<Expense>,
    /// Over every recorded expense, not just the current month.
    pub highest: Option<Expense>,
    pub budget: Option<BudgetUtilization>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// The day the view was derived for.
    pub today: NaiveDate,
    pub filter: Filter,
    pub range: DateRange,
    /// Newest first.
    pub expenses: Vec<Expense>,
    pub total: f64,
    /// Largest first; empty while a category filter is active.
    pub breakdown: Vec<CategoryTotal>,
    pub dashboard: Dashboard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// No snapshot has been read yet.
    Pending,
    Ready(ViewState),
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    StoreChanged,
    PeriodSelected(Period),
    CategorySelected(Option<Category>),
    Detach,
}

pub fn derive(snapshot: &Snapshot, filter: Filter, today: NaiveDate) -> ViewState {
    let range = filter.period.range(today);
    let mut expenses: Vec<Expense> = snapshot
        .expenses
        .iter()
        .filter(|e| range.contains(e.date))
        .filter(|e| filter.category.map_or(true, |c| e.category == c))
        .cloned()
        .collect();
    expenses.sort_by(stats::newest_first);
    let total = match filter.category {
        Some(c) => stats::category_total(&snapshot.expenses, c, range),
        None => stats::range_total(&snapshot.expenses, range),
    };
    let breakdown = match filter.category {
        Some(_) => Vec::new(),
        None => stats::sorted_by_total(stats::category_breakdown(&snapshot.expenses, range)),
    };

    ViewState {
        today,
        filter,
        range,
        expenses,
        total,
        breakdown,
        dashboard: dashboard(snapshot, today),
    }
}

fn dashboard(snapshot: &Snapshot, today: NaiveDate) -> Dashboard {
    let all = &snapshot.expenses;
    let this_month = YearMonth::from_date(today);
    let month_range = this_month.range();
    let month_total = stats::range_total(all, month_range);
    let last_month_total = stats::range_total(all, this_month.previous().range());
    let budget = snapshot
        .budgets
        .iter()
        .find(|b| b.category == MONTHLY_BUDGET)
        .map(|b| stats::budget_utilization(month_total, b.monthly_limit));

    Dashboard {
        today_total: stats::range_total(all, DateRange::day(today)),
        month_total,
        last_month_total,
        comparison: stats::compare_months(month_total, last_month_total),
        recent: stats::recent(all, month_range, stats::RECENT_LIMIT),
        highest: stats::highest_expense(all).cloned(),
        budget,
    }
}

pub struct Tracker<'a, S: ExpenseStore> {
    store: &'a S,
    changes: Option<Receiver<Change>>,
    filter: Filter,
    today: NaiveDate,
    phase: Phase,
}

impl<'a, S: ExpenseStore> Tracker<'a, S> {
    pub fn new(store: &'a S, today: NaiveDate) -> Self {
        Self {
            store,
            changes: Some(store.subscribe()),
            filter: Filter::default(),
            today,
            phase: Phase::Pending,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn view(&self) -> Option<&ViewState> {
        match &self.phase {
            Phase::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// Move "today" forward, e.g. when a long-running view crosses midnight.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn handle(&mut self, event: Event) -> Result<()> {
        if self.phase == Phase::Detached {
            tracing::trace!(?event, "ignoring event after detach");
            return Ok(());
        }
        match event {
            Event::StoreChanged => {}
            Event::PeriodSelected(period) => self.filter.period = period,
            Event::CategorySelected(category) => self.filter.category = category,
            Event::Detach => {
                self.changes = None;
                self.phase = Phase::Detached;
                return Ok(());
            }
        }
        self.recompute()
    }

    /// Drain pending store notifications; recompute once if any arrived.
    pub fn sync(&mut self) -> Result<bool> {
        let Some(rx) = &self.changes else {
            return Ok(false);
        };
        let mut pending = 0usize;
        loop {
            match rx.try_recv() {
                Ok(_) => pending += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if pending == 0 {
            return Ok(false);
        }
        tracing::debug!(pending, "store changed, recomputing view");
        self.handle(Event::StoreChanged)?;
        Ok(true)
    }

    fn recompute(&mut self) -> Result<()> {
        let snapshot = Snapshot::load(self.store, self.today)?;
        self.phase = Phase::Ready(derive(&snapshot, self.filter, self.today));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBudget, NewExpense};
    use crate::store::tests::{add, d};
    use crate::store::SqliteStore;

    fn today() -> NaiveDate {
        d(2025, 3, 20)
    }

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        add(&store, 100.0, Category::Food, d(2025, 3, 2));
        add(&store, 50.0, Category::Food, d(2025, 3, 15));
        add(&store, 30.0, Category::Transport, d(2025, 3, 20));
        add(&store, 200.0, Category::Bills, d(2025, 2, 10));
        store
    }

    #[test]
    fn test_pending_until_first_event() {
        let store = seeded();
        let mut tracker = Tracker::new(&store, today());
        assert_eq!(*tracker.phase(), Phase::Pending);
        tracker.handle(Event::StoreChanged).unwrap();
        let view = tracker.view().unwrap();
        assert_eq!(view.total, 180.0);
        assert_eq!(view.expenses.len(), 3);
        assert_eq!(view.breakdown[0], CategoryTotal { category: Category::Food, total: 150.0 });
    }

    #[test]
    fn test_dashboard_figures() {
        let store = seeded();
        store
            .upsert_budget(&NewBudget::monthly(400.0, 2025, 2).unwrap())
            .unwrap();
        let mut tracker = Tracker::new(&store, today());
        tracker.handle(Event::StoreChanged).unwrap();
        let dash = &tracker.view().unwrap().dashboard;
        assert_eq!(dash.today_total, 30.0);
        assert_eq!(dash.month_total, 180.0);
        assert_eq!(dash.last_month_total, 200.0);
        assert_eq!(dash.comparison.delta, -20.0);
        assert_eq!(dash.recent.first().map(|e| e.amount), Some(30.0));
        assert_eq!(dash.highest.as_ref().map(|e| e.amount), Some(200.0));
        assert_eq!(dash.budget.map(|b| b.fill), Some(0.45));
    }

    #[test]
    fn test_category_filter_stays_within_period() {
        let store = seeded();
        add(&store, 999.0, Category::Food, d(2024, 12, 1));
        let mut tracker = Tracker::new(&store, today());
        tracker
            .handle(Event::CategorySelected(Some(Category::Food)))
            .unwrap();
        let view = tracker.view().unwrap();
        assert_eq!(view.total, 150.0);
        assert!(view.breakdown.is_empty());

        tracker.handle(Event::PeriodSelected(Period::Year)).unwrap();
        assert_eq!(tracker.view().unwrap().total, 150.0);
        tracker.handle(Event::CategorySelected(None)).unwrap();
        assert_eq!(tracker.view().unwrap().total, 380.0);
    }

    #[test]
    fn test_sync_recomputes_after_write() {
        let store = seeded();
        let mut tracker = Tracker::new(&store, today());
        tracker.handle(Event::StoreChanged).unwrap();
        assert!(!tracker.sync().unwrap());

        store
            .insert_expense(&NewExpense::new(20.0, Category::Health, None, today()).unwrap())
            .unwrap();
        assert!(tracker.sync().unwrap());
        assert_eq!(tracker.view().unwrap().total, 200.0);
        assert!(!tracker.sync().unwrap());
    }

    #[test]
    fn test_detach_ignores_later_events() {
        let store = seeded();
        let mut tracker = Tracker::new(&store, today());
        tracker.handle(Event::Detach).unwrap();
        tracker.handle(Event::StoreChanged).unwrap();
        assert_eq!(*tracker.phase(), Phase::Detached);
        add(&store, 1.0, Category::Food, today());
        assert!(!tracker.sync().unwrap());
    }

    #[test]
    fn test_derive_is_pure() {
        let store = seeded();
        let snapshot = Snapshot::load(&store, today()).unwrap();
        let filter = Filter::default();
        assert_eq!(derive(&snapshot, filter, today()), derive(&snapshot, filter, today()));
        let empty = derive(&Snapshot::default(), filter, today());
        assert_eq!(empty.total, 0.0);
        assert!(empty.dashboard.highest.is_none());
        assert!(empty.dashboard.budget.is_none());
        assert_eq!(empty.dashboard.comparison.percent_change, 0.0);
    }
}
