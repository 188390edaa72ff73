//! Totals, breakdowns and comparisons derived from a list of expenses.
//!
//! Everything here is a pure reduction over the records it is given.
//! Absent data degrades to zero, an empty list, or `None`; nothing fails.

use std::cmp::Ordering;

use crate::models::{Category, CategoryTotal, Expense};
use crate::period::{DateRange, YearMonth};

/// Number of current-month expenses shown on the dashboard.
pub const RECENT_LIMIT: usize = 10;

pub fn range_total(expenses: &[Expense], range: DateRange) -> f64 {
    expenses
        .iter()
        .filter(|e| range.contains(e.date))
        .map(|e| e.amount)
        .sum()
}

pub fn category_total(expenses: &[Expense], category: Category, range: DateRange) -> f64 {
    expenses
        .iter()
        .filter(|e| e.category == category && range.contains(e.date))
        .map(|e| e.amount)
        .sum()
}

/// Sum per category over `range`. Categories with no expenses in the range
/// are omitted. Order carries no meaning; see [`sorted_by_total`].
pub fn category_breakdown(expenses: &[Expense], range: DateRange) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for e in expenses.iter().filter(|e| range.contains(e.date)) {
        match totals.iter_mut().find(|t| t.category == e.category) {
            Some(t) => t.total += e.amount,
            None => totals.push(CategoryTotal {
                category: e.category,
                total: e.amount,
            }),
        }
    }
    totals
}

/// Largest total first; equal totals fall back to category order.
pub fn sorted_by_total(mut totals: Vec<CategoryTotal>) -> Vec<CategoryTotal> {
    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthComparison {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    /// `delta / previous * 100`, or exactly 0 when there was no previous
    /// spending.
    pub percent_change: f64,
}

impl MonthComparison {
    pub fn is_increase(&self) -> bool {
        self.delta > 0.0
    }
}

pub fn compare_months(current: f64, previous: f64) -> MonthComparison {
    let delta = current - previous;
    let percent_change = if previous > 0.0 {
        delta / previous * 100.0
    } else {
        0.0
    };
    MonthComparison {
        current,
        previous,
        delta,
        percent_change,
    }
}

/// The single largest expense. Equal amounts resolve to the most recent
/// one: later date first, then the higher id.
pub fn highest_expense(expenses: &[Expense]) -> Option<&Expense> {
    expenses.iter().max_by(|a, b| {
        a.amount
            .total_cmp(&b.amount)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Expenses in `range`, newest first, capped at `limit`.
pub fn recent(expenses: &[Expense], range: DateRange, limit: usize) -> Vec<Expense> {
    let mut in_range: Vec<Expense> = expenses
        .iter()
        .filter(|e| range.contains(e.date))
        .cloned()
        .collect();
    in_range.sort_by(newest_first);
    in_range.truncate(limit);
    in_range
}

pub fn newest_first(a: &Expense, b: &Expense) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLevel {
    /// Under half the limit spent.
    Comfortable,
    /// Under three quarters.
    Warning,
    /// Three quarters or more, up to the limit.
    Critical,
    OverBudget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetUtilization {
    pub spent: f64,
    pub limit: f64,
    /// `spent / limit`, unclamped.
    pub ratio: f64,
    /// Ratio clamped to `[0, 1]` for fill indicators.
    pub fill: f64,
    /// `limit - spent`; negative once over budget.
    pub remaining: f64,
    /// `spent - limit` when over budget.
    pub overage: Option<f64>,
    pub level: BudgetLevel,
}

pub fn budget_utilization(spent: f64, limit: f64) -> BudgetUtilization {
    let ratio = if limit > 0.0 { spent / limit } else { 0.0 };
    let fill = ratio.clamp(0.0, 1.0);
    let overage = (limit > 0.0 && spent > limit).then(|| spent - limit);
    let level = if overage.is_some() {
        BudgetLevel::OverBudget
    } else if fill < 0.5 {
        BudgetLevel::Comfortable
    } else if fill < 0.75 {
        BudgetLevel::Warning
    } else {
        BudgetLevel::Critical
    };
    BudgetUtilization {
        spent,
        limit,
        ratio,
        fill,
        remaining: limit - spent,
        overage,
        level,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthTotal {
    pub month: YearMonth,
    pub total: f64,
    pub count: usize,
}

/// Totals for the `count` months ending at `last`, oldest first.
pub fn monthly_history(expenses: &[Expense], last: YearMonth, count: usize) -> Vec<MonthTotal> {
    last.trailing(count)
        .into_iter()
        .map(|month| {
            let range = month.range();
            let in_month = expenses.iter().filter(|e| range.contains(e.date));
            let (total, count) = in_month.fold((0.0, 0), |(t, c), e| (t + e.amount, c + 1));
            MonthTotal { month, total, count }
        })
        .collect()
}
