//! The write path: every user-initiated change goes through the store first
//! and is then reported to analytics.

use crate::currency::{self, Currency};
use crate::error::{OutlayError, Result};
use crate::models::{Budget, Expense, NewBudget, NewExpense, MONTHLY_BUDGET};
use crate::period::YearMonth;
use crate::settings::Settings;
use crate::stats::{budget_utilization, BudgetUtilization};
use crate::store::ExpenseStore;
use crate::telemetry::{Analytics, AnalyticsEvent};

/// Fill ratio at which a budget warning is raised.
pub const WARNING_THRESHOLD: f64 = 0.75;

pub struct Ledger<'a, S: ExpenseStore> {
    store: &'a S,
    analytics: &'a dyn Analytics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Added {
    pub id: i64,
    /// Utilization of the expense's month, when that month has a budget.
    pub budget: Option<BudgetUtilization>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetChange {
    Created(i64),
    Updated { id: i64, previous_limit: f64 },
}

impl<'a, S: ExpenseStore> Ledger<'a, S> {
    pub fn new(store: &'a S, analytics: &'a dyn Analytics) -> Self {
        Self { store, analytics }
    }

    pub fn add_expense(&self, expense: NewExpense) -> Result<Added> {
        let is_first_expense = !self.store.has_expenses()?;
        let month = YearMonth::from_date(expense.date);
        let spent_before = self.store.total_in_range(month.range())?;

        let id = self.store.insert_expense(&expense)?;
        self.analytics.record(AnalyticsEvent::ExpenseAdded {
            amount: expense.amount,
            category: expense.category,
            has_note: expense.description.is_some(),
            is_first_expense,
        });

        let budget = self.monthly_budget(month)?.map(|b| {
            let before = budget_utilization(spent_before, b.monthly_limit);
            let after = budget_utilization(spent_before + expense.amount, b.monthly_limit);
            self.record_threshold_crossing(&before, &after);
            after
        });
        Ok(Added { id, budget })
    }

    fn record_threshold_crossing(&self, before: &BudgetUtilization, after: &BudgetUtilization) {
        let percentage = (after.ratio * 100.0) as u32;
        if before.overage.is_none() && after.overage.is_some() {
            self.analytics.record(AnalyticsEvent::BudgetExceeded {
                budget_amount: after.limit,
                spent_amount: after.spent,
                percentage,
            });
        } else if before.ratio < WARNING_THRESHOLD && after.ratio >= WARNING_THRESHOLD && after.overage.is_none() {
            self.analytics.record(AnalyticsEvent::BudgetWarning {
                budget_amount: after.limit,
                spent_amount: after.spent,
                percentage,
            });
        }
    }

    pub fn update_expense(&self, expense: &Expense) -> Result<()> {
        crate::models::validate_amount(expense.amount)?;
        self.store.update_expense(expense)?;
        self.analytics.record(AnalyticsEvent::ExpenseUpdated {
            amount: expense.amount,
            category: expense.category,
        });
        Ok(())
    }

    pub fn delete_expense(&self, id: i64) -> Result<Expense> {
        let expense = self
            .store
            .expense(id)?
            .ok_or_else(|| OutlayError::NotFound(format!("Expense {id}")))?;
        self.store.delete_expense(id)?;
        self.analytics.record(AnalyticsEvent::ExpenseDeleted {
            amount: expense.amount,
            category: expense.category,
        });
        Ok(expense)
    }

    pub fn monthly_budget(&self, month: YearMonth) -> Result<Option<Budget>> {
        self.store
            .budget_for_category(MONTHLY_BUDGET, month.year, month.month0())
    }

    pub fn set_monthly_budget(&self, limit: f64, month: YearMonth) -> Result<BudgetChange> {
        let budget = NewBudget::monthly(limit, month.year, month.month0())?;
        match self.monthly_budget(month)? {
            Some(mut existing) => {
                let previous_limit = existing.monthly_limit;
                existing.monthly_limit = limit;
                self.store.update_budget(&existing)?;
                self.analytics.record(AnalyticsEvent::BudgetUpdated {
                    old_amount: previous_limit,
                    new_amount: limit,
                    category: existing.category.clone(),
                });
                Ok(BudgetChange::Updated {
                    id: existing.id,
                    previous_limit,
                })
            }
            None => {
                let id = self.store.upsert_budget(&budget)?;
                self.analytics.record(AnalyticsEvent::BudgetSet {
                    amount: limit,
                    category: budget.category,
                });
                Ok(BudgetChange::Created(id))
            }
        }
    }

    pub fn delete_monthly_budget(&self, month: YearMonth) -> Result<Option<Budget>> {
        let Some(existing) = self.monthly_budget(month)? else {
            return Ok(None);
        };
        self.store.delete_budget(existing.id)?;
        self.analytics.record(AnalyticsEvent::BudgetDeleted {
            amount: existing.monthly_limit,
            category: existing.category.clone(),
        });
        Ok(Some(existing))
    }
}

/// Switch the display currency. Stored amounts are left untouched; the
/// caller persists `settings`.
pub fn change_currency(
    settings: &mut Settings,
    code: &str,
    analytics: &dyn Analytics,
) -> Result<&'static Currency> {
    let next = currency::by_code(code).ok_or_else(|| OutlayError::UnknownCurrency(code.to_string()))?;
    let previous = settings.currency();
    settings.currency_code = next.code.to_string();
    if previous.code != next.code {
        analytics.record(AnalyticsEvent::CurrencyChanged {
            from: previous.code.to_string(),
            to: next.code.to_string(),
        });
    }
    Ok(next)
}

pub fn sign_in(settings: &mut Settings, name: &str, analytics: &dyn Analytics) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OutlayError::Other("name cannot be empty".to_string()));
    }
    settings.user_name = name.to_string();
    analytics.record(AnalyticsEvent::UserSignedIn);
    Ok(())
}

/// Returns false when nobody was signed in.
pub fn sign_out(settings: &mut Settings, analytics: &dyn Analytics) -> bool {
    if settings.user_name.is_empty() {
        return false;
    }
    settings.user_name.clear();
    analytics.record(AnalyticsEvent::UserSignedOut);
    true
}
