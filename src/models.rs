use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{OutlayError, Result};

/// Category label used by the budget write path. Budgets are stored per
/// category, but only this single overall bucket is ever written.
pub const MONTHLY_BUDGET: &str = "Monthly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Others,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}' (expected one of: Food, Transport, Shopping, Bills, Entertainment, Health, Others)")]
pub struct ParseCategoryError(pub String);

impl From<ParseCategoryError> for OutlayError {
    fn from(e: ParseCategoryError) -> Self {
        OutlayError::UnknownCategory(e.0)
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-supplied fields of an expense, before the store assigns an id
/// and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewExpense {
    pub fn new(amount: f64, category: Category, description: Option<String>, date: NaiveDate) -> Result<Self> {
        validate_amount(amount)?;
        Ok(Self {
            amount,
            category,
            description: normalize_description(description),
            date,
        })
    }
}

pub fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(OutlayError::InvalidAmount(amount))
    }
}

/// Blank notes are stored as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub monthly_limit: f64,
    pub year: i32,
    /// Zero-based: January is 0.
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category: String,
    pub monthly_limit: f64,
    pub year: i32,
    pub month: u32,
}

impl NewBudget {
    pub fn monthly(monthly_limit: f64, year: i32, month: u32) -> Result<Self> {
        validate_amount(monthly_limit)?;
        Ok(Self {
            category: MONTHLY_BUDGET.to_string(),
            monthly_limit,
            year,
            month,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_case_insensitively() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" TRANSPORT ".parse::<Category>().unwrap(), Category::Transport);
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_label_roundtrip() {
        for c in Category::ALL {
            assert_eq!(c.label().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn test_new_expense_rejects_non_positive_amount() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(NewExpense::new(0.0, Category::Food, None, date).is_err());
        assert!(NewExpense::new(-5.0, Category::Food, None, date).is_err());
        assert!(NewExpense::new(f64::NAN, Category::Food, None, date).is_err());
        assert!(NewExpense::new(0.01, Category::Food, None, date).is_ok());
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let e = NewExpense::new(5.0, Category::Food, Some("   ".into()), date).unwrap();
        assert_eq!(e.description, None);
        let e = NewExpense::new(5.0, Category::Food, Some(" lunch ".into()), date).unwrap();
        assert_eq!(e.description.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_monthly_budget_uses_constant_bucket() {
        let b = NewBudget::monthly(500.0, 2025, 0).unwrap();
        assert_eq!(b.category, MONTHLY_BUDGET);
        assert!(NewBudget::monthly(0.0, 2025, 0).is_err());
    }
}
