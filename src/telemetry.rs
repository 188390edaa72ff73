//! Local stand-ins for the identity and analytics collaborators.
//!
//! Analytics is fire-and-forget: a sink that fails logs the failure and
//! returns, and callers never observe the outcome.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Category;
use crate::settings::Settings;

pub const EVENT_LOG_FILE: &str = "events.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    ExpenseAdded {
        amount: f64,
        category: Category,
        has_note: bool,
        is_first_expense: bool,
    },
    ExpenseUpdated {
        amount: f64,
        category: Category,
    },
    ExpenseDeleted {
        amount: f64,
        category: Category,
    },
    BudgetSet {
        amount: f64,
        category: String,
    },
    BudgetUpdated {
        old_amount: f64,
        new_amount: f64,
        category: String,
    },
    BudgetDeleted {
        amount: f64,
        category: String,
    },
    BudgetWarning {
        budget_amount: f64,
        spent_amount: f64,
        percentage: u32,
    },
    BudgetExceeded {
        budget_amount: f64,
        spent_amount: f64,
        percentage: u32,
    },
    CurrencyChanged {
        from: String,
        to: String,
    },
    PeriodChanged {
        period: String,
    },
    CategoryFiltered {
        category: Category,
    },
    UserSignedIn,
    UserSignedOut,
}

pub trait Analytics {
    fn record(&self, event: AnalyticsEvent);
}

/// Drops every event.
pub struct Discard;

impl Analytics for Discard {
    fn record(&self, _event: AnalyticsEvent) {}
}

#[derive(Serialize)]
struct LoggedEvent<'a> {
    at: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a AnalyticsEvent,
}

/// Appends events as JSON lines to a file in the data directory.
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(EVENT_LOG_FILE),
        }
    }

    fn append(&self, event: &AnalyticsEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(&LoggedEvent { at: Utc::now(), event })?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl Analytics for EventLog {
    fn record(&self, event: AnalyticsEvent) {
        match self.append(&event) {
            Ok(()) => tracing::debug!(?event, "recorded event"),
            Err(e) => tracing::warn!(error = %e, path = %self.path.display(), "failed to record event"),
        }
    }
}

pub trait Identity {
    fn is_authenticated(&self) -> bool;
}

/// Signed in when settings carry a user name.
pub struct LocalIdentity<'a> {
    settings: &'a Settings,
}

impl<'a> LocalIdentity<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

impl Identity for LocalIdentity<'_> {
    fn is_authenticated(&self) -> bool {
        !self.settings.user_name.trim().is_empty()
    }
}
