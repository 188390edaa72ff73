pub mod account;
pub mod backup;
pub mod budget;
pub mod currency;
pub mod dashboard;
pub mod demo;
pub mod expenses;
pub mod export;
pub mod init;
pub mod reset;
pub mod stats;
pub mod status;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

use crate::db::db_path;
use crate::error::{OutlayError, Result};
use crate::period::{DateRange, Period, YearMonth};
use crate::settings::{load_settings, Settings};
use crate::store::SqliteStore;
use crate::telemetry::{Analytics, Discard, EventLog, Identity, LocalIdentity};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| OutlayError::Other(format!("Invalid date '{s}' (expected YYYY-MM-DD)")))
}

pub(crate) fn parse_month_opt(month: Option<&str>) -> Result<YearMonth> {
    match month {
        Some(m) => m.parse().map_err(|e| OutlayError::Other(format!("{e}"))),
        None => Ok(YearMonth::from_date(today())),
    }
}

/// Resolve `--period` / `--from` / `--to` into a period. Explicit bounds win.
pub(crate) fn resolve_period(
    period: PeriodArg,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Period> {
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;
    Ok(match DateRange::from_bounds(from, to)? {
        Some(range) => Period::Custom(range),
        None => period.into(),
    })
}

/// Open the store in the configured data directory. The database must exist.
pub(crate) fn open_store(settings: &Settings) -> Result<SqliteStore> {
    let path = db_path(&settings.data_dir());
    if !path.exists() {
        return Err(OutlayError::Settings(format!(
            "No database found at {}\nRun `outlay init` to set up.",
            path.display()
        )));
    }
    SqliteStore::open(&path)
}

/// Events go to the data directory's log once `init` has created it.
pub(crate) fn event_log(settings: &Settings) -> Box<dyn Analytics> {
    let dir = settings.data_dir();
    if dir.is_dir() {
        Box::new(EventLog::new(&dir))
    } else {
        Box::new(Discard)
    }
}

/// Load settings for a command that needs a signed-in user.
pub(crate) fn signed_in_settings() -> Result<Settings> {
    let settings = load_settings();
    if !LocalIdentity::new(&settings).is_authenticated() {
        return Err(OutlayError::Other(
            "Not signed in. Run `outlay login <name>` first.".to_string(),
        ));
    }
    Ok(settings)
}

/// Upper bound for `stats --months`.
const MAX_HISTORY_MONTHS: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    Today,
    Week,
    Month,
    Quarter,
    Year,
}

impl From<PeriodArg> for Period {
    fn from(p: PeriodArg) -> Self {
        match p {
            PeriodArg::Today => Period::Today,
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
            PeriodArg::Quarter => Period::Quarter,
            PeriodArg::Year => Period::Year,
        }
    }
}

#[derive(Parser)]
#[command(name = "outlay", version, about = "Track expenses, budgets and monthly spending on your own machine.")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up outlay: choose a data directory and initialize the database.
    Init {
        /// Path for outlay data (default: ~/Documents/outlay)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record an expense.
    Add {
        /// Amount spent (positive)
        amount: f64,
        /// Category: Food, Transport, Shopping, Bills, Entertainment, Health, Others
        #[arg(short, long)]
        category: String,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Change an existing expense.
    Edit {
        /// Expense ID (shown in `outlay list`)
        id: i64,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        /// Remove the note
        #[arg(long = "clear-note", conflicts_with = "note")]
        clear_note: bool,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete an expense.
    Delete {
        /// Expense ID (shown in `outlay list`)
        id: i64,
    },
    /// List expenses for a period.
    List {
        #[arg(short, long, value_enum, default_value = "month")]
        period: PeriodArg,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show this month's spending at a glance.
    Dashboard,
    /// Keep the dashboard on screen, refreshing whenever the data changes.
    Watch {
        /// Seconds between checks for changes
        #[arg(long, default_value = "2")]
        interval: u64,
    },
    /// Monthly spending history and category breakdown.
    Stats {
        /// Number of months of history (1 to 120)
        #[arg(long, default_value = "6", value_parser = clap::value_parser!(u16).range(1..=MAX_HISTORY_MONTHS))]
        months: u16,
        /// Month to break down: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Manage the monthly budget.
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Choose the display currency.
    Currency {
        #[command(subcommand)]
        command: CurrencyCommands,
    },
    /// Export expenses.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Sign in on this machine.
    Login {
        /// Name to sign in as
        name: String,
    },
    /// Sign out.
    Logout,
    /// Load sample expenses and a budget to explore outlay.
    Demo,
    /// Delete every expense and budget.
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/outlay-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current settings and database summary.
    Status,
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the budget for a month (replaces an existing one).
    Set {
        /// Monthly limit
        amount: f64,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Show budget usage for a month.
    Show {
        #[arg(long)]
        month: Option<String>,
    },
    /// Remove the budget for a month.
    Clear {
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CurrencyCommands {
    /// List available currencies.
    List,
    /// Show the current display currency.
    Show,
    /// Change the display currency. Amounts are relabelled, not converted.
    Set {
        /// ISO code, e.g. USD
        code: String,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export expenses as CSV.
    Csv {
        /// Only export one month: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Output file path (default: <data_dir>/exports/expenses_<timestamp>.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Export a month report.
    Report {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
        /// Render as PDF instead of text
        #[arg(long)]
        pdf: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_period_prefers_bounds() {
        let p = resolve_period(PeriodArg::Week, Some("2025-01-01"), Some("2025-01-31")).unwrap();
        match p {
            Period::Custom(r) => assert_eq!(r.to_string(), "2025-01-01 to 2025-01-31"),
            other => panic!("expected custom range, got {other:?}"),
        }
        assert_eq!(resolve_period(PeriodArg::Year, None, None).unwrap(), Period::Year);
        assert!(resolve_period(PeriodArg::Month, Some("2025-01-01"), None).is_err());
    }

    #[test]
    fn test_stats_months_is_bounded() {
        let parse = |months: &str| Cli::try_parse_from(["outlay", "stats", "--months", months]);
        assert!(parse("0").is_err());
        assert!(parse("121").is_err());
        assert!(parse("99999999999").is_err());
        match parse("120").map(|cli| cli.command) {
            Ok(Some(Commands::Stats { months, .. })) => assert_eq!(months, 120),
            _ => panic!("expected stats with 120 months"),
        }
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-02-30").is_err());
        assert_eq!(
            parse_date(" 2025-02-28 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }
}
