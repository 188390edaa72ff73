//! Durable storage for expenses and budgets.
//!
//! [`ExpenseStore`] is the handle the rest of the program is written
//! against; [`SqliteStore`] implements it over rusqlite. Every row the store
//! writes is announced to subscribers as a [`Change`], so views can
//! recompute from a fresh snapshot instead of being told what to refresh.

use std::cell::Cell;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::hooks::Action;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{get_connection, init_db};
use crate::error::{OutlayError, Result};
use crate::models::{Budget, Category, CategoryTotal, Expense, NewBudget, NewExpense};
use crate::period::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Expenses,
    Budgets,
}

impl Table {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "expenses" => Some(Table::Expenses),
            "budgets" => Some(Table::Budgets),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Row {
        table: Table,
        kind: ChangeKind,
        rowid: i64,
    },
    /// Every expense and budget was removed at once.
    Cleared,
    /// Another connection committed to the database file.
    External,
}

pub trait ExpenseStore {
    fn insert_expense(&self, expense: &NewExpense) -> Result<i64>;
    /// Rewrites every user-editable field and bumps `updated_at`.
    fn update_expense(&self, expense: &Expense) -> Result<()>;
    fn delete_expense(&self, id: i64) -> Result<bool>;
    fn expense(&self, id: i64) -> Result<Option<Expense>>;
    fn has_expenses(&self) -> Result<bool>;

    /// All expenses, newest first.
    fn all_expenses(&self) -> Result<Vec<Expense>>;
    fn expenses_in_range(&self, range: DateRange) -> Result<Vec<Expense>>;
    fn expenses_by_category(&self, category: Category) -> Result<Vec<Expense>>;
    fn total_in_range(&self, range: DateRange) -> Result<f64>;
    fn category_total_in_range(&self, category: Category, range: DateRange) -> Result<f64>;
    fn category_totals_in_range(&self, range: DateRange) -> Result<Vec<CategoryTotal>>;

    /// `month` is zero-based throughout the budget API.
    fn budgets_for_month(&self, year: i32, month: u32) -> Result<Vec<Budget>>;
    fn budget_for_category(&self, category: &str, year: i32, month: u32) -> Result<Option<Budget>>;
    /// Insert, or overwrite the limit of the existing record for the same
    /// (category, year, month). Returns the record id.
    fn upsert_budget(&self, budget: &NewBudget) -> Result<i64>;
    fn update_budget(&self, budget: &Budget) -> Result<()>;
    fn delete_budget(&self, id: i64) -> Result<bool>;
    fn delete_budget_for_category(&self, category: &str, year: i32, month: u32) -> Result<usize>;

    fn clear_all(&self) -> Result<()>;

    /// Receive a [`Change`] for every write made through this store.
    fn subscribe(&self) -> Receiver<Change>;
}

type Subscribers = Arc<Mutex<Vec<Sender<Change>>>>;

fn notify(subscribers: &Subscribers, change: Change) {
    if let Ok(mut subs) = subscribers.lock() {
        subs.retain(|tx| tx.send(change).is_ok());
    }
}

pub struct SqliteStore {
    conn: Connection,
    subscribers: Subscribers,
    data_version: Cell<i64>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));
        let hook_subs = Arc::clone(&subscribers);
        conn.update_hook(Some(
            move |action: Action, _db: &str, table: &str, rowid: i64| {
                let Some(table) = Table::from_name(table) else {
                    return;
                };
                let kind = match action {
                    Action::SQLITE_INSERT => ChangeKind::Insert,
                    Action::SQLITE_UPDATE => ChangeKind::Update,
                    Action::SQLITE_DELETE => ChangeKind::Delete,
                    _ => return,
                };
                notify(&hook_subs, Change::Row { table, kind, rowid });
            },
        ));
        let version = read_data_version(&conn)?;
        Ok(Self {
            conn,
            subscribers,
            data_version: Cell::new(version),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check whether another process has committed since the last call.
    /// Subscribers receive [`Change::External`] when it has.
    pub fn poll_external(&self) -> Result<bool> {
        let version = read_data_version(&self.conn)?;
        let changed = self.data_version.replace(version) != version;
        if changed {
            tracing::debug!(version, "database changed by another connection");
            notify(&self.subscribers, Change::External);
        }
        Ok(changed)
    }

    pub fn expense_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM expenses", [], |r| r.get(0))?)
    }

    pub fn budget_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM budgets", [], |r| r.get(0))?)
    }

    fn query_expenses<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn query_budgets<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn read_data_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA data_version", [], |r| r.get(0))?)
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

const EXPENSE_COLUMNS: &str = "id, amount, category, description, date, created_at, updated_at";
const BUDGET_COLUMNS: &str = "id, category, monthly_limit, year, month";

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        monthly_limit: row.get(2)?,
        year: row.get(3)?,
        month: row.get(4)?,
    })
}

impl ExpenseStore for SqliteStore {
    fn insert_expense(&self, expense: &NewExpense) -> Result<i64> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO expenses (amount, category, description, date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![expense.amount, expense.category, expense.description, expense.date, now],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, amount = expense.amount, category = %expense.category, "inserted expense");
        Ok(id)
    }

    fn update_expense(&self, expense: &Expense) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE expenses SET amount = ?1, category = ?2, description = ?3, date = ?4, updated_at = ?5 \
             WHERE id = ?6",
            params![
                expense.amount,
                expense.category,
                expense.description,
                expense.date,
                Utc::now(),
                expense.id
            ],
        )?;
        if updated == 0 {
            return Err(OutlayError::NotFound(format!("Expense {}", expense.id)));
        }
        tracing::debug!(id = expense.id, "updated expense");
        Ok(())
    }

    fn delete_expense(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        tracing::debug!(id, deleted, "deleted expense");
        Ok(deleted > 0)
    }

    fn expense(&self, id: i64) -> Result<Option<Expense>> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], expense_from_row).optional()?)
    }

    fn has_expenses(&self) -> Result<bool> {
        Ok(self
            .conn
            .query_row("SELECT EXISTS(SELECT 1 FROM expenses)", [], |r| r.get(0))?)
    }

    fn all_expenses(&self) -> Result<Vec<Expense>> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date DESC, id DESC");
        self.query_expenses(&sql, [])
    }

    fn expenses_in_range(&self, range: DateRange) -> Result<Vec<Expense>> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE date BETWEEN ?1 AND ?2 \
             ORDER BY date DESC, id DESC"
        );
        self.query_expenses(&sql, params![range.start(), range.end()])
    }

    fn expenses_by_category(&self, category: Category) -> Result<Vec<Expense>> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE category = ?1 ORDER BY date DESC, id DESC"
        );
        self.query_expenses(&sql, [category])
    }

    fn total_in_range(&self, range: DateRange) -> Result<f64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE date BETWEEN ?1 AND ?2",
            params![range.start(), range.end()],
            |r| r.get(0),
        )?)
    }

    fn category_total_in_range(&self, category: Category, range: DateRange) -> Result<f64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM expenses \
             WHERE category = ?1 AND date BETWEEN ?2 AND ?3",
            params![category, range.start(), range.end()],
            |r| r.get(0),
        )?)
    }

    fn category_totals_in_range(&self, range: DateRange) -> Result<Vec<CategoryTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, SUM(amount) FROM expenses WHERE date BETWEEN ?1 AND ?2 GROUP BY category",
        )?;
        let rows = stmt.query_map(params![range.start(), range.end()], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn budgets_for_month(&self, year: i32, month: u32) -> Result<Vec<Budget>> {
        let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE year = ?1 AND month = ?2 ORDER BY id");
        self.query_budgets(&sql, params![year, month])
    }

    fn budget_for_category(&self, category: &str, year: i32, month: u32) -> Result<Option<Budget>> {
        let sql = format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE category = ?1 AND year = ?2 AND month = ?3 \
             ORDER BY id LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![category, year, month], budget_from_row)
            .optional()?)
    }

    fn upsert_budget(&self, budget: &NewBudget) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let id = match self.budget_for_category(&budget.category, budget.year, budget.month)? {
            Some(existing) => {
                tx.execute(
                    "UPDATE budgets SET monthly_limit = ?1 WHERE id = ?2",
                    params![budget.monthly_limit, existing.id],
                )?;
                existing.id
            }
            None => {
                tx.execute(
                    "INSERT INTO budgets (category, monthly_limit, year, month) VALUES (?1, ?2, ?3, ?4)",
                    params![budget.category, budget.monthly_limit, budget.year, budget.month],
                )?;
                tx.last_insert_rowid()
            }
        };
        tx.commit()?;
        tracing::debug!(id, limit = budget.monthly_limit, "saved budget");
        Ok(id)
    }

    fn update_budget(&self, budget: &Budget) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE budgets SET category = ?1, monthly_limit = ?2, year = ?3, month = ?4 WHERE id = ?5",
            params![budget.category, budget.monthly_limit, budget.year, budget.month, budget.id],
        )?;
        if updated == 0 {
            return Err(OutlayError::NotFound(format!("Budget {}", budget.id)));
        }
        Ok(())
    }

    fn delete_budget(&self, id: i64) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM budgets WHERE id = ?1", [id])? > 0)
    }

    fn delete_budget_for_category(&self, category: &str, year: i32, month: u32) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM budgets WHERE category = ?1 AND year = ?2 AND month = ?3",
            params![category, year, month],
        )?)
    }

    fn clear_all(&self) -> Result<()> {
        // Unqualified DELETE takes SQLite's truncate path, which skips the
        // update hook; announce the change explicitly.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM expenses; DELETE FROM budgets;")?;
        tx.commit()?;
        notify(&self.subscribers, Change::Cleared);
        tracing::info!("cleared all expenses and budgets");
        Ok(())
    }

    fn subscribe(&self) -> Receiver<Change> {
        let (tx, rx) = channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }
}
