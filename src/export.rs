use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use crate::currency::Currency;
use crate::error::Result;
use crate::fmt::money;
use crate::models::Expense;
use crate::period::YearMonth;

pub const CSV_HEADER: [&str; 4] = ["Date", "Category", "Amount", "Description"];
pub const REPORT_TITLE: &str = "Expense Report";
/// Expense rows per page of the month report.
pub const ROWS_PER_PAGE: usize = 25;
const DESCRIPTION_WIDTH: usize = 36;

/// Description column: always quoted, commas become semicolons and line
/// breaks become spaces so every expense stays on one line.
pub fn csv_description(description: Option<&str>) -> String {
    let cleaned = description
        .unwrap_or_default()
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace(',', ";")
        .replace('"', "\"\"");
    format!("\"{cleaned}\"")
}

/// Write `expenses` in the given order. Returns the number of data rows.
pub fn write_csv<W: Write>(expenses: &[Expense], out: W) -> Result<usize> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for e in expenses {
        wtr.write_record([
            e.date.format("%Y-%m-%d").to_string(),
            e.category.label().to_string(),
            format!("{:.2}", e.amount),
            csv_description(e.description.as_deref()),
        ])?;
    }
    wtr.flush()?;
    Ok(expenses.len())
}

/// One month of expenses, oldest first, labelled in a display currency.
#[derive(Debug, Clone)]
pub struct MonthReport {
    pub month: YearMonth,
    pub currency: &'static Currency,
    pub expenses: Vec<Expense>,
    pub total: f64,
}

impl MonthReport {
    pub fn new(month: YearMonth, currency: &'static Currency, expenses: &[Expense]) -> Self {
        let range = month.range();
        let mut expenses: Vec<Expense> = expenses
            .iter()
            .filter(|e| range.contains(e.date))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        let total = expenses.iter().map(|e| e.amount).sum();
        Self {
            month,
            currency,
            expenses,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.expenses.len().div_ceil(ROWS_PER_PAGE).max(1)
    }

    pub fn pages(&self) -> Vec<&[Expense]> {
        if self.expenses.is_empty() {
            return vec![&self.expenses[..]];
        }
        self.expenses.chunks(ROWS_PER_PAGE).collect()
    }
}

pub fn report_date(e: &Expense) -> String {
    e.date.format("%d/%m/%Y").to_string()
}

/// Plain-text rendering of a [`MonthReport`]. Pages are separated by a form
/// feed and each ends with a `Page n of N` footer.
pub fn render_text(report: &MonthReport) -> String {
    let pages = report.pages();
    let count = pages.len();
    let mut out = String::new();
    for (i, rows) in pages.into_iter().enumerate() {
        if i > 0 {
            out.push('\u{c}');
            out.push('\n');
        }
        if i == 0 {
            out.push_str(REPORT_TITLE);
            out.push('\n');
            out.push_str(&report.month.label());
            out.push('\n');
            out.push_str(&format!("Total: {}\n\n", money(report.total, report.currency)));
        }
        out.push_str(&format!(
            "{:<12}{:<15}{:>14}  {}\n",
            "Date", "Category", "Amount", "Description"
        ));
        out.push_str(&"-".repeat(41 + DESCRIPTION_WIDTH + 2));
        out.push('\n');
        if rows.is_empty() {
            out.push_str("No expenses recorded.\n");
        }
        for e in rows {
            let description = e.description.as_deref().unwrap_or("-");
            let wrapped = textwrap::wrap(description, DESCRIPTION_WIDTH);
            let first = wrapped.first().map_or("-", |l| &**l);
            out.push_str(&format!(
                "{:<12}{:<15}{:>14}  {}\n",
                report_date(e),
                e.category.label(),
                money(e.amount, report.currency),
                first
            ));
            for line in wrapped.iter().skip(1) {
                out.push_str(&format!("{:43}{line}\n", ""));
            }
        }
        out.push_str(&format!("\n{:>60}\n", format!("Page {} of {count}", i + 1)));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::currency::by_code;
    use crate::models::Category;

    fn expense(id: i64, amount: f64, category: Category, day: u32, description: Option<&str>) -> Expense {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        Expense {
            id,
            amount,
            category,
            description: description.map(String::from),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn march() -> YearMonth {
        YearMonth { year: 2025, month: 3 }
    }

    #[test]
    fn test_csv_format() {
        let rows = vec![
            expense(1, 100.0, Category::Food, 2, Some("lunch, with \"team\"")),
            expense(2, 30.5, Category::Transport, 31, None),
        ];
        let mut buf = Vec::new();
        assert_eq!(write_csv(&rows, &mut buf).unwrap(), 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Category,Amount,Description");
        assert_eq!(lines[1], "2025-03-02,Food,100.00,\"lunch; with \"\"team\"\"\"");
        assert_eq!(lines[2], "2025-03-31,Transport,30.50,\"\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_keeps_multiline_note_on_one_line() {
        let rows = vec![
            expense(1, 5.0, Category::Food, 2, Some("line one\nline two")),
            expense(2, 7.0, Category::Bills, 3, Some("first\r\nsecond\rthird")),
        ];
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), rows.len() + 1);
        assert!(text.contains("2025-03-02,Food,5.00,\"line one line two\""));
        assert!(text.contains("2025-03-03,Bills,7.00,\"first second third\""));
    }

    #[test]
    fn test_report_sorts_and_filters_month() {
        let mut rows = vec![
            expense(1, 10.0, Category::Food, 20, None),
            expense(2, 5.0, Category::Bills, 3, None),
        ];
        let mut april = expense(3, 99.0, Category::Food, 1, None);
        april.date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        rows.push(april);
        let report = MonthReport::new(march(), by_code("USD").unwrap(), &rows);
        assert_eq!(report.total, 15.0);
        assert_eq!(report.expenses.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_text_report_layout() {
        let rows = vec![expense(1, 1234.5, Category::Food, 2, Some("dinner"))];
        let report = MonthReport::new(march(), by_code("EUR").unwrap(), &rows);
        let text = render_text(&report);
        assert!(text.starts_with("Expense Report\nMarch 2025\nTotal: €1,234.50\n"));
        assert!(text.contains("02/03/2025"));
        assert!(text.contains("dinner"));
        assert!(text.contains("Page 1 of 1"));
        assert!(!text.contains('\u{c}'));
    }

    #[test]
    fn test_text_report_paginates() {
        let rows: Vec<Expense> = (1..=30)
            .map(|i| expense(i, 1.0, Category::Others, (i as u32 % 28) + 1, None))
            .collect();
        let report = MonthReport::new(march(), by_code("INR").unwrap(), &rows);
        assert_eq!(report.page_count(), 2);
        let text = render_text(&report);
        assert_eq!(text.matches('\u{c}').count(), 1);
        assert!(text.contains("Page 1 of 2"));
        assert!(text.contains("Page 2 of 2"));
        assert_eq!(text.matches("Expense Report").count(), 1);
    }

    #[test]
    fn test_empty_report_has_one_page() {
        let report = MonthReport::new(march(), by_code("INR").unwrap(), &[]);
        assert!(report.is_empty());
        let text = render_text(&report);
        assert!(text.contains("No expenses recorded."));
        assert!(text.contains("Total: ₹0.00"));
        assert!(text.contains("Page 1 of 1"));
    }
}
