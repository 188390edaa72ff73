use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::cli::{open_store, parse_month_opt, signed_in_settings};
use crate::error::Result;
use crate::export::{render_text, write_csv, MonthReport};
use crate::store::ExpenseStore;

fn default_path(data_dir: &Path, name: &str, ext: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    data_dir.join("exports").join(format!("{name}_{stamp}.{ext}"))
}

fn prepare(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    prepare(path)?;
    std::fs::write(path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn csv(month: Option<&str>, output: Option<String>) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let expenses = match month {
        Some(_) => store.expenses_in_range(parse_month_opt(month)?.range())?,
        None => store.all_expenses()?,
    };
    if expenses.is_empty() {
        println!("No expenses to export");
        return Ok(());
    }

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&settings.data_dir(), "expenses", "csv"));
    prepare(&path)?;
    let rows = write_csv(&expenses, BufWriter::new(File::create(&path)?))?;
    tracing::info!(rows, path = %path.display(), "exported csv");
    println!("Exported {rows} expenses to {}", path.display());
    Ok(())
}

pub fn report(month: Option<&str>, output: Option<String>, pdf: bool) -> Result<()> {
    let settings = signed_in_settings()?;
    let store = open_store(&settings)?;
    let month = parse_month_opt(month)?;
    let expenses = store.expenses_in_range(month.range())?;
    if expenses.is_empty() {
        println!("No expenses to export");
        return Ok(());
    }
    let report = MonthReport::new(month, settings.currency(), &expenses);
    let name = format!("report_{month}");
    let data_dir = settings.data_dir();

    if pdf {
        let bytes = render_pdf(&report)?;
        let path = output
            .map(PathBuf::from)
            .unwrap_or_else(|| default_path(&data_dir, &name, "pdf"));
        return write_bytes(&bytes, &path);
    }

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&data_dir, &name, "txt"));
    write_bytes(render_text(&report).as_bytes(), &path)
}

#[cfg(feature = "pdf")]
fn render_pdf(report: &MonthReport) -> Result<Vec<u8>> {
    crate::pdf::render_month(report)
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_report: &MonthReport) -> Result<Vec<u8>> {
    Err(crate::error::OutlayError::Other(
        "PDF export is not available in this build (enable the `pdf` feature)".to_string(),
    ))
}
