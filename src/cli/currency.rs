use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::actions;
use crate::cli::event_log;
use crate::currency::CURRENCIES;
use crate::error::Result;
use crate::fmt::money_with_code;
use crate::settings::{load_settings, save_settings};

pub fn list() -> Result<()> {
    let current = load_settings().currency();
    let mut table = Table::new();
    table.set_header(vec!["", "Code", "Name", "Symbol", "Locale", ""]);
    for c in CURRENCIES {
        let marker = if c.code == current.code { "*" } else { "" };
        table.add_row(vec![
            Cell::new(c.flag),
            Cell::new(c.code),
            Cell::new(c.name),
            Cell::new(c.symbol),
            Cell::new(c.locale),
            Cell::new(marker),
        ]);
    }
    println!("Currencies\n{table}");
    Ok(())
}

pub fn show() -> Result<()> {
    let c = load_settings().currency();
    println!(
        "{} {} ({}, {}), shown as {}",
        c.flag,
        c.name,
        c.code,
        c.locale,
        money_with_code(1234.5, c)
    );
    Ok(())
}

pub fn set(code: &str) -> Result<()> {
    let mut settings = load_settings();
    let previous = settings.currency();
    let analytics = event_log(&settings);
    let next = actions::change_currency(&mut settings, code, analytics.as_ref())?;
    save_settings(&settings)?;

    println!("Display currency set to {} {} ({})", next.flag, next.name, next.code);
    if previous.code != next.code {
        println!(
            "{}",
            format!(
                "Warning: amounts are not converted. Existing expenses and budgets recorded in {} are now shown in {}.",
                previous.code, next.code
            )
            .yellow()
        );
    }
    Ok(())
}
