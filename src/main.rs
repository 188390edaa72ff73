mod actions;
mod cli;
mod currency;
mod db;
mod error;
mod export;
mod fmt;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod period;
mod settings;
mod stats;
mod store;
mod telemetry;
mod tracker;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{BudgetCommands, Cli, Commands, CurrencyCommands, ExportCommands};

/// Log to stderr. `OUTLAY_LOG` takes an env-filter directive; otherwise the
/// level follows the number of `-v` flags.
fn setup_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("OUTLAY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        None | Some(Commands::Dashboard) => cli::dashboard::run(),
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Add {
            amount,
            category,
            note,
            date,
        }) => cli::expenses::add(amount, &category, note, date.as_deref()),
        Some(Commands::Edit {
            id,
            amount,
            category,
            note,
            clear_note,
            date,
        }) => cli::expenses::edit(id, amount, category.as_deref(), note, clear_note, date.as_deref()),
        Some(Commands::Delete { id }) => cli::expenses::delete(id),
        Some(Commands::List {
            period,
            from_date,
            to_date,
            category,
        }) => cli::expenses::list(
            period,
            from_date.as_deref(),
            to_date.as_deref(),
            category.as_deref(),
        ),
        Some(Commands::Watch { interval }) => cli::dashboard::watch(interval),
        Some(Commands::Stats { months, month }) => cli::stats::run(months.into(), month.as_deref()),
        Some(Commands::Budget { command }) => match command {
            BudgetCommands::Set { amount, month } => cli::budget::set(amount, month.as_deref()),
            BudgetCommands::Show { month } => cli::budget::show(month.as_deref()),
            BudgetCommands::Clear { month } => cli::budget::clear(month.as_deref()),
        },
        Some(Commands::Currency { command }) => match command {
            CurrencyCommands::List => cli::currency::list(),
            CurrencyCommands::Show => cli::currency::show(),
            CurrencyCommands::Set { code } => cli::currency::set(&code),
        },
        Some(Commands::Export { command }) => match command {
            ExportCommands::Csv { month, output } => cli::export::csv(month.as_deref(), output),
            ExportCommands::Report { month, output, pdf } => {
                cli::export::report(month.as_deref(), output, pdf)
            }
        },
        Some(Commands::Login { name }) => cli::account::login(&name),
        Some(Commands::Logout) => cli::account::logout(),
        Some(Commands::Demo) => cli::demo::run(),
        Some(Commands::Reset { yes }) => cli::reset::run(yes),
        Some(Commands::Backup { output }) => cli::backup::run(output),
        Some(Commands::Status) => cli::status::run(),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "outlay", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
