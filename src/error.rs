use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlayError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(f64),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, OutlayError>;
