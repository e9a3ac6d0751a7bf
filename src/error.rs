//! Error taxonomy shared by the simulation core and its data boundaries.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::config::ConfigError;

/// A timestamp could not be priced.
///
/// Always a configuration defect: a validated schedule covers the whole day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("no tariff band covers {timestamp}")]
    NoMatchingBand { timestamp: NaiveDateTime },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("simulation already finished")]
    Finished,

    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
