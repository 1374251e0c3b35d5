//! # Error types
//!
//! All fallible operations of the crate return [`Result`], whose error side is
//! [`AmmoniaError`]. The three domain variants are the ones the user sees in the
//! status line of the GUI or on stderr of the console front end:
//! - `InvalidDataset` - the CSV file is unreadable, has no ammonia column, holds a
//!   bad value or has too few records for the train/test split
//! - `InvalidParameter` - a mass-transfer parameter is out of its slider range or not finite
//! - `Fitting` - the random forest could not be built from the training subset
//!
//! None of them is fatal to the session: the previous dataset and results stay in place.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmmoniaError {
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Fitting error: {0}")]
    Fitting(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl AmmoniaError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        AmmoniaError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AmmoniaError>;
