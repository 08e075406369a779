/// Error types for the NDVI library
use thiserror::Error;

/// Main error type for parsing and loading bloom data
#[derive(Error, Debug)]
pub enum BloomError {
    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Location not found
    #[error("Location not found: {0}")]
    LocationNotFound(String),
}

/// Type alias for Results using BloomError
pub type Result<T> = std::result::Result<T, BloomError>;
