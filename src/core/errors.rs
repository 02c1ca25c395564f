//! Error kinds surfaced by the pipeline components.
//!
//! Both kinds are converted to fixed outcomes by the pipeline and never
//! reach the user verbatim.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of the external text-understanding service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No API key configured for {0}")]
    MissingCredential(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Service call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    #[error("Failed to parse extraction payload: {0}")]
    Parse(String),
}

/// Failures reading the reference table
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Failed to read reference table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed reference table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reference table is missing required column '{0}'")]
    MissingColumn(String),
}
