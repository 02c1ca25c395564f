//! Reference table access.
//!
//! The reference table is a read-only external resource. Every call to
//! `ReferenceSource::load` re-reads the backing store; nothing is cached.

pub mod csv_table;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::DataSourceError;
use crate::domain::ReferenceRow;

pub use csv_table::CsvReferenceTable;

/// Column names used to read the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceColumns {
    /// Primary identifier column
    #[serde(default = "default_primary")]
    pub primary: String,

    /// Canonical secondary identifier column
    #[serde(default = "default_secondary")]
    pub secondary: String,

    /// Fallback names for the secondary column, tried in order when the
    /// canonical header is absent
    #[serde(default = "default_secondary_aliases")]
    pub secondary_aliases: Vec<String>,

    /// Point-of-contact display column
    #[serde(default = "default_contact")]
    pub contact: String,
}

fn default_primary() -> String {
    "GP ID".to_string()
}
fn default_secondary() -> String {
    "Seeker ID".to_string()
}
fn default_secondary_aliases() -> Vec<String> {
    vec!["Robi ID".to_string()]
}
fn default_contact() -> String {
    "1st Level POC (Umbrella ZM)".to_string()
}

impl Default for ReferenceColumns {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            secondary_aliases: default_secondary_aliases(),
            contact: default_contact(),
        }
    }
}

/// Read-only provider of reference rows
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Human-readable description (path, etc.)
    fn describe(&self) -> String;

    /// Load all rows, fresh from the backing store
    async fn load(&self) -> Result<Vec<ReferenceRow>, DataSourceError>;
}

/// Fixed in-memory table for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceTable {
    rows: Vec<ReferenceRow>,
}

impl StaticReferenceTable {
    pub fn new(rows: Vec<ReferenceRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl ReferenceSource for StaticReferenceTable {
    fn describe(&self) -> String {
        format!("static table ({} rows)", self.rows.len())
    }

    async fn load(&self) -> Result<Vec<ReferenceRow>, DataSourceError> {
        Ok(self.rows.clone())
    }
}
