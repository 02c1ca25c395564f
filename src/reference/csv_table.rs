//! CSV-backed reference table.
//!
//! The file is read asynchronously on every `load` and parsed with the
//! header row. Short rows are tolerated; missing cells read as "".

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ReferenceColumns, ReferenceSource};
use crate::core::errors::DataSourceError;
use crate::domain::ReferenceRow;

/// Reference table stored as a single-sheet CSV export
#[derive(Debug, Clone)]
pub struct CsvReferenceTable {
    path: PathBuf,
    columns: ReferenceColumns,
}

/// Header positions resolved for one read
#[derive(Debug)]
struct ColumnIndex {
    primary: usize,
    secondary: usize,
    contact: Option<usize>,
}

impl CsvReferenceTable {
    pub fn new(path: impl Into<PathBuf>, columns: ReferenceColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    /// Parse CSV bytes into rows
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<ReferenceRow>, DataSourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        let index = self.resolve_columns(&headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |i: usize| record.get(i).unwrap_or("").to_string();

            rows.push(ReferenceRow {
                gp_id: cell(index.primary),
                seeker_id: cell(index.secondary),
                contact: index.contact.map(cell).unwrap_or_default(),
            });
        }

        Ok(rows)
    }

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<ColumnIndex, DataSourceError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let primary = position(&self.columns.primary)
            .ok_or_else(|| DataSourceError::MissingColumn(self.columns.primary.clone()))?;

        // Canonical secondary column first, then aliases in order
        let secondary = std::iter::once(&self.columns.secondary)
            .chain(self.columns.secondary_aliases.iter())
            .find_map(|name| {
                let found = position(name);
                if found.is_some() && name != &self.columns.secondary {
                    debug!(column = %name, "Using secondary identifier alias column");
                }
                found
            })
            .ok_or_else(|| DataSourceError::MissingColumn(self.columns.secondary.clone()))?;

        let contact = position(&self.columns.contact);
        if contact.is_none() {
            warn!(column = %self.columns.contact, "Contact column not found, contacts will be empty");
        }

        Ok(ColumnIndex {
            primary,
            secondary,
            contact,
        })
    }
}

#[async_trait]
impl ReferenceSource for CsvReferenceTable {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Vec<ReferenceRow>, DataSourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| DataSourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let rows = self.parse(&bytes)?;
        debug!(path = %self.path.display(), rows = rows.len(), "Reference table loaded");
        Ok(rows)
    }
}
