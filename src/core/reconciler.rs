//! Reconciliation of extracted identifiers against the reference table.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::errors::DataSourceError;
use crate::domain::{ExtractedRecord, Reconciliation, ReferenceRow};
use crate::reference::ReferenceSource;

/// Classify an identifier pair against a set of rows
pub fn reconcile_rows(rows: &[ReferenceRow], gp_id: &str, seeker_id: &str) -> Reconciliation {
    if let Some(row) = rows
        .iter()
        .find(|r| r.matches_gp_id(gp_id) && r.matches_seeker_id(seeker_id))
    {
        return Reconciliation::FullMatch {
            contact: row.contact.clone(),
        };
    }

    let gp_exists = rows.iter().any(|r| r.matches_gp_id(gp_id));
    let seeker_exists = rows.iter().any(|r| r.matches_seeker_id(seeker_id));

    match (gp_exists, seeker_exists) {
        (true, false) => Reconciliation::MismatchSecondary,
        (false, true) => Reconciliation::MismatchPrimary,
        // Both present on different rows means the pair itself is unknown
        _ => Reconciliation::NoMatch,
    }
}

/// Looks complete records up in a `ReferenceSource`
#[derive(Clone)]
pub struct Reconciler {
    source: Arc<dyn ReferenceSource>,
}

impl Reconciler {
    pub fn new(source: Arc<dyn ReferenceSource>) -> Self {
        Self { source }
    }

    /// Description of the backing table
    pub fn source(&self) -> String {
        self.source.describe()
    }

    /// Reconcile a record; the table is re-read on every call
    #[instrument(skip_all, fields(source = %self.source.describe()))]
    pub async fn reconcile(&self, record: &ExtractedRecord) -> Result<Reconciliation, DataSourceError> {
        self.lookup(&record.gp_id, &record.seeker_id).await
    }

    /// Reconcile a bare identifier pair
    pub async fn lookup(&self, gp_id: &str, seeker_id: &str) -> Result<Reconciliation, DataSourceError> {
        let rows = self.source.load().await?;
        let result = reconcile_rows(&rows, gp_id, seeker_id);
        debug!(rows = rows.len(), ?result, "Reconciled identifiers");
        Ok(result)
    }
}
