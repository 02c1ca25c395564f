//! Rows of the reference table.

use serde::{Deserialize, Serialize};

/// A single row of the reference table, reduced to the columns the
/// reconciler needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRow {
    /// Primary identifier ("GP ID" column)
    pub gp_id: String,

    /// Secondary identifier (canonical "Seeker ID" column or its alias)
    pub seeker_id: String,

    /// Point-of-contact display value
    pub contact: String,
}

impl ReferenceRow {
    pub fn new(
        gp_id: impl Into<String>,
        seeker_id: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            gp_id: gp_id.into(),
            seeker_id: seeker_id.into(),
            contact: contact.into(),
        }
    }

    /// Case-insensitive match on the primary identifier
    pub fn matches_gp_id(&self, gp_id: &str) -> bool {
        ids_equal(&self.gp_id, gp_id)
    }

    /// Case-insensitive match on the secondary identifier
    pub fn matches_seeker_id(&self, seeker_id: &str) -> bool {
        ids_equal(&self.seeker_id, seeker_id)
    }
}

/// Identifier equality: surrounding whitespace ignored, letter case ignored,
/// every other character significant
pub fn ids_equal(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
