//! Completeness check for extracted records.

use crate::domain::{Completeness, ExtractedRecord};

/// Classify an extraction result as empty, incomplete or complete
pub fn classify(record: Option<&ExtractedRecord>) -> Completeness {
    let Some(record) = record else {
        return Completeness::Empty;
    };

    if record.is_blank() {
        return Completeness::Empty;
    }

    let missing = record.missing_fields();
    if missing.is_empty() {
        Completeness::Complete
    } else {
        Completeness::Missing(missing)
    }
}
