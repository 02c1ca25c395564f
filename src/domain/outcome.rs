//! Classifications produced along the pipeline.
//!
//! `PipelineOutcome` is the single value the response composer switches on.

use serde::{Deserialize, Serialize};

use super::record::{ExtractedRecord, Field};

/// Result of the completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completeness {
    /// No recognizable labeled data at all
    Empty,

    /// Some fields present, these ones blank (canonical order)
    Missing(Vec<Field>),

    /// All five fields present
    Complete,
}

/// Result of looking the identifier pair up in the reference table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// A single row carries both identifiers
    FullMatch { contact: String },

    /// GP ID exists but Seeker ID matches no row
    MismatchSecondary,

    /// Seeker ID exists but GP ID matches no row
    MismatchPrimary,

    /// Neither identifier found, or both found on unrelated rows
    NoMatch,
}

/// Terminal classification of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The extraction service failed, timed out or returned garbage
    ServiceUnavailable,

    /// Nothing recognizable in the message; no reply is sent
    NoData,

    /// The message exceeded the size limit and was not examined
    MessageTooLarge { limit: usize },

    /// Some required fields were not labeled in the message
    MissingFields { fields: Vec<Field> },

    /// The identifier pair exists in the reference table
    FullMatch {
        record: ExtractedRecord,
        contact: String,
    },

    /// The secondary identifier is wrong
    MismatchSecondary { seeker_id: String },

    /// The primary identifier is wrong
    MismatchPrimary { gp_id: String },

    /// No relevant row in the reference table
    NoMatch,

    /// The reference table could not be read
    LookupFailed,
}

impl PipelineOutcome {
    /// Build the outcome for a complete record from its reconciliation result
    pub fn from_reconciliation(record: ExtractedRecord, result: Reconciliation) -> Self {
        match result {
            Reconciliation::FullMatch { contact } => Self::FullMatch { record, contact },
            Reconciliation::MismatchSecondary => Self::MismatchSecondary {
                seeker_id: record.seeker_id,
            },
            Reconciliation::MismatchPrimary => Self::MismatchPrimary {
                gp_id: record.gp_id,
            },
            Reconciliation::NoMatch => Self::NoMatch,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "service_unavailable",
            Self::NoData => "no_data",
            Self::MessageTooLarge { .. } => "message_too_large",
            Self::MissingFields { .. } => "missing_fields",
            Self::FullMatch { .. } => "full_match",
            Self::MismatchSecondary { .. } => "mismatch_secondary",
            Self::MismatchPrimary { .. } => "mismatch_primary",
            Self::NoMatch => "no_match",
            Self::LookupFailed => "lookup_failed",
        }
    }
}
