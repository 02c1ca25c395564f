//! Domain types for the sitebot pipeline.
//!
//! This module contains the core data structures:
//! - Record: The five labeled fields extracted from a message
//! - Reference: Rows of the reference table
//! - Outcome: Classifications produced along the pipeline

pub mod outcome;
pub mod record;
pub mod reference;

// Re-export commonly used types
pub use outcome::{Completeness, PipelineOutcome, Reconciliation};
pub use record::{ExtractedRecord, Field};
pub use reference::ReferenceRow;
