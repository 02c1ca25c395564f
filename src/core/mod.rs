//! Core pipeline logic.
//!
//! This module contains:
//! - Extractor: Labeled-field extraction via the text service
//! - Validator: Completeness classification
//! - Reconciler: Reference table lookup
//! - Composer: Reply templates
//! - Pipeline: Wires the stages together for one message

pub mod composer;
pub mod errors;
pub mod extractor;
pub mod pipeline;
pub mod reconciler;
pub mod validator;

// Re-export commonly used types
pub use composer::compose;
pub use errors::{DataSourceError, ServiceError};
pub use extractor::FieldExtractor;
pub use pipeline::Pipeline;
pub use reconciler::{reconcile_rows, Reconciler};
pub use validator::classify;
