//! sitebot - Site incident report checker for chat
//!
//! Answers free-text chat messages by extracting five labeled fields
//! (GP ID, Seeker ID, Event Date, Event Time, Issue Details) through an
//! external text-understanding service and reconciling the identifiers
//! against a reference table.
//!
//! # Architecture
//!
//! ```text
//! message → FieldExtractor → classify → Reconciler → PipelineOutcome → compose → reply
//! ```
//!
//! - Extraction failures become a static "service unavailable" reply
//! - Messages without labeled fields get no reply at all
//! - The reference table is re-read for every lookup
//!
//! # Modules
//!
//! - `adapters`: External systems (Gemini, Telegram)
//! - `core`: Pipeline stages
//! - `domain`: Data structures (ExtractedRecord, ReferenceRow, PipelineOutcome)
//! - `reference`: Reference table sources
//! - `bot`: Transport polling loop
//! - `server`: Keep-alive endpoint
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the bot
//! sitebot serve
//!
//! # Try a single message
//! printf 'GP ID: 1001\nSeeker ID: 77' | sitebot check
//! ```

pub mod adapters;
pub mod bot;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod reference;
pub mod server;

// Re-export main types at crate root for convenience
pub use crate::core::Pipeline;
pub use bot::Bot;
pub use config::BotConfig;
pub use domain::{Completeness, ExtractedRecord, Field, PipelineOutcome, Reconciliation, ReferenceRow};
