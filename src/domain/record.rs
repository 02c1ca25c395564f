//! Labeled fields extracted from an inbound message.
//!
//! A field is only ever populated when its explicit label appeared in the
//! message text. Absent fields are the empty string, never `None`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five labeled fields, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    GpId,
    SeekerId,
    EventDate,
    EventTime,
    IssueDetails,
}

impl Field {
    /// All fields in the fixed order used for missing-field reports
    pub const ALL: [Field; 5] = [
        Field::GpId,
        Field::SeekerId,
        Field::EventDate,
        Field::EventTime,
        Field::IssueDetails,
    ];

    /// The label a user must type in the message (without the colon)
    pub fn label(&self) -> &'static str {
        match self {
            Field::GpId => "GP ID",
            Field::SeekerId => "Seeker ID",
            Field::EventDate => "Event Date",
            Field::EventTime => "Event Time",
            Field::IssueDetails => "Issue Details",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The structured record built from one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Primary identifier ("GP ID:")
    pub gp_id: String,

    /// Secondary identifier ("Seeker ID:")
    pub seeker_id: String,

    /// "Event Date:" value, unvalidated
    pub event_date: String,

    /// "Event Time:" value, unvalidated
    pub event_time: String,

    /// "Issue Details:" free text
    pub issue_details: String,
}

impl ExtractedRecord {
    /// Get the raw value of a field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::GpId => &self.gp_id,
            Field::SeekerId => &self.seeker_id,
            Field::EventDate => &self.event_date,
            Field::EventTime => &self.event_time,
            Field::IssueDetails => &self.issue_details,
        }
    }

    /// Whether a field counts as present (non-blank after trimming)
    pub fn has(&self, field: Field) -> bool {
        !self.get(field).trim().is_empty()
    }

    /// Fields that are blank, in canonical order
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }

    /// True when every field is blank
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| !self.has(*f))
    }
}
