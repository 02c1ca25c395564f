//! User-facing reply templates.
//!
//! `compose` is pure: one fixed template per outcome, `None` when the
//! message must not be answered at all.

use crate::domain::{Field, PipelineOutcome};

/// Reply when the extraction service cannot be used
pub const SERVICE_UNAVAILABLE: &str =
    "Service is unavailable. Please wait or try again after some time.";

/// Reply when the reference table cannot be read
pub const LOOKUP_FAILED: &str = "❌ Failed to read the reference data. Please try again later.";

/// Reply when a message is over the size limit
pub const MESSAGE_TOO_LARGE: &str =
    "⚠️ Message is too long to check. Please send only the report fields:";

/// Input-format reminder appended to the no-match reply
pub const FORMAT_REMINDER: &str = "GP ID: XXXX
Seeker ID: XXXXX
Event Date: mm/dd/yyyy
Event Time: hh:mm:ss AM/PM
Issue Details: ---";

fn required_fields() -> String {
    join_labels(&Field::ALL)
}

fn join_labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the reply for an outcome
pub fn compose(outcome: &PipelineOutcome) -> Option<String> {
    let text = match outcome {
        PipelineOutcome::NoData => return None,

        PipelineOutcome::ServiceUnavailable => SERVICE_UNAVAILABLE.to_string(),

        PipelineOutcome::LookupFailed => LOOKUP_FAILED.to_string(),

        PipelineOutcome::MessageTooLarge { .. } => {
            format!("{}\n\n{}", MESSAGE_TOO_LARGE, FORMAT_REMINDER)
        }

        PipelineOutcome::MissingFields { fields } => format!(
            "⚠️ Missing fields: {}\n\n*You must enter the following fields:*\n{}",
            join_labels(fields),
            required_fields()
        ),

        PipelineOutcome::FullMatch { record, contact } => format!(
            "✅ GP ID: {}\nSeeker ID: {}\nEvent Date: {}\nEvent Time: {}\nIssue Details: {}\nGP POC: {}",
            record.gp_id,
            record.seeker_id,
            record.event_date,
            record.event_time,
            record.issue_details,
            contact
        ),

        PipelineOutcome::MismatchSecondary { seeker_id } => {
            format!("❌ Incorrect Seeker ID: {}", seeker_id)
        }

        PipelineOutcome::MismatchPrimary { gp_id } => format!("❌ Incorrect GP ID: {}", gp_id),

        PipelineOutcome::NoMatch => format!(
            "❌ No relevant site found! Please check your input and follow the format:\n\n{}",
            FORMAT_REMINDER
        ),
    };

    Some(text)
}
