//! Field extraction through the text-understanding service.
//!
//! The service is instructed to only report values that follow an explicit
//! label and to answer with either the literal `null` or a JSON object with
//! the five field keys. Anything else is a `ServiceError`, never "no data".

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, instrument};

use super::errors::ServiceError;
use crate::adapters::TextService;
use crate::domain::ExtractedRecord;

/// Fixed extraction instruction; the message is appended after it
const INSTRUCTION: &str = r#"You will receive a message. Extract ONLY the following fields if they are clearly present in the message with their label:

- GP ID (e.g., GP ID: 12345)
- Seeker ID (e.g., Seeker ID: 67890)
- Event Date (e.g., Event Date: mm/dd/yyyy or dd/mm/yyyy)
- Event Time (e.g., Event Time: 09:00 AM or 15:30)
- Issue Details (e.g., Issue Details: any description of a problem)

Only take a value when its label "GP ID:", "Seeker ID:", "Event Date:", "Event Time:" or "Issue Details:" is present in the message. Never infer a field from an unlabeled value, even if it looks plausible.

If none of these labels is present, return exactly: null

Otherwise return JSON with exactly these keys, using "" for any field whose label is absent:
{
  "gp_id": "",
  "seeker_id": "",
  "event_date": "",
  "event_time": "",
  "issue_details": ""
}

Copy identifiers character for character. Do not drop, merge or deduplicate repeated letters or digits.
Return only raw JSON or null."#;

/// Build the full prompt for one message
pub fn build_prompt(message: &str) -> String {
    format!("{}\nMessage: \"\"\"{}\"\"\"", INSTRUCTION, message)
}

/// Payload shape accepted from the service
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFields {
    #[serde(default)]
    gp_id: Option<String>,
    #[serde(default)]
    seeker_id: Option<String>,
    #[serde(default)]
    event_date: Option<String>,
    #[serde(default)]
    event_time: Option<String>,
    #[serde(default)]
    issue_details: Option<String>,
}

impl From<RawFields> for ExtractedRecord {
    fn from(raw: RawFields) -> Self {
        Self {
            gp_id: raw.gp_id.unwrap_or_default(),
            seeker_id: raw.seeker_id.unwrap_or_default(),
            event_date: raw.event_date.unwrap_or_default(),
            event_time: raw.event_time.unwrap_or_default(),
            issue_details: raw.issue_details.unwrap_or_default(),
        }
    }
}

/// Remove markdown code fences around a JSON payload
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the service reply text into a record, or `None` for the null sentinel
pub fn parse_reply(text: &str) -> Result<Option<ExtractedRecord>, ServiceError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(ServiceError::Parse("empty reply".to_string()));
    }

    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| ServiceError::Parse(e.to_string()))?;

    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(_) => {
            let raw: RawFields =
                serde_json::from_value(value).map_err(|e| ServiceError::Parse(e.to_string()))?;
            Ok(Some(raw.into()))
        }
        other => Err(ServiceError::Parse(format!(
            "expected object or null, got {}",
            other
        ))),
    }
}

/// Turns message text into an `ExtractedRecord` via a `TextService`
#[derive(Clone)]
pub struct FieldExtractor {
    service: Arc<dyn TextService>,
    timeout: Duration,
}

impl FieldExtractor {
    pub fn new(service: Arc<dyn TextService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Extract the labeled fields from a message.
    ///
    /// One outbound call, no retries. Expiry of the timeout is reported as
    /// `ServiceError::Timeout`.
    #[instrument(skip_all, fields(service = %self.service.name()))]
    pub async fn extract(&self, message: &str) -> Result<Option<ExtractedRecord>, ServiceError> {
        let prompt = build_prompt(message);

        let output = timeout(self.timeout, self.service.generate(&prompt))
            .await
            .map_err(|_| ServiceError::Timeout(self.timeout))??;

        debug!(
            reply_len = output.content.len(),
            tokens_used = ?output.tokens_used,
            "Extraction reply received"
        );

        parse_reply(&output.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_labels_and_message() {
        let prompt = build_prompt("GP ID: 1001");
        for label in ["GP ID:", "Seeker ID:", "Event Date:", "Event Time:", "Issue Details:"] {
            assert!(prompt.contains(label), "prompt is missing {}", label);
        }
        assert!(prompt.ends_with("Message: \"\"\"GP ID: 1001\"\"\""));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\nnull\n```"), "null");
        assert_eq!(strip_code_fences("  null "), "null");
    }

    #[test]
    fn test_parse_null_sentinel() {
        assert_eq!(parse_reply("null").unwrap(), None);
        assert_eq!(parse_reply("```json\nnull\n```").unwrap(), None);
    }

    #[test]
    fn test_parse_full_object() {
        let reply = r#"```json
{"gp_id": "AA1122", "seeker_id": "77", "event_date": "01/02/2024", "event_time": "10:00 AM", "issue_details": "router down"}
```"#;
        let record = parse_reply(reply).unwrap().unwrap();
        assert_eq!(record.gp_id, "AA1122");
        assert_eq!(record.seeker_id, "77");
        assert_eq!(record.issue_details, "router down");
    }

    #[test]
    fn test_absent_and_null_keys_default_to_empty() {
        let record = parse_reply(r#"{"gp_id": "1001", "seeker_id": null}"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.gp_id, "1001");
        assert_eq!(record.seeker_id, "");
        assert_eq!(record.event_date, "");
    }

    #[test]
    fn test_malformed_replies_are_service_errors() {
        for reply in [
            "",
            "```json\n```",
            "I could not find anything",
            "[1, 2]",
            r#"{"gp_id": 1001}"#,
            r#"{"gp_id": "1", "site": "x"}"#,
        ] {
            assert!(
                matches!(parse_reply(reply), Err(ServiceError::Parse(_))),
                "expected parse failure for {:?}",
                reply
            );
        }
    }

    #[test]
    fn test_values_are_kept_verbatim() {
        let record = parse_reply(r#"{"gp_id": " aAbB11 ", "issue_details": "Line 1\nLine 2"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.gp_id, " aAbB11 ");
        assert_eq!(record.issue_details, "Line 1\nLine 2");
    }
}
