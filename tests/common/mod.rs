//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use sitebot::adapters::{AdapterOutput, TextService};
use sitebot::core::{FieldExtractor, Reconciler, ServiceError};
use sitebot::reference::{CsvReferenceTable, ReferenceColumns};
use sitebot::Pipeline;

pub const FULL_MESSAGE: &str = "GP ID: 1001\nSeeker ID: 77\nEvent Date: 01/02/2024\nEvent Time: 10:00 AM\nIssue Details: router down";

pub const FULL_REPLY: &str = r#"```json
{
  "gp_id": "1001",
  "seeker_id": "77",
  "event_date": "01/02/2024",
  "event_time": "10:00 AM",
  "issue_details": "router down"
}
```"#;

/// Build a service reply for the given identifiers with the other fields filled in
pub fn reply_for(gp_id: &str, seeker_id: &str) -> String {
    serde_json::json!({
        "gp_id": gp_id,
        "seeker_id": seeker_id,
        "event_date": "01/02/2024",
        "event_time": "10:00 AM",
        "issue_details": "router down",
    })
    .to_string()
}

/// Text service returning a canned reply, optionally after a delay
pub struct CannedService {
    pub reply: String,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl CannedService {
    pub fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(reply: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextService for CannedService {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> Result<AdapterOutput, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(AdapterOutput::new(self.reply.clone()))
    }
}

/// Text service that always fails at the transport level
pub struct DownService;

#[async_trait]
impl TextService for DownService {
    fn name(&self) -> &str {
        "down"
    }

    async fn generate(&self, _prompt: &str) -> Result<AdapterOutput, ServiceError> {
        Err(ServiceError::Status {
            status: 503,
            body: "upstream connect error".to_string(),
        })
    }
}

/// Reference table on disk
pub struct TableFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TableFixture {
    pub fn new(csv: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, csv).unwrap();
        Self { dir, path }
    }

    pub fn rewrite(&self, csv: &str) {
        std::fs::write(&self.path, csv).unwrap();
    }

    pub fn table(&self) -> CsvReferenceTable {
        CsvReferenceTable::new(self.path.clone(), ReferenceColumns::default())
    }
}

pub const TABLE_HEADER: &str = "GP ID,Seeker ID,1st Level POC (Umbrella ZM)";

/// CSV content with the default header
pub fn table_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut out = String::from(TABLE_HEADER);
    out.push('\n');
    for (gp, seeker, contact) in rows {
        out.push_str(&format!("{},{},{}\n", gp, seeker, contact));
    }
    out
}

/// Pipeline over a text service and a CSV table
pub fn pipeline_with(service: Arc<dyn TextService>, table: CsvReferenceTable, timeout: Duration) -> Pipeline {
    Pipeline::new(
        FieldExtractor::new(service, timeout),
        Reconciler::new(Arc::new(table)),
    )
}
