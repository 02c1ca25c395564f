//! The message-handling pipeline.
//!
//! raw message → extract → classify → (complete) reconcile → outcome → reply
//!
//! Failures never escape: a `ServiceError` becomes `ServiceUnavailable` and a
//! `DataSourceError` becomes `LookupFailed`. Nothing is retried.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::composer::compose;
use super::extractor::FieldExtractor;
use super::reconciler::Reconciler;
use super::validator::classify;
use crate::adapters::{GeminiAdapter, TextService};
use crate::config::BotConfig;
use crate::domain::{Completeness, PipelineOutcome};
use crate::reference::{CsvReferenceTable, ReferenceSource};

/// Default upper bound on inbound message size
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024;

/// Stateless per-message pipeline; safe to share across tasks
#[derive(Clone)]
pub struct Pipeline {
    extractor: FieldExtractor,
    reconciler: Reconciler,
    max_message_bytes: usize,
}

impl Pipeline {
    /// Create a pipeline from its two components
    pub fn new(extractor: FieldExtractor, reconciler: Reconciler) -> Self {
        Self {
            extractor,
            reconciler,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Override the inbound message size limit
    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    /// Build the production pipeline (Gemini + CSV reference table)
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let service: Arc<dyn TextService> = Arc::new(
            GeminiAdapter::new(config.service.clone())
                .context("Failed to create text-understanding adapter")?,
        );
        let source: Arc<dyn ReferenceSource> = Arc::new(CsvReferenceTable::new(
            config.reference_path.clone(),
            config.columns.clone(),
        ));

        Ok(Self::new(
            FieldExtractor::new(service, config.service_timeout()),
            Reconciler::new(source),
        )
        .with_max_message_bytes(config.max_message_bytes))
    }

    /// The extraction stage
    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    /// The reconciliation stage
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Run one message through the pipeline
    #[instrument(skip(self, message), fields(message_id = %Uuid::new_v4(), len = message.len()))]
    pub async fn run(&self, message: &str) -> PipelineOutcome {
        if message.trim().is_empty() {
            debug!("Blank message ignored");
            return PipelineOutcome::NoData;
        }

        if message.len() > self.max_message_bytes {
            warn!(
                limit = self.max_message_bytes,
                "Message exceeds size limit, not extracting"
            );
            return PipelineOutcome::MessageTooLarge {
                limit: self.max_message_bytes,
            };
        }

        let extracted = match self.extractor.extract(message).await {
            Ok(extracted) => extracted,
            Err(e) => {
                error!(error = %e, "Field extraction failed");
                return PipelineOutcome::ServiceUnavailable;
            }
        };

        let record = match classify(extracted.as_ref()) {
            Completeness::Empty => {
                debug!("No labeled fields found");
                return PipelineOutcome::NoData;
            }
            Completeness::Missing(fields) => {
                info!(missing = ?fields, "Missing fields");
                return PipelineOutcome::MissingFields { fields };
            }
            Completeness::Complete => match extracted {
                Some(record) => record,
                None => return PipelineOutcome::NoData,
            },
        };

        let outcome = match self.reconciler.reconcile(&record).await {
            Ok(result) => PipelineOutcome::from_reconciliation(record, result),
            Err(e) => {
                error!(error = %e, "Reference table lookup failed");
                PipelineOutcome::LookupFailed
            }
        };

        info!(outcome = outcome.kind(), "Message processed");
        outcome
    }

    /// Run one message and render the reply (`None` means stay silent)
    pub async fn reply(&self, message: &str) -> Option<String> {
        compose(&self.run(message).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::adapters::AdapterOutput;
    use crate::core::errors::ServiceError;
    use crate::domain::ReferenceRow;
    use crate::reference::StaticReferenceTable;

    struct CountingService {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextService for CountingService {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, _prompt: &str) -> Result<AdapterOutput, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AdapterOutput::new(self.reply.clone()))
        }
    }

    fn pipeline(service: Arc<CountingService>) -> Pipeline {
        let table = StaticReferenceTable::new(vec![ReferenceRow::new("1001", "77", "Jane")]);
        Pipeline::new(
            FieldExtractor::new(service, Duration::from_secs(1)),
            Reconciler::new(Arc::new(table)),
        )
    }

    #[tokio::test]
    async fn test_blank_and_oversized_messages_skip_the_service() {
        let service = Arc::new(CountingService {
            reply: "null".to_string(),
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline(service.clone()).with_max_message_bytes(10);

        assert_eq!(pipeline.run("   ").await, PipelineOutcome::NoData);
        assert_eq!(
            pipeline.run(&"x".repeat(11)).await,
            PipelineOutcome::MessageTooLarge { limit: 10 }
        );
        assert!(pipeline.reply(&"x".repeat(11)).await.is_some());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        assert_eq!(pipeline.run("hello").await, PipelineOutcome::NoData);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_garbage_reply_is_service_unavailable() {
        let service = Arc::new(CountingService {
            reply: "Sure! Here is the data you asked for".to_string(),
            calls: AtomicUsize::new(0),
        });
        assert_eq!(
            pipeline(service).run("GP ID: 1").await,
            PipelineOutcome::ServiceUnavailable
        );
    }
}
