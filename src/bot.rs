//! Chat bot loop.
//!
//! Polls a `ChatTransport` and runs every inbound message through the
//! pipeline on its own task. Each message gets at most one reply.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::{ChatTransport, InboundMessage};
use crate::core::Pipeline;

/// Pause after a failed poll before trying again
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Connects a transport to the pipeline
#[derive(Clone)]
pub struct Bot {
    transport: Arc<dyn ChatTransport>,
    pipeline: Arc<Pipeline>,
}

impl Bot {
    pub fn new(transport: Arc<dyn ChatTransport>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            transport,
            pipeline,
        }
    }

    /// Process one message; returns whether a reply was sent
    pub async fn handle(&self, message: InboundMessage) -> Result<bool> {
        respond(self.transport.as_ref(), &self.pipeline, message).await
    }

    /// Spawn one task per message
    pub fn dispatch(&self, messages: Vec<InboundMessage>) -> Vec<JoinHandle<()>> {
        messages
            .into_iter()
            .map(|message| {
                let transport = Arc::clone(&self.transport);
                let pipeline = Arc::clone(&self.pipeline);
                tokio::spawn(async move {
                    let sender = message.sender.clone();
                    if let Err(e) = respond(transport.as_ref(), &pipeline, message).await {
                        error!(%sender, error = %e, "Failed to send reply");
                    }
                })
            })
            .collect()
    }

    /// Poll once and wait for every message of the batch to be handled
    pub async fn run_once(&self) -> Result<usize> {
        let messages = self.transport.poll().await?;
        let count = messages.len();

        for handle in self.dispatch(messages) {
            if let Err(e) = handle.await {
                error!(error = %e, "Message task panicked");
            }
        }

        Ok(count)
    }

    /// Poll until `shutdown` resolves, then wait for in-flight messages
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(transport = %self.transport.name(), "Bot started");
        tokio::pin!(shutdown);

        // Polled updates are already acknowledged upstream
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(pending = in_flight.len(), "Bot shutting down");
                    break;
                }
                polled = self.transport.poll() => match polled {
                    Ok(messages) => {
                        if !messages.is_empty() {
                            debug!(count = messages.len(), "Received messages");
                        }
                        in_flight.retain(|handle| !handle.is_finished());
                        in_flight.extend(self.dispatch(messages));
                    }
                    Err(e) => {
                        warn!(error = %e, "Polling failed, backing off");
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    }
                }
            }
        }

        for handle in in_flight {
            if let Err(e) = handle.await {
                error!(error = %e, "Message task panicked");
            }
        }
    }
}

async fn respond(
    transport: &dyn ChatTransport,
    pipeline: &Pipeline,
    message: InboundMessage,
) -> Result<bool> {
    match pipeline.reply(message.text.trim()).await {
        Some(reply) => {
            transport.send(&message.sender, &reply).await?;
            debug!(sender = %message.sender, "Reply sent");
            Ok(true)
        }
        None => {
            debug!(sender = %message.sender, "No reply for message");
            Ok(false)
        }
    }
}
