//! Sink abstraction: where classified items and outbound payloads go.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::SinkError;
use crate::message::Payload;

/// Receives outbound payloads (the transport side).
#[async_trait]
pub trait OutboundSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Hand one payload to the transport.
    async fn deliver(&self, payload: Payload) -> Result<(), SinkError>;
}

/// Forwards payloads into an unbounded channel.
pub struct ChannelSink {
    name: String,
    tx: mpsc::UnboundedSender<Payload>,
}

impl ChannelSink {
    pub fn new(name: impl Into<String>, tx: mpsc::UnboundedSender<Payload>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

#[async_trait]
impl OutboundSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, payload: Payload) -> Result<(), SinkError> {
        self.tx.send(payload).map_err(|_| SinkError::Disconnected {
            name: self.name.clone(),
        })
    }
}

/// Writes payloads to stdout, one text value per line.
pub struct StdoutSink;

#[async_trait]
impl OutboundSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn deliver(&self, payload: Payload) -> Result<(), SinkError> {
        let texts = payload.into_texts();
        info!(count = texts.len(), "Sending");
        for text in texts {
            println!("{text}");
        }
        Ok(())
    }
}
