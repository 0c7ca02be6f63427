//! Demo agents built from the relay core.
//!
//! Every agent exposes the same two hooks: a receive hook fed by the
//! transport and a send hook polled for the next outbound payload. The
//! runtime drives each hook from its own task; the two only meet in the
//! agent's mailbox.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::batch::{BatchAggregator, BatchFormat};
use crate::classifier::{Destination, InboundClassifier};
use crate::config::{AggregatorConfig, CycleConfig};
use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::message::{Item, Payload};
use crate::qa::QaTable;
use crate::questions::{PacedQuestions, QuestionCycle};

/// Receive/send hooks driven by [`crate::runtime::spawn_agent`].
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Handle one inbound message from the transport.
    async fn on_receive(&self, raw: serde_json::Value) -> Result<()>;

    /// Produce the next outbound payload. `Ok(None)` means the agent has
    /// nothing more to send and its send path should stop.
    async fn next_outbound(&self) -> Result<Option<Payload>>;

    /// Release anything the send path may be suspended on.
    fn shutdown(&self) {}
}

/// Prefix an answer with the address it responds to.
pub fn format_reply(origin: Option<&str>, answer: &str) -> String {
    match origin {
        Some(addr) if !addr.is_empty() => format!("[Response to {addr}] {answer}"),
        _ => answer.to_string(),
    }
}

// ── Answer agent ────────────────────────────────────────────────────

/// Answers known questions, batching replies that arrive close together.
pub struct AnswerAgent {
    qa: Arc<QaTable>,
    aggregator: BatchAggregator<Item>,
}

impl AnswerAgent {
    pub fn new(qa: Arc<QaTable>, config: AggregatorConfig) -> Self {
        Self {
            qa,
            aggregator: BatchAggregator::new(Mailbox::new(), config),
        }
    }
}

#[async_trait]
impl Agent for AnswerAgent {
    fn name(&self) -> &str {
        "AnswerBot"
    }

    async fn on_receive(&self, raw: serde_json::Value) -> Result<()> {
        let item = Item::from_envelope(raw);
        info!(
            item_id = %item.id(),
            origin = item.origin().unwrap_or(""),
            "Received: {}",
            item.render()
        );

        let Some(answer) = item.text().and_then(|q| self.qa.lookup(q)) else {
            debug!(item_id = %item.id(), "No answer for question");
            return Ok(());
        };

        let reply = match item.origin() {
            Some(origin) => Item::new(answer).with_origin(origin),
            None => Item::new(answer),
        };
        debug!(item_id = %item.id(), reply_id = %reply.id(), "Queued reply");
        self.aggregator.mailbox().put(reply)?;
        Ok(())
    }

    async fn next_outbound(&self) -> Result<Option<Payload>> {
        let batch = self.aggregator.collect_batch().await?;
        let replies = batch.map(|item| format_reply(item.origin(), &item.render()));
        Ok(Some(BatchFormat::lines().render(replies)))
    }

    fn shutdown(&self) {
        self.aggregator.mailbox().close();
    }
}

// ── Question agent ──────────────────────────────────────────────────

/// Asks every known question in turn at a fixed pace.
pub struct QuestionAgent {
    questions: Mutex<PacedQuestions>,
}

impl QuestionAgent {
    pub fn new(qa: &QaTable, config: CycleConfig) -> Result<Self> {
        let cycle = QuestionCycle::new(qa.questions().iter().cloned())?;
        Ok(Self {
            questions: Mutex::new(PacedQuestions::new(cycle, config.pace)),
        })
    }
}

#[async_trait]
impl Agent for QuestionAgent {
    fn name(&self) -> &str {
        "QuestionBot"
    }

    async fn on_receive(&self, raw: serde_json::Value) -> Result<()> {
        let item = Item::from_envelope(raw);
        info!("Received: {}", item.render());
        Ok(())
    }

    async fn next_outbound(&self) -> Result<Option<Payload>> {
        let question = self.questions.lock().await.next().await;
        info!("(Asked: {question})");
        Ok(Some(Payload::Text(question)))
    }
}

// ── Reporter agent ──────────────────────────────────────────────────

/// Collects classified inbound traffic and reports it in periodic lists.
pub struct ReporterAgent {
    classifier: InboundClassifier,
    aggregator: BatchAggregator<Item>,
}

impl ReporterAgent {
    pub fn new(config: AggregatorConfig) -> Self {
        let mailbox = Mailbox::new();
        Self {
            classifier: InboundClassifier::new(Destination::Mailbox(Arc::clone(&mailbox))),
            aggregator: BatchAggregator::new(mailbox, config),
        }
    }
}

#[async_trait]
impl Agent for ReporterAgent {
    fn name(&self) -> &str {
        "ReporterAgent"
    }

    async fn on_receive(&self, raw: serde_json::Value) -> Result<()> {
        self.classifier.accept(raw)?;
        Ok(())
    }

    async fn next_outbound(&self) -> Result<Option<Payload>> {
        let batch = self.aggregator.collect_batch().await?;
        Ok(Some(BatchFormat::List.render(batch.map(|item| item.render()))))
    }

    fn shutdown(&self) {
        self.aggregator.mailbox().close();
    }
}

// ── Chat agent ──────────────────────────────────────────────────────

/// Traces inbound traffic and sends whatever the operator types.
pub struct ChatAgent {
    classifier: InboundClassifier,
    input: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl ChatAgent {
    pub fn new(input: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            classifier: InboundClassifier::new(Destination::TraceOnly),
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl Agent for ChatAgent {
    fn name(&self) -> &str {
        "ChatAgent"
    }

    async fn on_receive(&self, raw: serde_json::Value) -> Result<()> {
        self.classifier.accept(raw)?;
        // Put the operator's receive prompt back after the trace line.
        eprint!("r> ");
        Ok(())
    }

    async fn next_outbound(&self) -> Result<Option<Payload>> {
        Ok(self.input.lock().await.recv().await.map(Payload::Text))
    }
}
