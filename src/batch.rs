//! Batch aggregation: turn arbitrarily-timed puts into non-empty batches.
//!
//! One aggregation cycle:
//! 1. Wait on the mailbox for the first item (no timeout)
//! 2. Sleep for the grace period
//! 3. Drain whatever is queued at that moment without blocking
//!
//! Items that land exactly as the grace period expires may end up in this
//! batch or the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::AggregatorConfig;
use crate::error::MailboxError;
use crate::mailbox::Mailbox;
use crate::message::Payload;

// ── Batch ───────────────────────────────────────────────────────────

/// A non-empty, arrival-ordered snapshot of drained items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    first: T,
    rest: Vec<T>,
}

impl<T> Batch<T> {
    fn new(first: T) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    fn push(&mut self, item: T) {
        self.rest.push(item);
    }

    /// Always at least 1.
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// The item that opened the cycle.
    pub fn first(&self) -> &T {
        &self.first
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.into_iter().collect()
    }

    /// Transform every item, keeping order and non-emptiness.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Batch<U> {
        Batch {
            first: f(self.first),
            rest: self.rest.into_iter().map(f).collect(),
        }
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = T;
    type IntoIter = std::iter::Chain<std::iter::Once<T>, std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.first).chain(self.rest)
    }
}

/// How a batch of text is handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchFormat {
    /// One text value, items joined by the separator.
    Joined(String),
    /// A sequence with one entry per item.
    List,
}

impl BatchFormat {
    /// Newline-joined text.
    pub fn lines() -> Self {
        Self::Joined("\n".to_string())
    }

    pub fn render(&self, batch: Batch<String>) -> Payload {
        match self {
            Self::Joined(sep) => Payload::Text(batch.into_vec().join(sep)),
            Self::List => Payload::List(batch.into_vec()),
        }
    }
}

// ── Aggregator ──────────────────────────────────────────────────────

/// Run one aggregation cycle against `mailbox`.
///
/// Returns `Err(MailboxError::Closed)` when the mailbox is closed before a
/// first item arrives or at any point during the cycle. Items already taken
/// by an interrupted cycle are dropped.
pub async fn collect_batch<T>(
    mailbox: &Mailbox<T>,
    grace_period: Duration,
) -> Result<Batch<T>, MailboxError> {
    let first = mailbox.get().await?;
    let opened_at = Instant::now();

    tokio::time::sleep(grace_period).await;

    let mut batch = Batch::new(first);
    loop {
        match mailbox.try_get() {
            Ok(Some(item)) => batch.push(item),
            Ok(None) => break,
            Err(MailboxError::Closed) => {
                debug!(dropped = batch.len(), "Mailbox closed during drain");
                return Err(MailboxError::Closed);
            }
        }
    }

    debug!(
        size = batch.len(),
        waited_ms = opened_at.elapsed().as_millis() as u64,
        "Batch collected"
    );
    Ok(batch)
}

/// A mailbox paired with its grace period.
///
/// Cycles never overlap: concurrent callers of [`BatchAggregator::collect_batch`]
/// are served one cycle at a time.
pub struct BatchAggregator<T> {
    mailbox: Arc<Mailbox<T>>,
    config: AggregatorConfig,
    cycle: Mutex<()>,
}

impl<T> BatchAggregator<T> {
    pub fn new(mailbox: Arc<Mailbox<T>>, config: AggregatorConfig) -> Self {
        Self {
            mailbox,
            config,
            cycle: Mutex::new(()),
        }
    }

    pub fn mailbox(&self) -> &Arc<Mailbox<T>> {
        &self.mailbox
    }

    pub fn grace_period(&self) -> Duration {
        self.config.grace_period
    }

    pub async fn collect_batch(&self) -> Result<Batch<T>, MailboxError> {
        let _cycle = self.cycle.lock().await;
        collect_batch(&self.mailbox, self.config.grace_period).await
    }
}
