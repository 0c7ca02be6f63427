//! Mailbox: unbounded FIFO shared between producer tasks and one consumer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tracing::debug;

use crate::error::MailboxError;

/// Unbounded, ordered, concurrency-safe queue.
///
/// `put` never suspends. `get` suspends until an item is available. `try_get`
/// polls without suspending. After [`Mailbox::close`], items already queued
/// are still handed out; once they are gone every call reports
/// [`MailboxError::Closed`].
pub struct Mailbox<T> {
    items: Mutex<VecDeque<T>>,
    available: Notify,
    closed: AtomicBool,
}

impl<T> Mailbox<T> {
    /// Create a new, empty mailbox.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            closed: AtomicBool::new(false),
        })
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<T>> {
        // The lock is never held across a panic point that leaves the deque torn.
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue an item at the back.
    pub fn put(&self, item: T) -> Result<(), MailboxError> {
        if self.is_closed() {
            return Err(MailboxError::Closed);
        }
        self.items().push_back(item);
        self.available.notify_one();
        Ok(())
    }

    /// Wait until an item is available and remove the oldest one.
    ///
    /// There is no timeout: this only returns once an item arrives or the
    /// mailbox is closed and empty.
    pub async fn get(&self) -> Result<T, MailboxError> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register interest before checking state so a concurrent put or
            // close cannot slip between the check and the await.
            notified.as_mut().enable();

            if let Some(item) = self.try_get()? {
                return Ok(item);
            }

            notified.await;
        }
    }

    /// Remove the oldest item if one is immediately available.
    ///
    /// `Ok(None)` means the mailbox is empty right now.
    pub fn try_get(&self) -> Result<Option<T>, MailboxError> {
        let item = self.items().pop_front();
        match item {
            Some(item) => {
                // Pass the wakeup on if more items remain for another waiter.
                if !self.is_empty() {
                    self.available.notify_one();
                }
                Ok(Some(item))
            }
            None if self.is_closed() => Err(MailboxError::Closed),
            None => Ok(None),
        }
    }

    /// Shut the mailbox down. Further `put` calls fail; suspended `get` calls
    /// wake up and drain what is left before reporting `Closed`.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(pending = self.len(), "Mailbox closed");
        }
        self.available.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}
