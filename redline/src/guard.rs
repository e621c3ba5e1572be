//! Debounced detection of external buffer edits.
//!
//! While a diff is active the live buffer is expected to contain exactly the
//! session's unified text. Every buffer-change notification schedules a
//! check here; the short debounce lets the engine's own just-issued render
//! settle so it is not misread as a stray edit. Each new change event
//! cancels and replaces the pending check, so overlapping validations for
//! one document cannot race.
//!
//! The guard itself never touches registry state: after the debounce it
//! emits a [`GuardTick`] on an unbounded channel, and whoever owns the
//! `DiffRegistry` drains that channel and calls `handle_guard_tick`. This
//! keeps all session mutation on one logical thread of control.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::document::DocumentId;

/// Receiver half of the guard channel, owned by the registry's event loop.
pub type GuardTicks = UnboundedReceiver<GuardTick>;

/// A debounce that expired: `observed` is the buffer content reported by the
/// change notification that scheduled it.
///
/// A tick may arrive after its session was retired or cancelled mid-flight;
/// `DiffRegistry::handle_guard_tick` ignores ticks for documents with no
/// active session.
#[derive(Debug)]
pub struct GuardTick {
    /// The document whose buffer changed.
    pub doc: DocumentId,
    /// The full buffer content at notification time.
    pub observed: String,
}

/// Per-document cancelable debounce timers.
pub struct ChangeGuard {
    debounce: Duration,
    tx: UnboundedSender<GuardTick>,
    pending: HashMap<DocumentId, JoinHandle<()>>,
}

impl ChangeGuard {
    /// Creates the guard and the channel its ticks arrive on.
    pub fn new(debounce: Duration) -> (Self, GuardTicks) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { debounce, tx, pending: HashMap::new() }, rx)
    }

    /// Schedules a debounced check for `doc`, cancelling any pending one.
    ///
    /// Only the most recent `observed` content per document survives the
    /// debounce window.
    pub fn schedule(&mut self, doc: DocumentId, observed: String) {
        if let Some(handle) = self.pending.remove(&doc) {
            handle.abort();
        }
        let tx = self.tx.clone();
        let debounce = self.debounce;
        let key = doc.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Receiver gone means the registry is shutting down; nothing to do.
            let _ = tx.send(GuardTick { doc, observed });
        });
        self.pending.insert(key, handle);
    }

    /// Cancels the pending check for `doc`, if any.
    ///
    /// Called when a session is retired, reverted, or its document closes.
    pub fn cancel(&mut self, doc: &DocumentId) {
        if let Some(handle) = self.pending.remove(doc) {
            handle.abort();
        }
    }
}

impl Drop for ChangeGuard {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}
