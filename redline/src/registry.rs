//! The per-process registry of active diffs.
//!
//! A [`DiffRegistry`] maps each document identity to at most one active
//! [`DiffSession`] and drives the start/revert lifecycle around it. It is an
//! explicit object owned by the embedding application context — never a
//! global — and all mutation happens through `&mut self`, so session state
//! stays on one logical thread of control.
//!
//! Every mutating operation follows the same shape: snapshot the session's
//! `(source, target)` pair, mutate, render the new unified text, then retire
//! the session if it settled. If the render fails the snapshot is restored
//! (the buffer and memory must not disagree) and the error propagated; if
//! even re-rendering the restored state fails — the document closed
//! mid-operation — the session is dropped, which is the implicit revert.

use std::collections::HashMap;
use std::sync::Arc;

use redline_core::{hunk_ranges, DiffSession};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::document::DocumentId;
use crate::gateway::{GatewayError, RenderGateway};
use crate::guard::{ChangeGuard, GuardTick, GuardTicks};

/// Outcome of [`DiffRegistry::start_diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A session was created and the unified view rendered.
    Started,
    /// Source and target compute to zero visible change; no session was
    /// created and the buffer was left untouched. Informational, not an
    /// error.
    NothingToDiff,
}

/// Optional callbacks fired when the matching bulk operation resolves a
/// session.
///
/// Per-hunk accepts/rejects never fire these, even when they settle the
/// session — only an explicit `accept_all` / `reject_all` does.
#[derive(Default)]
pub struct SessionHooks {
    /// Fired after `accept_all` renders and retires the session.
    pub on_accept_all: Option<Box<dyn FnOnce(&DocumentId) + Send>>,
    /// Fired after `reject_all` renders and retires the session.
    pub on_reject_all: Option<Box<dyn FnOnce(&DocumentId) + Send>>,
}

impl SessionHooks {
    /// Hooks that do nothing.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Which operation a mutation came from, for hook dispatch and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    AcceptHunk,
    RejectHunk,
    AcceptAll,
    RejectAll,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::AcceptHunk => "accept_hunk",
            Op::RejectHunk => "reject_hunk",
            Op::AcceptAll => "accept_all",
            Op::RejectAll => "reject_all",
        }
    }
}

/// A registered session plus its host-side bookkeeping.
struct ActiveDiff {
    /// Correlation id carried by every log line for this diff's lifetime.
    diff_id: String,
    session: DiffSession,
    hooks: SessionHooks,
}

/// Process-wide map from document identity to its single active diff.
pub struct DiffRegistry {
    gateway: Arc<dyn RenderGateway>,
    guard: ChangeGuard,
    config: EngineConfig,
    sessions: HashMap<DocumentId, ActiveDiff>,
}

impl DiffRegistry {
    /// Creates the registry and the guard-tick receiver the embedder's event
    /// loop must drain into [`handle_guard_tick`](Self::handle_guard_tick).
    pub fn new(gateway: Arc<dyn RenderGateway>, config: EngineConfig) -> (Self, GuardTicks) {
        let (guard, ticks) = ChangeGuard::new(config.debounce());
        let registry = Self { gateway, guard, config, sessions: HashMap::new() };
        (registry, ticks)
    }

    /// Starts a diff for `id` over `(source, target)`.
    ///
    /// Any existing session for `id` is reverted first (its target reset to
    /// its own source, the clean state rendered, the entry removed), so at
    /// most one diff is ever active per document and the buffer is clean
    /// before the new one starts.
    ///
    /// When the pair computes to no visible change, no session is created:
    /// an informational notice is surfaced, the buffer is left untouched,
    /// and [`StartOutcome::NothingToDiff`] is returned.
    ///
    /// # Errors
    ///
    /// Propagates [`GatewayError`] from the initial render; in that case no
    /// session is registered.
    pub async fn start_diff(
        &mut self,
        id: DocumentId,
        source_text: impl Into<String>,
        target_text: impl Into<String>,
        hooks: SessionHooks,
    ) -> Result<StartOutcome, GatewayError> {
        if self.sessions.contains_key(&id) {
            self.revert_diff(&id).await?;
        }

        let session =
            DiffSession::with_algorithm(self.config.algorithm(), source_text, target_text);
        if session.is_settled() {
            info!(doc = %id, "nothing to diff");
            self.gateway
                .notify_info(&id, "Nothing to diff: the proposed content matches the buffer.");
            return Ok(StartOutcome::NothingToDiff);
        }

        let diff_id = Uuid::new_v4().to_string();
        debug!(doc = %id, diff = %diff_id, hunks = session.hunks().len(), "starting diff");

        let unified = session.unified_text();
        let ranges = hunk_ranges(session.hunks());
        self.gateway.render(&id, &unified, &ranges).await?;

        self.sessions.insert(id, ActiveDiff { diff_id, session, hooks });
        Ok(StartOutcome::Started)
    }

    /// Reverts and removes the session for `id`, restoring the baseline in
    /// the buffer. No-op when no session exists.
    ///
    /// # Errors
    ///
    /// Propagates [`GatewayError`] from the revert render; the session is
    /// removed either way.
    pub async fn revert_diff(&mut self, id: &DocumentId) -> Result<(), GatewayError> {
        let Some(mut active) = self.sessions.remove(id) else {
            return Ok(());
        };
        self.guard.cancel(id);
        active.session.reject_all();
        debug!(doc = %id, diff = %active.diff_id, "reverting diff");
        let unified = active.session.unified_text();
        let ranges = hunk_ranges(active.session.hunks());
        self.gateway.render(id, &unified, &ranges).await
    }

    /// Whether `id` currently has an active diff.
    pub fn has_diff(&self, id: &DocumentId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Read access to the active session for `id`, if any.
    pub fn session(&self, id: &DocumentId) -> Option<&DiffSession> {
        self.sessions.get(id).map(|a| &a.session)
    }

    /// Accepts the hunk at `index` of `id`'s current hunk list.
    ///
    /// Returns `true` when the session changed (and was re-rendered);
    /// `false` for Unmodified hunks, out-of-range indices, or an absent
    /// session.
    ///
    /// # Errors
    ///
    /// Propagates [`GatewayError`] after rolling the session back to its
    /// pre-mutation state.
    pub async fn accept_hunk(
        &mut self,
        id: &DocumentId,
        index: usize,
    ) -> Result<bool, GatewayError> {
        self.apply(id, Op::AcceptHunk, |s| s.accept_hunk(index)).await
    }

    /// Rejects the hunk at `index` of `id`'s current hunk list. Same
    /// no-op and error semantics as [`accept_hunk`](Self::accept_hunk).
    pub async fn reject_hunk(
        &mut self,
        id: &DocumentId,
        index: usize,
    ) -> Result<bool, GatewayError> {
        self.apply(id, Op::RejectHunk, |s| s.reject_hunk(index)).await
    }

    /// Commits every pending hunk for `id` and retires the session, firing
    /// its `on_accept_all` hook.
    pub async fn accept_all(&mut self, id: &DocumentId) -> Result<bool, GatewayError> {
        self.apply(id, Op::AcceptAll, |s| {
            s.accept_all();
            true
        })
        .await
    }

    /// Discards every pending hunk for `id` and retires the session, firing
    /// its `on_reject_all` hook.
    pub async fn reject_all(&mut self, id: &DocumentId) -> Result<bool, GatewayError> {
        self.apply(id, Op::RejectAll, |s| {
            s.reject_all();
            true
        })
        .await
    }

    /// Feeds a buffer-change notification into the guard.
    ///
    /// Ignored when no session is active for `id`. The actual comparison
    /// happens in [`handle_guard_tick`](Self::handle_guard_tick) once the
    /// debounce expires.
    pub fn handle_change(&mut self, id: &DocumentId, new_full_text: impl Into<String>) {
        if !self.sessions.contains_key(id) {
            return;
        }
        self.guard.schedule(id.clone(), new_full_text.into());
    }

    /// Compares a debounced buffer observation against the session's
    /// unified text, reverting stray external edits.
    ///
    /// Returns `true` when a stray edit was reverted (the unified text was
    /// re-rendered and a warning surfaced). Ticks for documents with no
    /// active session, or whose buffer matches the unified text, return
    /// `false`.
    ///
    /// # Errors
    ///
    /// Propagates [`GatewayError`] from the revert render; the session
    /// survives (its in-memory state never changed).
    pub async fn handle_guard_tick(&self, tick: GuardTick) -> Result<bool, GatewayError> {
        let (unified, ranges, diff_id) = match self.sessions.get(&tick.doc) {
            Some(active) => (
                active.session.unified_text(),
                hunk_ranges(active.session.hunks()),
                active.diff_id.clone(),
            ),
            None => return Ok(false),
        };
        if tick.observed == unified {
            return Ok(false);
        }

        warn!(doc = %tick.doc, diff = %diff_id, "external edit during active diff; reverting buffer");
        self.gateway.render(&tick.doc, &unified, &ranges).await?;
        self.gateway.notify_warning(
            &tick.doc,
            "The buffer was edited while a diff is active; the edit was reverted. \
             Accept or reject the pending changes before editing.",
        );
        Ok(true)
    }

    /// Tears down `id`'s session when its document closes. No render is
    /// issued — the buffer is gone.
    pub fn handle_close(&mut self, id: &DocumentId) {
        self.guard.cancel(id);
        if let Some(active) = self.sessions.remove(id) {
            debug!(doc = %id, diff = %active.diff_id, "document closed; dropping session");
        }
    }

    /// Re-renders `id`'s unified view when its document regains focus, so
    /// decorations reappear. No-op without a session.
    ///
    /// # Errors
    ///
    /// Propagates [`GatewayError`] from the render.
    pub async fn handle_activate(&self, id: &DocumentId) -> Result<(), GatewayError> {
        let (unified, ranges) = match self.sessions.get(id) {
            Some(active) => {
                (active.session.unified_text(), hunk_ranges(active.session.hunks()))
            }
            None => return Ok(()),
        };
        self.gateway.render(id, &unified, &ranges).await
    }

    /// Runs one mutation through the snapshot / mutate / render / retire
    /// pipeline shared by all four operations.
    async fn apply<F>(&mut self, id: &DocumentId, op: Op, f: F) -> Result<bool, GatewayError>
    where
        F: FnOnce(&mut DiffSession) -> bool,
    {
        let (snapshot, unified, ranges, diff_id) = {
            let Some(active) = self.sessions.get_mut(id) else {
                return Ok(false);
            };
            let snapshot = (
                active.session.source_text().to_owned(),
                active.session.target_text().to_owned(),
            );
            if !f(&mut active.session) {
                return Ok(false);
            }
            (
                snapshot,
                active.session.unified_text(),
                hunk_ranges(active.session.hunks()),
                active.diff_id.clone(),
            )
        };

        debug!(doc = %id, diff = %diff_id, op = op.name(), "hunk state changed");

        match self.gateway.render(id, &unified, &ranges).await {
            Ok(()) => {
                if let Some(retired) = self.retire_if_settled(id) {
                    match op {
                        Op::AcceptAll => {
                            if let Some(hook) = retired.hooks.on_accept_all {
                                hook(id);
                            }
                        }
                        Op::RejectAll => {
                            if let Some(hook) = retired.hooks.on_reject_all {
                                hook(id);
                            }
                        }
                        Op::AcceptHunk | Op::RejectHunk => {}
                    }
                }
                Ok(true)
            }
            Err(err) => {
                warn!(doc = %id, diff = %diff_id, op = op.name(), error = %err,
                      "render failed; restoring last known-good state");
                let restore = match self.sessions.get_mut(id) {
                    Some(active) => {
                        active.session.reset_to(snapshot.0, snapshot.1);
                        (active.session.unified_text(), hunk_ranges(active.session.hunks()))
                    }
                    None => return Err(err),
                };
                if let Err(restore_err) = self.gateway.render(id, &restore.0, &restore.1).await {
                    // The document is effectively gone; dropping the session
                    // is the implicit revert.
                    warn!(doc = %id, diff = %diff_id, error = %restore_err,
                          "restore render failed; dropping session");
                    self.guard.cancel(id);
                    self.sessions.remove(id);
                }
                Err(err)
            }
        }
    }

    /// Removes and returns `id`'s session when every hunk has been resolved.
    fn retire_if_settled(&mut self, id: &DocumentId) -> Option<ActiveDiff> {
        let settled = self.sessions.get(id).map(|a| a.session.is_settled())?;
        if !settled {
            return None;
        }
        self.guard.cancel(id);
        let active = self.sessions.remove(id)?;
        debug!(doc = %id, diff = %active.diff_id, "diff fully resolved; retiring session");
        Some(active)
    }
}
