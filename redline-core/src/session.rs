//! The per-document accept/reject state machine.
//!
//! A [`DiffSession`] owns one document's active diff: the accepted baseline
//! (`source_text`), the proposed content (`target_text`), and the hunk list
//! derived from them. Mutations follow a strict discipline: hunk offsets are
//! used only to locate splice points in the text being edited, then the
//! entire hunk list is recomputed from the new `(source, target)` pair.
//! Hunk objects are never patched incrementally, which removes the whole
//! class of off-by-one drift that manual index-shifting invites.
//!
//! Hunks are addressed by index into the session's *current* list. A stale
//! hunk value from before a mutation cannot be dispatched at all; an
//! out-of-range index is the same silent no-op as an Unmodified hunk.

use similar::Algorithm;

use crate::compute::compute_with;
use crate::hunk::{join_lines, text_lines, unified_text, Hunk, HunkKind};

/// One document's active diff and its accept/reject state machine.
#[derive(Debug, Clone)]
pub struct DiffSession {
    source_text: String,
    target_text: String,
    hunks: Vec<Hunk>,
    algorithm: Algorithm,
}

impl DiffSession {
    /// Creates a session over `(source, target)` using the Myers differ.
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self::with_algorithm(Algorithm::Myers, source_text, target_text)
    }

    /// Creates a session with an explicit diff algorithm.
    ///
    /// The algorithm is remembered and reused by every recompute, so a
    /// session's hunk shapes stay consistent across its whole lifetime.
    pub fn with_algorithm(
        algorithm: Algorithm,
        source_text: impl Into<String>,
        target_text: impl Into<String>,
    ) -> Self {
        let source_text = source_text.into();
        let target_text = target_text.into();
        let hunks = compute_with(algorithm, &source_text, &target_text);
        Self { source_text, target_text, hunks, algorithm }
    }

    /// The accepted baseline text.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// The proposed text.
    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    /// The current hunk list. Replaced wholesale by every mutation — indices
    /// handed to [`accept_hunk`](Self::accept_hunk) and
    /// [`reject_hunk`](Self::reject_hunk) must come from this list.
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// The text the live buffer must contain while this diff is displayed.
    pub fn unified_text(&self) -> String {
        unified_text(&self.hunks)
    }

    /// Whether every hunk has been resolved: the list is empty or a single
    /// Unmodified hunk. A settled session has nothing left to accept or
    /// reject and can be retired.
    pub fn is_settled(&self) -> bool {
        match self.hunks.as_slice() {
            [] => true,
            [only] => only.is_unmodified(),
            _ => false,
        }
    }

    /// Commits the hunk at `index` into the baseline text.
    ///
    /// Insert lines are spliced into `source_text` at the hunk's source
    /// offset; Delete lines are removed from it. A Delete immediately
    /// followed by an Insert is a line replacement and commits atomically:
    /// accepting the Delete also accepts the following Insert. (Only that
    /// direction — an Insert followed by a Delete is two independent hunks,
    /// matching the differ's delete-then-insert run ordering for replaces.)
    ///
    /// Returns `true` when the texts changed. Unmodified hunks and
    /// out-of-range indices are silent no-ops returning `false`.
    pub fn accept_hunk(&mut self, index: usize) -> bool {
        let (kind, lines, at) = match self.hunks.get(index) {
            Some(h) => (h.kind, h.lines.clone(), h.source_line),
            None => return false,
        };
        match kind {
            HunkKind::Unmodified => false,
            HunkKind::Insert => {
                let mut source = text_lines(&self.source_text);
                splice_in(&mut source, at, &lines);
                self.source_text = join_lines(&source);
                self.recompute();
                true
            }
            HunkKind::Delete => {
                let paired = self.paired_insert(index).map(|h| h.lines.clone());
                let mut source = text_lines(&self.source_text);
                splice_out(&mut source, at, lines.len());
                if let Some(insert) = paired {
                    splice_in(&mut source, at, &insert);
                }
                self.source_text = join_lines(&source);
                self.recompute();
                true
            }
        }
    }

    /// Removes the hunk at `index` from the proposed text — the mirror of
    /// [`accept_hunk`](Self::accept_hunk) operating on `target_text`.
    ///
    /// Insert lines are removed from `target_text` at the hunk's target
    /// offset; Delete lines are re-inserted there. The same
    /// Delete→following-Insert pairing applies: rejecting the Delete of a
    /// replacement also rejects its Insert, restoring the baseline lines.
    ///
    /// Returns `true` when the texts changed; no-ops return `false`.
    pub fn reject_hunk(&mut self, index: usize) -> bool {
        let (kind, lines, at) = match self.hunks.get(index) {
            Some(h) => (h.kind, h.lines.clone(), h.target_line),
            None => return false,
        };
        match kind {
            HunkKind::Unmodified => false,
            HunkKind::Insert => {
                let mut target = text_lines(&self.target_text);
                splice_out(&mut target, at, lines.len());
                self.target_text = join_lines(&target);
                self.recompute();
                true
            }
            HunkKind::Delete => {
                // The paired Insert occupies the target at the same offset
                // (target_line does not advance past a Delete); drop it
                // before restoring the deleted lines.
                let paired = self.paired_insert(index).map(|h| h.len());
                let mut target = text_lines(&self.target_text);
                if let Some(count) = paired {
                    splice_out(&mut target, at, count);
                }
                splice_in(&mut target, at, &lines);
                self.target_text = join_lines(&target);
                self.recompute();
                true
            }
        }
    }

    /// Commits every pending hunk: `source_text := target_text`.
    ///
    /// Collapses the hunk list to a single Unmodified hunk.
    pub fn accept_all(&mut self) {
        self.source_text = self.target_text.clone();
        self.recompute();
    }

    /// Discards every pending hunk: `target_text := source_text`.
    ///
    /// Same end state as [`accept_all`](Self::accept_all) — a single
    /// Unmodified hunk — but the baseline wins.
    pub fn reject_all(&mut self) {
        self.target_text = self.source_text.clone();
        self.recompute();
    }

    /// Replaces both texts and re-derives the hunk list.
    ///
    /// Used by the registry to roll a session back to its last known-good
    /// `(source, target)` pair after a render failure.
    pub fn reset_to(&mut self, source_text: impl Into<String>, target_text: impl Into<String>) {
        self.source_text = source_text.into();
        self.target_text = target_text.into();
        self.recompute();
    }

    /// The Insert hunk immediately following `index`, if any.
    fn paired_insert(&self, index: usize) -> Option<&Hunk> {
        self.hunks.get(index + 1).filter(|h| h.kind == HunkKind::Insert)
    }

    fn recompute(&mut self) {
        self.hunks = compute_with(self.algorithm, &self.source_text, &self.target_text);
    }
}

/// Inserts `new` into `lines` starting at `at` (clamped to the end).
fn splice_in(lines: &mut Vec<String>, at: usize, new: &[String]) {
    let at = at.min(lines.len());
    lines.splice(at..at, new.iter().cloned());
}

/// Removes `count` lines from `lines` starting at `at` (clamped to the end).
fn splice_out(lines: &mut Vec<String>, at: usize, count: usize) {
    let at = at.min(lines.len());
    let end = at.saturating_add(count).min(lines.len());
    lines.drain(at..end);
}
