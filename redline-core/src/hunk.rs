//! Owned value types for the diff engine.
//!
//! A [`Hunk`] is one contiguous run of lines classified Insert/Delete/
//! Unmodified, with its starting offset recorded in all three coordinate
//! spaces: the source (baseline) text, the target (proposed) text, and the
//! unified view that shows both simultaneously. All types are fully owned —
//! no borrowed lifetimes — so hunk lists can be stored, cloned, and handed
//! across task boundaries freely.

/// Classification of a contiguous run of lines between two text versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HunkKind {
    /// Lines present only in the target (proposed) text.
    Insert,
    /// Lines present only in the source (baseline) text.
    Delete,
    /// Lines common to both texts.
    Unmodified,
}

/// One contiguous run of lines and where it starts in each coordinate space.
///
/// Invariants (maintained by `compute` and never patched incrementally):
/// concatenating all hunks' `lines` in list order, `\n`-joined, equals the
/// unified text; all three offsets are monotonically non-decreasing across
/// the ordered hunk list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Whether this run is inserted, deleted, or common.
    pub kind: HunkKind,
    /// The lines of the run, in order, without trailing newlines.
    pub lines: Vec<String>,
    /// Starting line offset in the source text. Advances past Delete and
    /// Unmodified runs only.
    pub source_line: usize,
    /// Starting line offset in the target text. Advances past Insert and
    /// Unmodified runs only.
    pub target_line: usize,
    /// Starting line offset in the unified view. Advances past every run.
    pub unified_line: usize,
}

impl Hunk {
    /// Number of lines in this run.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the run contains no lines (only the degenerate empty-text
    /// Unmodified hunk).
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether accept/reject on this hunk is a no-op.
    pub fn is_unmodified(&self) -> bool {
        self.kind == HunkKind::Unmodified
    }
}

/// A hunk's extent in unified-view coordinates.
///
/// Handed to the render gateway alongside the unified text so it can paint
/// per-hunk insert/delete styling and accept/reject affordances without
/// re-deriving line math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    /// The hunk's classification (drives the marker styling).
    pub kind: HunkKind,
    /// First line of the hunk in the unified view.
    pub start: usize,
    /// Number of lines the hunk spans.
    pub len: usize,
}

/// Splits a text into borrowed lines.
///
/// A text is a `\n`-separated line sequence: the empty text has zero lines,
/// and `"a\nb\n"` has three (the last empty). This convention round-trips
/// exactly through [`join_lines`], which is what keeps splice arithmetic in
/// the session honest. `compute` diffs these same lines, so a trailing
/// empty line is an ordinary diffable line rather than something the
/// differ's tokenizer may swallow.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}

/// Owned variant of [`split_lines`].
pub fn text_lines(text: &str) -> Vec<String> {
    split_lines(text).into_iter().map(str::to_owned).collect()
}

/// Inverse of [`text_lines`].
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// Newline-joins all hunks' lines in order — the text the live buffer must
/// contain while the diff is displayed.
pub fn unified_text(hunks: &[Hunk]) -> String {
    let mut all: Vec<&str> = Vec::new();
    for hunk in hunks {
        all.extend(hunk.lines.iter().map(String::as_str));
    }
    all.join("\n")
}

/// Derives the unified-view extent of every hunk, in order.
pub fn hunk_ranges(hunks: &[Hunk]) -> Vec<HunkRange> {
    hunks
        .iter()
        .map(|h| HunkRange { kind: h.kind, start: h.unified_line, len: h.len() })
        .collect()
}
