//! Line-level diff computation.
//!
//! Wraps the `similar` crate's differ: consecutive changes with the same
//! tag are grouped into one [`Hunk`], and three running counters track
//! where each run starts in source, target, and unified coordinates. The
//! unified counter advances for every run regardless of kind, because the
//! unified view shows deleted and inserted regions in place simultaneously.
//!
//! Both texts are split with [`split_lines`] and diffed as line slices, so
//! the differ sees exactly the lines the session will later splice — in
//! particular the empty final line of a text ending in `\n` diffs like any
//! other line instead of being swallowed by newline tokenization.
//!
//! Determinism: `similar` is deterministic for a fixed algorithm, so
//! identical inputs always yield an identical hunk list.

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::hunk::{split_lines, Hunk, HunkKind};

/// Computes the ordered hunk list for `(source, target)` with Myers.
///
/// Myers is the default for the same reason the rest of the ecosystem picks
/// it: fastest on typical code-sized inputs. Use [`compute_with`] to select
/// Patience or LCS instead.
pub fn compute(source: &str, target: &str) -> Vec<Hunk> {
    compute_with(Algorithm::Myers, source, target)
}

/// Computes the ordered hunk list for `(source, target)` with an explicit
/// diff algorithm.
///
/// Degenerate case: when the differ reports no changes (including two empty
/// inputs), the result is exactly one Unmodified hunk spanning the whole
/// text, never an empty list.
pub fn compute_with(algorithm: Algorithm, source: &str, target: &str) -> Vec<Hunk> {
    let source_lines = split_lines(source);
    let target_lines = split_lines(target);
    let diff = TextDiff::configure()
        .algorithm(algorithm)
        .diff_slices(&source_lines, &target_lines);

    let mut hunks: Vec<Hunk> = Vec::new();
    let mut source_line = 0usize;
    let mut target_line = 0usize;
    let mut unified_line = 0usize;
    let mut run: Option<(HunkKind, Vec<String>)> = None;

    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Insert => HunkKind::Insert,
            ChangeTag::Delete => HunkKind::Delete,
            ChangeTag::Equal => HunkKind::Unmodified,
        };
        let line = change.value().to_owned();

        match &mut run {
            Some((current, lines)) if *current == kind => lines.push(line),
            _ => {
                if let Some((k, lines)) = run.take() {
                    push_run(&mut hunks, k, lines, &mut source_line, &mut target_line, &mut unified_line);
                }
                run = Some((kind, vec![line]));
            }
        }
    }
    if let Some((k, lines)) = run.take() {
        push_run(&mut hunks, k, lines, &mut source_line, &mut target_line, &mut unified_line);
    }

    // Two empty inputs produce zero change runs; normalise to the
    // single-Unmodified shape so the degenerate case is uniform.
    if hunks.is_empty() {
        hunks.push(Hunk {
            kind: HunkKind::Unmodified,
            lines: Vec::new(),
            source_line: 0,
            target_line: 0,
            unified_line: 0,
        });
    }

    hunks
}

/// Appends one completed run as a hunk and advances the coordinate counters.
///
/// `source_line` advances only past Delete and Unmodified runs, `target_line`
/// only past Insert and Unmodified runs, `unified_line` past every run.
fn push_run(
    hunks: &mut Vec<Hunk>,
    kind: HunkKind,
    lines: Vec<String>,
    source_line: &mut usize,
    target_line: &mut usize,
    unified_line: &mut usize,
) {
    let len = lines.len();
    hunks.push(Hunk {
        kind,
        lines,
        source_line: *source_line,
        target_line: *target_line,
        unified_line: *unified_line,
    });
    match kind {
        HunkKind::Insert => *target_line += len,
        HunkKind::Delete => *source_line += len,
        HunkKind::Unmodified => {
            *source_line += len;
            *target_line += len;
        }
    }
    *unified_line += len;
}
