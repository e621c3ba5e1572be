//! redline-core — the pure diff engine behind redline's inline review flow.
//!
//! Given a `(source, target)` text pair this crate derives an ordered list
//! of typed [`Hunk`]s (Insert / Delete / Unmodified runs with coordinates in
//! source, target, and unified space) and drives the accept/reject state
//! machine over them. Everything here is synchronous and in-memory; the
//! async lifecycle layer (registry, change guard, render gateway) lives in
//! the `redline` crate.
//!
//! The line-level differ itself is `similar` — this crate only groups its
//! change runs into hunks and keeps the coordinate bookkeeping honest.

pub mod compute;
pub mod hunk;
pub mod session;

pub use compute::{compute, compute_with};
pub use hunk::{hunk_ranges, unified_text, Hunk, HunkKind, HunkRange};
pub use session::DiffSession;

// Re-exported so the host crate can map config strings to algorithms
// without depending on `similar` directly.
pub use similar::Algorithm;
