//! redline — inline unified-diff review engine, host layer.
//!
//! This crate wraps the pure diff machinery in `redline-core` with the
//! lifecycle an editor integration needs:
//!
//! - [`DiffRegistry`] — at most one active [`DiffSession`] per document,
//!   start/revert lifecycle, per-hunk and bulk accept/reject with
//!   render-failure rollback.
//! - [`ChangeGuard`] — debounced, cancelable re-validation of the live
//!   buffer against the session's unified text; stray external edits are
//!   reverted with a warning.
//! - [`RenderGateway`] — the collaborator trait the integration implements
//!   to paint the unified view and surface notices. The engine never
//!   touches a buffer directly.
//!
//! # Wiring
//!
//! The embedder owns the registry and drives it from a single event loop:
//! document lifecycle events map to [`DiffRegistry::handle_close`] /
//! [`DiffRegistry::handle_activate`] / [`DiffRegistry::handle_change`], UI
//! actions to the accept/reject methods, and the [`GuardTick`] receiver
//! returned by [`DiffRegistry::new`] is drained into
//! [`DiffRegistry::handle_guard_tick`]. All state lives behind `&mut self`,
//! so there is one logical thread of control and renders for a document are
//! naturally serialized.
//!
//! No subscriber is installed for the `tracing` output; that belongs to the
//! embedding application.

pub mod config;
pub mod document;
pub mod gateway;
pub mod guard;
pub mod registry;

pub use config::EngineConfig;
pub use document::DocumentId;
pub use gateway::{GatewayError, RenderGateway};
pub use guard::{ChangeGuard, GuardTick, GuardTicks};
pub use registry::{DiffRegistry, SessionHooks, StartOutcome};

pub use redline_core::{Algorithm, DiffSession, Hunk, HunkKind, HunkRange};
