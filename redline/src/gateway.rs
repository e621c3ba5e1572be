//! The render collaborator contract.
//!
//! The engine never touches an editor buffer directly. Everything visual —
//! replacing the buffer with the unified text, painting per-hunk markers,
//! showing the per-hunk and global accept/reject affordances, surfacing
//! notices — goes through a [`RenderGateway`] supplied by the embedding
//! integration. The engine awaits each render before issuing the next one
//! for the same document, so implementations see renders strictly
//! serialized per document and may assume no overlap.

use async_trait::async_trait;
use redline_core::HunkRange;
use thiserror::Error;

use crate::document::DocumentId;

/// Failure reported by the render gateway.
///
/// A failed render means the buffer and the engine's in-memory text may
/// disagree; the registry reacts by rolling the session back to its last
/// known-good pair (see `DiffRegistry`) and propagating this error.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The document was closed before or while the render applied.
    #[error("document is no longer open")]
    DocumentClosed,
    /// Any other backend failure, with a human-readable cause.
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// Editor-side collaborator that paints diff state into the live buffer.
#[async_trait]
pub trait RenderGateway: Send + Sync {
    /// Atomically replaces the buffer's full content with `unified_text` and
    /// redraws the per-hunk markers described by `ranges`.
    ///
    /// Resolves once the edit is applied. Must be safe to complete (or fail
    /// with [`GatewayError::DocumentClosed`]) if the document goes away
    /// while the render is in flight.
    async fn render(
        &self,
        id: &DocumentId,
        unified_text: &str,
        ranges: &[HunkRange],
    ) -> Result<(), GatewayError>;

    /// Surfaces an informational notice (e.g. "nothing to diff").
    /// Fire-and-forget.
    fn notify_info(&self, id: &DocumentId, message: &str);

    /// Surfaces a warning (e.g. a stray edit was reverted). Fire-and-forget.
    fn notify_warning(&self, id: &DocumentId, message: &str);
}
