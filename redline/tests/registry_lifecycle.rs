//! Integration tests for the registry lifecycle.
//!
//! Exercises: start_diff / revert_diff / has_diff, the single-diff-per-
//! document rule, per-hunk and bulk operations with retire-when-settled,
//! completion hooks, and render-failure rollback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redline::{
    DiffRegistry, DocumentId, EngineConfig, GatewayError, GuardTicks, HunkRange, RenderGateway,
    SessionHooks, StartOutcome,
};

/// Records every gateway call; can be told to fail the next N renders.
#[derive(Default)]
struct RecordingGateway {
    renders: Mutex<Vec<(String, String, Vec<HunkRange>)>>,
    infos: Mutex<Vec<(String, String)>>,
    warnings: Mutex<Vec<(String, String)>>,
    fail_renders: AtomicUsize,
}

impl RecordingGateway {
    fn fail_next(&self, count: usize) {
        self.fail_renders.store(count, Ordering::SeqCst);
    }

    fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    fn last_render(&self) -> (String, String, Vec<HunkRange>) {
        self.renders.lock().unwrap().last().cloned().expect("no render recorded")
    }

    fn render_texts(&self) -> Vec<String> {
        self.renders.lock().unwrap().iter().map(|(_, text, _)| text.clone()).collect()
    }

    fn info_count(&self) -> usize {
        self.infos.lock().unwrap().len()
    }

    fn warning_count(&self) -> usize {
        self.warnings.lock().unwrap().len()
    }
}

#[async_trait]
impl RenderGateway for RecordingGateway {
    async fn render(
        &self,
        id: &DocumentId,
        unified_text: &str,
        ranges: &[HunkRange],
    ) -> Result<(), GatewayError> {
        if self.fail_renders.load(Ordering::SeqCst) > 0 {
            self.fail_renders.fetch_sub(1, Ordering::SeqCst);
            return Err(GatewayError::Backend("injected failure".to_owned()));
        }
        self.renders.lock().unwrap().push((
            id.to_string(),
            unified_text.to_owned(),
            ranges.to_vec(),
        ));
        Ok(())
    }

    fn notify_info(&self, id: &DocumentId, message: &str) {
        self.infos.lock().unwrap().push((id.to_string(), message.to_owned()));
    }

    fn notify_warning(&self, id: &DocumentId, message: &str) {
        self.warnings.lock().unwrap().push((id.to_string(), message.to_owned()));
    }
}

fn new_registry() -> (DiffRegistry, GuardTicks, Arc<RecordingGateway>) {
    let gateway = Arc::new(RecordingGateway::default());
    let (registry, ticks) = DiffRegistry::new(gateway.clone(), EngineConfig::default());
    (registry, ticks, gateway)
}

fn doc(name: &str) -> DocumentId {
    DocumentId::from(name)
}

#[tokio::test]
async fn start_renders_the_unified_view() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");

    let outcome = registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();
    assert_eq!(outcome, StartOutcome::Started);
    assert!(registry.has_diff(&id));

    let (render_doc, unified, ranges) = gateway.last_render();
    assert_eq!(render_doc, "file.rs");
    assert_eq!(unified, "a\nb\nz\nc");
    assert_eq!(ranges.len(), 4);
}

#[tokio::test]
async fn equal_texts_create_no_session() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");

    let outcome = registry
        .start_diff(id.clone(), "same\ntext", "same\ntext", SessionHooks::none())
        .await
        .unwrap();
    assert_eq!(outcome, StartOutcome::NothingToDiff);
    assert!(!registry.has_diff(&id));
    assert_eq!(gateway.render_count(), 0, "buffer must be left untouched");
    assert_eq!(gateway.info_count(), 1);
}

#[tokio::test]
async fn accepting_the_last_hunk_retires_the_session() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();

    // Index 1 is the Delete of the b→z replacement; accepting it commits
    // the paired Insert too and settles the whole diff.
    let changed = registry.accept_hunk(&id, 1).await.unwrap();
    assert!(changed);
    assert!(!registry.has_diff(&id), "settled session must be retired");
    assert_eq!(gateway.last_render().1, "a\nz\nc");
}

#[tokio::test]
async fn settling_renders_the_accepted_target_byte_for_byte() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\n", "a\nc\n", SessionHooks::none())
        .await
        .unwrap();
    assert_eq!(gateway.last_render().1, "a\nb\nc\n");

    // Accepting the replacement settles the diff; the final buffer content
    // must be exactly the proposed text, trailing newline included.
    assert!(registry.accept_hunk(&id, 1).await.unwrap());
    assert!(!registry.has_diff(&id));
    assert_eq!(gateway.last_render().1, "a\nc\n");
}

#[tokio::test]
async fn operations_on_unmodified_hunks_do_not_render() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();
    let renders_before = gateway.render_count();

    assert!(!registry.accept_hunk(&id, 0).await.unwrap());
    assert!(!registry.reject_hunk(&id, 0).await.unwrap());
    assert!(!registry.accept_hunk(&id, 99).await.unwrap());
    assert!(!registry.accept_hunk(&doc("other.rs"), 0).await.unwrap());

    assert_eq!(gateway.render_count(), renders_before);
    assert!(registry.has_diff(&id));
}

#[tokio::test]
async fn starting_a_second_diff_reverts_the_first() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");

    registry
        .start_diff(id.clone(), "a\nb", "a\nx", SessionHooks::none())
        .await
        .unwrap();
    registry
        .start_diff(id.clone(), "a\nb", "a\ny", SessionHooks::none())
        .await
        .unwrap();

    // Render sequence: first unified view, the first session's reverted
    // (clean) baseline, then the second unified view.
    assert_eq!(gateway.render_texts(), vec!["a\nb\nx", "a\nb", "a\nb\ny"]);
    assert!(registry.has_diff(&id));
    let session = registry.session(&id).unwrap();
    assert_eq!(session.target_text(), "a\ny");
}

#[tokio::test]
async fn revert_restores_the_baseline_and_removes_the_session() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();

    registry.revert_diff(&id).await.unwrap();
    assert!(!registry.has_diff(&id));
    assert_eq!(gateway.last_render().1, "a\nb\nc");

    // Reverting again is a no-op.
    let renders = gateway.render_count();
    registry.revert_diff(&id).await.unwrap();
    assert_eq!(gateway.render_count(), renders);
}

#[tokio::test]
async fn closing_a_document_tears_down_without_rendering() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();
    let renders = gateway.render_count();

    registry.handle_close(&id);
    assert!(!registry.has_diff(&id));
    assert_eq!(gateway.render_count(), renders, "no render for a closed buffer");
}

#[tokio::test]
async fn activation_repaints_the_unified_view() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();

    registry.handle_activate(&id).await.unwrap();
    assert_eq!(gateway.render_count(), 2);
    assert_eq!(gateway.last_render().1, "a\nb\nz\nc");

    // Without a session, activation does nothing.
    registry.handle_activate(&doc("other.rs")).await.unwrap();
    assert_eq!(gateway.render_count(), 2);
}

#[tokio::test]
async fn accept_all_fires_its_hook_and_retires() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    let fired = Arc::new(AtomicBool::new(false));
    let hook_fired = fired.clone();
    let hooks = SessionHooks {
        on_accept_all: Some(Box::new(move |_| hook_fired.store(true, Ordering::SeqCst))),
        on_reject_all: None,
    };
    registry.start_diff(id.clone(), "a\nb\nc", "a\nz\nc", hooks).await.unwrap();

    assert!(registry.accept_all(&id).await.unwrap());
    assert!(!registry.has_diff(&id));
    assert!(fired.load(Ordering::SeqCst));
    assert_eq!(gateway.last_render().1, "a\nz\nc");
}

#[tokio::test]
async fn reject_all_fires_its_hook_and_restores_the_baseline() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    let fired = Arc::new(AtomicBool::new(false));
    let hook_fired = fired.clone();
    let hooks = SessionHooks {
        on_accept_all: None,
        on_reject_all: Some(Box::new(move |_| hook_fired.store(true, Ordering::SeqCst))),
    };
    registry.start_diff(id.clone(), "a\nb\nc", "a\nz\nc", hooks).await.unwrap();

    assert!(registry.reject_all(&id).await.unwrap());
    assert!(!registry.has_diff(&id));
    assert!(fired.load(Ordering::SeqCst));
    assert_eq!(gateway.last_render().1, "a\nb\nc");
}

#[tokio::test]
async fn per_hunk_accepts_do_not_fire_bulk_hooks() {
    let (mut registry, _ticks, _gateway) = new_registry();
    let id = doc("file.rs");
    let fired = Arc::new(AtomicBool::new(false));
    let hook_fired = fired.clone();
    let hooks = SessionHooks {
        on_accept_all: Some(Box::new(move |_| hook_fired.store(true, Ordering::SeqCst))),
        on_reject_all: None,
    };
    registry.start_diff(id.clone(), "a\nb\nc", "a\nz\nc", hooks).await.unwrap();

    // Settles the session, but through a per-hunk action.
    assert!(registry.accept_hunk(&id, 1).await.unwrap());
    assert!(!registry.has_diff(&id));
    assert!(!fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failed_initial_render_registers_no_session() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    gateway.fail_next(1);

    let result = registry
        .start_diff(id.clone(), "a\nb", "a\nx", SessionHooks::none())
        .await;
    assert!(result.is_err());
    assert!(!registry.has_diff(&id));
}

#[tokio::test]
async fn render_failure_rolls_the_session_back() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();

    gateway.fail_next(1);
    let result = registry.accept_hunk(&id, 1).await;
    assert!(result.is_err());

    // The session survives with its last known-good pair, and the restore
    // render repainted the pre-mutation unified view.
    assert!(registry.has_diff(&id));
    let session = registry.session(&id).unwrap();
    assert_eq!(session.source_text(), "a\nb\nc");
    assert_eq!(session.target_text(), "a\nz\nc");
    assert_eq!(gateway.last_render().1, "a\nb\nz\nc");
}

#[tokio::test]
async fn double_render_failure_drops_the_session() {
    let (mut registry, _ticks, gateway) = new_registry();
    let id = doc("file.rs");
    registry
        .start_diff(id.clone(), "a\nb\nc", "a\nz\nc", SessionHooks::none())
        .await
        .unwrap();

    // Both the mutation render and the restore render fail: the document is
    // effectively gone, so the session is dropped (implicit revert).
    gateway.fail_next(2);
    let result = registry.accept_hunk(&id, 1).await;
    assert!(result.is_err());
    assert!(!registry.has_diff(&id));
}

#[tokio::test]
async fn sessions_are_independent_across_documents() {
    let (mut registry, _ticks, gateway) = new_registry();
    let one = doc("one.rs");
    let two = doc("two.rs");
    registry.start_diff(one.clone(), "a", "b", SessionHooks::none()).await.unwrap();
    registry.start_diff(two.clone(), "x", "y", SessionHooks::none()).await.unwrap();
    assert!(registry.has_diff(&one) && registry.has_diff(&two));

    registry.accept_all(&one).await.unwrap();
    assert!(!registry.has_diff(&one));
    assert!(registry.has_diff(&two));
    assert_eq!(gateway.warning_count(), 0);
}
