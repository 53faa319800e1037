use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{AnswerOutcome, FinalStats, QuestionData, ScreenKind, SessionMode};
use quiz_core::progress::CommandKind;
use quiz_core::time::fixed_clock;
use serde_json::json;
use services::{BackendEnvelope, ResponseData, ScriptedBackend, SessionConfig, SessionError};
use tokio::sync::mpsc;
use ui::compose::CompositionKind;
use ui::session::{ChannelListener, SessionController, SessionSignal};
use ui::surface::{ElementKind, Frame, RecordingSurface};

fn question(id: &str) -> ResponseData {
    ResponseData::question(QuestionData::new(id, format!("prompt {id}")))
}

fn results(correct: u32, total: u32) -> ResponseData {
    ResponseData::final_stats(FinalStats {
        correct,
        incorrect: total - correct,
        total,
        ..FinalStats::default()
    })
}

async fn start(
    backend: &ScriptedBackend,
    surface: &RecordingSurface,
    config: SessionConfig,
) -> SessionController {
    SessionController::builder(Arc::new(backend.clone()))
        .with_config(config)
        .with_surface(surface.clone())
        .with_clock(fixed_clock())
        .start("test-1")
        .await
        .unwrap()
}

fn question_id(controller: &SessionController) -> &str {
    controller.get_state().current_question_id().unwrap().as_str()
}

#[tokio::test]
async fn select_mode_session_runs_to_results() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q2"))
        .then(question("q3"))
        .then(results(3, 3));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    assert_eq!(controller.get_state().current_screen, ScreenKind::Question);
    assert_eq!(question_id(&controller), "q1");
    assert!(surface.kinds().contains(&ElementKind::Question));

    let mut last = None;
    for _ in 0..3 {
        let result = controller
            .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
            .await;
        assert!(result.success, "{:?}", result.error);
        assert!(result.business_data.is_some());
        last = Some(result);
    }

    assert_eq!(controller.get_state().current_screen, ScreenKind::Results);
    assert_eq!(controller.progress().current_position, 3);
    assert!(controller.progress().is_full());
    assert_eq!(backend.submitted(), vec![AnswerOutcome::Correct; 3]);

    let last = last.unwrap();
    let snapshot = last.composition.unwrap();
    assert_eq!(snapshot.kind, CompositionKind::Screen(ScreenKind::Results));
    assert!(last.rendered.is_none());
}

#[tokio::test]
async fn bare_question_responses_still_advance_progress() {
    let bare = |body: serde_json::Value| serde_json::from_value::<BackendEnvelope>(body).unwrap();
    let backend = ScriptedBackend::new().with_start(question("q1").with_total_questions(3));
    backend.push_answer(bare(json!({ "success": true, "data": { "type": "question" } })));
    backend.push_answer(bare(json!({ "success": true, "data": { "type": "question" } })));
    backend.push_answer(bare(json!({ "success": true, "data": { "type": "final_stats" } })));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    for round in 0..2 {
        let result = controller
            .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
            .await;
        assert!(result.success, "round {round}: {:?}", result.error);
        assert_eq!(controller.get_state().current_screen, ScreenKind::Question);
        assert_eq!(question_id(&controller), "q1");
    }

    let result = controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(controller.get_state().current_screen, ScreenKind::Results);
    assert_eq!(controller.progress().current_position, 3);
    assert!(controller.progress().is_full());
    assert_eq!(backend.submitted(), vec![AnswerOutcome::Correct; 3]);
}

#[tokio::test]
async fn failed_submission_keeps_previous_state() {
    let backend = ScriptedBackend::new().with_start(question("q1").with_total_questions(3));
    backend.push_answer_failure("evaluation service unavailable");
    backend.push_answer(BackendEnvelope::failure("session expired"));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    let before = controller.get_state().clone();
    let before_progress = controller.progress().clone();
    let before_composition = controller.get_current_composition().snapshot();
    let painted = surface.frames().len();

    for _ in 0..2 {
        let result = controller
            .handle_user_action("SUBMIT_ANSWER", Some(json!({ "result": "correct" })))
            .await;
        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.state.as_ref(), Some(&before));
        assert_eq!(result.composition.as_ref(), Some(&before_composition));
        assert!(result.rendered.is_none());
    }
    assert_eq!(surface.frames().len(), painted);
    assert_eq!(controller.get_state(), &before);
    assert_eq!(controller.progress(), &before_progress);
}

#[tokio::test]
async fn malformed_answer_is_rejected_before_the_backend() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q2"));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;
    let before = controller.get_state().clone();

    let result = controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("maybe")))
        .await;
    assert!(!result.success);
    assert_eq!(result.state, Some(before));
    assert!(backend.submitted().is_empty());

    let result = controller.handle_user_action("SUBMIT_ANSWER", None).await;
    assert!(!result.success);
    assert_eq!(backend.pending_answers(), 1);
}

#[tokio::test]
async fn incorrect_answer_keeps_position() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q1"));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    let result = controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("incorrect")))
        .await;
    assert!(result.success);
    assert_eq!(controller.progress().current_position, 0);
    assert_eq!(controller.progress().last_action, CommandKind::Stay);
    assert_eq!(
        controller.progress().stay_reason.as_deref(),
        Some("incorrect_answer")
    );
}

#[tokio::test(start_paused = true)]
async fn example_times_out_into_stashed_question() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q2").with_example("inu ga iru"));
    let surface = RecordingSurface::new();
    let config = SessionConfig::default().with_example_display(Duration::from_secs(3));
    let mut controller = start(&backend, &surface, config).await;

    let result = controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    assert!(result.success);
    assert_eq!(controller.get_state().current_screen, ScreenKind::Example);
    assert!(controller.auto_transition_pending());
    assert!(controller.poll_auto_transition().is_none());

    let result = controller.wait_auto_transition().await.unwrap();
    assert!(result.success);
    assert!(result.rendered.is_some());

    let state = controller.get_state();
    assert_eq!(state.current_screen, ScreenKind::Question);
    assert_eq!(question_id(&controller), "q2");
    assert!(controller.get_state().example_data.is_none());
    assert!(controller.get_state().pending_question_data.is_none());
    assert!(!controller.auto_transition_pending());

    let Some(Frame::Question(vm)) = surface.last(ElementKind::Question) else {
        panic!("question card was not painted");
    };
    assert_eq!(vm.question_id, "q2");
}

#[tokio::test(start_paused = true)]
async fn leaving_example_early_cancels_timer_and_keeps_stash() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q2").with_example("neko ga iru"));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    assert!(controller.auto_transition_pending());

    let result = controller
        .handle_user_action(
            "NEW_QUESTION",
            Some(json!({ "question": { "id": "other", "text": "ignored" } })),
        )
        .await;
    assert!(result.success);
    assert_eq!(question_id(&controller), "q2");
    assert!(!controller.auto_transition_pending());
    assert!(controller.wait_auto_transition().await.is_none());
}

#[tokio::test]
async fn write_mode_uses_write_screens() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(2))
        .then(question("q2"));
    let surface = RecordingSurface::new();
    let config = SessionConfig::default().with_mode(SessionMode::Write);
    let mut controller = start(&backend, &surface, config).await;

    assert_eq!(
        controller.get_state().current_screen,
        ScreenKind::WriteQuestion
    );
    assert!(surface.kinds().contains(&ElementKind::WriteQuestion));

    controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    assert_eq!(
        controller.get_state().current_screen,
        ScreenKind::WriteQuestion
    );
    assert_eq!(question_id(&controller), "q2");
}

#[tokio::test]
async fn restart_and_close_go_to_the_listener() {
    let backend = ScriptedBackend::new().with_start(question("q1").with_total_questions(3));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut controller = SessionController::builder(Arc::new(backend))
        .with_listener(Arc::new(ChannelListener::new(tx)))
        .start("test-1")
        .await
        .unwrap();
    let before = controller.get_state().clone();

    let result = controller.handle_user_action("TRY_AGAIN", None).await;
    assert!(result.success);
    assert_eq!(result.signal, Some(SessionSignal::TryAgain));
    assert!(result.state.is_none());

    controller.handle_user_action("CLOSE_LEARN_MODE", None).await;

    let session = controller.session_id();
    assert_eq!(rx.try_recv().unwrap(), (session, SessionSignal::TryAgain));
    assert_eq!(rx.try_recv().unwrap(), (session, SessionSignal::Close));
    assert_eq!(controller.get_state(), &before);
}

#[tokio::test]
async fn unknown_action_is_a_no_op() {
    let backend = ScriptedBackend::new().with_start(question("q1").with_total_questions(3));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;
    let before = controller.get_state().clone();

    let result = controller.handle_user_action("__unknown__", None).await;
    assert!(result.success);
    assert_eq!(result.state, Some(before));
}

#[tokio::test]
async fn failing_component_does_not_block_siblings() {
    let backend = ScriptedBackend::new().with_start(question("q1").with_total_questions(3));
    let surface = RecordingSurface::new();
    surface.fail_on(ElementKind::Background);
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    let kinds = surface.kinds();
    assert!(kinds.contains(&ElementKind::Question));
    assert!(kinds.contains(&ElementKind::Progress));
    assert!(!kinds.contains(&ElementKind::Background));

    let report = controller.render_current();
    assert_eq!(
        report.rendered,
        vec![ElementKind::Question, ElementKind::Progress]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, ElementKind::Background);
}

#[tokio::test]
async fn long_session_switches_page_after_thirty_answers() {
    let mut backend = ScriptedBackend::new().with_start(question("q0").with_total_questions(65));
    for id in 1..=30 {
        backend = backend.then(question(&format!("q{id}")));
    }
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;
    assert_eq!(controller.progress().pagination.total_pages, 3);

    for _ in 0..29 {
        controller
            .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
            .await;
    }
    assert_eq!(controller.progress().current_page, 0);
    assert_eq!(controller.progress().current_position, 29);

    controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    let progress = controller.progress();
    assert_eq!(progress.current_page, 1);
    assert_eq!(progress.current_position, 0);
    assert_eq!(progress.page_units, 30);
    assert_eq!(progress.absolute_position(), 30);
}

#[tokio::test]
async fn start_failures_are_fatal() {
    let backend = ScriptedBackend::new();
    backend.push_start_failure("backend offline");
    let err = SessionController::builder(Arc::new(backend.clone()))
        .start("test-1")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Backend(_)));

    let err = SessionController::builder(Arc::new(backend.clone()))
        .start("   ")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Id(_)));
    assert_eq!(backend.started().len(), 1);
}

#[tokio::test]
async fn cleanup_is_idempotent_and_closes_the_session() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q2"));
    let surface = RecordingSurface::new();
    let mut controller = start(&backend, &surface, SessionConfig::default()).await;

    controller.cleanup();
    controller.cleanup();
    assert!(controller.is_cleaned_up());
    assert!(controller.get_current_composition().main.is_none());

    let result = controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    assert!(!result.success);
    assert!(backend.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cleanup_cancels_pending_example_transition() {
    let backend = ScriptedBackend::new()
        .with_start(question("q1").with_total_questions(3))
        .then(question("q2").with_example("tori ga iru"));
    let surface = RecordingSurface::new();
    let config = SessionConfig::default().with_example_display(Duration::from_secs(3));
    let mut controller = start(&backend, &surface, config).await;

    controller
        .handle_user_action("SUBMIT_ANSWER", Some(json!("correct")))
        .await;
    assert!(controller.auto_transition_pending());

    controller.cleanup();
    assert!(!controller.auto_transition_pending());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!controller.auto_transition_pending());
    assert!(controller.poll_auto_transition().is_none());
    assert!(controller.wait_auto_transition().await.is_none());
    assert_eq!(controller.get_state().current_screen, ScreenKind::Example);
    assert!(controller.get_state().pending_question_data.is_some());
}
