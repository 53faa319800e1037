use quiz_core::model::{Action, AnswerOutcome, SessionMode, TestId};
use serde_json::json;
use services::{
    BackendEnvelope, BackendError, QuizBackend, ScriptedBackend, SessionConfig, follow_up_action,
};

#[tokio::test]
async fn wire_envelopes_drive_follow_up_actions() {
    let start: BackendEnvelope = serde_json::from_value(json!({
        "success": true,
        "data": {
            "type": "question",
            "totalQuestions": 12,
            "questionData": { "id": "q1", "text": "taberu", "options": ["eat", "drink"] },
            "progressData": { "current": 1, "total": 12 }
        }
    }))
    .unwrap();
    let example: BackendEnvelope = serde_json::from_value(json!({
        "success": true,
        "data": {
            "type": "question",
            "showExample": { "text": "gohan wo taberu" },
            "questionData": { "id": "q2", "text": "nomu" }
        }
    }))
    .unwrap();
    let rejected: BackendEnvelope =
        serde_json::from_value(json!({ "success": false, "error": "session expired" })).unwrap();

    let backend = ScriptedBackend::new();
    backend.push_start(start);
    backend.push_answer(example);
    backend.push_answer(rejected);

    let config = SessionConfig::default().with_units_per_page(5);
    let engine = config.pagination_engine().unwrap();

    let test_id = TestId::new("verbs-1").unwrap();
    let data = backend.start_session(&test_id).await.unwrap().into_data().unwrap();
    let pagination = engine.calculate(data.total_units().unwrap());
    assert_eq!(pagination.total_pages, 3);
    assert!(matches!(
        follow_up_action(&data, SessionMode::Write, None),
        Action::NewWriteQuestion(_)
    ));

    let data = backend
        .submit_answer_result(AnswerOutcome::Correct)
        .await
        .unwrap()
        .into_data()
        .unwrap();
    let Action::DisplayExample(payload) = follow_up_action(&data, SessionMode::Select, None)
    else {
        panic!("expected example");
    };
    assert_eq!(payload.question_data.id.as_str(), "q2");

    let err = backend
        .submit_answer_result(AnswerOutcome::Incorrect)
        .await
        .unwrap()
        .into_data()
        .unwrap_err();
    assert!(matches!(err, BackendError::Rejected(message) if message == "session expired"));
    assert_eq!(
        backend.submitted(),
        vec![AnswerOutcome::Correct, AnswerOutcome::Incorrect]
    );
}
