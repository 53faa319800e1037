use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use quiz_core::model::{AnswerOutcome, TestId};

use crate::backend::{BackendEnvelope, QuizBackend, ResponseData};
use crate::error::BackendError;

#[derive(Debug, Clone)]
enum Scripted {
    Envelope(BackendEnvelope),
    Failure(String),
}

#[derive(Debug, Default)]
struct Script {
    start: VecDeque<Scripted>,
    answers: VecDeque<Scripted>,
    started: Vec<TestId>,
    submitted: Vec<AnswerOutcome>,
}

/// In-memory backend replaying queued responses, for tests and demos.
///
/// Clones share the same script, so a test can keep a handle and inspect what
/// the session sent.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response to the next `start_session`.
    #[must_use]
    pub fn with_start(self, data: ResponseData) -> Self {
        self.push_start(BackendEnvelope::ok(data));
        self
    }

    /// Queue the response to the next answer submission.
    #[must_use]
    pub fn then(self, data: ResponseData) -> Self {
        self.push_answer(BackendEnvelope::ok(data));
        self
    }

    pub fn push_start(&self, envelope: BackendEnvelope) {
        self.lock().start.push_back(Scripted::Envelope(envelope));
    }

    pub fn push_start_failure(&self, message: impl Into<String>) {
        self.lock().start.push_back(Scripted::Failure(message.into()));
    }

    pub fn push_answer(&self, envelope: BackendEnvelope) {
        self.lock().answers.push_back(Scripted::Envelope(envelope));
    }

    /// Make the next answer submission fail as if the service were unreachable.
    pub fn push_answer_failure(&self, message: impl Into<String>) {
        self.lock()
            .answers
            .push_back(Scripted::Failure(message.into()));
    }

    #[must_use]
    pub fn submitted(&self) -> Vec<AnswerOutcome> {
        self.lock().submitted.clone()
    }

    #[must_use]
    pub fn started(&self) -> Vec<TestId> {
        self.lock().started.clone()
    }

    #[must_use]
    pub fn pending_answers(&self) -> usize {
        self.lock().answers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn replay(next: Option<Scripted>) -> Result<BackendEnvelope, BackendError> {
    match next {
        Some(Scripted::Envelope(envelope)) => Ok(envelope),
        Some(Scripted::Failure(message)) => Err(BackendError::Rejected(message)),
        None => Err(BackendError::Malformed("no scripted response left".into())),
    }
}

#[async_trait]
impl QuizBackend for ScriptedBackend {
    async fn start_session(&self, test_id: &TestId) -> Result<BackendEnvelope, BackendError> {
        let next = {
            let mut script = self.lock();
            script.started.push(test_id.clone());
            script.start.pop_front()
        };
        replay(next)
    }

    async fn submit_answer_result(
        &self,
        outcome: AnswerOutcome,
    ) -> Result<BackendEnvelope, BackendError> {
        let next = {
            let mut script = self.lock();
            script.submitted.push(outcome);
            script.answers.pop_front()
        };
        replay(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ResponseKind;
    use quiz_core::model::{FinalStats, QuestionData};

    #[tokio::test]
    async fn replays_in_order_and_records_calls() {
        let backend = ScriptedBackend::new()
            .with_start(ResponseData::question(QuestionData::new("q1", "a")))
            .then(ResponseData::question(QuestionData::new("q2", "b")))
            .then(ResponseData::final_stats(FinalStats::default()));
        let handle = backend.clone();

        let test_id = TestId::new("t").unwrap();
        let start = backend.start_session(&test_id).await.unwrap();
        assert_eq!(start.data.unwrap().kind, ResponseKind::Question);

        let first = backend
            .submit_answer_result(AnswerOutcome::Correct)
            .await
            .unwrap();
        assert_eq!(first.data.unwrap().kind, ResponseKind::Question);
        let second = backend
            .submit_answer_result(AnswerOutcome::Incorrect)
            .await
            .unwrap();
        assert_eq!(second.data.unwrap().kind, ResponseKind::FinalStats);

        assert_eq!(handle.started(), vec![test_id]);
        assert_eq!(
            handle.submitted(),
            vec![AnswerOutcome::Correct, AnswerOutcome::Incorrect]
        );
        assert_eq!(handle.pending_answers(), 0);
    }

    #[tokio::test]
    async fn failures_and_exhaustion_are_errors() {
        let backend = ScriptedBackend::new();
        backend.push_answer_failure("offline");
        assert!(matches!(
            backend.submit_answer_result(AnswerOutcome::Correct).await,
            Err(BackendError::Rejected(msg)) if msg == "offline"
        ));
        assert!(matches!(
            backend.submit_answer_result(AnswerOutcome::Correct).await,
            Err(BackendError::Malformed(_))
        ));
    }
}
