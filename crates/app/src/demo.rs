use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use quiz_core::model::{
    AnswerOutcome, BackgroundData, FinalStats, ProgressData, QuestionData, TestId,
};
use services::{BackendEnvelope, BackendError, QuizBackend, ResponseData};
use tracing::debug;

struct DemoQuestion {
    id: &'static str,
    prompt: &'static str,
    options: [&'static str; 3],
    hint: &'static str,
    example: &'static str,
}

static QUESTIONS: [DemoQuestion; 4] = [
    DemoQuestion {
        id: "taberu",
        prompt: "taberu",
        options: ["to eat", "to drink", "to sleep"],
        hint: "what you do with rice",
        example: "gohan wo taberu: I eat rice",
    },
    DemoQuestion {
        id: "nomu",
        prompt: "nomu",
        options: ["to see", "to drink", "to go"],
        hint: "what you do with tea",
        example: "ocha wo nomu: I drink tea",
    },
    DemoQuestion {
        id: "miru",
        prompt: "miru",
        options: ["to see", "to buy", "to write"],
        hint: "what you do with a film",
        example: "eiga wo miru: I watch a film",
    },
    DemoQuestion {
        id: "kaku",
        prompt: "kaku",
        options: ["to read", "to listen", "to write"],
        hint: "what you do with a pen",
        example: "tegami wo kaku: I write a letter",
    },
];

#[derive(Debug, Default)]
struct Tally {
    position: usize,
    correct: u32,
    incorrect: u32,
}

/// Offline backend with a fixed set of questions.
///
/// A wrong answer repeats the question after showing an example sentence.
#[derive(Debug, Default)]
pub struct DemoBackend {
    tally: Mutex<Tally>,
}

impl DemoBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn total() -> u32 {
    u32::try_from(QUESTIONS.len()).unwrap_or(u32::MAX)
}

fn question_at(position: usize) -> Option<ResponseData> {
    let question = QUESTIONS.get(position)?;
    let data = QuestionData::new(question.id, question.prompt)
        .with_options(question.options)
        .with_hint(question.hint);
    let current = u32::try_from(position + 1).unwrap_or(u32::MAX);
    Some(
        ResponseData::question(data)
            .with_progress(ProgressData {
                current,
                total: total(),
            })
            .with_background(BackgroundData {
                scene: Some("dojo".into()),
                stage: current,
                ..BackgroundData::default()
            }),
    )
}

#[async_trait]
impl QuizBackend for DemoBackend {
    async fn start_session(&self, test_id: &TestId) -> Result<BackendEnvelope, BackendError> {
        debug!(%test_id, "demo session started");
        *self.lock() = Tally::default();
        let first = question_at(0)
            .ok_or_else(|| BackendError::Malformed("demo has no questions".into()))?;
        Ok(BackendEnvelope::ok(first.with_total_questions(total())))
    }

    async fn submit_answer_result(
        &self,
        outcome: AnswerOutcome,
    ) -> Result<BackendEnvelope, BackendError> {
        let mut tally = self.lock();
        let Some(current) = QUESTIONS.get(tally.position) else {
            return Ok(BackendEnvelope::failure("session already finished"));
        };

        let data = match outcome {
            AnswerOutcome::Correct => {
                tally.correct += 1;
                tally.position += 1;
                question_at(tally.position).unwrap_or_else(|| {
                    ResponseData::final_stats(FinalStats {
                        correct: tally.correct,
                        incorrect: tally.incorrect,
                        total: tally.correct + tally.incorrect,
                        ..FinalStats::default()
                    })
                })
            }
            AnswerOutcome::Incorrect => {
                tally.incorrect += 1;
                question_at(tally.position)
                    .ok_or_else(|| BackendError::Malformed("question vanished".into()))?
                    .with_example(current.example)
            }
        };
        Ok(BackendEnvelope::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::ResponseKind;

    fn test_id() -> TestId {
        TestId::new("demo").unwrap()
    }

    #[tokio::test]
    async fn wrong_answer_repeats_with_example() {
        let backend = DemoBackend::new();
        let start = backend.start_session(&test_id()).await.unwrap().into_data().unwrap();
        assert_eq!(start.total_units(), Some(4));

        let data = backend
            .submit_answer_result(AnswerOutcome::Incorrect)
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(data.question.unwrap().id.as_str(), "taberu");
        assert!(data.show_example.is_some());
    }

    #[tokio::test]
    async fn all_correct_ends_with_stats() {
        let backend = DemoBackend::new();
        backend.start_session(&test_id()).await.unwrap();
        let mut last = None;
        for _ in 0..4 {
            last = backend
                .submit_answer_result(AnswerOutcome::Correct)
                .await
                .unwrap()
                .into_data()
                .ok();
        }
        let last = last.unwrap();
        assert_eq!(last.kind, ResponseKind::FinalStats);
        assert_eq!(last.stats.unwrap().correct, 4);

        let after = backend
            .submit_answer_result(AnswerOutcome::Correct)
            .await
            .unwrap();
        assert!(!after.success);
    }
}
