use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use quiz_core::model::{
    AnswerOutcome, BackgroundData, BlockTransition, FinalStats, ProgressData, QuestionData,
    TestId,
};

use crate::error::BackendError;

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

/// Declared type of a backend response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Question,
    NextBlock,
    FinalStats,
    /// Any type the client does not know.
    #[serde(other)]
    Other,
}

/// Instruction to show an example before the next question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowExample {
    pub text: String,
}

/// Payload of a successful backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(default, alias = "showExample")]
    pub show_example: Option<ShowExample>,
    #[serde(default, alias = "questionData")]
    pub question: Option<QuestionData>,
    #[serde(default, alias = "progressData")]
    pub progress: Option<ProgressData>,
    #[serde(default, alias = "backgroundData")]
    pub background: Option<BackgroundData>,
    #[serde(default)]
    pub stats: Option<FinalStats>,
    #[serde(default)]
    pub block: Option<BlockTransition>,
    #[serde(default, alias = "totalQuestions")]
    pub total_questions: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseData {
    #[must_use]
    pub fn new(kind: ResponseKind) -> Self {
        Self {
            kind,
            show_example: None,
            question: None,
            progress: None,
            background: None,
            stats: None,
            block: None,
            total_questions: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn question(question: QuestionData) -> Self {
        Self {
            question: Some(question),
            ..Self::new(ResponseKind::Question)
        }
    }

    #[must_use]
    pub fn final_stats(stats: FinalStats) -> Self {
        Self {
            stats: Some(stats),
            ..Self::new(ResponseKind::FinalStats)
        }
    }

    #[must_use]
    pub fn next_block(block: BlockTransition) -> Self {
        Self {
            block: Some(block),
            ..Self::new(ResponseKind::NextBlock)
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressData) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: BackgroundData) -> Self {
        self.background = Some(background);
        self
    }

    #[must_use]
    pub fn with_example(mut self, text: impl Into<String>) -> Self {
        self.show_example = Some(ShowExample { text: text.into() });
        self
    }

    #[must_use]
    pub fn with_total_questions(mut self, total: u32) -> Self {
        self.total_questions = Some(total);
        self
    }

    /// Number of progress units in the session, if the response states it.
    #[must_use]
    pub fn total_units(&self) -> Option<u32> {
        self.total_questions
            .or_else(|| self.progress.map(|progress| progress.total))
            .filter(|total| *total > 0)
    }
}

/// Response envelope: `success` plus either `data` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendEnvelope {
    #[must_use]
    pub fn ok(data: ResponseData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` for failure envelopes and
    /// `BackendError::Malformed` when a successful envelope has no data.
    pub fn into_data(self) -> Result<ResponseData, BackendError> {
        if !self.success {
            return Err(BackendError::Rejected(
                self.error.unwrap_or_else(|| "unspecified failure".into()),
            ));
        }
        self.data
            .ok_or_else(|| BackendError::Malformed("successful response without data".into()))
    }
}

//
// ─── CONTRACT ──────────────────────────────────────────────────────────────────
//

/// Answer-evaluation service driving a session.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Open a session for a test.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the service cannot be reached.
    async fn start_session(&self, test_id: &TestId) -> Result<BackendEnvelope, BackendError>;

    /// Report the result of the current question.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the service cannot be reached.
    async fn submit_answer_result(
        &self,
        outcome: AnswerOutcome,
    ) -> Result<BackendEnvelope, BackendError>;
}
