use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::ids::QuestionId;

/// A question as delivered by the backend.
///
/// Fields the session does not interpret are kept in `extra` so components can
/// still show them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionData {
    #[serde(default)]
    pub id: QuestionId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuestionData {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: QuestionId::new(id),
            text: text.into(),
            options: Vec::new(),
            hint: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Counter shown next to the question ("3 of 12").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressData {
    pub current: u32,
    pub total: u32,
}

/// Scene description handed to the background component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundData {
    pub scene: Option<String>,
    pub stage: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final statistics shown on the results screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalStats {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inter-block pause between two groups of questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockTransition {
    pub completed_block: u32,
    pub next_block: u32,
    pub message: Option<String>,
}

/// Everything a question screen is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScreen {
    #[serde(alias = "questionData")]
    pub question: QuestionData,
    #[serde(default, alias = "progressData")]
    pub progress: ProgressData,
    /// `None` keeps the background currently on screen.
    #[serde(default, alias = "backgroundData")]
    pub background: Option<BackgroundData>,
}

impl QuestionScreen {
    #[must_use]
    pub fn new(question: QuestionData) -> Self {
        Self {
            question,
            progress: ProgressData::default(),
            background: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressData) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: BackgroundData) -> Self {
        self.background = Some(background);
        self
    }
}

/// Main content of the current screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ScreenData {
    #[default]
    Empty,
    Question(QuestionData),
    Results(FinalStats),
    Transition(BlockTransition),
}

impl ScreenData {
    #[must_use]
    pub fn question(&self) -> Option<&QuestionData> {
        match self {
            ScreenData::Question(question) => Some(question),
            _ => None,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> Option<&QuestionId> {
        self.question().map(|question| &question.id)
    }
}
