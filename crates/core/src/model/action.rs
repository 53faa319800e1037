use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::question::{
    BackgroundData, BlockTransition, FinalStats, ProgressData, QuestionData, QuestionScreen,
};
use crate::model::ui_state::{EffectFlag, SessionMode};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Payload validation failures. Raised before any state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("{action} requires a payload")]
    MissingPayload { action: ActionType },

    #[error("invalid {action} payload: {reason}")]
    InvalidPayload { action: ActionType, reason: String },

    #[error("unknown answer result: {0}")]
    UnknownOutcome(String),

    #[error("unknown effect: {0}")]
    UnknownEffect(String),
}

//
// ─── ACTION TYPE ───────────────────────────────────────────────────────────────
//

/// Every action name the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    NewQuestion,
    NewWriteQuestion,
    ShowResults,
    ShowTransition,
    BackgroundUpdate,
    DisplayExample,
    SelectAnswer,
    ShowEffects,
    SubmitAnswer,
    TryAgain,
    NextStage,
    CloseLearnMode,
}

impl ActionType {
    pub const ALL: [ActionType; 12] = [
        ActionType::NewQuestion,
        ActionType::NewWriteQuestion,
        ActionType::ShowResults,
        ActionType::ShowTransition,
        ActionType::BackgroundUpdate,
        ActionType::DisplayExample,
        ActionType::SelectAnswer,
        ActionType::ShowEffects,
        ActionType::SubmitAnswer,
        ActionType::TryAgain,
        ActionType::NextStage,
        ActionType::CloseLearnMode,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::NewQuestion => "NEW_QUESTION",
            ActionType::NewWriteQuestion => "NEW_WRITE_QUESTION",
            ActionType::ShowResults => "SHOW_RESULTS",
            ActionType::ShowTransition => "SHOW_TRANSITION",
            ActionType::BackgroundUpdate => "BACKGROUND_UPDATE",
            ActionType::DisplayExample => "DISPLAY_EXAMPLE",
            ActionType::SelectAnswer => "SELECT_ANSWER",
            ActionType::ShowEffects => "SHOW_EFFECTS",
            ActionType::SubmitAnswer => "SUBMIT_ANSWER",
            ActionType::TryAgain => "TRY_AGAIN",
            ActionType::NextStage => "NEXT_STAGE",
            ActionType::CloseLearnMode => "CLOSE_LEARN_MODE",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// New-question action for the given answer mode.
    #[must_use]
    pub fn new_question_for(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Select => ActionType::NewQuestion,
            SessionMode::Write => ActionType::NewWriteQuestion,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of checking one answer, as reported to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

impl AnswerOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerOutcome::Correct => "correct",
            AnswerOutcome::Incorrect => "incorrect",
        }
    }
}

impl FromStr for AnswerOutcome {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(Self::Correct),
            "incorrect" => Ok(Self::Incorrect),
            other => Err(ActionError::UnknownOutcome(other.to_string())),
        }
    }
}

impl fmt::Display for AnswerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ACTION ────────────────────────────────────────────────────────────────────
//

/// Example interlude request: the example text plus the question that follows it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExamplePayload {
    #[serde(alias = "exampleText")]
    pub example_text: String,
    #[serde(alias = "questionData")]
    pub question_data: QuestionData,
    /// `None` keeps the progress counter currently on screen.
    #[serde(default, alias = "progressData")]
    pub progress: Option<ProgressData>,
    #[serde(default, alias = "backgroundData")]
    pub background: Option<BackgroundData>,
}

impl ExamplePayload {
    #[must_use]
    pub fn new(example_text: impl Into<String>, next: QuestionScreen) -> Self {
        Self {
            example_text: example_text.into(),
            question_data: next.question,
            progress: Some(next.progress),
            background: next.background,
        }
    }
}

/// A typed request to change UI state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NewQuestion(QuestionScreen),
    NewWriteQuestion(QuestionScreen),
    ShowResults(FinalStats),
    ShowTransition(BlockTransition),
    BackgroundUpdate(BackgroundData),
    DisplayExample(ExamplePayload),
    SelectAnswer(String),
    ShowEffects { flag: EffectFlag, value: Option<bool> },
    SubmitAnswer(AnswerOutcome),
    TryAgain,
    NextStage,
    CloseLearnMode,
    /// Any name outside `ActionType`. Leaves state unchanged.
    Unknown(String),
}

impl Action {
    #[must_use]
    pub fn action_type(&self) -> Option<ActionType> {
        Some(match self {
            Action::NewQuestion(_) => ActionType::NewQuestion,
            Action::NewWriteQuestion(_) => ActionType::NewWriteQuestion,
            Action::ShowResults(_) => ActionType::ShowResults,
            Action::ShowTransition(_) => ActionType::ShowTransition,
            Action::BackgroundUpdate(_) => ActionType::BackgroundUpdate,
            Action::DisplayExample(_) => ActionType::DisplayExample,
            Action::SelectAnswer(_) => ActionType::SelectAnswer,
            Action::ShowEffects { .. } => ActionType::ShowEffects,
            Action::SubmitAnswer(_) => ActionType::SubmitAnswer,
            Action::TryAgain => ActionType::TryAgain,
            Action::NextStage => ActionType::NextStage,
            Action::CloseLearnMode => ActionType::CloseLearnMode,
            Action::Unknown(_) => return None,
        })
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Action::Unknown(name) => name,
            other => other.action_type().map_or("", ActionType::as_str),
        }
    }

    /// New-question action for the given mode.
    #[must_use]
    pub fn new_question(mode: SessionMode, screen: QuestionScreen) -> Self {
        match ActionType::new_question_for(mode) {
            ActionType::NewWriteQuestion => Action::NewWriteQuestion(screen),
            _ => Action::NewQuestion(screen),
        }
    }

    /// Build an action from its wire name and optional JSON payload.
    ///
    /// Unknown names are not an error: they become `Action::Unknown`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` when a known action's payload is missing or malformed.
    pub fn from_parts(name: &str, payload: Option<Value>) -> Result<Self, ActionError> {
        let Some(kind) = ActionType::from_name(name) else {
            return Ok(Action::Unknown(name.to_string()));
        };

        let action = match kind {
            ActionType::NewQuestion => Action::NewQuestion(decode(kind, payload)?),
            ActionType::NewWriteQuestion => Action::NewWriteQuestion(decode(kind, payload)?),
            ActionType::ShowResults => Action::ShowResults(decode_or_default(kind, payload)?),
            ActionType::ShowTransition => {
                Action::ShowTransition(decode_or_default(kind, payload)?)
            }
            ActionType::BackgroundUpdate => Action::BackgroundUpdate(decode(kind, payload)?),
            ActionType::DisplayExample => Action::DisplayExample(decode(kind, payload)?),
            ActionType::SelectAnswer => {
                Action::SelectAnswer(string_field(kind, payload, "answer")?)
            }
            ActionType::ShowEffects => parse_effects(payload)?,
            ActionType::SubmitAnswer => {
                let raw = string_field(kind, payload, "result")?;
                Action::SubmitAnswer(raw.parse()?)
            }
            ActionType::TryAgain => Action::TryAgain,
            ActionType::NextStage => Action::NextStage,
            ActionType::CloseLearnMode => Action::CloseLearnMode,
        };
        Ok(action)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    action: ActionType,
    payload: Option<Value>,
) -> Result<T, ActionError> {
    let value = payload
        .filter(|value| !value.is_null())
        .ok_or(ActionError::MissingPayload { action })?;
    serde_json::from_value(value).map_err(|err| ActionError::InvalidPayload {
        action,
        reason: err.to_string(),
    })
}

fn decode_or_default<T: Default + for<'de> Deserialize<'de>>(
    action: ActionType,
    payload: Option<Value>,
) -> Result<T, ActionError> {
    match payload {
        None | Some(Value::Null) => Ok(T::default()),
        some => decode(action, some),
    }
}

/// Accepts either a bare string or an object carrying the string under `key`.
fn string_field(
    action: ActionType,
    payload: Option<Value>,
    key: &str,
) -> Result<String, ActionError> {
    match payload {
        Some(Value::String(value)) => Ok(value),
        Some(Value::Object(mut map)) => match map.remove(key) {
            Some(Value::String(value)) => Ok(value),
            _ => Err(ActionError::InvalidPayload {
                action,
                reason: format!("expected string field `{key}`"),
            }),
        },
        None | Some(Value::Null) => Err(ActionError::MissingPayload { action }),
        Some(_) => Err(ActionError::InvalidPayload {
            action,
            reason: "expected a string or an object".into(),
        }),
    }
}

fn parse_effects(payload: Option<Value>) -> Result<Action, ActionError> {
    let action = ActionType::ShowEffects;
    let (name, value) = match payload {
        Some(Value::String(name)) => (name, None),
        Some(Value::Object(map)) => {
            let name = map
                .get("effect")
                .and_then(Value::as_str)
                .ok_or_else(|| ActionError::InvalidPayload {
                    action,
                    reason: "expected string field `effect`".into(),
                })?
                .to_string();
            (name, map.get("value").and_then(Value::as_bool))
        }
        None | Some(Value::Null) => return Err(ActionError::MissingPayload { action }),
        Some(_) => {
            return Err(ActionError::InvalidPayload {
                action,
                reason: "expected a string or an object".into(),
            });
        }
    };
    let flag = name.parse().map_err(|_| ActionError::UnknownEffect(name))?;
    Ok(Action::ShowEffects { flag, value })
}
