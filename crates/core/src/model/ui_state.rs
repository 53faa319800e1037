use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::QuestionId;
use crate::model::question::{BackgroundData, ProgressData, QuestionScreen, ScreenData};

//
// ─── SCREEN ────────────────────────────────────────────────────────────────────
//

/// Top-level UI mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenKind {
    Question,
    WriteQuestion,
    Results,
    Transition,
    Example,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 5] = [
        ScreenKind::Question,
        ScreenKind::WriteQuestion,
        ScreenKind::Results,
        ScreenKind::Transition,
        ScreenKind::Example,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScreenKind::Question => "QUESTION",
            ScreenKind::WriteQuestion => "WRITE_QUESTION",
            ScreenKind::Results => "RESULTS",
            ScreenKind::Transition => "TRANSITION",
            ScreenKind::Example => "EXAMPLE",
        }
    }

    /// Screens that accept an answer from the user.
    #[must_use]
    pub fn is_question(self) -> bool {
        matches!(self, ScreenKind::Question | ScreenKind::WriteQuestion)
    }

    /// The session ends externally once results are shown.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ScreenKind::Results)
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── OPTIONS ───────────────────────────────────────────────────────────────────
//

/// How answers are given: picking an option or typing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Select,
    Write,
}

impl SessionMode {
    /// Question screen used for this mode.
    #[must_use]
    pub fn question_screen(self) -> ScreenKind {
        match self {
            SessionMode::Select => ScreenKind::Question,
            SessionMode::Write => ScreenKind::WriteQuestion,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Select => "select",
            SessionMode::Write => "write",
        }
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "write" => Ok(Self::Write),
            other => Err(format!("unknown session mode: {other}")),
        }
    }
}

/// Session-scoped options, read by name wherever a decision depends on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub mode: SessionMode,
    pub show_hints: bool,
}

//
// ─── INTERACTION & EFFECTS ─────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    /// Accepting input.
    #[default]
    Ready,
    /// An answer is being evaluated; inputs are disabled.
    Processing,
    /// Non-interactive screen (transition).
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub answer: String,
    pub at: DateTime<Utc>,
}

/// Per-screen input bookkeeping. Replaced on every screen transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub selected_answer: Option<String>,
    pub attempts: Vec<Attempt>,
    pub start_time: DateTime<Utc>,
    pub status: InteractionStatus,
}

impl Interaction {
    #[must_use]
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            selected_answer: None,
            attempts: Vec::new(),
            start_time: now,
            status: InteractionStatus::Ready,
        }
    }

    #[must_use]
    pub fn waiting(now: DateTime<Utc>) -> Self {
        Self {
            status: InteractionStatus::Waiting,
            ..Self::fresh(now)
        }
    }

    #[must_use]
    pub fn accepts_input(&self) -> bool {
        self.status == InteractionStatus::Ready
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectFlag {
    CorrectAnimation,
    IncorrectAnimation,
    ExampleShowing,
}

impl FromStr for EffectFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correctAnimation" | "correct_animation" => Ok(Self::CorrectAnimation),
            "incorrectAnimation" | "incorrect_animation" => Ok(Self::IncorrectAnimation),
            "exampleShowing" | "example_showing" => Ok(Self::ExampleShowing),
            other => Err(format!("unknown effect: {other}")),
        }
    }
}

/// Visual-effect switches. Replaced on every screen transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effects {
    pub correct_animation: bool,
    pub incorrect_animation: bool,
    pub example_showing: bool,
}

impl Effects {
    #[must_use]
    pub fn get(&self, flag: EffectFlag) -> bool {
        match flag {
            EffectFlag::CorrectAnimation => self.correct_animation,
            EffectFlag::IncorrectAnimation => self.incorrect_animation,
            EffectFlag::ExampleShowing => self.example_showing,
        }
    }

    #[must_use]
    pub fn with(mut self, flag: EffectFlag, value: bool) -> Self {
        match flag {
            EffectFlag::CorrectAnimation => self.correct_animation = value,
            EffectFlag::IncorrectAnimation => self.incorrect_animation = value,
            EffectFlag::ExampleShowing => self.example_showing = value,
        }
        self
    }
}

//
// ─── EXAMPLE ───────────────────────────────────────────────────────────────────
//

/// Example interlude shown before the next question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleData {
    pub text: String,
    pub question_id: QuestionId,
    pub show_time: DateTime<Utc>,
    pub auto_transition: bool,
}

//
// ─── UI STATE ──────────────────────────────────────────────────────────────────
//

/// Immutable snapshot of the session UI.
///
/// Produced by `UiStateManager::update_state`; every call returns a new value.
/// `example_data` and `pending_question_data` are only set on the EXAMPLE screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub current_screen: ScreenKind,
    pub question_data: ScreenData,
    pub progress_data: ProgressData,
    pub background_data: BackgroundData,
    pub example_data: Option<ExampleData>,
    pub pending_question_data: Option<QuestionScreen>,
    pub interaction: Interaction,
    pub effects: Effects,
    pub options: SessionOptions,
}

impl UiState {
    /// State of a session that has not received its first question yet.
    #[must_use]
    pub fn initial(options: SessionOptions, now: DateTime<Utc>) -> Self {
        Self {
            current_screen: options.mode.question_screen(),
            question_data: ScreenData::Empty,
            progress_data: ProgressData::default(),
            background_data: BackgroundData::default(),
            example_data: None,
            pending_question_data: None,
            interaction: Interaction::fresh(now),
            effects: Effects::default(),
            options,
        }
    }

    #[must_use]
    pub fn current_question_id(&self) -> Option<&QuestionId> {
        self.question_data.question_id()
    }

    #[must_use]
    pub fn is_showing_example(&self) -> bool {
        self.current_screen == ScreenKind::Example
    }
}
