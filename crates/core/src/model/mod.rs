mod action;
mod ids;
mod question;
mod ui_state;

pub use action::{Action, ActionError, ActionType, AnswerOutcome, ExamplePayload};
pub use ids::{IdError, QuestionId, SessionId, TestId};
pub use question::{
    BackgroundData, BlockTransition, FinalStats, ProgressData, QuestionData, QuestionScreen,
    ScreenData,
};
pub use ui_state::{
    Attempt, EffectFlag, Effects, ExampleData, Interaction, InteractionStatus, ScreenKind,
    SessionMode, SessionOptions, UiState,
};
