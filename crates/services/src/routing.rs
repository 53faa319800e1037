//! Turns backend responses into follow-up UI actions.

use serde_json::Value;
use tracing::debug;

use quiz_core::model::{
    Action, ActionType, ExamplePayload, FinalStats, QuestionData, QuestionScreen, SessionMode,
};

use crate::backend::{ResponseData, ResponseKind};

/// Follow-up action type for a response type.
///
/// Unrecognized response types fall through to a new question. This mirrors how
/// the backend signals an ordinary next question and is kept on purpose, but it
/// also hides unexpected types; see `ResponseKind::Other`.
#[must_use]
pub fn action_type_for(kind: ResponseKind, mode: SessionMode) -> ActionType {
    match kind {
        ResponseKind::FinalStats => ActionType::ShowResults,
        ResponseKind::NextBlock => ActionType::ShowTransition,
        ResponseKind::Question | ResponseKind::Other => ActionType::new_question_for(mode),
    }
}

/// Build the action that applies `data`.
///
/// A `show_example` instruction replaces a new-question action with
/// `DISPLAY_EXAMPLE`, carrying the question so it is shown after the example.
/// The instruction only applies to question responses: results and block
/// transitions have no question to return to, so it is dropped for them.
///
/// A question response that carries no question keeps `current` on screen, or
/// an empty question when there is none. The backend has already recorded the
/// answer by then, so the response is never rejected.
#[must_use]
pub fn follow_up_action(
    data: &ResponseData,
    mode: SessionMode,
    current: Option<&QuestionScreen>,
) -> Action {
    if data.kind == ResponseKind::Other {
        debug!(extra = ?data.extra.keys().collect::<Vec<_>>(), "unrecognized response type, treating as question");
    }

    let action = match action_type_for(data.kind, mode) {
        ActionType::ShowResults => Action::ShowResults(final_stats(data)),
        ActionType::ShowTransition => Action::ShowTransition(data.block.clone().unwrap_or_default()),
        _ => {
            let screen = question_screen(data, current);
            match &data.show_example {
                Some(example) => Action::DisplayExample(ExamplePayload {
                    example_text: example.text.clone(),
                    question_data: screen.question,
                    progress: data.progress,
                    background: screen.background,
                }),
                None => Action::new_question(mode, screen),
            }
        }
    };

    if data.show_example.is_some() && !matches!(action, Action::DisplayExample(_)) {
        debug!(response = ?data.kind, "example ignored for non-question response");
    }
    action
}

fn question_screen(data: &ResponseData, current: Option<&QuestionScreen>) -> QuestionScreen {
    let sent = data.question.clone().or_else(|| flat_question(data));
    let (question, progress) = match (sent, current) {
        (Some(question), _) => (question, data.progress.unwrap_or_default()),
        (None, Some(current)) => {
            debug!(question = %current.question.id, "response without a question, keeping the current one");
            (current.question.clone(), data.progress.unwrap_or(current.progress))
        }
        (None, None) => {
            debug!("response without a question and nothing on screen");
            (QuestionData::default(), data.progress.unwrap_or_default())
        }
    };
    QuestionScreen {
        question,
        progress,
        background: data.background.clone(),
    }
}

/// A question sent as top-level fields next to `type`. Needs at least an `id`.
fn flat_question(data: &ResponseData) -> Option<QuestionData> {
    if !data.extra.contains_key("id") {
        return None;
    }
    serde_json::from_value(Value::Object(data.extra.clone())).ok()
}

fn final_stats(data: &ResponseData) -> FinalStats {
    data.stats.clone().unwrap_or_else(|| {
        serde_json::from_value(Value::Object(data.extra.clone())).unwrap_or_default()
    })
}
