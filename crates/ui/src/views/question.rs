use quiz_core::model::{ScreenKind, UiState};

use crate::compose::{ComposeContext, ComposeError};
use crate::surface::Frame;
use crate::views::View;
use crate::vm::{AnswerInput, map_question};

/// Multiple-choice question card.
///
/// # Errors
///
/// Returns `ComposeError::MissingQuestion` when the state holds no question.
pub fn question_view(state: &UiState, ctx: &ComposeContext<'_>) -> Result<View, ComposeError> {
    let question = state
        .question_data
        .question()
        .ok_or(ComposeError::MissingQuestion {
            screen: ScreenKind::Question,
        })?;
    let vm = map_question(
        question,
        state.progress_data,
        &state.interaction,
        ctx.options,
        AnswerInput::Choices,
    );
    Ok(View::new(Frame::Question(vm)))
}

/// Free-text question card.
///
/// # Errors
///
/// Returns `ComposeError::MissingQuestion` when the state holds no question.
pub fn write_question_view(
    state: &UiState,
    ctx: &ComposeContext<'_>,
) -> Result<View, ComposeError> {
    let question = state
        .question_data
        .question()
        .ok_or(ComposeError::MissingQuestion {
            screen: ScreenKind::WriteQuestion,
        })?;
    let vm = map_question(
        question,
        state.progress_data,
        &state.interaction,
        ctx.options,
        AnswerInput::FreeText,
    );
    Ok(View::new(Frame::WriteQuestion(vm)))
}
