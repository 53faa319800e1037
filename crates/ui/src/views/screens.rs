use quiz_core::model::{BlockTransition, ScreenData, UiState};

use crate::compose::ComposeError;
use crate::surface::Frame;
use crate::views::View;
use crate::vm::{map_background, map_example, map_results, map_transition};

#[must_use]
pub fn background_view(state: &UiState) -> View {
    View::new(Frame::Background(map_background(&state.background_data)))
}

/// # Errors
///
/// Returns `ComposeError::MissingResults` when the state holds no final stats.
pub fn results_view(state: &UiState) -> Result<View, ComposeError> {
    match &state.question_data {
        ScreenData::Results(stats) => Ok(View::new(Frame::Results(map_results(stats)))),
        _ => Err(ComposeError::MissingResults),
    }
}

#[must_use]
pub fn transition_view(state: &UiState) -> View {
    let vm = match &state.question_data {
        ScreenData::Transition(block) => map_transition(block),
        _ => map_transition(&BlockTransition::default()),
    };
    View::new(Frame::Transition(vm))
}

/// # Errors
///
/// Returns `ComposeError::MissingExample` when no example is stored.
pub fn example_view(state: &UiState) -> Result<View, ComposeError> {
    let example = state
        .example_data
        .as_ref()
        .ok_or(ComposeError::MissingExample)?;
    Ok(View::new(Frame::Example(map_example(example))))
}
