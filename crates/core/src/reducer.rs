//! Pure state transition engine: `(state, action) -> state`.

use chrono::{DateTime, Utc};

use crate::model::{
    Action, Attempt, Effects, ExampleData, ExamplePayload, Interaction, InteractionStatus,
    QuestionScreen, ScreenData, ScreenKind, UiState,
};
use crate::time::Clock;

/// Maps actions to new UI states.
///
/// Never mutates its input and never fails: actions it does not handle return an
/// equal copy of the state.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiStateManager {
    clock: Clock,
}

impl UiStateManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn update_state(&self, state: &UiState, action: &Action) -> UiState {
        let now = self.clock.now();

        // Leaving the example interlude: the stashed question wins over the payload.
        if state.current_screen == ScreenKind::Example {
            match action {
                Action::NewQuestion(screen) => {
                    return leave_example(state, ScreenKind::Question, screen, now);
                }
                Action::NewWriteQuestion(screen) => {
                    return leave_example(state, ScreenKind::WriteQuestion, screen, now);
                }
                _ => {}
            }
        }

        match action {
            Action::NewQuestion(screen) => {
                enter_question(state, ScreenKind::Question, screen.clone(), now)
            }
            Action::NewWriteQuestion(screen) => {
                enter_question(state, ScreenKind::WriteQuestion, screen.clone(), now)
            }
            Action::ShowResults(stats) => UiState {
                current_screen: ScreenKind::Results,
                question_data: ScreenData::Results(stats.clone()),
                example_data: None,
                pending_question_data: None,
                interaction: Interaction::fresh(now),
                effects: Effects::default(),
                ..state.clone()
            },
            Action::ShowTransition(block) => UiState {
                current_screen: ScreenKind::Transition,
                question_data: ScreenData::Transition(block.clone()),
                example_data: None,
                pending_question_data: None,
                interaction: Interaction::waiting(now),
                effects: Effects::default(),
                ..state.clone()
            },
            Action::BackgroundUpdate(background) => UiState {
                background_data: background.clone(),
                ..state.clone()
            },
            Action::DisplayExample(payload) => display_example(state, payload, now),
            Action::SelectAnswer(answer) => {
                let mut next = state.clone();
                next.interaction.selected_answer = Some(answer.clone());
                next.interaction.attempts.push(Attempt {
                    answer: answer.clone(),
                    at: now,
                });
                next.interaction.status = InteractionStatus::Processing;
                next
            }
            Action::ShowEffects { flag, value } => {
                let current = state.effects.get(*flag);
                UiState {
                    effects: state.effects.with(*flag, value.unwrap_or(!current)),
                    ..state.clone()
                }
            }
            Action::SubmitAnswer(_) => {
                let mut next = state.clone();
                next.interaction.status = InteractionStatus::Processing;
                next
            }
            Action::TryAgain | Action::NextStage | Action::CloseLearnMode | Action::Unknown(_) => {
                state.clone()
            }
        }
    }
}

fn enter_question(
    state: &UiState,
    screen: ScreenKind,
    data: QuestionScreen,
    now: DateTime<Utc>,
) -> UiState {
    UiState {
        current_screen: screen,
        question_data: ScreenData::Question(data.question),
        progress_data: data.progress,
        background_data: data
            .background
            .unwrap_or_else(|| state.background_data.clone()),
        example_data: None,
        pending_question_data: None,
        interaction: Interaction::fresh(now),
        effects: Effects::default(),
        options: state.options,
    }
}

fn leave_example(
    state: &UiState,
    screen: ScreenKind,
    incoming: &QuestionScreen,
    now: DateTime<Utc>,
) -> UiState {
    let resolved = state
        .pending_question_data
        .clone()
        .unwrap_or_else(|| incoming.clone());
    enter_question(state, screen, resolved, now)
}

fn display_example(state: &UiState, payload: &ExamplePayload, now: DateTime<Utc>) -> UiState {
    let pending = QuestionScreen {
        question: payload.question_data.clone(),
        progress: payload.progress.unwrap_or(state.progress_data),
        background: payload.background.clone(),
    };
    UiState {
        current_screen: ScreenKind::Example,
        example_data: Some(ExampleData {
            text: payload.example_text.clone(),
            question_id: pending.question.id.clone(),
            show_time: now,
            auto_transition: true,
        }),
        pending_question_data: Some(pending),
        interaction: Interaction::waiting(now),
        effects: Effects {
            example_showing: true,
            ..Effects::default()
        },
        ..state.clone()
    }
}
