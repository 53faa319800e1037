use std::collections::HashMap;

use quiz_core::model::{ScreenKind, SessionMode, SessionOptions, UiState};
use quiz_core::progress::ProgressState;
use thiserror::Error;
use tracing::warn;

use crate::compose::Composition;
use crate::views::{
    Component, background_view, example_view, progress_view, question_view, results_view,
    transition_view, write_question_view,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ComposeError {
    #[error("{screen} screen has no question")]
    MissingQuestion { screen: ScreenKind },
    #[error("results screen has no final stats")]
    MissingResults,
    #[error("example screen has no example")]
    MissingExample,
    #[error("component construction failed: {0}")]
    Component(String),
}

/// Read-only inputs a composer may consult besides the UI state.
#[derive(Clone, Copy, Debug)]
pub struct ComposeContext<'a> {
    pub progress: &'a ProgressState,
    pub options: SessionOptions,
}

pub type ComposerFn = fn(&UiState, &ComposeContext<'_>) -> Result<Composition, ComposeError>;

/// Screen → composer table.
///
/// Screens without a composer produce an empty composition; composers that fail
/// produce an error composition.
#[derive(Clone)]
pub struct ComposerRegistry {
    composers: HashMap<ScreenKind, ComposerFn>,
}

impl Default for ComposerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ScreenKind::Question, compose_question);
        registry.register(ScreenKind::WriteQuestion, compose_write_question);
        registry.register(ScreenKind::Results, compose_results);
        registry.register(ScreenKind::Transition, compose_transition);
        registry.register(ScreenKind::Example, compose_example);
        registry
    }
}

impl ComposerRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            composers: HashMap::new(),
        }
    }

    pub fn register(&mut self, screen: ScreenKind, composer: ComposerFn) {
        self.composers.insert(screen, composer);
    }

    pub fn unregister(&mut self, screen: ScreenKind) {
        self.composers.remove(&screen);
    }

    /// Screen whose composer is used. Write mode shows plain question screens
    /// with the free-text card.
    #[must_use]
    pub fn resolve_screen(screen: ScreenKind, mode: SessionMode) -> ScreenKind {
        match (screen, mode) {
            (ScreenKind::Question, SessionMode::Write) => ScreenKind::WriteQuestion,
            (screen, _) => screen,
        }
    }

    #[must_use]
    pub fn compose(&self, state: &UiState, ctx: &ComposeContext<'_>) -> Composition {
        let screen = Self::resolve_screen(state.current_screen, ctx.options.mode);
        let Some(composer) = self.composers.get(&screen) else {
            return Composition::empty();
        };
        match composer(state, ctx) {
            Ok(composition) => composition,
            Err(err) => {
                warn!(%screen, error = %err, "composition failed");
                Composition::failed(screen, err)
            }
        }
    }
}

fn boxed<C: Component + 'static>(component: C) -> Box<dyn Component> {
    Box::new(component)
}

fn compose_question(state: &UiState, ctx: &ComposeContext<'_>) -> Result<Composition, ComposeError> {
    Ok(
        Composition::new(ScreenKind::Question, boxed(question_view(state, ctx)?))
            .with_progress(progress_view(ctx).map(boxed))
            .with_background(Some(boxed(background_view(state)))),
    )
}

fn compose_write_question(
    state: &UiState,
    ctx: &ComposeContext<'_>,
) -> Result<Composition, ComposeError> {
    Ok(
        Composition::new(ScreenKind::WriteQuestion, boxed(write_question_view(state, ctx)?))
            .with_progress(progress_view(ctx).map(boxed))
            .with_background(Some(boxed(background_view(state)))),
    )
}

fn compose_results(state: &UiState, _ctx: &ComposeContext<'_>) -> Result<Composition, ComposeError> {
    Ok(Composition::new(ScreenKind::Results, boxed(results_view(state)?))
        .with_background(Some(boxed(background_view(state)))))
}

fn compose_transition(
    state: &UiState,
    ctx: &ComposeContext<'_>,
) -> Result<Composition, ComposeError> {
    Ok(Composition::new(ScreenKind::Transition, boxed(transition_view(state)))
        .with_progress(progress_view(ctx).map(boxed))
        .with_background(Some(boxed(background_view(state)))))
}

fn compose_example(state: &UiState, _ctx: &ComposeContext<'_>) -> Result<Composition, ComposeError> {
    Ok(Composition::new(ScreenKind::Example, boxed(example_view(state)?))
        .with_background(Some(boxed(background_view(state)))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::CompositionKind;
    use crate::surface::ElementKind;
    use quiz_core::UiStateManager;
    use quiz_core::model::{Action, ExamplePayload, FinalStats, QuestionData, QuestionScreen};
    use quiz_core::progress::PaginationEngine;
    use quiz_core::time::{fixed_clock, fixed_now};

    fn progress() -> ProgressState {
        ProgressState::start(PaginationEngine::default().calculate(5)).unwrap()
    }

    fn question_state(options: SessionOptions) -> UiState {
        UiStateManager::new().with_clock(fixed_clock()).update_state(
            &UiState::initial(options, fixed_now()),
            &Action::NewQuestion(QuestionScreen::new(QuestionData::new("q1", "inu"))),
        )
    }

    #[test]
    fn question_screen_has_all_parts() {
        let progress = progress();
        let options = SessionOptions::default();
        let ctx = ComposeContext {
            progress: &progress,
            options,
        };
        let composition = ComposerRegistry::default().compose(&question_state(options), &ctx);
        assert_eq!(composition.kind(), CompositionKind::Screen(ScreenKind::Question));
        assert_eq!(
            composition.elements(),
            vec![
                ElementKind::Background,
                ElementKind::Question,
                ElementKind::Progress
            ]
        );
    }

    #[test]
    fn write_mode_uses_write_composer_for_question_screen() {
        let progress = progress();
        let options = SessionOptions {
            mode: SessionMode::Write,
            show_hints: false,
        };
        let state = question_state(options);
        assert_eq!(state.current_screen, ScreenKind::Question);
        let ctx = ComposeContext {
            progress: &progress,
            options,
        };
        let composition = ComposerRegistry::default().compose(&state, &ctx);
        assert_eq!(
            composition.kind(),
            CompositionKind::Screen(ScreenKind::WriteQuestion)
        );
    }

    #[test]
    fn missing_data_degrades_to_error_composition() {
        let progress = progress();
        let options = SessionOptions::default();
        let state = UiState::initial(options, fixed_now());
        let ctx = ComposeContext {
            progress: &progress,
            options,
        };
        let composition = ComposerRegistry::default().compose(&state, &ctx);
        assert_eq!(composition.kind(), CompositionKind::Error(ScreenKind::Question));
        assert!(composition.main.is_none());
        assert!(composition.error().is_some());
    }

    #[test]
    fn unregistered_screen_yields_empty_composition() {
        let progress = progress();
        let options = SessionOptions::default();
        let mut registry = ComposerRegistry::default();
        registry.unregister(ScreenKind::Results);
        let state = UiStateManager::new().update_state(
            &question_state(options),
            &Action::ShowResults(FinalStats::default()),
        );
        let ctx = ComposeContext {
            progress: &progress,
            options,
        };
        let composition = registry.compose(&state, &ctx);
        assert_eq!(composition.kind(), CompositionKind::Empty);
        assert!(composition.main.is_none());
    }

    #[test]
    fn example_screen_shows_example_and_background() {
        let progress = progress();
        let options = SessionOptions::default();
        let state = UiStateManager::new().update_state(
            &question_state(options),
            &Action::DisplayExample(ExamplePayload::new(
                "inu ga iru",
                QuestionScreen::new(QuestionData::new("q2", "neko")),
            )),
        );
        let ctx = ComposeContext {
            progress: &progress,
            options,
        };
        let composition = ComposerRegistry::default().compose(&state, &ctx);
        assert_eq!(
            composition.elements(),
            vec![ElementKind::Background, ElementKind::Example]
        );
    }
}
