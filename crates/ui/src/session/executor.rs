use std::sync::Arc;

use quiz_core::UiStateManager;
use quiz_core::model::{Action, AnswerOutcome, QuestionScreen, UiState};
use quiz_core::progress::{ProgressState, ProgressStateMachine};
use services::{QuizBackend, ResponseData, SessionError, follow_up_action};
use tracing::{debug, warn};

use crate::compose::{ComposeContext, Composition, ComposerRegistry};
use crate::session::SessionSignal;

/// How an action is sequenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionClass {
    /// Session restart requests, handed to the listener.
    Restart,
    Close,
    /// New question screens, rendered as part of the dispatch.
    Render,
    /// Answer submission, which needs the backend.
    Business,
    Default,
}

impl ActionClass {
    #[must_use]
    pub fn of(action: &Action) -> Self {
        match action {
            Action::TryAgain | Action::NextStage => ActionClass::Restart,
            Action::CloseLearnMode => ActionClass::Close,
            Action::NewQuestion(_) | Action::NewWriteQuestion(_) => ActionClass::Render,
            Action::SubmitAnswer(_) => ActionClass::Business,
            Action::DisplayExample(_)
            | Action::ShowResults(_)
            | Action::ShowTransition(_)
            | Action::BackgroundUpdate(_)
            | Action::SelectAnswer(_)
            | Action::ShowEffects { .. }
            | Action::Unknown(_) => ActionClass::Default,
        }
    }
}

/// New state to commit.
#[derive(Debug)]
pub struct Applied {
    pub state: UiState,
    pub progress: ProgressState,
    pub composition: Composition,
    /// The composition should be painted before the call returns.
    pub render: bool,
    pub business: Option<ResponseData>,
}

#[derive(Debug)]
pub enum Dispatch {
    Signal(SessionSignal),
    Applied(Applied),
    /// Nothing changed.
    Failed(SessionError),
}

/// Runs actions against a state snapshot and hands back what to commit.
///
/// Never touches the caller's state: everything it produces is returned.
pub struct PatternExecutor {
    manager: UiStateManager,
    registry: ComposerRegistry,
    backend: Arc<dyn QuizBackend>,
}

impl PatternExecutor {
    #[must_use]
    pub fn new(
        backend: Arc<dyn QuizBackend>,
        manager: UiStateManager,
        registry: ComposerRegistry,
    ) -> Self {
        Self {
            manager,
            registry,
            backend,
        }
    }

    #[must_use]
    pub fn manager(&self) -> &UiStateManager {
        &self.manager
    }

    #[must_use]
    pub fn compose(&self, state: &UiState, progress: &ProgressState) -> Composition {
        let ctx = ComposeContext {
            progress,
            options: state.options,
        };
        self.registry.compose(state, &ctx)
    }

    pub async fn execute(
        &self,
        action: Action,
        state: &UiState,
        progress: &ProgressState,
    ) -> Dispatch {
        match action {
            Action::SubmitAnswer(outcome) => self.submit(outcome, state, progress).await,
            other => self.local(&other, state, progress),
        }
    }

    /// Everything except business actions, which return `None`.
    #[must_use]
    pub fn execute_local(
        &self,
        action: &Action,
        state: &UiState,
        progress: &ProgressState,
    ) -> Option<Dispatch> {
        (ActionClass::of(action) != ActionClass::Business)
            .then(|| self.local(action, state, progress))
    }

    fn local(&self, action: &Action, state: &UiState, progress: &ProgressState) -> Dispatch {
        if let Some(signal) = SessionSignal::for_action(action) {
            return Dispatch::Signal(signal);
        }
        if let Action::Unknown(name) = action {
            debug!(action = %name, "unknown action leaves state unchanged");
        }
        let render = ActionClass::of(action) == ActionClass::Render;
        Dispatch::Applied(self.reduce(state, progress.clone(), action, render))
    }

    /// Local submit step, backend call, then the follow-up action.
    ///
    /// The local step only lives inside this call: the caller commits the state
    /// after the follow-up, or keeps its previous state on failure.
    async fn submit(
        &self,
        outcome: AnswerOutcome,
        state: &UiState,
        progress: &ProgressState,
    ) -> Dispatch {
        let submit = Action::SubmitAnswer(outcome);
        let local = self.manager.update_state(state, &submit);

        match self.follow_up(outcome, &local, progress).await {
            Ok((follow_up, next_progress, data)) => {
                debug!(
                    %outcome,
                    follow_up = follow_up.name(),
                    position = next_progress.current_position,
                    answered_after_ms = self
                        .manager
                        .clock()
                        .elapsed_since(state.interaction.start_time)
                        .num_milliseconds(),
                    "answer applied"
                );
                let render = ActionClass::of(&follow_up) == ActionClass::Render;
                let mut applied = self.reduce(&local, next_progress, &follow_up, render);
                applied.business = Some(data);
                Dispatch::Applied(applied)
            }
            Err(err) => {
                warn!(%outcome, error = %err, "answer submission failed");
                Dispatch::Failed(err)
            }
        }
    }

    async fn follow_up(
        &self,
        outcome: AnswerOutcome,
        local: &UiState,
        progress: &ProgressState,
    ) -> Result<(Action, ProgressState, ResponseData), SessionError> {
        let data = self.backend.submit_answer_result(outcome).await?.into_data()?;
        let step = ProgressStateMachine::advance(
            progress,
            outcome,
            local.current_question_id().cloned(),
        )?;
        if step.switched_page() {
            debug!(page = step.state.current_page, "progress moved to next page");
        }

        let current = local.question_data.question().map(|question| {
            QuestionScreen::new(question.clone()).with_progress(local.progress_data)
        });
        let follow_up = follow_up_action(&data, local.options.mode, current.as_ref());
        Ok((follow_up, step.state, data))
    }

    fn reduce(
        &self,
        state: &UiState,
        progress: ProgressState,
        action: &Action,
        render: bool,
    ) -> Applied {
        let next = self.manager.update_state(state, action);
        let composition = self.compose(&next, &progress);
        Applied {
            state: next,
            progress,
            composition,
            render,
            business: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionData, QuestionScreen, ScreenKind, SessionOptions};
    use quiz_core::progress::PaginationEngine;
    use quiz_core::time::{fixed_clock, fixed_now};
    use services::ScriptedBackend;

    fn executor(backend: ScriptedBackend) -> PatternExecutor {
        PatternExecutor::new(
            Arc::new(backend),
            UiStateManager::new().with_clock(fixed_clock()),
            ComposerRegistry::default(),
        )
    }

    fn on_question(executor: &PatternExecutor) -> (UiState, ProgressState) {
        let progress = ProgressState::start(PaginationEngine::default().calculate(3)).unwrap();
        let state = executor.manager().update_state(
            &UiState::initial(SessionOptions::default(), fixed_now()),
            &Action::NewQuestion(QuestionScreen::new(QuestionData::new("q1", "inu"))),
        );
        (state, progress)
    }

    #[test]
    fn classifies_actions() {
        assert_eq!(ActionClass::of(&Action::TryAgain), ActionClass::Restart);
        assert_eq!(ActionClass::of(&Action::CloseLearnMode), ActionClass::Close);
        assert_eq!(
            ActionClass::of(&Action::SubmitAnswer(AnswerOutcome::Correct)),
            ActionClass::Business
        );
        assert_eq!(
            ActionClass::of(&Action::Unknown("__unknown__".into())),
            ActionClass::Default
        );
    }

    #[test]
    fn local_path_refuses_business_actions() {
        let executor = executor(ScriptedBackend::new());
        let (state, progress) = on_question(&executor);
        assert!(
            executor
                .execute_local(&Action::SubmitAnswer(AnswerOutcome::Correct), &state, &progress)
                .is_none()
        );
    }

    #[test]
    fn signals_leave_state_alone() {
        let executor = executor(ScriptedBackend::new());
        let (state, progress) = on_question(&executor);
        let dispatch = executor.execute_local(&Action::NextStage, &state, &progress);
        assert!(matches!(
            dispatch,
            Some(Dispatch::Signal(SessionSignal::NextStage))
        ));
    }

    #[tokio::test]
    async fn correct_answer_moves_progress_and_shows_next_question() {
        let backend = ScriptedBackend::new()
            .then(ResponseData::question(QuestionData::new("q2", "neko")));
        let executor = executor(backend.clone());
        let (state, progress) = on_question(&executor);

        let Dispatch::Applied(applied) = executor
            .execute(Action::SubmitAnswer(AnswerOutcome::Correct), &state, &progress)
            .await
        else {
            panic!("expected applied dispatch");
        };
        assert_eq!(applied.state.current_screen, ScreenKind::Question);
        assert_eq!(applied.state.current_question_id().unwrap().as_str(), "q2");
        assert_eq!(applied.progress.current_position, 1);
        assert!(applied.render);
        assert!(applied.business.is_some());
        assert_eq!(backend.submitted(), vec![AnswerOutcome::Correct]);
    }

    #[tokio::test]
    async fn failed_backend_reports_error() {
        let backend = ScriptedBackend::new();
        backend.push_answer_failure("evaluation unavailable");
        let executor = executor(backend);
        let (state, progress) = on_question(&executor);

        let dispatch = executor
            .execute(Action::SubmitAnswer(AnswerOutcome::Incorrect), &state, &progress)
            .await;
        assert!(matches!(dispatch, Dispatch::Failed(SessionError::Backend(_))));
    }
}
