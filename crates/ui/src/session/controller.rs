use std::fmt;
use std::sync::Arc;

use quiz_core::model::{Action, SessionId, SessionOptions, TestId, UiState};
use quiz_core::progress::ProgressState;
use quiz_core::{Clock, UiStateManager};
use serde_json::Value;
use services::{QuizBackend, ResponseData, SessionConfig, SessionError, follow_up_action};
use tracing::{debug, info, warn};

use crate::compose::{Composition, CompositionSnapshot, ComposerRegistry, RenderReport};
use crate::session::{
    Applied, CancelableTimer, Dispatch, NoopListener, PatternExecutor, SessionListener,
    SessionSignal,
};
use crate::surface::{RecordingSurface, RenderSurface};

/// Outcome of one dispatched action. Same shape for every kind of action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    /// Session state after the call; the unchanged state on failure.
    pub state: Option<UiState>,
    pub composition: Option<CompositionSnapshot>,
    pub business_data: Option<ResponseData>,
    pub signal: Option<SessionSignal>,
    /// Set when the composition was painted during the call. Question screens
    /// are painted as they are entered, including the follow-up question of an
    /// answer; other screens wait for [`SessionController::render_current`].
    pub rendered: Option<RenderReport>,
    pub error: Option<String>,
}

impl ActionResult {
    fn signal(signal: SessionSignal) -> Self {
        Self {
            success: true,
            signal: Some(signal),
            ..Self::default()
        }
    }
}

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder {
    backend: Arc<dyn QuizBackend>,
    config: SessionConfig,
    listener: Arc<dyn SessionListener>,
    surface: Box<dyn RenderSurface>,
    clock: Clock,
    registry: ComposerRegistry,
}

impl SessionControllerBuilder {
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = listener;
        self
    }

    #[must_use]
    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ComposerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Open a session and show its first screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the test id is empty, the configuration is
    /// invalid, or the backend cannot start the session. Nothing else in the
    /// session returns an error.
    pub async fn start(self, test_id: &str) -> Result<SessionController, SessionError> {
        let test_id = TestId::new(test_id)?;
        let engine = self.config.pagination_engine()?;
        let session_id = SessionId::random();
        info!(%session_id, %test_id, "starting session");

        let data = self
            .backend
            .start_session(&test_id)
            .await
            .and_then(|envelope| envelope.into_data())
            .inspect_err(|err| warn!(%session_id, error = %err, "session start failed"))?;

        let total_units = data.total_units().unwrap_or(0);
        let progress = ProgressState::start(engine.calculate(total_units))?;
        let options = self.config.options;
        let first = follow_up_action(&data, options.mode, None);
        debug!(%session_id, total_units, first = first.name(), "session opened");

        let manager = UiStateManager::new().with_clock(self.clock);
        let state = UiState::initial(options, self.clock.now());
        let mut controller = SessionController {
            session_id,
            test_id,
            config: self.config,
            executor: PatternExecutor::new(self.backend, manager, self.registry),
            listener: self.listener,
            surface: self.surface,
            state,
            progress,
            composition: Composition::empty(),
            example_timer: None,
            cleaned_up: false,
        };

        let result = controller.apply_local(&first);
        if result.rendered.is_none() {
            controller.render_current();
        }
        Ok(controller)
    }
}

/// One quiz session: owns its UI state, progress and current composition.
///
/// Every call takes `&mut self`, so a second action cannot start while one is
/// in flight. State is replaced only once an action has completed.
pub struct SessionController {
    session_id: SessionId,
    test_id: TestId,
    config: SessionConfig,
    executor: PatternExecutor,
    listener: Arc<dyn SessionListener>,
    surface: Box<dyn RenderSurface>,
    state: UiState,
    progress: ProgressState,
    composition: Composition,
    example_timer: Option<CancelableTimer>,
    cleaned_up: bool,
}

impl SessionController {
    #[must_use]
    pub fn builder(backend: Arc<dyn QuizBackend>) -> SessionControllerBuilder {
        SessionControllerBuilder {
            backend,
            config: SessionConfig::default(),
            listener: Arc::new(NoopListener),
            surface: Box::new(RecordingSurface::new()),
            clock: Clock::default(),
            registry: ComposerRegistry::default(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn options(&self) -> SessionOptions {
        self.config.options
    }

    #[must_use]
    pub fn get_state(&self) -> &UiState {
        &self.state
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    #[must_use]
    pub fn get_current_composition(&self) -> &Composition {
        &self.composition
    }

    #[must_use]
    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up
    }

    /// An example is on screen and its auto-transition has not happened yet.
    #[must_use]
    pub fn auto_transition_pending(&self) -> bool {
        self.example_timer
            .as_ref()
            .is_some_and(CancelableTimer::is_pending)
    }

    /// Parse and dispatch a host action.
    ///
    /// Malformed payloads fail validation and leave the session untouched.
    pub async fn handle_user_action(
        &mut self,
        action_type: &str,
        payload: Option<Value>,
    ) -> ActionResult {
        match Action::from_parts(action_type, payload) {
            Ok(action) => self.dispatch(action).await,
            Err(err) => {
                warn!(session_id = %self.session_id, action = action_type, error = %err, "invalid action");
                self.failure(SessionError::from(err))
            }
        }
    }

    pub async fn dispatch(&mut self, action: Action) -> ActionResult {
        if self.cleaned_up {
            return self.failure("session is closed");
        }
        debug!(session_id = %self.session_id, action = action.name(), "dispatch");
        let dispatch = self
            .executor
            .execute(action, &self.state, &self.progress)
            .await;
        self.settle(dispatch)
    }

    /// Paint the current composition.
    pub fn render_current(&mut self) -> RenderReport {
        self.composition.render(self.surface.as_mut())
    }

    /// Wait for the example on screen to time out, then move to the stashed
    /// question. `None` when no example timer is armed or it was canceled.
    pub async fn wait_auto_transition(&mut self) -> Option<ActionResult> {
        let timer = self.example_timer.as_mut()?;
        if !timer.fired().await {
            return None;
        }
        self.auto_transition()
    }

    /// Non-blocking form of [`Self::wait_auto_transition`].
    pub fn poll_auto_transition(&mut self) -> Option<ActionResult> {
        let timer = self.example_timer.as_mut()?;
        if !timer.try_fire() {
            return None;
        }
        self.auto_transition()
    }

    /// Cancel the example timer and dispose the composition. Runs once.
    pub fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        if let Some(mut timer) = self.example_timer.take() {
            timer.cancel();
        }
        self.composition.cleanup();
        info!(session_id = %self.session_id, "session cleaned up");
    }

    fn auto_transition(&mut self) -> Option<ActionResult> {
        self.example_timer = None;
        if !self.state.is_showing_example() || self.cleaned_up {
            return None;
        }
        let Some(pending) = self.state.pending_question_data.clone() else {
            warn!(session_id = %self.session_id, "example without a pending question");
            return None;
        };
        debug!(session_id = %self.session_id, "example timed out");
        Some(self.apply_local(&Action::new_question(self.config.options.mode, pending)))
    }

    fn apply_local(&mut self, action: &Action) -> ActionResult {
        match self
            .executor
            .execute_local(action, &self.state, &self.progress)
        {
            Some(dispatch) => self.settle(dispatch),
            None => self.failure("answers must be dispatched asynchronously"),
        }
    }

    fn settle(&mut self, dispatch: Dispatch) -> ActionResult {
        match dispatch {
            Dispatch::Signal(signal) => {
                info!(session_id = %self.session_id, ?signal, "session signal");
                self.listener.on_signal(self.session_id, signal);
                ActionResult::signal(signal)
            }
            Dispatch::Applied(applied) => self.commit(applied),
            Dispatch::Failed(err) => self.failure(err),
        }
    }

    fn commit(&mut self, applied: Applied) -> ActionResult {
        let Applied {
            state,
            progress,
            composition,
            render,
            business,
        } = applied;

        let example_changed = state.is_showing_example()
            && (!self.state.is_showing_example() || self.state.example_data != state.example_data);

        let mut previous = std::mem::replace(&mut self.composition, composition);
        previous.cleanup();
        self.state = state;
        self.progress = progress;

        if !self.state.is_showing_example() {
            if let Some(mut timer) = self.example_timer.take() {
                timer.cancel();
                debug!(session_id = %self.session_id, "example timer canceled");
            }
        } else if example_changed {
            let delay = self.config.example_display;
            self.example_timer = Some(CancelableTimer::start(delay));
            debug!(session_id = %self.session_id, ?delay, "example timer armed");
        }

        let rendered = render.then(|| self.render_current());
        ActionResult {
            success: true,
            state: Some(self.state.clone()),
            composition: Some(self.composition.snapshot()),
            business_data: business,
            signal: None,
            rendered,
            error: None,
        }
    }

    fn failure(&self, error: impl fmt::Display) -> ActionResult {
        ActionResult {
            success: false,
            state: Some(self.state.clone()),
            composition: Some(self.composition.snapshot()),
            error: Some(error.to_string()),
            ..ActionResult::default()
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session_id", &self.session_id)
            .field("test_id", &self.test_id)
            .field("screen", &self.state.current_screen)
            .field("position", &self.progress.current_position)
            .field("cleaned_up", &self.cleaned_up)
            .finish_non_exhaustive()
    }
}
