use std::fmt;

use quiz_core::model::ScreenKind;
use tracing::warn;

use crate::surface::{ElementKind, RenderError, RenderSurface};
use crate::views::Component;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositionKind {
    Screen(ScreenKind),
    /// No composer is registered for the screen.
    Empty,
    /// The composer for the screen failed.
    Error(ScreenKind),
}

/// Outcome of rendering a composition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: Vec<ElementKind>,
    pub failed: Vec<(ElementKind, RenderError)>,
}

impl RenderReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Plain description of a composition, safe to hand out with results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositionSnapshot {
    pub kind: CompositionKind,
    pub elements: Vec<ElementKind>,
    pub error: Option<String>,
}

/// Components making up one screen.
pub struct Composition {
    pub main: Option<Box<dyn Component>>,
    pub progress: Option<Box<dyn Component>>,
    pub background: Option<Box<dyn Component>>,
    kind: CompositionKind,
    error: Option<String>,
}

impl Composition {
    #[must_use]
    pub fn new(screen: ScreenKind, main: Box<dyn Component>) -> Self {
        Self {
            main: Some(main),
            progress: None,
            background: None,
            kind: CompositionKind::Screen(screen),
            error: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Option<Box<dyn Component>>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Option<Box<dyn Component>>) -> Self {
        self.background = background;
        self
    }

    /// Composition with nothing to show; render and cleanup do nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            main: None,
            progress: None,
            background: None,
            kind: CompositionKind::Empty,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(screen: ScreenKind, error: impl fmt::Display) -> Self {
        Self {
            kind: CompositionKind::Error(screen),
            error: Some(error.to_string()),
            ..Self::empty()
        }
    }

    #[must_use]
    pub fn kind(&self) -> CompositionKind {
        self.kind
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Kinds of the present components in render order.
    #[must_use]
    pub fn elements(&self) -> Vec<ElementKind> {
        [&self.background, &self.main, &self.progress]
            .into_iter()
            .flatten()
            .map(|component| component.kind())
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> CompositionSnapshot {
        CompositionSnapshot {
            kind: self.kind,
            elements: self.elements(),
            error: self.error.clone(),
        }
    }

    /// Render background, main and progress in that order.
    ///
    /// A failing component is logged and skipped; the others still render.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) -> RenderReport {
        let mut report = RenderReport::default();
        for component in [&mut self.background, &mut self.main, &mut self.progress]
            .into_iter()
            .flatten()
        {
            let kind = component.kind();
            match component.render(surface) {
                Ok(()) => report.rendered.push(kind),
                Err(err) => {
                    warn!(?kind, error = %err, "component render failed");
                    report.failed.push((kind, err));
                }
            }
        }
        report
    }

    /// Dispose every component. Safe to call more than once.
    pub fn cleanup(&mut self) {
        for slot in [&mut self.background, &mut self.main, &mut self.progress] {
            if let Some(mut component) = slot.take() {
                component.cleanup();
            }
        }
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composition")
            .field("kind", &self.kind)
            .field("elements", &self.elements())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Frame, RecordingSurface};
    use crate::views::View;
    use crate::vm::{BackgroundVm, TransitionVm};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        cleanups: Arc<AtomicUsize>,
    }

    impl Component for Counting {
        fn kind(&self) -> ElementKind {
            ElementKind::Progress
        }

        fn render(&mut self, _surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
            Ok(())
        }

        fn cleanup(&mut self) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn transition_composition() -> Composition {
        Composition::new(
            ScreenKind::Transition,
            Box::new(View::new(Frame::Transition(TransitionVm {
                title: "done".into(),
                message: None,
            }))),
        )
        .with_background(Some(Box::new(View::new(Frame::Background(BackgroundVm {
            scene: "dusk".into(),
            stage: 2,
        })))))
    }

    #[test]
    fn render_paints_in_order() {
        let surface = RecordingSurface::new();
        let mut composition = transition_composition();
        let report = composition.render(&mut surface.clone());
        assert!(report.is_clean());
        assert_eq!(
            surface.kinds(),
            vec![ElementKind::Background, ElementKind::Transition]
        );
    }

    #[test]
    fn one_failure_does_not_stop_siblings() {
        let surface = RecordingSurface::new();
        surface.fail_on(ElementKind::Background);
        let mut composition = transition_composition();
        let report = composition.render(&mut surface.clone());
        assert_eq!(report.rendered, vec![ElementKind::Transition]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, ElementKind::Background);
        assert_eq!(surface.kinds(), vec![ElementKind::Transition]);
    }

    #[test]
    fn cleanup_disposes_each_component_once() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut composition = transition_composition().with_progress(Some(Box::new(Counting {
            cleanups: Arc::clone(&cleanups),
        })));
        composition.cleanup();
        composition.cleanup();
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(composition.elements().is_empty());
    }

    #[test]
    fn empty_composition_is_inert() {
        let surface = RecordingSurface::new();
        let mut composition = Composition::empty();
        assert!(composition.main.is_none());
        let report = composition.render(&mut surface.clone());
        assert!(report.rendered.is_empty());
        composition.cleanup();
        assert_eq!(composition.kind(), CompositionKind::Empty);
    }
}
