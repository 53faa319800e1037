use std::fmt;

use crate::surface::{ElementKind, Frame, RenderError, RenderSurface};

/// A renderable piece of a composition.
pub trait Component: Send {
    fn kind(&self) -> ElementKind;

    /// # Errors
    ///
    /// Returns `RenderError` if the component cannot be painted.
    fn render(&mut self, surface: &mut dyn RenderSurface) -> Result<(), RenderError>;

    /// Release the component. Safe to call more than once.
    fn cleanup(&mut self);
}

/// Component painting a single precomputed frame.
#[derive(Clone, PartialEq, Eq)]
pub struct View {
    frame: Frame,
    disposed: bool,
}

impl View {
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            disposed: false,
        }
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Component for View {
    fn kind(&self) -> ElementKind {
        self.frame.kind()
    }

    fn render(&mut self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        surface.paint(&self.frame)
    }

    fn cleanup(&mut self) {
        self.disposed = true;
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("kind", &self.frame.kind())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
