//! Screen composition: which components make up each screen.

mod composition;
mod registry;

pub use composition::{Composition, CompositionKind, CompositionSnapshot, RenderReport};
pub use registry::{ComposeContext, ComposeError, ComposerFn, ComposerRegistry};
