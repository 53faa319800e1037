#![forbid(unsafe_code)]

pub mod compose;
pub mod session;
pub mod surface;
pub mod views;
pub mod vm;

pub use compose::{Composition, ComposerRegistry, RenderReport};
pub use session::{ActionResult, SessionController, SessionListener, SessionSignal};
pub use surface::{Frame, RecordingSurface, RenderSurface, TextSurface};
