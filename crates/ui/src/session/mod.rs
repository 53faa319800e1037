//! Session orchestration: dispatching actions, talking to the backend and
//! owning the live state.

mod controller;
mod executor;
mod listener;
mod timer;

pub use controller::{ActionResult, SessionController, SessionControllerBuilder};
pub use executor::{ActionClass, Applied, Dispatch, PatternExecutor};
pub use listener::{ChannelListener, NoopListener, SessionListener, SessionSignal};
pub use timer::CancelableTimer;
