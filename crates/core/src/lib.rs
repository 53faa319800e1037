#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod progress;
pub mod reducer;
pub mod time;

pub use error::Error;
pub use reducer::UiStateManager;
pub use time::Clock;
