#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod http_backend;
pub mod routing;
pub mod scripted;

pub use quiz_core::Clock;

pub use backend::{BackendEnvelope, QuizBackend, ResponseData, ResponseKind, ShowExample};
pub use config::{DEFAULT_EXAMPLE_DISPLAY, SessionConfig};
pub use error::{BackendError, ConfigError, SessionError};
pub use http_backend::{HttpBackendConfig, HttpQuizBackend};
pub use routing::{action_type_for, follow_up_action};
pub use scripted::ScriptedBackend;
