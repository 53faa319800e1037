//! Renderable sub-components built from state snapshots.

mod component;
mod progress;
mod question;
mod screens;

pub use component::{Component, View};
pub use progress::progress_view;
pub use question::{question_view, write_question_view};
pub use screens::{background_view, example_view, results_view, transition_view};
