mod progress_vm;
mod question_vm;
mod screen_vm;
mod time_fmt;

pub use progress_vm::{ProgressTrackerVm, SlotState, map_progress_tracker};
pub use question_vm::{AnswerInput, QuestionVm, map_question};
pub use screen_vm::{
    BackgroundVm, ExampleVm, ResultsVm, TransitionVm, map_background, map_example, map_results,
    map_transition,
};
pub use time_fmt::format_clock;
