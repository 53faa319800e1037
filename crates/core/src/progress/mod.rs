//! Progress tracker: capped-size pages of progress units and the position
//! within the current page.

mod machine;
mod pagination;

pub use machine::{Command, CommandKind, ProgressError, ProgressState, ProgressStateMachine, ProgressStep};
pub use pagination::{
    DEFAULT_UNITS_PER_PAGE, PageDescriptor, PageInfo, Pagination, PaginationEngine,
    PaginationError,
};
