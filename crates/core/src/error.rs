use thiserror::Error;

use crate::model::{ActionError, IdError};
use crate::progress::{PaginationError, ProgressError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
