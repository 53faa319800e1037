use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerOutcome, QuestionId};
use super::pagination::{PageDescriptor, PageInfo, Pagination, PaginationError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("page {page_index} does not exist")]
    PageOutOfRange { page_index: u32 },

    #[error("page data does not match page {page_index}")]
    PageMismatch { page_index: u32 },

    #[error("position {position} exceeds page size {count}")]
    PositionOutOfRange { position: u32, count: u32 },

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    #[default]
    Init,
    Move,
    Stay,
    Reset,
    PageSwitch,
}

/// Instruction for the progress tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Init {
        total_units: u32,
        pagination: Pagination,
        page_index: u32,
        page_data: PageDescriptor,
    },
    Move {
        question_id: Option<QuestionId>,
    },
    Stay {
        question_id: Option<QuestionId>,
        reason: String,
    },
    Reset,
    PageSwitch {
        new_page_index: u32,
        new_page_data: PageDescriptor,
    },
}

impl Command {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Init { .. } => CommandKind::Init,
            Command::Move { .. } => CommandKind::Move,
            Command::Stay { .. } => CommandKind::Stay,
            Command::Reset => CommandKind::Reset,
            Command::PageSwitch { .. } => CommandKind::PageSwitch,
        }
    }

    /// `INIT` on `page_index` of `pagination`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::PageOutOfRange` if the page does not exist.
    pub fn init(pagination: Pagination, page_index: u32) -> Result<Self, ProgressError> {
        let page_data = *pagination
            .page_data(page_index)
            .ok_or(ProgressError::PageOutOfRange { page_index })?;
        Ok(Command::Init {
            total_units: pagination.total_units(),
            pagination,
            page_index,
            page_data,
        })
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Position of the tracker within the current page.
///
/// `total_units` counts the whole session; `page_units` counts the current page
/// and is what the tracker fills up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub total_units: u32,
    pub page_units: u32,
    pub pagination: Pagination,
    pub current_page: u32,
    pub current_page_data: PageDescriptor,
    pub current_position: u32,
    pub last_action: CommandKind,
    pub last_question_id: Option<QuestionId>,
    pub stay_reason: Option<String>,
}

impl ProgressState {
    /// Tracker with no units, used when the session size is unknown.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_units: 0,
            page_units: 0,
            pagination: Pagination::empty(),
            current_page: 0,
            current_page_data: PageDescriptor::default(),
            current_position: 0,
            last_action: CommandKind::Init,
            last_question_id: None,
            stay_reason: None,
        }
    }

    /// Tracker positioned at the start of the first page.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the pagination is invalid.
    pub fn start(pagination: Pagination) -> Result<Self, ProgressError> {
        pagination.validate()?;
        if pagination.is_empty() {
            return Ok(Self::empty());
        }
        let init = Command::init(pagination, 0)?;
        ProgressStateMachine::apply(&Self::empty(), &init)
    }

    /// Accept a tracker restored from storage only if it is consistent.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when the pagination or the position is inconsistent.
    pub fn from_persisted(state: Self) -> Result<Self, ProgressError> {
        state.pagination.validate()?;
        if state.pagination.is_empty() {
            return Ok(state);
        }
        let page = state
            .pagination
            .page_data(state.current_page)
            .ok_or(ProgressError::PageOutOfRange {
                page_index: state.current_page,
            })?;
        if *page != state.current_page_data {
            return Err(ProgressError::PageMismatch {
                page_index: state.current_page,
            });
        }
        if state.current_position > page.count {
            return Err(ProgressError::PositionOutOfRange {
                position: state.current_position,
                count: page.count,
            });
        }
        Ok(state)
    }

    #[must_use]
    pub fn current_page_info(&self) -> Option<PageInfo> {
        self.pagination.page_info(self.current_page)
    }

    /// Units completed across all pages.
    #[must_use]
    pub fn absolute_position(&self) -> u32 {
        self.current_page_data.start_unit + self.current_position
    }

    /// Last page filled; nothing left to track.
    #[must_use]
    pub fn is_full(&self) -> bool {
        ProgressStateMachine::should_switch_page(self.current_position, &self.current_page_data)
            && self.pagination.next_page_data(self.current_page).is_none()
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Outcome of `ProgressStateMachine::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    pub state: ProgressState,
    pub applied: Vec<Command>,
}

impl ProgressStep {
    #[must_use]
    pub fn switched_page(&self) -> bool {
        self.applied
            .iter()
            .any(|command| command.kind() == CommandKind::PageSwitch)
    }
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Transitions of the progress tracker. All functions are pure.
pub struct ProgressStateMachine;

impl ProgressStateMachine {
    /// Apply one command, returning the next state.
    ///
    /// `MOVE` never takes the position past the end of the current page.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when `INIT` or `PAGE_SWITCH` name a page that is not
    /// part of the pagination.
    pub fn apply(state: &ProgressState, command: &Command) -> Result<ProgressState, ProgressError> {
        let mut next = state.clone();
        next.last_action = command.kind();
        next.stay_reason = None;

        match command {
            Command::Init {
                total_units,
                pagination,
                page_index,
                page_data,
            } => {
                let expected = pagination
                    .page_data(*page_index)
                    .ok_or(ProgressError::PageOutOfRange {
                        page_index: *page_index,
                    })?;
                if expected != page_data {
                    return Err(ProgressError::PageMismatch {
                        page_index: *page_index,
                    });
                }
                next.total_units = *total_units;
                next.pagination = pagination.clone();
                next.current_page = *page_index;
                next.current_page_data = *page_data;
                next.page_units = page_data.count;
                next.current_position = 0;
                next.last_question_id = None;
            }
            Command::Move { question_id } => {
                next.current_position = state
                    .current_position
                    .saturating_add(1)
                    .min(state.current_page_data.count);
                next.last_question_id.clone_from(question_id);
            }
            Command::Stay {
                question_id,
                reason,
            } => {
                next.stay_reason = Some(reason.clone());
                next.last_question_id.clone_from(question_id);
            }
            Command::Reset => {
                next.current_position = 0;
            }
            Command::PageSwitch {
                new_page_index,
                new_page_data,
            } => {
                let expected = state.pagination.page_data(*new_page_index).ok_or(
                    ProgressError::PageOutOfRange {
                        page_index: *new_page_index,
                    },
                )?;
                if expected != new_page_data {
                    return Err(ProgressError::PageMismatch {
                        page_index: *new_page_index,
                    });
                }
                next.current_page = *new_page_index;
                next.current_page_data = *new_page_data;
                next.page_units = new_page_data.count;
                next.current_position = 0;
            }
        }
        Ok(next)
    }

    /// Map an answer result string to a tracker command.
    ///
    /// Returns `None` for anything other than `"correct"` or `"incorrect"`.
    #[must_use]
    pub fn generate_command(result: &str, question_id: Option<QuestionId>) -> Option<Command> {
        let outcome: AnswerOutcome = result.parse().ok()?;
        Some(Self::command_for(outcome, question_id))
    }

    #[must_use]
    pub fn command_for(outcome: AnswerOutcome, question_id: Option<QuestionId>) -> Command {
        match outcome {
            AnswerOutcome::Correct => Command::Move { question_id },
            AnswerOutcome::Incorrect => Command::Stay {
                question_id,
                reason: "incorrect_answer".into(),
            },
        }
    }

    #[must_use]
    pub fn should_switch_page(position: u32, page: &PageDescriptor) -> bool {
        position >= page.count
    }

    /// `PAGE_SWITCH` to the page after the current one, if the current page is
    /// full and another page exists.
    #[must_use]
    pub fn page_switch_for(state: &ProgressState) -> Option<Command> {
        if !state.pagination.needs_pagination
            || !Self::should_switch_page(state.current_position, &state.current_page_data)
        {
            return None;
        }
        let next = state.pagination.next_page_data(state.current_page)?;
        Some(Command::PageSwitch {
            new_page_index: next.page_index,
            new_page_data: *next,
        })
    }

    /// Record an answer: `MOVE` or `STAY`, then a page switch when the page filled up.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the state's pagination is inconsistent.
    pub fn advance(
        state: &ProgressState,
        outcome: AnswerOutcome,
        question_id: Option<QuestionId>,
    ) -> Result<ProgressStep, ProgressError> {
        let command = Self::command_for(outcome, question_id);
        let moved = command.kind() == CommandKind::Move;
        let mut next = Self::apply(state, &command)?;
        let mut applied = vec![command];

        if moved {
            if let Some(switch) = Self::page_switch_for(&next) {
                next = Self::apply(&next, &switch)?;
                applied.push(switch);
            }
        }

        Ok(ProgressStep {
            state: next,
            applied,
        })
    }
}
