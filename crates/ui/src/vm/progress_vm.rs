use quiz_core::progress::ProgressState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Done,
    Current,
    Upcoming,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressTrackerVm {
    pub slots: Vec<SlotState>,
    pub page_label: Option<String>,
    pub completed_label: String,
    pub is_full: bool,
}

/// One slot per unit on the current page; pages are labelled only when there
/// is more than one.
#[must_use]
pub fn map_progress_tracker(progress: &ProgressState) -> ProgressTrackerVm {
    let capacity = progress.current_page_data.count;
    let position = progress.current_position.min(capacity);
    let slots = (0..capacity)
        .map(|slot| match slot.cmp(&position) {
            std::cmp::Ordering::Less => SlotState::Done,
            std::cmp::Ordering::Equal => SlotState::Current,
            std::cmp::Ordering::Greater => SlotState::Upcoming,
        })
        .collect();

    let page_label = progress
        .pagination
        .needs_pagination
        .then(|| format!("Page {} of {}", progress.current_page + 1, progress.pagination.total_pages));

    ProgressTrackerVm {
        slots,
        page_label,
        completed_label: format!("{} / {}", progress.absolute_position(), progress.total_units),
        is_full: progress.is_full(),
    }
}
