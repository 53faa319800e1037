use crate::compose::ComposeContext;
use crate::surface::Frame;
use crate::views::View;
use crate::vm::map_progress_tracker;

/// Progress tracker for the current page. `None` when the session has no units.
#[must_use]
pub fn progress_view(ctx: &ComposeContext<'_>) -> Option<View> {
    if ctx.progress.pagination.is_empty() {
        return None;
    }
    Some(View::new(Frame::Progress(map_progress_tracker(ctx.progress))))
}
