//! Boundary to the rendering technology. Components paint `Frame`s onto a
//! `RenderSurface`; what a surface does with them is up to the host.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::vm::{
    BackgroundVm, ExampleVm, ProgressTrackerVm, QuestionVm, ResultsVm, SlotState, TransitionVm,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderError {
    #[error("component was already disposed")]
    Disposed,
    #[error("surface failed to paint {kind:?}: {reason}")]
    Surface { kind: ElementKind, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Question,
    WriteQuestion,
    Progress,
    Background,
    Results,
    Transition,
    Example,
}

/// One painted element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Question(QuestionVm),
    WriteQuestion(QuestionVm),
    Progress(ProgressTrackerVm),
    Background(BackgroundVm),
    Results(ResultsVm),
    Transition(TransitionVm),
    Example(ExampleVm),
}

impl Frame {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Frame::Question(_) => ElementKind::Question,
            Frame::WriteQuestion(_) => ElementKind::WriteQuestion,
            Frame::Progress(_) => ElementKind::Progress,
            Frame::Background(_) => ElementKind::Background,
            Frame::Results(_) => ElementKind::Results,
            Frame::Transition(_) => ElementKind::Transition,
            Frame::Example(_) => ElementKind::Example,
        }
    }
}

pub trait RenderSurface: Send {
    /// # Errors
    ///
    /// Returns `RenderError::Surface` if the frame cannot be painted.
    fn paint(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

#[derive(Debug, Default)]
struct Recording {
    frames: Vec<Frame>,
    failing: HashSet<ElementKind>,
}

/// Surface that keeps every painted frame. Clones share the same recording.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every paint of `kind` fail.
    pub fn fail_on(&self, kind: ElementKind) {
        self.lock().failing.insert(kind);
    }

    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.lock().frames.clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<ElementKind> {
        self.lock().frames.iter().map(Frame::kind).collect()
    }

    #[must_use]
    pub fn last(&self, kind: ElementKind) -> Option<Frame> {
        self.lock()
            .frames
            .iter()
            .rev()
            .find(|frame| frame.kind() == kind)
            .cloned()
    }

    pub fn clear(&self) {
        self.lock().frames.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderSurface for RecordingSurface {
    fn paint(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let mut recording = self.lock();
        if recording.failing.contains(&frame.kind()) {
            return Err(RenderError::Surface {
                kind: frame.kind(),
                reason: "configured to fail".into(),
            });
        }
        recording.frames.push(frame.clone());
        Ok(())
    }
}

/// Surface writing each frame as plain text lines.
pub struct TextSurface<W> {
    out: W,
}

impl TextSurface<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RenderSurface for TextSurface<W> {
    fn paint(&mut self, frame: &Frame) -> Result<(), RenderError> {
        writeln!(self.out, "{}", describe(frame))
            .and_then(|()| self.out.flush())
            .map_err(|err| RenderError::Surface {
                kind: frame.kind(),
                reason: err.to_string(),
            })
    }
}

/// Text form of a frame, as painted by [`TextSurface`].
#[must_use]
pub fn describe(frame: &Frame) -> String {
    match frame {
        Frame::Question(vm) => describe_question(vm, "choose"),
        Frame::WriteQuestion(vm) => describe_question(vm, "type the answer"),
        Frame::Progress(vm) => {
            let slots: String = vm
                .slots
                .iter()
                .map(|slot| match slot {
                    SlotState::Done => '#',
                    SlotState::Current => '>',
                    SlotState::Upcoming => '.',
                })
                .collect();
            match &vm.page_label {
                Some(page) => format!("[{slots}] {} ({page})", vm.completed_label),
                None => format!("[{slots}] {}", vm.completed_label),
            }
        }
        Frame::Background(vm) => format!("~ {} (stage {}) ~", vm.scene, vm.stage),
        Frame::Results(vm) => format!(
            "results: {} correct, {} incorrect ({}%)",
            vm.score_label, vm.incorrect, vm.accuracy_percent
        ),
        Frame::Transition(vm) => match &vm.message {
            Some(message) => format!("{}: {message}", vm.title),
            None => vm.title.clone(),
        },
        Frame::Example(vm) => format!("example: {}", vm.text),
    }
}

fn describe_question(vm: &QuestionVm, verb: &str) -> String {
    let mut line = match &vm.counter_label {
        Some(counter) => format!("({counter}) {}", vm.prompt),
        None => vm.prompt.clone(),
    };
    if !vm.options.is_empty() {
        let options: Vec<String> = vm
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| format!("{}) {option}", index + 1))
            .collect();
        line.push_str(&format!(" [{verb}: {}]", options.join("  ")));
    } else {
        line.push_str(&format!(" [{verb}]"));
    }
    if let Some(hint) = &vm.hint {
        line.push_str(&format!(" hint: {hint}"));
    }
    line
}
