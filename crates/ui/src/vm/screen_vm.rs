use quiz_core::model::{BackgroundData, BlockTransition, ExampleData, FinalStats};

use crate::vm::time_fmt::format_clock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundVm {
    pub scene: String,
    pub stage: u32,
}

#[must_use]
pub fn map_background(background: &BackgroundData) -> BackgroundVm {
    BackgroundVm {
        scene: background.scene.clone().unwrap_or_else(|| "default".into()),
        stage: background.stage,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub score_label: String,
    pub accuracy_percent: u32,
}

#[must_use]
pub fn map_results(stats: &FinalStats) -> ResultsVm {
    let total = if stats.total == 0 {
        stats.correct + stats.incorrect
    } else {
        stats.total
    };
    let accuracy_percent = if total == 0 {
        0
    } else {
        u32::try_from(u64::from(stats.correct) * 100 / u64::from(total)).unwrap_or(100)
    };
    ResultsVm {
        correct: stats.correct,
        incorrect: stats.incorrect,
        total,
        score_label: format!("{} / {}", stats.correct, total),
        accuracy_percent,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionVm {
    pub title: String,
    pub message: Option<String>,
}

#[must_use]
pub fn map_transition(block: &BlockTransition) -> TransitionVm {
    let title = if block.next_block == 0 {
        "Block complete".to_string()
    } else {
        format!("Block {} complete, next up: block {}", block.completed_block, block.next_block)
    };
    TransitionVm {
        title,
        message: block.message.clone(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExampleVm {
    pub text: String,
    pub question_id: String,
    pub shown_at: String,
    pub auto_transition: bool,
}

#[must_use]
pub fn map_example(example: &ExampleData) -> ExampleVm {
    ExampleVm {
        text: example.text.clone(),
        question_id: example.question_id.to_string(),
        shown_at: format_clock(example.show_time),
        auto_transition: example.auto_transition,
    }
}
