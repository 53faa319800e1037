use quiz_core::model::{Interaction, ProgressData, QuestionData, SessionOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerInput {
    Choices,
    FreeText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub question_id: String,
    pub prompt: String,
    pub input: AnswerInput,
    pub options: Vec<String>,
    pub hint: Option<String>,
    pub counter_label: Option<String>,
    pub selected: Option<String>,
    pub accepts_input: bool,
}

/// Build the question card. Hints are only exposed when the session enables them.
#[must_use]
pub fn map_question(
    question: &QuestionData,
    progress: ProgressData,
    interaction: &Interaction,
    options: SessionOptions,
    input: AnswerInput,
) -> QuestionVm {
    let counter_label = (progress.total > 0).then(|| {
        format!("{} / {}", progress.current.min(progress.total), progress.total)
    });
    let choices = match input {
        AnswerInput::Choices => question.options.clone(),
        AnswerInput::FreeText => Vec::new(),
    };

    QuestionVm {
        question_id: question.id.to_string(),
        prompt: question.text.clone(),
        input,
        options: choices,
        hint: question.hint.clone().filter(|_| options.show_hints),
        counter_label,
        selected: interaction.selected_answer.clone(),
        accepts_input: interaction.accepts_input(),
    }
}
