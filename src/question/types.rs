use serde::Deserialize;

/// Presentation variant, keyed by the source's question-type id:
/// 1 = true/false, 2 = multiple-choice, 3 = free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    TrueFalse,
    MultipleChoice,
    FreeText,
}

impl QuestionKind {
    pub fn from_type_id(id: u32) -> QuestionKind {
        match id {
            1 => QuestionKind::TrueFalse,
            2 => QuestionKind::MultipleChoice,
            _ => QuestionKind::FreeText,
        }
    }
}

/// One trivia question. For multiple-choice questions `answer` holds the
/// comma-delimited option list with the correct option first; at
/// presentation time it is rewritten to just the correct option text.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "kind")]
    pub type_id: u32,
    #[serde(rename = "text")]
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub answered: bool,
}

/// Delimiter between multiple-choice options in the source data.
pub const OPTION_SEPARATOR: char = ',';

impl Question {
    pub fn new(id: u32, type_id: u32, question: &str, answer: &str) -> Self {
        Question {
            id,
            type_id,
            question: question.to_string(),
            answer: answer.to_string(),
            answered: false,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        QuestionKind::from_type_id(self.type_id)
    }

    /// Case-insensitive match against the canonical answer.
    pub fn check_answer(&self, input: &str) -> bool {
        input.trim().eq_ignore_ascii_case(self.answer.trim())
    }

    /// The raw option list for a multiple-choice question, correct option
    /// first. Single-element for other kinds.
    pub fn options(&self) -> Vec<String> {
        self.answer
            .split(OPTION_SEPARATOR)
            .map(|s| s.trim().to_string())
            .collect()
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.answered == other.answered
            && self.answer == other.answer
            && self.question == other.question
    }
}

impl Eq for Question {}
