use serde::{Deserialize, Serialize};

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
	pub description: String,
	pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeQuestion {
	pub note_name: String,
	pub question: String,
	pub options: Vec<QuestionOption>,
}
impl PracticeQuestion {
	pub fn correct_option(&self) -> Option<&QuestionOption> {
		self.options.iter().find(|option| option.correct)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionShapeError {
	EmptyQuestion,
	WrongOptionCount { found: usize },
	EmptyOption { index: usize },
	CorrectCount { found: usize },
}
impl std::fmt::Display for QuestionShapeError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::EmptyQuestion => write!(f, "question text is empty"),
			Self::WrongOptionCount { found } => {
				write!(f, "expected {OPTIONS_PER_QUESTION} options, found {found}")
			},
			Self::EmptyOption { index } => write!(f, "option {index} has no description"),
			Self::CorrectCount { found } => {
				write!(f, "expected exactly one correct option, found {found}")
			},
		}
	}
}

/// Checks the structural invariants of a question, not its quality.
pub fn validate_question(question: &PracticeQuestion) -> Result<(), QuestionShapeError> {
	if question.question.trim().is_empty() {
		return Err(QuestionShapeError::EmptyQuestion);
	}
	if question.options.len() != OPTIONS_PER_QUESTION {
		return Err(QuestionShapeError::WrongOptionCount { found: question.options.len() });
	}
	if let Some(index) = question.options.iter().position(|option| option.description.trim().is_empty())
	{
		return Err(QuestionShapeError::EmptyOption { index });
	}

	let correct = question.options.iter().filter(|option| option.correct).count();

	if correct != 1 {
		return Err(QuestionShapeError::CorrectCount { found: correct });
	}

	Ok(())
}
