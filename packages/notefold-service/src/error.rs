pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Extraction failed: {message}")]
	Extraction { message: String },
	#[error("Resource rejected: {message}")]
	ResourceRejected { message: String },
	#[error("Update queue is full (capacity {capacity}).")]
	QueueFull { capacity: usize },
	#[error("Summarization failed: {message}")]
	Summarization { message: String },
	#[error("Question generation failed for note {note:?}: {message}")]
	Generation { note: String, message: String },
	#[error("Generated question for note {note:?} is malformed: {message}")]
	InvalidQuestion { note: String, message: String },
	#[error("Note not found: {name:?}.")]
	NoteNotFound { name: String },
	#[error("Note store error: {message}")]
	NoteStore { message: String },
	#[error("Question store error: {message}")]
	QuestionStore { message: String },
	#[error("Pipeline lifecycle error: {message}")]
	Lifecycle { message: String },
}
impl Error {
	pub fn from_note_store(err: notefold_storage::Error) -> Self {
		match err {
			notefold_storage::Error::NotFound(name) => Self::NoteNotFound { name },
			other => Self::NoteStore { message: other.to_string() },
		}
	}

	pub fn from_question_store(err: notefold_storage::Error) -> Self {
		Self::QuestionStore { message: err.to_string() }
	}
}
