#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteNameError {
	Empty,
	TooLong,
	PathSeparator,
	Hidden,
	ControlCharacter,
}
impl NoteNameError {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Empty => "note name is empty",
			Self::TooLong => "note name is longer than 200 characters",
			Self::PathSeparator => "note name contains a path separator",
			Self::Hidden => "note name starts with a dot",
			Self::ControlCharacter => "note name contains a control character",
		}
	}
}

pub const MAX_NOTE_NAME_CHARS: usize = 200;

/// Note names double as file stems, so they must stay inside the notes directory.
pub fn validate_note_name(name: &str) -> Result<(), NoteNameError> {
	if name.trim().is_empty() {
		return Err(NoteNameError::Empty);
	}
	if name.chars().count() > MAX_NOTE_NAME_CHARS {
		return Err(NoteNameError::TooLong);
	}
	if name.contains(['/', '\\']) {
		return Err(NoteNameError::PathSeparator);
	}
	if name.starts_with('.') {
		return Err(NoteNameError::Hidden);
	}
	if name.chars().any(char::is_control) {
		return Err(NoteNameError::ControlCharacter);
	}

	Ok(())
}
