use notefold_domain::{
	learning,
	note_name::{self, NoteNameError},
	practice::{self, PracticeQuestion, QuestionOption, QuestionShapeError},
};

fn domains(entries: &[&str]) -> Vec<String> {
	entries.iter().map(|entry| entry.to_string()).collect()
}

fn question(correct_flags: &[bool]) -> PracticeQuestion {
	PracticeQuestion {
		note_name: "Biology".to_string(),
		question: "What does photosynthesis convert light into?".to_string(),
		options: correct_flags
			.iter()
			.enumerate()
			.map(|(idx, correct)| QuestionOption {
				description: format!("Option {idx}"),
				correct: *correct,
			})
			.collect(),
	}
}

#[test]
fn learning_domains_match_subdomains() {
	let allowed = domains(&["wikipedia.org", "docs.python.org"]);

	assert!(learning::is_learning_resource("https://en.wikipedia.org/wiki/Rust", &allowed));
	assert!(learning::is_learning_resource("http://docs.python.org/3/library/asyncio.html", &allowed));
	assert!(!learning::is_learning_resource("https://python.org/", &allowed));
	assert!(!learning::is_learning_resource("https://example.com/wikipedia.org", &allowed));
}

#[test]
fn learning_domains_with_paths_require_prefix() {
	let allowed = domains(&["reddit.com/r/askscience"]);

	assert!(learning::is_learning_resource("https://www.reddit.com/r/askscience/comments/1", &allowed));
	assert!(learning::is_learning_resource("https://reddit.com/r/AskScience", &allowed));
	assert!(!learning::is_learning_resource("https://reddit.com/r/askscienceish", &allowed));
	assert!(!learning::is_learning_resource("https://reddit.com/r/funny", &allowed));
}

#[test]
fn empty_domain_list_accepts_any_web_url() {
	assert!(learning::is_learning_resource("https://example.com/", &[]));
	assert!(!learning::is_learning_resource("ftp://example.com/", &[]));
	assert!(!learning::is_learning_resource("not a url", &[]));
}

#[test]
fn note_names_stay_inside_the_notes_directory() {
	assert!(note_name::validate_note_name("Photosynthesis").is_ok());
	assert!(note_name::validate_note_name("Cell Biology (Intro)").is_ok());
	assert_eq!(note_name::validate_note_name("  "), Err(NoteNameError::Empty));
	assert_eq!(note_name::validate_note_name("../etc/passwd"), Err(NoteNameError::PathSeparator));
	assert_eq!(note_name::validate_note_name("a/b"), Err(NoteNameError::PathSeparator));
	assert_eq!(note_name::validate_note_name("a\\b"), Err(NoteNameError::PathSeparator));
	assert_eq!(note_name::validate_note_name(".hidden"), Err(NoteNameError::Hidden));
	assert_eq!(
		note_name::validate_note_name(&"x".repeat(note_name::MAX_NOTE_NAME_CHARS + 1)),
		Err(NoteNameError::TooLong)
	);
}

#[test]
fn question_requires_exactly_one_correct_option() {
	assert!(practice::validate_question(&question(&[false, true, false, false])).is_ok());
	assert_eq!(
		practice::validate_question(&question(&[true, true, false, false])),
		Err(QuestionShapeError::CorrectCount { found: 2 })
	);
	assert_eq!(
		practice::validate_question(&question(&[false, false, false, false])),
		Err(QuestionShapeError::CorrectCount { found: 0 })
	);
}

#[test]
fn question_requires_four_options() {
	assert_eq!(
		practice::validate_question(&question(&[true, false, false])),
		Err(QuestionShapeError::WrongOptionCount { found: 3 })
	);
}

#[test]
fn question_deserializes_from_generator_json() {
	let raw = serde_json::json!({
		"note_name": "Biology",
		"question": "Q?",
		"options": [
			{ "description": "a", "correct": false },
			{ "description": "b", "correct": true },
			{ "description": "c", "correct": false },
			{ "description": "d", "correct": false }
		]
	});
	let parsed: PracticeQuestion = serde_json::from_value(raw).expect("Failed to parse question.");

	assert_eq!(parsed.correct_option().map(|option| option.description.as_str()), Some("b"));
}
