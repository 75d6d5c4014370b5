//! Chat-completion backed summarizer and question generator.

use serde::Deserialize;
use serde_json::Value;

use notefold_config::LlmProviderConfig;
use notefold_domain::{
	note_name,
	practice::{OPTIONS_PER_QUESTION, PracticeQuestion, QuestionOption},
};
use notefold_providers::llm;

use crate::{BoxFuture, Error, NoteStore, QuestionGenerator, Result, Summarizer};

const SUMMARIZER_INSTRUCTIONS: &str = "\
You are an efficient note-writer for a student. Take in a piece of text, extract the most \
important parts, and fold them into the existing Markdown notes or create new notes. \
Reply with a JSON object of the form {\"notes\": [{\"name\": string, \"content\": string}]} \
listing only notes that must be created or rewritten. Each content is the complete new Markdown \
body of that note, keeping what was already there unless it is wrong. Note names are short \
titles without slashes.";

/// Budget for existing note bodies sent along with the new text; past it only names are sent.
const MAX_NOTE_CONTEXT_CHARS: usize = 48_000;

#[derive(Debug, Deserialize)]
struct NoteUpdates {
	#[serde(default)]
	notes: Vec<NoteUpdate>,
}

#[derive(Debug, Deserialize)]
struct NoteUpdate {
	name: String,
	content: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestions {
	#[serde(default)]
	questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
	question: String,
	options: Vec<GeneratedOption>,
}

#[derive(Debug, Deserialize)]
struct GeneratedOption {
	description: String,
	#[serde(default)]
	correct: bool,
}

pub struct LlmSummarizer {
	cfg: LlmProviderConfig,
}
impl LlmSummarizer {
	pub fn new(cfg: LlmProviderConfig) -> Self {
		Self { cfg }
	}

	async fn run(&self, notes: &dyn NoteStore, text: &str) -> Result<()> {
		let messages = build_summarizer_messages(notes, text).await?;
		let reply = llm::complete_json(&self.cfg, &messages)
			.await
			.map_err(|err| Error::Summarization { message: err.to_string() })?;
		let updates = parse_note_updates(reply)?;

		if updates.is_empty() {
			tracing::warn!(provider = %self.cfg.provider_id, "Summarizer proposed no note changes.");
		}

		for update in updates {
			notes.write(&update.name, &update.content).await?;

			tracing::info!(note = %update.name, "Note rewritten by summarizer.");
		}

		Ok(())
	}
}
impl Summarizer for LlmSummarizer {
	fn update<'a>(&'a self, notes: &'a dyn NoteStore, text: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.run(notes, text))
	}
}

pub struct LlmQuestionGenerator {
	cfg: LlmProviderConfig,
	questions_per_note: u32,
}
impl LlmQuestionGenerator {
	pub fn new(cfg: LlmProviderConfig, questions_per_note: u32) -> Self {
		Self { cfg, questions_per_note }
	}

	async fn run(&self, note_name: &str, note_text: &str) -> Result<Vec<PracticeQuestion>> {
		let messages = build_generator_messages(note_name, note_text, self.questions_per_note);
		let reply = llm::complete_json(&self.cfg, &messages).await.map_err(|err| {
			Error::Generation { note: note_name.to_string(), message: err.to_string() }
		})?;

		parse_generated_questions(note_name, reply)
	}
}
impl QuestionGenerator for LlmQuestionGenerator {
	fn generate<'a>(
		&'a self,
		note_name: &'a str,
		note_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<PracticeQuestion>>> {
		Box::pin(self.run(note_name, note_text))
	}
}

async fn build_summarizer_messages(notes: &dyn NoteStore, text: &str) -> Result<Vec<Value>> {
	let existing = notes.list().await?;
	let mut context = String::new();
	let mut budget = MAX_NOTE_CONTEXT_CHARS;

	for note in &existing {
		let body = match notes.read(&note.name).await {
			Ok(body) => body,
			// Listed a moment ago; a concurrent delete is not fatal here.
			Err(Error::NoteNotFound { .. }) => continue,
			Err(err) => return Err(err),
		};
		let chars = body.chars().count();

		if chars <= budget {
			budget -= chars;
			context.push_str(&format!("## Note: {}\n{}\n\n", note.name, body));
		} else {
			context.push_str(&format!("## Note: {} (content omitted)\n\n", note.name));
		}
	}

	if context.is_empty() {
		context.push_str("There are no notes yet.\n");
	}

	Ok(vec![
		serde_json::json!({ "role": "system", "content": SUMMARIZER_INSTRUCTIONS }),
		serde_json::json!({
			"role": "user",
			"content": format!(
				"Existing notes:\n\n{context}\nPlease update the notes to include notes from the \
				 following content:\n\n{text}"
			),
		}),
	])
}

fn parse_note_updates(reply: Value) -> Result<Vec<NoteUpdate>> {
	let updates: NoteUpdates = serde_json::from_value(reply).map_err(|err| {
		Error::Summarization { message: format!("Unexpected summarizer reply: {err}.") }
	})?;
	let mut out = Vec::with_capacity(updates.notes.len());

	for mut update in updates.notes {
		update.name = update.name.trim().trim_end_matches(".md").to_string();

		if let Err(err) = note_name::validate_note_name(&update.name) {
			return Err(Error::Summarization {
				message: format!("Summarizer proposed an invalid note name: {}.", err.as_str()),
			});
		}

		out.push(update);
	}

	Ok(out)
}

fn build_generator_messages(note_name: &str, note_text: &str, count: u32) -> Vec<Value> {
	let instructions = format!(
		"Write {count} multiple-choice practice questions that test the key facts of the note \
below. Every question has exactly {OPTIONS_PER_QUESTION} options and exactly one of them is \
correct. Reply with a JSON object of the form {{\"questions\": [{{\"question\": string, \
\"options\": [{{\"description\": string, \"correct\": boolean}}]}}]}}."
	);

	vec![
		serde_json::json!({ "role": "system", "content": instructions }),
		serde_json::json!({
			"role": "user",
			"content": format!("# {note_name}\n\n{note_text}"),
		}),
	]
}

fn parse_generated_questions(note_name: &str, reply: Value) -> Result<Vec<PracticeQuestion>> {
	let generated: GeneratedQuestions = serde_json::from_value(reply).map_err(|err| {
		Error::Generation {
			note: note_name.to_string(),
			message: format!("Unexpected generator reply: {err}."),
		}
	})?;

	if generated.questions.is_empty() {
		return Err(Error::Generation {
			note: note_name.to_string(),
			message: "Generator returned no questions.".to_string(),
		});
	}

	Ok(generated
		.questions
		.into_iter()
		.map(|question| PracticeQuestion {
			note_name: note_name.to_string(),
			question: question.question.trim().to_string(),
			options: question
				.options
				.into_iter()
				.map(|option| QuestionOption {
					description: option.description.trim().to_string(),
					correct: option.correct,
				})
				.collect(),
		})
		.collect())
}
