use std::{collections::BTreeSet, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::Mutex;

use notefold_domain::practice;

use crate::{Error, NoteMeta, NoteStore, QuestionGenerator, QuestionStore, Result};

/// Position of the practice refresher in the note history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshCursor {
	pub last_refreshed_at: OffsetDateTime,
	/// Notes whose regeneration failed in the previous pass; retried even when unchanged.
	pub retry: BTreeSet<String>,
}
impl RefreshCursor {
	pub fn at(last_refreshed_at: OffsetDateTime) -> Self {
		Self { last_refreshed_at, retry: BTreeSet::new() }
	}

	pub fn is_stale(&self, note: &NoteMeta) -> bool {
		note.last_modified > self.last_refreshed_at || self.retry.contains(&note.name)
	}
}
impl Default for RefreshCursor {
	fn default() -> Self {
		Self::at(OffsetDateTime::UNIX_EPOCH)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
	pub regenerated: Vec<String>,
	pub failed: Vec<String>,
	pub skipped: usize,
}
impl RefreshReport {
	pub fn is_noop(&self) -> bool {
		self.regenerated.is_empty() && self.failed.is_empty()
	}
}

/// Regenerates practice questions for notes changed since the previous pass.
pub struct PracticeRefresher {
	notes: Arc<dyn NoteStore>,
	generator: Arc<dyn QuestionGenerator>,
	questions: Arc<dyn QuestionStore>,
	cursor: Mutex<RefreshCursor>,
}
impl PracticeRefresher {
	pub fn new(
		notes: Arc<dyn NoteStore>,
		generator: Arc<dyn QuestionGenerator>,
		questions: Arc<dyn QuestionStore>,
	) -> Self {
		Self::with_cursor(notes, generator, questions, RefreshCursor::default())
	}

	pub fn with_cursor(
		notes: Arc<dyn NoteStore>,
		generator: Arc<dyn QuestionGenerator>,
		questions: Arc<dyn QuestionStore>,
		cursor: RefreshCursor,
	) -> Self {
		Self { notes, generator, questions, cursor: Mutex::new(cursor) }
	}

	pub async fn cursor(&self) -> RefreshCursor {
		self.cursor.lock().await.clone()
	}

	pub async fn last_refreshed_at(&self) -> OffsetDateTime {
		self.cursor.lock().await.last_refreshed_at
	}

	/// Runs one refresh pass.
	///
	/// Passes are serialized. A failure to list notes aborts the pass and leaves the cursor
	/// untouched; a failure on a single note is logged, remembered for the next pass and does not
	/// stop the others. The cursor moves to the instant the note listing was taken, so a note
	/// written while the pass runs is picked up by the next one.
	///
	/// The cursor is wall-clock time while note timestamps come from the store. On a store with
	/// coarse timestamps (whole-second filesystem mtimes, for instance) a note written shortly
	/// after the listing can be stamped at or before the cursor and is then skipped until its
	/// next write.
	pub async fn refresh(&self) -> Result<RefreshReport> {
		let mut cursor = self.cursor.lock().await;
		let started_at = OffsetDateTime::now_utc();
		let notes = self.notes.list().await?;
		let mut report = RefreshReport::default();
		let mut retry = BTreeSet::new();

		for note in notes {
			if !cursor.is_stale(&note) {
				report.skipped += 1;

				continue;
			}

			match self.regenerate(&note.name).await {
				Ok(count) => {
					tracing::info!(
						note = %note.name,
						questions = count,
						"Practice questions regenerated."
					);

					report.regenerated.push(note.name);
				},
				Err(err) => {
					tracing::error!(
						note = %note.name,
						error = %err,
						"Practice question regeneration failed."
					);

					retry.insert(note.name.clone());
					report.failed.push(note.name);
				},
			}
		}

		cursor.last_refreshed_at = started_at.max(cursor.last_refreshed_at);
		cursor.retry = retry;

		Ok(report)
	}

	async fn regenerate(&self, note_name: &str) -> Result<usize> {
		let text = self.notes.read(note_name).await?;
		let mut questions = self.generator.generate(note_name, &text).await?;

		for question in &mut questions {
			practice::validate_question(question).map_err(|err| Error::InvalidQuestion {
				note: note_name.to_string(),
				message: err.to_string(),
			})?;

			question.note_name = note_name.to_string();
		}

		let count = questions.len();

		self.questions.replace_all(note_name, questions).await?;

		Ok(count)
	}
}
