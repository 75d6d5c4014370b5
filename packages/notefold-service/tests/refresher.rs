use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use notefold_service::{
	Error, NoteStore, PracticeQuestion, PracticeRefresher, QuestionGenerator, QuestionOption,
	QuestionStore, RefreshCursor,
};
use notefold_testkit::{MemoryNoteStore, MemoryQuestionStore, ScriptedGenerator};

struct Fixture {
	notes: Arc<MemoryNoteStore>,
	questions: Arc<MemoryQuestionStore>,
	generator: Arc<ScriptedGenerator>,
}
impl Fixture {
	fn new() -> Self {
		Self {
			notes: Arc::new(MemoryNoteStore::new()),
			questions: Arc::new(MemoryQuestionStore::new()),
			generator: Arc::new(ScriptedGenerator::new()),
		}
	}

	fn refresher(&self, cursor: RefreshCursor) -> PracticeRefresher {
		PracticeRefresher::with_cursor(
			self.notes.clone() as Arc<dyn NoteStore>,
			self.generator.clone() as Arc<dyn QuestionGenerator>,
			self.questions.clone() as Arc<dyn QuestionStore>,
			cursor,
		)
	}
}

#[tokio::test]
async fn fresh_refresher_treats_every_note_as_stale() {
	let fixture = Fixture::new();

	fixture.notes.insert_at(
		"Ancient",
		"Old fact.",
		OffsetDateTime::UNIX_EPOCH + Duration::seconds(1),
	);
	fixture.notes.write("Recent", "New fact.").await.expect("Failed to write note.");

	let refresher = fixture.refresher(RefreshCursor::default());

	assert_eq!(refresher.last_refreshed_at().await, OffsetDateTime::UNIX_EPOCH);

	let report = refresher.refresh().await.expect("Refresh failed.");

	assert_eq!(report.regenerated, vec!["Ancient".to_string(), "Recent".to_string()]);
}

#[tokio::test]
async fn regenerates_only_notes_newer_than_the_cursor() {
	let fixture = Fixture::new();
	let cursor_at = OffsetDateTime::now_utc() - Duration::hours(1);

	fixture.notes.insert_at("Before", "Stale? No.", cursor_at - Duration::minutes(5));
	fixture.notes.insert_at("After", "Changed since.", cursor_at + Duration::minutes(5));

	let refresher = fixture.refresher(RefreshCursor::at(cursor_at));
	let report = refresher.refresh().await.expect("Refresh failed.");

	assert_eq!(report.regenerated, vec!["After".to_string()]);
	assert_eq!(report.skipped, 1);
	assert_eq!(fixture.generator.calls(), vec!["After".to_string()]);
	assert!(fixture.questions.questions_for("Before").is_empty());
	assert_eq!(fixture.questions.questions_for("After").len(), 1);
}

#[tokio::test]
async fn note_at_exactly_the_cursor_is_not_stale() {
	let fixture = Fixture::new();
	let cursor_at = OffsetDateTime::now_utc() - Duration::hours(1);

	fixture.notes.insert_at("Edge", "Same instant.", cursor_at);

	let report =
		fixture.refresher(RefreshCursor::at(cursor_at)).refresh().await.expect("Refresh failed.");

	assert!(report.is_noop());
	assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn second_pass_without_changes_is_a_noop() {
	let fixture = Fixture::new();

	fixture.notes.write("Cells", "Cells divide.").await.expect("Failed to write note.");
	fixture.notes.write("Atoms", "Atoms bond.").await.expect("Failed to write note.");

	let refresher = fixture.refresher(RefreshCursor::default());
	let first = refresher.refresh().await.expect("Refresh failed.");

	assert_eq!(first.regenerated.len(), 2);

	fixture.generator.clear_calls();

	let second = refresher.refresh().await.expect("Refresh failed.");

	assert!(second.is_noop());
	assert_eq!(second.skipped, 2);
	assert!(fixture.generator.calls().is_empty());
}

#[tokio::test]
async fn failure_on_one_note_does_not_block_the_others() {
	let fixture = Fixture::new();
	let seeded = vec![PracticeQuestion {
		note_name: "A".to_string(),
		question: "Which letter comes first?".to_string(),
		options: ["A", "B", "C", "D"]
			.into_iter()
			.map(|letter| QuestionOption { description: letter.to_string(), correct: letter == "A" })
			.collect(),
	}];

	fixture.questions.seed("A", seeded.clone());
	fixture.notes.write("A", "Alpha.").await.expect("Failed to write note.");
	fixture.notes.write("B", "Beta.").await.expect("Failed to write note.");
	fixture.generator.fail_for("A");

	let refresher = fixture.refresher(RefreshCursor::default());
	let before = refresher.last_refreshed_at().await;
	let report = refresher.refresh().await.expect("Refresh failed.");

	assert_eq!(report.regenerated, vec!["B".to_string()]);
	assert_eq!(report.failed, vec!["A".to_string()]);
	assert_eq!(fixture.questions.replaced(), vec!["B".to_string()]);
	assert_eq!(fixture.questions.questions_for("A"), seeded);
	assert_eq!(fixture.questions.questions_for("B").len(), 1);
	assert!(refresher.last_refreshed_at().await > before);
}

#[tokio::test]
async fn failed_note_is_retried_on_the_next_pass() {
	let fixture = Fixture::new();

	fixture.notes.write("A", "Alpha.").await.expect("Failed to write note.");
	fixture.notes.write("B", "Beta.").await.expect("Failed to write note.");
	fixture.generator.fail_for("A");

	let refresher = fixture.refresher(RefreshCursor::default());

	refresher.refresh().await.expect("Refresh failed.");

	assert!(refresher.cursor().await.retry.contains("A"));

	fixture.generator.recover("A");
	fixture.generator.clear_calls();

	let report = refresher.refresh().await.expect("Refresh failed.");

	assert_eq!(report.regenerated, vec!["A".to_string()]);
	assert_eq!(fixture.generator.calls(), vec!["A".to_string()]);
	assert!(refresher.cursor().await.retry.is_empty());
}

#[tokio::test]
async fn malformed_questions_are_never_stored() {
	let fixture = Fixture::new();

	fixture.notes.write("Cells", "Cells divide.").await.expect("Failed to write note.");
	fixture.generator.malformed_for("Cells");

	let report =
		fixture.refresher(RefreshCursor::default()).refresh().await.expect("Refresh failed.");

	assert_eq!(report.failed, vec!["Cells".to_string()]);
	assert!(fixture.questions.replaced().is_empty());
}

#[tokio::test]
async fn stored_questions_carry_the_note_name() {
	let fixture = Fixture::new();

	fixture.notes.write("Cells", "Cells divide.").await.expect("Failed to write note.");
	fixture.refresher(RefreshCursor::default()).refresh().await.expect("Refresh failed.");

	let stored = fixture.questions.questions_for("Cells");

	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].note_name, "Cells");
	assert_eq!(stored[0].options.iter().filter(|option| option.correct).count(), 1);
}

#[tokio::test]
async fn missing_note_store_surfaces_not_found() {
	let notes = MemoryNoteStore::new();
	let err = notes.read("Nope").await.expect_err("Expected a missing note.");

	assert!(matches!(err, Error::NoteNotFound { name } if name == "Nope"));
}
