use std::{
	collections::{BTreeMap, HashMap, HashSet},
	sync::{
		Mutex, MutexGuard,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use time::OffsetDateTime;

use notefold_service::{
	BoxFuture, Error, NoteMeta, NoteStore, PracticeQuestion, QuestionGenerator, QuestionOption,
	QuestionStore, Resource, Result, Summarizer, TextExtractor,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[derive(Default)]
struct NoteTable {
	notes: BTreeMap<String, (String, OffsetDateTime)>,
	last_stamp: Option<OffsetDateTime>,
}

/// Notes held in memory. Every write gets a strictly increasing timestamp.
#[derive(Default)]
pub struct MemoryNoteStore {
	table: Mutex<NoteTable>,
	writes: AtomicUsize,
}
impl MemoryNoteStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds a note with an explicit timestamp, bypassing the write counter.
	pub fn insert_at(&self, name: &str, content: &str, last_modified: OffsetDateTime) {
		lock(&self.table).notes.insert(name.to_string(), (content.to_string(), last_modified));
	}

	pub fn content(&self, name: &str) -> Option<String> {
		lock(&self.table).notes.get(name).map(|(content, _)| content.clone())
	}

	pub fn last_modified(&self, name: &str) -> Option<OffsetDateTime> {
		lock(&self.table).notes.get(name).map(|(_, ts)| *ts)
	}

	pub fn write_count(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	fn store(&self, name: &str, content: &str) {
		let mut table = lock(&self.table);
		let now = OffsetDateTime::now_utc();
		let stamp = match table.last_stamp {
			Some(last) if last >= now => last + time::Duration::microseconds(1),
			_ => now,
		};

		table.last_stamp = Some(stamp);
		table.notes.insert(name.to_string(), (content.to_string(), stamp));
		self.writes.fetch_add(1, Ordering::SeqCst);
	}
}
impl NoteStore for MemoryNoteStore {
	fn list(&self) -> BoxFuture<'_, Result<Vec<NoteMeta>>> {
		let notes = lock(&self.table)
			.notes
			.iter()
			.map(|(name, (_, ts))| NoteMeta { name: name.clone(), last_modified: *ts })
			.collect();

		Box::pin(async move { Ok(notes) })
	}

	fn read<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>> {
		let content = self.content(name).ok_or_else(|| Error::NoteNotFound { name: name.to_string() });

		Box::pin(async move { content })
	}

	fn write<'a>(&'a self, name: &'a str, content: &'a str) -> BoxFuture<'a, Result<()>> {
		self.store(name, content);

		Box::pin(async move { Ok(()) })
	}
}

#[derive(Default)]
pub struct MemoryQuestionStore {
	sets: Mutex<HashMap<String, Vec<PracticeQuestion>>>,
	replaced: Mutex<Vec<String>>,
}
impl MemoryQuestionStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn seed(&self, note_name: &str, questions: Vec<PracticeQuestion>) {
		lock(&self.sets).insert(note_name.to_string(), questions);
	}

	pub fn questions_for(&self, note_name: &str) -> Vec<PracticeQuestion> {
		lock(&self.sets).get(note_name).cloned().unwrap_or_default()
	}

	/// Note names passed to `replace_all`, in call order.
	pub fn replaced(&self) -> Vec<String> {
		lock(&self.replaced).clone()
	}
}
impl QuestionStore for MemoryQuestionStore {
	fn replace_all<'a>(
		&'a self,
		note_name: &'a str,
		questions: Vec<PracticeQuestion>,
	) -> BoxFuture<'a, Result<()>> {
		lock(&self.sets).insert(note_name.to_string(), questions);
		lock(&self.replaced).push(note_name.to_string());

		Box::pin(async move { Ok(()) })
	}

	fn list_for<'a>(&'a self, note_name: &'a str) -> BoxFuture<'a, Result<Vec<PracticeQuestion>>> {
		let questions = self.questions_for(note_name);

		Box::pin(async move { Ok(questions) })
	}
}

/// Returns pasted text as is and web pages from a fixed table; unknown pages fail.
#[derive(Default)]
pub struct EchoExtractor {
	pages: Mutex<HashMap<String, String>>,
	calls: AtomicUsize,
}
impl EchoExtractor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_page(self, url: &str, text: &str) -> Self {
		lock(&self.pages).insert(url.to_string(), text.to_string());

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TextExtractor for EchoExtractor {
	fn extract<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let result = match resource {
			Resource::Text { text } => Ok(text.clone()),
			Resource::Webpage { url } => lock(&self.pages)
				.get(url)
				.cloned()
				.ok_or_else(|| Error::Extraction { message: format!("{url} is unreachable.") }),
		};

		Box::pin(async move { result })
	}
}

/// Appends every text it receives to one note, optionally slowly or failing on a marker.
pub struct AppendingSummarizer {
	note_name: String,
	delay: Duration,
	fail_marker: Option<String>,
	panic_marker: Option<String>,
	seen: Mutex<Vec<String>>,
	active: AtomicUsize,
	max_active: AtomicUsize,
}
impl AppendingSummarizer {
	pub fn new(note_name: &str) -> Self {
		Self {
			note_name: note_name.to_string(),
			delay: Duration::ZERO,
			fail_marker: None,
			panic_marker: None,
			seen: Mutex::new(Vec::new()),
			active: AtomicUsize::new(0),
			max_active: AtomicUsize::new(0),
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;

		self
	}

	pub fn failing_on(mut self, marker: &str) -> Self {
		self.fail_marker = Some(marker.to_string());

		self
	}

	pub fn panicking_on(mut self, marker: &str) -> Self {
		self.panic_marker = Some(marker.to_string());

		self
	}

	/// Texts handed to the summarizer, in call order, failed ones included.
	pub fn seen(&self) -> Vec<String> {
		lock(&self.seen).clone()
	}

	/// Highest number of overlapping `update` calls observed.
	pub fn max_concurrency(&self) -> usize {
		self.max_active.load(Ordering::SeqCst)
	}

	async fn append(&self, notes: &dyn NoteStore, text: &str) -> Result<()> {
		if let Some(marker) = self.panic_marker.as_deref()
			&& text.contains(marker)
		{
			lock(&self.seen).push(text.to_string());

			panic!("Summarizer asked to panic on {marker:?}.");
		}

		let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;

		self.max_active.fetch_max(active, Ordering::SeqCst);
		lock(&self.seen).push(text.to_string());

		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}

		let result = match self.fail_marker.as_deref() {
			Some(marker) if text.contains(marker) =>
				Err(Error::Summarization { message: format!("Refusing text containing {marker:?}.") }),
			_ => {
				let existing = match notes.read(&self.note_name).await {
					Ok(content) => content,
					Err(Error::NoteNotFound { .. }) => String::new(),
					Err(err) => {
						self.active.fetch_sub(1, Ordering::SeqCst);

						return Err(err);
					},
				};
				let updated =
					if existing.is_empty() { text.to_string() } else { format!("{existing}\n{text}") };

				notes.write(&self.note_name, &updated).await
			},
		};

		self.active.fetch_sub(1, Ordering::SeqCst);

		result
	}
}
impl Summarizer for AppendingSummarizer {
	fn update<'a>(&'a self, notes: &'a dyn NoteStore, text: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.append(notes, text))
	}
}

/// Produces one well-formed question per note unless told to fail for it.
#[derive(Default)]
pub struct ScriptedGenerator {
	failing: Mutex<HashSet<String>>,
	malformed: Mutex<HashSet<String>>,
	calls: Mutex<Vec<String>>,
}
impl ScriptedGenerator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail_for(&self, note_name: &str) {
		lock(&self.failing).insert(note_name.to_string());
	}

	pub fn recover(&self, note_name: &str) {
		lock(&self.failing).remove(note_name);
		lock(&self.malformed).remove(note_name);
	}

	/// Makes the generator return a question with two correct options for this note.
	pub fn malformed_for(&self, note_name: &str) {
		lock(&self.malformed).insert(note_name.to_string());
	}

	/// Note names the generator was asked about, in call order.
	pub fn calls(&self) -> Vec<String> {
		lock(&self.calls).clone()
	}

	pub fn clear_calls(&self) {
		lock(&self.calls).clear();
	}

	fn question_for(note_name: &str, note_text: &str, correct_count: usize) -> PracticeQuestion {
		let first_line = note_text.lines().map(str::trim).find(|line| !line.is_empty());
		let first_line = first_line.unwrap_or("The note is empty.");

		PracticeQuestion {
			note_name: note_name.to_string(),
			question: format!("Which statement appears in {note_name}?"),
			options: (0..4)
				.map(|idx| QuestionOption {
					description: if idx == 0 {
						first_line.to_string()
					} else {
						format!("Distractor {idx}")
					},
					correct: idx < correct_count,
				})
				.collect(),
		}
	}
}
impl QuestionGenerator for ScriptedGenerator {
	fn generate<'a>(
		&'a self,
		note_name: &'a str,
		note_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<PracticeQuestion>>> {
		lock(&self.calls).push(note_name.to_string());

		let result = if lock(&self.failing).contains(note_name) {
			Err(Error::Generation {
				note: note_name.to_string(),
				message: "scripted failure".to_string(),
			})
		} else if lock(&self.malformed).contains(note_name) {
			Ok(vec![Self::question_for(note_name, note_text, 2)])
		} else {
			Ok(vec![Self::question_for(note_name, note_text, 1)])
		};

		Box::pin(async move { result })
	}
}
