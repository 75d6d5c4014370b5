//! Fakes and fixtures shared by the workspace's integration tests.

mod error;
mod fakes;

pub use error::{Error, Result};
pub use fakes::{
	AppendingSummarizer, EchoExtractor, MemoryNoteStore, MemoryQuestionStore, ScriptedGenerator,
};

use std::{str::FromStr, sync::Arc};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tempfile::TempDir;

use notefold_service::{Capabilities, QuestionGenerator, Summarizer, TextExtractor};
use notefold_storage::db::Db;

/// A private in-memory database. The pool keeps its single connection alive for the whole test.
pub async fn memory_db() -> Result<Db> {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await?;
	let db = Db::from_pool(pool);

	db.ensure_schema().await?;

	Ok(db)
}

/// A file-backed WAL database in a temporary directory, for tests that need several connections.
pub struct TestDatabase {
	pub db: Db,
	_dir: TempDir,
}
impl TestDatabase {
	pub async fn new(max_connections: u32) -> Result<Self> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("practice.db");
		let options = SqliteConnectOptions::new()
			.filename(&path)
			.create_if_missing(true)
			.foreign_keys(true)
			.journal_mode(SqliteJournalMode::Wal);
		let pool = SqlitePoolOptions::new()
			.max_connections(max_connections.max(1))
			.connect_with(options)
			.await?;
		let db = Db::from_pool(pool);

		db.ensure_schema().await?;

		Ok(Self { db, _dir: dir })
	}
}

/// Fakes wired together the way the worker wires the real adapters.
pub struct Harness {
	pub notes: Arc<MemoryNoteStore>,
	pub questions: Arc<MemoryQuestionStore>,
	pub extractor: Arc<EchoExtractor>,
	pub summarizer: Arc<AppendingSummarizer>,
	pub generator: Arc<ScriptedGenerator>,
}
impl Harness {
	pub fn new() -> Self {
		Self {
			notes: Arc::new(MemoryNoteStore::new()),
			questions: Arc::new(MemoryQuestionStore::new()),
			extractor: Arc::new(EchoExtractor::new()),
			summarizer: Arc::new(AppendingSummarizer::new("Inbox")),
			generator: Arc::new(ScriptedGenerator::new()),
		}
	}

	pub fn capabilities(&self) -> Capabilities {
		Capabilities {
			extractor: self.extractor.clone() as Arc<dyn TextExtractor>,
			summarizer: self.summarizer.clone() as Arc<dyn Summarizer>,
			notes: self.notes.clone(),
			generator: self.generator.clone() as Arc<dyn QuestionGenerator>,
			questions: self.questions.clone(),
		}
	}
}
impl Default for Harness {
	fn default() -> Self {
		Self::new()
	}
}
