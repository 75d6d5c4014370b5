pub mod adapters;
pub mod llm;
pub mod pipeline;
pub mod queue;
pub mod refresher;
pub mod resource;

mod error;

pub use error::{Error, Result};
pub use notefold_domain::practice::{PracticeQuestion, QuestionOption};
pub use notefold_storage::models::NoteMeta;
pub use pipeline::{PipelineOptions, PipelineState, UpdatePipeline};
pub use queue::{UpdateJob, UpdateQueue};
pub use refresher::{PracticeRefresher, RefreshCursor, RefreshReport};
pub use resource::Resource;

use std::{future::Future, pin::Pin, sync::Arc};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns a resource into plain or Markdown text.
pub trait TextExtractor
where
	Self: Send + Sync,
{
	fn extract<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, Result<String>>;
}

/// Folds new text into the note collection through the given store.
pub trait Summarizer
where
	Self: Send + Sync,
{
	fn update<'a>(&'a self, notes: &'a dyn NoteStore, text: &'a str) -> BoxFuture<'a, Result<()>>;
}

pub trait NoteStore
where
	Self: Send + Sync,
{
	fn list(&self) -> BoxFuture<'_, Result<Vec<NoteMeta>>>;

	/// Fails with [`Error::NoteNotFound`] when no note has this name.
	fn read<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>>;

	/// Creates or overwrites a note and bumps its last-modified timestamp.
	fn write<'a>(&'a self, name: &'a str, content: &'a str) -> BoxFuture<'a, Result<()>>;
}

pub trait QuestionGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		note_name: &'a str,
		note_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<PracticeQuestion>>>;
}

pub trait QuestionStore
where
	Self: Send + Sync,
{
	/// Swaps the whole question set of a note. Readers never see a mix of old and new questions.
	fn replace_all<'a>(
		&'a self,
		note_name: &'a str,
		questions: Vec<PracticeQuestion>,
	) -> BoxFuture<'a, Result<()>>;

	fn list_for<'a>(&'a self, note_name: &'a str) -> BoxFuture<'a, Result<Vec<PracticeQuestion>>>;
}

#[derive(Clone)]
pub struct Capabilities {
	pub extractor: Arc<dyn TextExtractor>,
	pub summarizer: Arc<dyn Summarizer>,
	pub notes: Arc<dyn NoteStore>,
	pub generator: Arc<dyn QuestionGenerator>,
	pub questions: Arc<dyn QuestionStore>,
}
