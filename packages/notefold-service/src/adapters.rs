//! Capability implementations backed by the storage and provider crates.

use notefold_config::MarkdownProviderConfig;
use notefold_storage::{db::Db, notes::FsNoteStore, questions};

use crate::{
	BoxFuture, Error, NoteMeta, NoteStore, PracticeQuestion, QuestionStore, Resource, Result,
	TextExtractor,
};

impl NoteStore for FsNoteStore {
	fn list(&self) -> BoxFuture<'_, Result<Vec<NoteMeta>>> {
		Box::pin(async move { FsNoteStore::list(self).await.map_err(Error::from_note_store) })
	}

	fn read<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { FsNoteStore::read(self, name).await.map_err(Error::from_note_store) })
	}

	fn write<'a>(&'a self, name: &'a str, content: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			FsNoteStore::write(self, name, content).await.map_err(Error::from_note_store)
		})
	}
}

impl QuestionStore for Db {
	fn replace_all<'a>(
		&'a self,
		note_name: &'a str,
		questions: Vec<PracticeQuestion>,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			questions::replace_questions(self, note_name, &questions)
				.await
				.map_err(Error::from_question_store)
		})
	}

	fn list_for<'a>(&'a self, note_name: &'a str) -> BoxFuture<'a, Result<Vec<PracticeQuestion>>> {
		Box::pin(async move {
			questions::list_questions(self, note_name).await.map_err(Error::from_question_store)
		})
	}
}

/// Web pages go through the Markdown proxy; pasted text is used verbatim.
pub struct MarkdownExtractor {
	cfg: MarkdownProviderConfig,
}
impl MarkdownExtractor {
	pub fn new(cfg: MarkdownProviderConfig) -> Self {
		Self { cfg }
	}
}
impl TextExtractor for MarkdownExtractor {
	fn extract<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			match resource {
				Resource::Text { text } => Ok(text.clone()),
				Resource::Webpage { url } =>
					notefold_providers::markdown::fetch_markdown(&self.cfg, url).await.map_err(
						|err| Error::Extraction { message: format!("{url}: {err}") },
					),
			}
		})
	}
}
