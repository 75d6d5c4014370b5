use std::{
	io::ErrorKind,
	path::{Path, PathBuf},
};

use time::OffsetDateTime;
use tokio::fs;

use notefold_domain::note_name;

use crate::{Error, Result, models::NoteMeta};

const NOTE_EXTENSION: &str = "md";

/// Markdown notes kept as `<name>.md` files in a single directory.
///
/// Writes go through a hidden temporary file and a rename, so concurrent readers see either the
/// old or the new content of a note.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
	dir: PathBuf,
}
impl FsNoteStore {
	pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
		let dir = dir.into();

		fs::create_dir_all(&dir).await.map_err(|source| Error::Io { path: dir.clone(), source })?;

		Ok(Self { dir })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub async fn list(&self) -> Result<Vec<NoteMeta>> {
		let mut entries = fs::read_dir(&self.dir).await.map_err(|source| self.io_error(source))?;
		let mut notes = Vec::new();

		while let Some(entry) = entries.next_entry().await.map_err(|source| self.io_error(source))? {
			let path = entry.path();
			let Some(name) = note_name_from_path(&path) else {
				continue;
			};
			let metadata =
				entry.metadata().await.map_err(|source| Error::Io { path: path.clone(), source })?;

			if !metadata.is_file() {
				continue;
			}

			let modified =
				metadata.modified().map_err(|source| Error::Io { path: path.clone(), source })?;

			notes.push(NoteMeta { name, last_modified: OffsetDateTime::from(modified) });
		}

		notes.sort_by(|a, b| a.name.cmp(&b.name));

		Ok(notes)
	}

	pub async fn read(&self, name: &str) -> Result<String> {
		let path = self.note_path(name)?;

		match fs::read_to_string(&path).await {
			Ok(content) => Ok(content),
			Err(err) if err.kind() == ErrorKind::NotFound => Err(Error::NotFound(name.to_string())),
			Err(source) => Err(Error::Io { path, source }),
		}
	}

	pub async fn write(&self, name: &str, content: &str) -> Result<()> {
		let path = self.note_path(name)?;
		let tmp = self.dir.join(format!(".{name}.{NOTE_EXTENSION}.tmp"));

		fs::write(&tmp, content).await.map_err(|source| Error::Io { path: tmp.clone(), source })?;

		if let Err(source) = fs::rename(&tmp, &path).await {
			let _ = fs::remove_file(&tmp).await;

			return Err(Error::Io { path, source });
		}

		tracing::debug!(note = name, bytes = content.len(), "Note written.");

		Ok(())
	}

	fn note_path(&self, name: &str) -> Result<PathBuf> {
		note_name::validate_note_name(name)
			.map_err(|err| Error::InvalidArgument(format!("{}: {name:?}.", err.as_str())))?;

		Ok(self.dir.join(format!("{name}.{NOTE_EXTENSION}")))
	}

	fn io_error(&self, source: std::io::Error) -> Error {
		Error::Io { path: self.dir.clone(), source }
	}
}

fn note_name_from_path(path: &Path) -> Option<String> {
	if path.extension()? != NOTE_EXTENSION {
		return None;
	}

	let stem = path.file_stem()?.to_str()?;

	if stem.starts_with('.') {
		return None;
	}

	Some(stem.to_string())
}
