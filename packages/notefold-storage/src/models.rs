use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMeta {
	pub name: String,
	pub last_modified: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionOptionRow {
	pub(crate) question_id: i64,
	pub(crate) question: String,
	pub(crate) description: String,
	pub(crate) correct: bool,
}
