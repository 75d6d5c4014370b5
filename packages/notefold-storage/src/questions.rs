use notefold_domain::practice::{PracticeQuestion, QuestionOption};

use crate::{Result, db::Db, models::QuestionOptionRow};

/// Replaces every stored question of `note_name` with `questions` in one transaction.
///
/// Readers observe either the previous set or the new one. A failure part-way rolls the whole
/// replacement back.
pub async fn replace_questions(
	db: &Db,
	note_name: &str,
	questions: &[PracticeQuestion],
) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	sqlx::query(
		"\
DELETE FROM question_options
WHERE question_id IN (SELECT question_id FROM questions WHERE note_name = ?1)",
	)
	.bind(note_name)
	.execute(&mut *tx)
	.await?;
	sqlx::query("DELETE FROM questions WHERE note_name = ?1")
		.bind(note_name)
		.execute(&mut *tx)
		.await?;

	for (position, question) in questions.iter().enumerate() {
		let question_id = sqlx::query(
			"INSERT INTO questions (note_name, position, question) VALUES (?1, ?2, ?3)",
		)
		.bind(note_name)
		.bind(position as i64)
		.bind(question.question.as_str())
		.execute(&mut *tx)
		.await?
		.last_insert_rowid();

		for (option_position, option) in question.options.iter().enumerate() {
			sqlx::query(
				"\
INSERT INTO question_options (question_id, position, description, correct)
VALUES (?1, ?2, ?3, ?4)",
			)
			.bind(question_id)
			.bind(option_position as i64)
			.bind(option.description.as_str())
			.bind(option.correct)
			.execute(&mut *tx)
			.await?;
		}
	}

	tx.commit().await?;

	Ok(())
}

pub async fn list_questions(db: &Db, note_name: &str) -> Result<Vec<PracticeQuestion>> {
	// One statement, so a concurrent replacement is seen entirely or not at all.
	let rows: Vec<QuestionOptionRow> = sqlx::query_as(
		"\
SELECT q.question_id, q.question, o.description, o.correct
FROM questions q
JOIN question_options o ON o.question_id = q.question_id
WHERE q.note_name = ?1
ORDER BY q.position, o.position",
	)
	.bind(note_name)
	.fetch_all(&db.pool)
	.await?;
	let mut out: Vec<PracticeQuestion> = Vec::new();
	let mut current_id = None;

	for row in rows {
		let option = QuestionOption { description: row.description, correct: row.correct };

		if current_id == Some(row.question_id)
			&& let Some(last) = out.last_mut()
		{
			last.options.push(option);

			continue;
		}

		current_id = Some(row.question_id);
		out.push(PracticeQuestion {
			note_name: note_name.to_string(),
			question: row.question,
			options: vec![option],
		});
	}

	Ok(out)
}

pub async fn count_questions(db: &Db, note_name: &str) -> Result<i64> {
	let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE note_name = ?1")
		.bind(note_name)
		.fetch_one(&db.pool)
		.await?;

	Ok(count)
}
