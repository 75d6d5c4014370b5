pub const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS questions (
	question_id INTEGER PRIMARY KEY AUTOINCREMENT,
	note_name TEXT NOT NULL,
	position INTEGER NOT NULL,
	question TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS questions_note_name_idx ON questions (note_name, position);
CREATE TABLE IF NOT EXISTS question_options (
	option_id INTEGER PRIMARY KEY AUTOINCREMENT,
	question_id INTEGER NOT NULL REFERENCES questions (question_id) ON DELETE CASCADE,
	position INTEGER NOT NULL,
	description TEXT NOT NULL,
	correct INTEGER NOT NULL CHECK (correct IN (0, 1))
);
CREATE INDEX IF NOT EXISTS question_options_question_idx ON question_options (question_id, position);
";
