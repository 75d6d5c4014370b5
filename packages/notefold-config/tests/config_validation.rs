use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use notefold_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn parse(raw: &str) -> Config {
	toml::from_str(raw).expect("Failed to parse config.")
}

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(raw: &str) -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock before epoch.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("notefold_config_{nanos}_{seq}.toml"));

	fs::write(&path, raw).expect("Failed to write temp config.");

	path
}

fn validation_key(err: Error) -> &'static str {
	match err {
		Error::Validation { key, .. } => key,
		other => panic!("Expected validation error, got {other:?}."),
	}
}

#[test]
fn sample_config_is_valid() {
	let cfg = parse(SAMPLE_CONFIG_TOML);

	notefold_config::validate(&cfg).expect("Sample config must validate.");
	assert_eq!(cfg.queue.capacity, 0);
	assert_eq!(cfg.practice.questions_per_note, 5);
	assert!(cfg.providers.question_generator.api_key.is_empty());
}

#[test]
fn load_normalizes_domains_and_api_base() {
	let raw = sample_with(
		"resources",
		"learning_domains",
		Value::Array(vec![Value::String(" Wikipedia.org/ ".to_string())]),
	);
	let raw = {
		let mut root: Value = toml::from_str(&raw).expect("Failed to parse config.");
		let summarizer = root
			.get_mut("providers")
			.and_then(|providers| providers.get_mut("summarizer"))
			.and_then(Value::as_table_mut)
			.expect("Missing [providers.summarizer].");

		summarizer.insert("api_base".to_string(), Value::String("http://localhost:1234/v1/".to_string()));

		toml::to_string(&root).expect("Failed to render config.")
	};
	let path = write_temp_config(&raw);
	let cfg = notefold_config::load(&path).expect("Failed to load config.");

	fs::remove_file(&path).ok();

	assert_eq!(cfg.resources.learning_domains, vec!["wikipedia.org".to_string()]);
	assert_eq!(cfg.providers.summarizer.api_base, "http://localhost:1234/v1");
}

#[test]
fn missing_sections_fall_back_to_defaults() {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root.as_table_mut().expect("Sample config must be a table.");

	table.remove("queue");
	table.remove("resources");
	table.remove("practice");

	let cfg = parse(&toml::to_string(&root).expect("Failed to render config."));

	assert_eq!(cfg.queue.capacity, 0);
	assert_eq!(cfg.practice.questions_per_note, 5);
	assert!(cfg.resources.learning_domains.iter().any(|domain| domain == "wikipedia.org"));
}

#[test]
fn rejects_zero_pool_size() {
	let cfg = parse(&sample_with("storage.sqlite", "pool_max_conns", Value::Integer(0)));
	let err = notefold_config::validate(&cfg).expect_err("Expected validation error.");

	assert_eq!(validation_key(err), "storage.sqlite.pool_max_conns");
}

#[test]
fn rejects_zero_questions_per_note() {
	let cfg = parse(&sample_with("practice", "questions_per_note", Value::Integer(0)));
	let err = notefold_config::validate(&cfg).expect_err("Expected validation error.");

	assert_eq!(validation_key(err), "practice.questions_per_note");
}

#[test]
fn rejects_blank_learning_domain() {
	let cfg = parse(&sample_with(
		"resources",
		"learning_domains",
		Value::Array(vec![Value::String("  ".to_string())]),
	));
	let err = notefold_config::validate(&cfg).expect_err("Expected validation error.");

	assert_eq!(validation_key(err), "resources.learning_domains");
}

#[test]
fn rejects_negative_temperature() {
	let cfg = parse(&sample_with("providers.summarizer", "temperature", Value::Float(-0.5)));
	let err = notefold_config::validate(&cfg).expect_err("Expected validation error.");

	assert_eq!(validation_key(err), "providers.summarizer");
}

#[test]
fn rejects_non_string_default_header() {
	let mut headers = toml::map::Map::new();

	headers.insert("X-Retries".to_string(), Value::Integer(3));

	let cfg = parse(&sample_with("providers.question_generator", "default_headers", Value::Table(headers)));
	let err = notefold_config::validate(&cfg).expect_err("Expected validation error.");

	assert_eq!(validation_key(err), "providers.question_generator");
}

#[test]
fn load_reports_missing_file() {
	let path = env::temp_dir().join("notefold_config_missing_does_not_exist.toml");
	let err = notefold_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
