mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, LlmProviderConfig, MarkdownProviderConfig, Notes, Practice, Providers, Queue,
	Resources, Service, Sqlite, Storage, default_learning_domains,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::validation("service.log_level", "must be non-empty."));
	}
	if cfg.notes.dir.as_os_str().is_empty() {
		return Err(Error::validation("notes.dir", "must be non-empty."));
	}
	if cfg.storage.sqlite.dsn.trim().is_empty() {
		return Err(Error::validation("storage.sqlite.dsn", "must be non-empty."));
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::validation("storage.sqlite.pool_max_conns", "must be greater than zero."));
	}
	if cfg.practice.questions_per_note == 0 {
		return Err(Error::validation("practice.questions_per_note", "must be greater than zero."));
	}
	if cfg.resources.learning_domains.iter().any(|domain| domain.trim().is_empty()) {
		return Err(Error::validation(
			"resources.learning_domains",
			"must not contain blank entries.",
		));
	}
	if cfg.providers.markdown.api_base.trim().is_empty() {
		return Err(Error::validation("providers.markdown.api_base", "must be non-empty."));
	}
	if cfg.providers.markdown.timeout_ms == 0 {
		return Err(Error::validation("providers.markdown.timeout_ms", "must be greater than zero."));
	}

	for (key, provider) in [
		("providers.summarizer", &cfg.providers.summarizer),
		("providers.question_generator", &cfg.providers.question_generator),
	] {
		validate_llm_provider(key, provider)?;
	}

	Ok(())
}

fn validate_llm_provider(key: &'static str, provider: &LlmProviderConfig) -> Result<()> {
	if provider.api_base.trim().is_empty() || provider.model.trim().is_empty() {
		return Err(Error::validation(key, "requires api_base and model."));
	}
	if !provider.temperature.is_finite() || provider.temperature < 0.0 {
		return Err(Error::validation(key, "temperature must be a finite number, zero or greater."));
	}
	if provider.timeout_ms == 0 {
		return Err(Error::validation(key, "timeout_ms must be greater than zero."));
	}

	for (header, value) in &provider.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				key,
				message: format!("default header {header:?} must be a string."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	for domain in &mut cfg.resources.learning_domains {
		*domain = domain.trim().trim_end_matches('/').to_ascii_lowercase();
	}

	for provider in [&mut cfg.providers.summarizer, &mut cfg.providers.question_generator] {
		provider.api_base = provider.api_base.trim_end_matches('/').to_string();
	}
}
