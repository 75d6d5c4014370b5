use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use notefold_config::LlmProviderConfig;

const MAX_ATTEMPTS: usize = 3;

/// Sends a chat completion request and returns the assistant message parsed as a JSON object.
///
/// Models occasionally answer with prose or a fenced block; such replies are retried a few times
/// before giving up.
pub async fn complete_json(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});

	for attempt in 1..=MAX_ATTEMPTS {
		let res = client
			.post(&url)
			.headers(crate::request_headers(Some(cfg.api_key.as_str()), &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_completion_json(json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => {
				tracing::warn!(
					provider = %cfg.provider_id,
					attempt,
					error = %err,
					"Completion did not contain a JSON object."
				);
			},
		}
	}

	Err(eyre::eyre!("{} returned no valid JSON after {MAX_ATTEMPTS} attempts.", cfg.provider_id))
}

pub fn parse_completion_json(json: Value) -> Result<Value> {
	let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	else {
		return Err(eyre::eyre!("Completion response is missing message content."));
	};
	let parsed: Value = serde_json::from_str(strip_code_fence(content))
		.map_err(|_| eyre::eyre!("Completion content is not valid JSON."))?;

	if !parsed.is_object() {
		return Err(eyre::eyre!("Completion content is not a JSON object."));
	}

	Ok(parsed)
}

fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(rest) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);

	body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
