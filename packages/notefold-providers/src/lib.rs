pub mod llm;
pub mod markdown;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

/// Builds request headers from configured defaults, adding a bearer token when `api_key` is set.
pub fn request_headers(api_key: Option<&str>, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(key) = api_key.map(str::trim).filter(|key| !key.is_empty()) {
		headers.insert(AUTHORIZATION, format!("Bearer {key}").parse()?);
	}

	for (name, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header {name:?} must be a string."));
		};

		headers.insert(HeaderName::from_bytes(name.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
