use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;

use notefold_config::MarkdownProviderConfig;

/// Fetches `url` through the Markdown conversion proxy and returns the rendered text.
pub async fn fetch_markdown(cfg: &MarkdownProviderConfig, url: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client
		.get(&cfg.api_base)
		.headers(crate::request_headers(None, &cfg.default_headers)?)
		.query(&[("url", url)])
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		return Err(eyre::eyre!("Markdown proxy answered {status} for {url}."));
	}

	let text = res.text().await?;

	tracing::debug!(url, bytes = text.len(), "Fetched page as Markdown.");

	Ok(text)
}
