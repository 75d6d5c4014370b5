use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(r"(?i)^https?://(?:[^/@?#]*@)?([^/:?#]+)(?::\d+)?([^?#]*)").ok()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebLocation {
	pub host: String,
	pub path: String,
}

/// Splits an absolute `http(s)` URL into a lowercase host and its path.
pub fn parse_web_location(url: &str) -> Option<WebLocation> {
	let re = URL_RE.as_ref()?;
	let caps = re.captures(url.trim())?;
	let host = caps.get(1)?.as_str().trim_end_matches('.').to_ascii_lowercase();
	let path = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

	if host.is_empty() {
		return None;
	}

	Some(WebLocation { host, path: if path.is_empty() { "/".to_string() } else { path.to_string() } })
}

/// Returns true when `url` points at one of `domains`.
///
/// An entry matches its own host and every subdomain of it. Entries with a path part, such as
/// `reddit.com/r/askscience`, additionally require the URL path to sit under that prefix. An empty
/// list accepts every well-formed URL.
pub fn is_learning_resource(url: &str, domains: &[String]) -> bool {
	let Some(location) = parse_web_location(url) else {
		return false;
	};

	if domains.is_empty() {
		return true;
	}

	domains.iter().any(|entry| entry_matches(entry, &location))
}

fn entry_matches(entry: &str, location: &WebLocation) -> bool {
	let entry = entry.trim().trim_end_matches('/');
	let (entry_host, entry_path) = match entry.split_once('/') {
		Some((host, path)) => (host, Some(path)),
		None => (entry, None),
	};

	if entry_host.is_empty() || !host_matches(entry_host, &location.host) {
		return false;
	}

	match entry_path {
		None => true,
		Some(prefix) => {
			let path = location.path.trim_start_matches('/').to_ascii_lowercase();
			let prefix = prefix.to_ascii_lowercase();

			path == prefix || path.starts_with(&format!("{prefix}/"))
		},
	}
}

fn host_matches(entry_host: &str, host: &str) -> bool {
	if host.eq_ignore_ascii_case(entry_host) {
		return true;
	}

	host.len() > entry_host.len()
		&& host.to_ascii_lowercase().ends_with(&format!(".{}", entry_host.to_ascii_lowercase()))
}
