use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
	Webpage { url: String },
	Text { text: String },
}
impl Resource {
	pub fn webpage(url: impl Into<String>) -> Self {
		Self::Webpage { url: url.into() }
	}

	pub fn text(text: impl Into<String>) -> Self {
		Self::Text { text: text.into() }
	}

	/// Interprets one line of user input: `http(s)://` lines are web pages, anything else is text.
	pub fn from_input(input: &str) -> Option<Self> {
		let trimmed = input.trim();

		if trimmed.is_empty() {
			return None;
		}

		let lowered = trimmed.get(..8).unwrap_or(trimmed).to_ascii_lowercase();

		if lowered.starts_with("http://") || lowered.starts_with("https://") {
			Some(Self::webpage(trimmed))
		} else {
			Some(Self::text(trimmed))
		}
	}

	/// Short form for log lines; pasted text is not echoed in full.
	pub fn describe(&self) -> String {
		match self {
			Self::Webpage { url } => url.clone(),
			Self::Text { text } => format!("text ({} chars)", text.chars().count()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_input_lines() {
		assert_eq!(
			Resource::from_input(" HTTPS://en.wikipedia.org/wiki/Cell "),
			Some(Resource::webpage("HTTPS://en.wikipedia.org/wiki/Cell"))
		);
		assert_eq!(
			Resource::from_input("Mitochondria make ATP."),
			Some(Resource::text("Mitochondria make ATP."))
		);
		assert_eq!(Resource::from_input("   "), None);
	}

	#[test]
	fn serializes_with_kind_tag() {
		let json = serde_json::to_value(Resource::webpage("https://a.org")).expect("encode failed");

		assert_eq!(json, serde_json::json!({ "kind": "webpage", "url": "https://a.org" }));
	}
}
