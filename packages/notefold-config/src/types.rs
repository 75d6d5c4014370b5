use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub notes: Notes,
	pub storage: Storage,
	#[serde(default)]
	pub queue: Queue,
	#[serde(default)]
	pub resources: Resources,
	#[serde(default)]
	pub practice: Practice,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Notes {
	/// Directory holding one `<name>.md` file per note.
	pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct Sqlite {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct Queue {
	/// Zero keeps the queue unbounded.
	#[serde(default)]
	pub capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct Resources {
	/// Web pages outside these domains are rejected. An empty list accepts every host.
	#[serde(default = "default_learning_domains")]
	pub learning_domains: Vec<String>,
}
impl Default for Resources {
	fn default() -> Self {
		Self { learning_domains: default_learning_domains() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Practice {
	#[serde(default = "default_questions_per_note")]
	pub questions_per_note: u32,
}
impl Default for Practice {
	fn default() -> Self {
		Self { questions_per_note: default_questions_per_note() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub markdown: MarkdownProviderConfig,
	pub summarizer: LlmProviderConfig,
	pub question_generator: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownProviderConfig {
	/// Endpoint that takes `?url=` and answers with the page rendered as Markdown.
	pub api_base: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// May be empty for local servers that ignore authentication.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

pub fn default_learning_domains() -> Vec<String> {
	[
		// Encyclopedias.
		"wikipedia.org",
		"britannica.com",
		"scholarpedia.org",
		"infoplease.com",
		// Courseware.
		"ocw.mit.edu",
		"coursera.org",
		"edx.org",
		"khanacademy.org",
		"udacity.com",
		"udemy.com",
		"futurelearn.com",
		"openlearn.open.ac.uk",
		"classcentral.com",
		// Technical documentation.
		"docs.python.org",
		"developer.mozilla.org",
		"readthedocs.io",
		"w3schools.com",
		"geeksforgeeks.org",
		"cplusplus.com",
		"cppreference.com",
		"rust-lang.org",
		"golang.org",
		"docs.oracle.com",
		"kubernetes.io",
		"tensorflow.org",
		"pytorch.org",
		// Research.
		"arxiv.org",
		"ncbi.nlm.nih.gov",
		"nature.com",
		"sciencedirect.com",
		"plos.org",
		"springer.com",
		// Q&A.
		"stackoverflow.com",
		"stackexchange.com",
		"quora.com",
		"mathoverflow.net",
		"reddit.com/r/askscience",
		"reddit.com/r/explainlikeimfive",
		// Learning communities.
		"medium.com",
		"dev.to",
		"towardsdatascience.com",
		"freecodecamp.org",
		"codecademy.com",
		"tutorialspoint.com",
		"learncpp.com",
		"sqlbolt.com",
		// Dictionaries.
		"dictionary.com",
		"merriam-webster.com",
		"thesaurus.com",
		"etymonline.com",
		// Open data.
		"data.gov",
		"census.gov",
		"nasa.gov",
		"who.int",
		"worldbank.org",
	]
	.into_iter()
	.map(str::to_string)
	.collect()
}

fn default_questions_per_note() -> u32 {
	5
}
