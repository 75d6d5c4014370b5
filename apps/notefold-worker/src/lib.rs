use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use notefold_service::{
	Capabilities, PipelineOptions, Resource, UpdatePipeline,
	adapters::MarkdownExtractor,
	llm::{LlmQuestionGenerator, LlmSummarizer},
};
use notefold_storage::{db::Db, notes::FsNoteStore};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Web page to fold into the notes. May be repeated.
	#[arg(long = "url", value_name = "URL")]
	pub urls: Vec<String>,
	/// Raw text to fold into the notes. May be repeated.
	#[arg(long = "text", value_name = "TEXT")]
	pub texts: Vec<String>,
	/// Read one resource per line from standard input.
	#[arg(long)]
	pub stdin: bool,
}
impl Args {
	/// Resources given on the command line, pages first.
	pub fn resources(&self) -> Vec<Resource> {
		self.urls
			.iter()
			.map(|url| Resource::webpage(url.trim()))
			.chain(self.texts.iter().map(|text| Resource::text(text.as_str())))
			.collect()
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = notefold_config::load(&args.config)?;
	init_tracing(&config.service.log_level)?;

	let pipeline = build_pipeline(&config).await?;

	pipeline.start().await?;

	let work = async {
		let mut accepted = 0_usize;

		for resource in args.resources() {
			accepted += usize::from(submit(&pipeline, resource).await);
		}
		if args.stdin {
			accepted += feed_stdin(&pipeline).await?;
		}

		tracing::info!(accepted, "All resources submitted; waiting for the queue to drain.");
		pipeline.drain().await?;

		Ok::<_, color_eyre::Report>(())
	};

	tokio::select! {
		result = work => result?,
		signal = tokio::signal::ctrl_c() => {
			signal?;
			tracing::info!(
				pending = pipeline.pending(),
				"Interrupted; stopping after the current job."
			);
		},
	}

	pipeline.stop().await?;

	Ok(())
}

fn init_tracing(log_level: &str) -> color_eyre::Result<()> {
	let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.try_init()
		.map_err(|err| eyre::eyre!("Failed to initialize tracing: {err}."))?;
	Ok(())
}

async fn build_pipeline(config: &notefold_config::Config) -> color_eyre::Result<UpdatePipeline> {
	let notes = FsNoteStore::open(&config.notes.dir).await?;
	let db = Db::connect(&config.storage.sqlite).await?;
	db.ensure_schema().await?;

	let caps = Capabilities {
		extractor: Arc::new(MarkdownExtractor::new(config.providers.markdown.clone())),
		summarizer: Arc::new(LlmSummarizer::new(config.providers.summarizer.clone())),
		notes: Arc::new(notes),
		generator: Arc::new(LlmQuestionGenerator::new(
			config.providers.question_generator.clone(),
			config.practice.questions_per_note,
		)),
		questions: Arc::new(db),
	};

	tracing::info!(notes_dir = %config.notes.dir.display(), "Update pipeline configured.");

	Ok(UpdatePipeline::new(caps, PipelineOptions::from_config(config)))
}

async fn feed_stdin(pipeline: &UpdatePipeline) -> color_eyre::Result<usize> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut accepted = 0;

	while let Some(line) = lines.next_line().await? {
		if let Some(resource) = Resource::from_input(&line) {
			accepted += usize::from(submit(pipeline, resource).await);
		}
	}

	Ok(accepted)
}

async fn submit(pipeline: &UpdatePipeline, resource: Resource) -> bool {
	let described = resource.describe();

	match pipeline.add_update(resource).await {
		Ok(job_id) => {
			tracing::info!(job_id = %job_id, resource = %described, "Resource accepted.");

			true
		},
		Err(err) => {
			tracing::warn!(resource = %described, error = %err, "Resource was not queued.");

			false
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_tracing_init_is_an_error() {
		let result = init_tracing("not a [valid filter").and_then(|()| init_tracing("info"));

		assert!(result.is_err());
	}
}
