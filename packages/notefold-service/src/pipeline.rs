use std::sync::Arc;

use tokio::{
	sync::{Mutex, watch},
	task::JoinHandle,
};
use uuid::Uuid;

use notefold_domain::learning;

use crate::{
	Capabilities, Error, NoteStore, PracticeRefresher, Resource, Result, Summarizer,
	TextExtractor, UpdateJob, UpdateQueue,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
	Idle,
	Dequeuing,
	Extracting,
	Summarizing,
	Refreshing,
	Stopped,
}

#[derive(Clone, Debug, Default)]
pub struct PipelineOptions {
	/// Zero keeps the queue unbounded.
	pub queue_capacity: usize,
	/// Web pages must belong to one of these domains. Empty accepts every page.
	pub learning_domains: Vec<String>,
}
impl PipelineOptions {
	pub fn from_config(cfg: &notefold_config::Config) -> Self {
		Self {
			queue_capacity: cfg.queue.capacity,
			learning_domains: cfg.resources.learning_domains.clone(),
		}
	}
}

struct Shared {
	queue: UpdateQueue,
	extractor: Arc<dyn TextExtractor>,
	summarizer: Arc<dyn Summarizer>,
	notes: Arc<dyn NoteStore>,
	refresher: PracticeRefresher,
	learning_domains: Vec<String>,
	state: watch::Sender<PipelineState>,
}

struct Worker {
	handle: JoinHandle<()>,
	shutdown: watch::Sender<bool>,
}

/// Serializes every note mutation through one worker task.
///
/// Callers hand resources to [`UpdatePipeline::add_update`] from anywhere; the worker takes jobs in
/// FIFO order, runs the summarizer and then a practice refresh before touching the next job.
pub struct UpdatePipeline {
	shared: Arc<Shared>,
	worker: Mutex<Option<Worker>>,
}
impl UpdatePipeline {
	pub fn new(caps: Capabilities, options: PipelineOptions) -> Self {
		let refresher =
			PracticeRefresher::new(caps.notes.clone(), caps.generator, caps.questions);

		Self::with_refresher(caps.extractor, caps.summarizer, caps.notes, refresher, options)
	}

	pub fn with_refresher(
		extractor: Arc<dyn TextExtractor>,
		summarizer: Arc<dyn Summarizer>,
		notes: Arc<dyn NoteStore>,
		refresher: PracticeRefresher,
		options: PipelineOptions,
	) -> Self {
		let (state, _) = watch::channel(PipelineState::Idle);
		let shared = Shared {
			queue: UpdateQueue::from_capacity(options.queue_capacity),
			extractor,
			summarizer,
			notes,
			refresher,
			learning_domains: options.learning_domains,
			state,
		};

		Self { shared: Arc::new(shared), worker: Mutex::new(None) }
	}

	pub fn state(&self) -> PipelineState {
		*self.shared.state.borrow()
	}

	pub fn subscribe_state(&self) -> watch::Receiver<PipelineState> {
		self.shared.state.subscribe()
	}

	/// Jobs waiting in the queue, not counting the one being processed.
	pub fn pending(&self) -> usize {
		self.shared.queue.len()
	}

	pub fn refresher(&self) -> &PracticeRefresher {
		&self.shared.refresher
	}

	pub async fn is_running(&self) -> bool {
		self.worker.lock().await.as_ref().is_some_and(|worker| !worker.handle.is_finished())
	}

	/// Spawns the worker. Calling it while the worker runs does nothing.
	pub async fn start(&self) -> Result<()> {
		let mut slot = self.worker.lock().await;

		if let Some(worker) = slot.as_ref() {
			if !worker.handle.is_finished() {
				return Ok(());
			}
			if let Some(finished) = slot.take() {
				reap(finished.handle).await?;
			}
		}

		self.shared.set_state(PipelineState::Idle);

		let (shutdown, shutdown_rx) = watch::channel(false);
		let handle = tokio::spawn(run_worker(self.shared.clone(), shutdown_rx));

		*slot = Some(Worker { handle, shutdown });

		tracing::info!("Update pipeline started.");

		Ok(())
	}

	/// Asks the worker to exit and waits for it.
	///
	/// A job already taken off the queue runs to completion, refresh included. Jobs still queued
	/// stay queued for the next [`UpdatePipeline::start`]. The worker slot stays locked until the
	/// old worker has exited, so a concurrent `start` cannot spawn a second one.
	pub async fn stop(&self) -> Result<()> {
		let mut slot = self.worker.lock().await;
		let Some(worker) = slot.take() else {
			return Ok(());
		};

		worker.shutdown.send_replace(true);
		reap(worker.handle).await?;
		drop(slot);

		tracing::info!(pending = self.pending(), "Update pipeline stopped.");

		Ok(())
	}

	/// Waits until the queue is empty and no job is in flight.
	///
	/// Fails with [`Error::Lifecycle`] when jobs remain and no worker is running, or when the
	/// worker stops before the queue settles.
	pub async fn drain(&self) -> Result<()> {
		let mut state = self.subscribe_state();

		if !self.is_running().await {
			let unfinished = self.shared.queue.unfinished();

			if unfinished == 0 {
				return Ok(());
			}

			return Err(Error::Lifecycle {
				message: format!("No worker is running; {unfinished} jobs are still queued."),
			});
		}

		tokio::select! {
			biased;
			_ = self.shared.queue.join() => Ok(()),
			_ = wait_stopped(&mut state) => Err(Error::Lifecycle {
				message: format!(
					"Worker stopped with {} jobs still queued.",
					self.shared.queue.unfinished()
				),
			}),
		}
	}

	/// Extracts the resource text now and queues it for the worker.
	///
	/// Extraction problems and a full queue are reported to the caller and nothing is queued.
	/// Once queued, the job's outcome is only visible in the logs.
	pub async fn add_update(&self, resource: Resource) -> Result<Uuid> {
		if let Some(capacity) = self.shared.queue.capacity()
			&& self.shared.queue.is_full()
		{
			return Err(Error::QueueFull { capacity });
		}

		let text = self.shared.extract(&resource).await?;
		let job = UpdateJob::extracted(resource, text);
		let job_id = job.job_id;

		self.shared.queue.enqueue(job)?;

		tracing::debug!(job_id = %job_id, pending = self.pending(), "Update queued.");

		Ok(job_id)
	}

	/// Queues the resource as is and leaves extraction to the worker.
	pub fn add_update_deferred(&self, resource: Resource) -> Result<Uuid> {
		self.shared.check_allowed(&resource)?;

		let job = UpdateJob::deferred(resource);
		let job_id = job.job_id;

		self.shared.queue.enqueue(job)?;

		tracing::debug!(job_id = %job_id, pending = self.pending(), "Deferred update queued.");

		Ok(job_id)
	}
}

impl Shared {
	fn set_state(&self, state: PipelineState) {
		self.state.send_replace(state);
	}

	fn check_allowed(&self, resource: &Resource) -> Result<()> {
		if let Resource::Webpage { url } = resource
			&& !learning::is_learning_resource(url, &self.learning_domains)
		{
			return Err(Error::ResourceRejected {
				message: format!("{url} is not a recognized learning resource."),
			});
		}

		Ok(())
	}

	async fn extract(&self, resource: &Resource) -> Result<String> {
		self.check_allowed(resource)?;

		let text = self.extractor.extract(resource).await?;

		if text.trim().is_empty() {
			return Err(Error::Extraction {
				message: format!("{} produced no text.", resource.describe()),
			});
		}

		Ok(text)
	}

	async fn process(&self, job: UpdateJob) {
		let UpdateJob { job_id, resource, text, .. } = job;
		let text = match text {
			Some(text) => text,
			None => {
				self.set_state(PipelineState::Extracting);

				match self.extract(&resource).await {
					Ok(text) => text,
					Err(err) => {
						tracing::error!(
							job_id = %job_id,
							resource = %resource.describe(),
							error = %err,
							"Deferred extraction failed; dropping job."
						);

						return;
					},
				}
			},
		};

		self.set_state(PipelineState::Summarizing);

		if let Err(err) = self.summarizer.update(self.notes.as_ref(), &text).await {
			tracing::error!(
				job_id = %job_id,
				resource = %resource.describe(),
				error = %err,
				"Summarization failed; dropping job."
			);

			return;
		}

		tracing::info!(job_id = %job_id, resource = %resource.describe(), "Notes updated.");

		self.set_state(PipelineState::Refreshing);

		match self.refresher.refresh().await {
			Ok(report) => tracing::info!(
				job_id = %job_id,
				regenerated = report.regenerated.len(),
				failed = report.failed.len(),
				skipped = report.skipped,
				"Practice refresh finished."
			),
			Err(err) => {
				tracing::error!(job_id = %job_id, error = %err, "Practice refresh failed.");
			},
		}
	}
}

async fn run_worker(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
	loop {
		if *shutdown.borrow_and_update() {
			break;
		}

		shared.set_state(PipelineState::Dequeuing);

		let job = tokio::select! {
			biased;
			_ = shutdown.changed() => break,
			job = shared.queue.dequeue() => job,
		};

		let job_id = job.job_id;
		let outcome = tokio::spawn({
			let shared = shared.clone();

			async move { shared.process(job).await }
		})
		.await;

		if let Err(err) = outcome {
			tracing::error!(job_id = %job_id, error = %err, "Update job panicked; dropping job.");
		}

		shared.queue.task_done();
		shared.set_state(PipelineState::Idle);
	}

	shared.set_state(PipelineState::Stopped);
}

async fn wait_stopped(state: &mut watch::Receiver<PipelineState>) {
	loop {
		if *state.borrow_and_update() == PipelineState::Stopped {
			return;
		}
		if state.changed().await.is_err() {
			return;
		}
	}
}

async fn reap(handle: JoinHandle<()>) -> Result<()> {
	handle.await.map_err(|err| {
		tracing::error!(error = %err, "Update worker terminated abnormally.");

		Error::Lifecycle { message: format!("Update worker terminated abnormally: {err}.") }
	})
}
