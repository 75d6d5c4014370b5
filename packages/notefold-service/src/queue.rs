use std::{
	collections::VecDeque,
	pin::pin,
	sync::{Mutex, MutexGuard},
};

use time::OffsetDateTime;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{Error, Resource, Result};

#[derive(Clone, Debug)]
pub struct UpdateJob {
	pub job_id: Uuid,
	pub resource: Resource,
	/// `None` defers extraction to the worker.
	pub text: Option<String>,
	pub enqueued_at: OffsetDateTime,
}
impl UpdateJob {
	pub fn extracted(resource: Resource, text: String) -> Self {
		Self::new(resource, Some(text))
	}

	pub fn deferred(resource: Resource) -> Self {
		Self::new(resource, None)
	}

	fn new(resource: Resource, text: Option<String>) -> Self {
		Self { job_id: Uuid::new_v4(), resource, text, enqueued_at: OffsetDateTime::now_utc() }
	}
}

#[derive(Default)]
struct QueueState {
	jobs: VecDeque<UpdateJob>,
	/// Jobs enqueued but not yet marked done, including the one being processed.
	unfinished: usize,
}

/// FIFO queue of update jobs with a single consumer.
///
/// Producers never wait: a bounded queue at capacity rejects with [`Error::QueueFull`].
pub struct UpdateQueue {
	state: Mutex<QueueState>,
	capacity: Option<usize>,
	available: Notify,
	settled: Notify,
}
impl UpdateQueue {
	pub fn unbounded() -> Self {
		Self::with_capacity(None)
	}

	pub fn bounded(capacity: usize) -> Self {
		Self::with_capacity(Some(capacity))
	}

	/// Zero means unbounded, matching `queue.capacity` in the config file.
	pub fn from_capacity(capacity: usize) -> Self {
		if capacity == 0 { Self::unbounded() } else { Self::bounded(capacity) }
	}

	fn with_capacity(capacity: Option<usize>) -> Self {
		Self {
			state: Mutex::new(QueueState::default()),
			capacity,
			available: Notify::new(),
			settled: Notify::new(),
		}
	}

	pub fn capacity(&self) -> Option<usize> {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.lock().jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Queued jobs plus the one in flight, if any.
	pub fn unfinished(&self) -> usize {
		self.lock().unfinished
	}

	pub fn is_full(&self) -> bool {
		self.capacity.is_some_and(|capacity| self.len() >= capacity)
	}

	pub fn enqueue(&self, job: UpdateJob) -> Result<()> {
		{
			let mut state = self.lock();

			if let Some(capacity) = self.capacity
				&& state.jobs.len() >= capacity
			{
				return Err(Error::QueueFull { capacity });
			}

			state.jobs.push_back(job);
			state.unfinished += 1;
		}

		self.available.notify_one();

		Ok(())
	}

	/// Waits for the next job. Cancel safe: a job is only taken off the queue in the same poll
	/// that returns it.
	pub async fn dequeue(&self) -> UpdateJob {
		loop {
			let notified = self.available.notified();

			if let Some(job) = self.lock().jobs.pop_front() {
				return job;
			}

			notified.await;
		}
	}

	/// Marks one dequeued job as fully processed.
	pub fn task_done(&self) {
		let settled = {
			let mut state = self.lock();

			state.unfinished = state.unfinished.saturating_sub(1);

			state.unfinished == 0
		};

		if settled {
			self.settled.notify_waiters();
		}
	}

	/// Waits until every enqueued job has been dequeued and marked done.
	pub async fn join(&self) {
		loop {
			let mut notified = pin!(self.settled.notified());

			notified.as_mut().enable();

			if self.lock().unfinished == 0 {
				return;
			}

			notified.await;
		}
	}

	fn lock(&self) -> MutexGuard<'_, QueueState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn job(text: &str) -> UpdateJob {
		UpdateJob::extracted(Resource::text(text), text.to_string())
	}

	#[tokio::test]
	async fn dequeue_follows_enqueue_order() {
		let queue = UpdateQueue::unbounded();

		for idx in 0..5 {
			queue.enqueue(job(&format!("job {idx}"))).expect("enqueue failed");
		}

		for idx in 0..5 {
			assert_eq!(queue.dequeue().await.text.as_deref(), Some(format!("job {idx}").as_str()));
		}
	}

	#[tokio::test]
	async fn bounded_queue_rejects_when_full() {
		let queue = UpdateQueue::bounded(1);

		queue.enqueue(job("first")).expect("enqueue failed");

		assert!(matches!(queue.enqueue(job("second")), Err(Error::QueueFull { capacity: 1 })));
		assert_eq!(queue.len(), 1);
	}

	#[tokio::test]
	async fn dequeue_waits_for_a_producer() {
		let queue = std::sync::Arc::new(UpdateQueue::unbounded());
		let consumer = {
			let queue = queue.clone();

			tokio::spawn(async move { queue.dequeue().await })
		};

		tokio::time::sleep(Duration::from_millis(20)).await;
		assert!(!consumer.is_finished());

		queue.enqueue(job("late")).expect("enqueue failed");

		let got = tokio::time::timeout(Duration::from_secs(1), consumer)
			.await
			.expect("dequeue timed out")
			.expect("consumer panicked");

		assert_eq!(got.text.as_deref(), Some("late"));
	}

	#[tokio::test]
	async fn join_waits_for_task_done() {
		let queue = UpdateQueue::unbounded();

		queue.join().await;
		queue.enqueue(job("one")).expect("enqueue failed");

		let _ = queue.dequeue().await;

		assert!(tokio::time::timeout(Duration::from_millis(20), queue.join()).await.is_err());

		queue.task_done();

		tokio::time::timeout(Duration::from_secs(1), queue.join()).await.expect("join timed out");
	}
}
