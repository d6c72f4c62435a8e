//! Cancellable timers for the simulated steps.
//!
//! The flow never sleeps itself. It asks a [`Scheduler`] to deliver a
//! [`FlowEvent::TimerElapsed`] after a delay and keeps the returned
//! [`TimerHandle`]. Cancelling or dropping the handle guarantees the event is
//! never delivered by that scheduler.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use translator_types::{FlowEvent, TimerJob, TimerOutcome, TimerToken};

/// Ownership of one scheduled timer.
///
/// Cancels the timer when dropped.
pub struct TimerHandle {
	token: TimerToken,
	cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
	/// Creates a handle that runs `cancel` at most once.
	pub fn new(token: TimerToken, cancel: impl FnOnce() + Send + 'static) -> Self {
		Self {
			token,
			cancel: Some(Box::new(cancel)),
		}
	}

	/// Creates a handle that aborts a spawned task.
	pub fn from_abort(token: TimerToken, abort: AbortHandle) -> Self {
		Self::new(token, move || abort.abort())
	}

	/// Token of the timer this handle owns.
	pub fn token(&self) -> TimerToken {
		self.token
	}

	/// Cancels the timer. Cancelling twice is harmless.
	pub fn cancel(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl Drop for TimerHandle {
	fn drop(&mut self) {
		self.cancel();
	}
}

impl std::fmt::Debug for TimerHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TimerHandle")
			.field("token", &self.token)
			.field("armed", &self.cancel.is_some())
			.finish()
	}
}

/// Schedules timer completions for the flow.
pub trait Scheduler: Send + Sync {
	/// Arranges for `TimerElapsed { token, .. }` to be delivered after `after`,
	/// carrying the outcome of `job`.
	fn schedule(&self, token: TimerToken, after: Duration, job: TimerJob) -> TimerHandle;
}

/// Performs the collaborator call attached to a timer.
#[async_trait]
pub trait JobRunner: Send + Sync {
	async fn run(&self, job: TimerJob) -> TimerOutcome;
}

/// Scheduler backed by tokio tasks.
///
/// Each timer is one task that waits for the delay and the job together, then
/// sends the completion into the session's event channel.
pub struct TokioScheduler {
	runtime: Handle,
	runner: Arc<dyn JobRunner>,
	events: mpsc::UnboundedSender<FlowEvent>,
}

impl TokioScheduler {
	pub fn new(
		runtime: Handle,
		runner: Arc<dyn JobRunner>,
		events: mpsc::UnboundedSender<FlowEvent>,
	) -> Self {
		Self {
			runtime,
			runner,
			events,
		}
	}
}

impl Scheduler for TokioScheduler {
	fn schedule(&self, token: TimerToken, after: Duration, job: TimerJob) -> TimerHandle {
		let runner = self.runner.clone();
		let events = self.events.clone();
		let kind = job.kind();

		tracing::debug!(%token, kind, delay_ms = after.as_millis() as u64, "Timer scheduled");

		let task = self.runtime.spawn(async move {
			let (_, outcome) = tokio::join!(tokio::time::sleep(after), runner.run(job));
			if events.send(FlowEvent::TimerElapsed { token, outcome }).is_err() {
				tracing::debug!(%token, "Session gone, dropping timer result");
			}
		});

		TimerHandle::from_abort(token, task.abort_handle())
	}
}
