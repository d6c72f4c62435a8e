//! Async driver around the ordering flow.
//!
//! [`OrderSession`] is what a front end talks to. It owns the flow, the upload
//! collector, the host bridge and the receiving end of the timer channel, and it
//! keeps the collector enabled only on the steps that take a document.

use crate::flow::{FlowError, OrderFlow, Transition};
use crate::progress::{progress_index, progress_label};
use crate::timer::JobRunner;
use crate::upload::UploadCollector;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use translator_analysis::AnalysisService;
use translator_bridge::HostBridgeService;
use translator_payment::PaymentService;
use translator_pricing::{Locale, TurnaroundFormatter};
use translator_types::{
	AnalysisReport, FlowEvent, SelectedFile, Step, TimerJob, TimerOutcome, CURRENCY,
};

/// Errors surfaced by [`OrderSession`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
	#[error(transparent)]
	Flow(#[from] FlowError),
	#[error("Host bridge error: {0}")]
	Bridge(String),
	#[error("Order is not complete, current step is {0}")]
	NotComplete(Step),
	#[error("Timer channel closed")]
	TimersClosed,
}

/// Runs timer jobs against the configured providers.
///
/// Provider errors become the user-facing message carried by the outcome.
pub struct ProviderRunner {
	analysis: Arc<AnalysisService>,
	payment: Arc<PaymentService>,
}

impl ProviderRunner {
	pub fn new(analysis: Arc<AnalysisService>, payment: Arc<PaymentService>) -> Self {
		Self { analysis, payment }
	}
}

#[async_trait]
impl JobRunner for ProviderRunner {
	async fn run(&self, job: TimerJob) -> TimerOutcome {
		match job {
			TimerJob::Analysis(document) => {
				TimerOutcome::Analysis(self.analysis.analyze(&document).await.map_err(|e| {
					tracing::warn!(provider = %self.analysis.primary(), error = %e, "Analysis provider failed");
					e.to_string()
				}))
			},
			TimerJob::Payment(request) => {
				TimerOutcome::Payment(self.payment.charge(&request).await.map_err(|e| {
					tracing::warn!(provider = %self.payment.primary(), error = %e, "Payment provider failed");
					e.to_string()
				}))
			},
		}
	}
}

/// Render-ready snapshot of the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
	pub step: Step,
	pub progress_index: usize,
	pub progress_label: &'static str,
	pub upload_enabled: bool,
	pub uploaded_file_name: Option<String>,
	pub language_code: &'static str,
	pub language_name: &'static str,
	pub needs_notary: bool,
	pub needs_stamp: bool,
	pub price: u32,
	pub currency: &'static str,
	pub turnaround_days: u32,
	pub turnaround_label: String,
	pub is_payment_processing: bool,
	pub analysis: Option<AnalysisReport>,
	pub failure: Option<String>,
}

/// One ordering session, from landing screen to confirmation.
pub struct OrderSession {
	flow: OrderFlow,
	collector: UploadCollector,
	bridge: HostBridgeService,
	locale: Locale,
	events: mpsc::UnboundedReceiver<FlowEvent>,
}

impl OrderSession {
	/// Creates a session. `events` must be the channel the flow's scheduler
	/// delivers timer completions into.
	pub fn new(
		flow: OrderFlow,
		collector: UploadCollector,
		bridge: HostBridgeService,
		locale: Locale,
		events: mpsc::UnboundedReceiver<FlowEvent>,
	) -> Self {
		let mut session = Self {
			flow,
			collector,
			bridge,
			locale,
			events,
		};
		session.sync_collector();
		session
	}

	/// Tells the host the app is ready.
	pub fn start(&self) -> Result<(), SessionError> {
		self.bridge
			.bootstrap()
			.map_err(|e| SessionError::Bridge(e.to_string()))
	}

	pub fn flow(&self) -> &OrderFlow {
		&self.flow
	}

	pub fn locale(&self) -> Locale {
		self.locale
	}

	/// Applies a user event.
	pub fn dispatch(&mut self, event: FlowEvent) -> Result<Transition, SessionError> {
		let transition = self.flow.handle(event)?;
		self.sync_collector();
		Ok(transition)
	}

	/// Hands a picker or drop selection to the collector.
	///
	/// Returns `Ok(None)` when the selection was ignored. A refused file is
	/// reported to the flow, which shows it as a failure banner.
	pub fn select_files(
		&mut self,
		files: impl IntoIterator<Item = SelectedFile>,
	) -> Result<Option<Transition>, SessionError> {
		match self.collector.collect(files) {
			Ok(None) => Ok(None),
			Ok(Some(document)) => self.dispatch(FlowEvent::FileSelected(document)).map(Some),
			Err(e) => {
				tracing::warn!(error = %e, "File rejected");
				self.dispatch(FlowEvent::UploadRejected {
					reason: e.to_string(),
				})
				.map(Some)
			},
		}
	}

	/// Waits until no timer is pending, applying completions as they arrive.
	///
	/// Returns the transitions produced, including ignored stale completions.
	pub async fn settle(&mut self) -> Result<Vec<Transition>, SessionError> {
		let mut applied = Vec::new();
		while self.flow.pending_timer().is_some() {
			let event = self.events.recv().await.ok_or(SessionError::TimersClosed)?;
			applied.push(self.dispatch(event)?);
		}
		Ok(applied)
	}

	/// Current order as it should be rendered.
	pub fn view(&self) -> OrderView {
		let state = self.flow.state();
		let step = state.current_step();
		let language = state.selected_language();

		OrderView {
			step,
			progress_index: progress_index(step),
			progress_label: progress_label(step, self.locale),
			upload_enabled: self.collector.is_enabled(),
			uploaded_file_name: state.uploaded_file_name().map(str::to_string),
			language_code: language.code(),
			language_name: language.name(),
			needs_notary: state.needs_notary(),
			needs_stamp: state.needs_stamp(),
			price: state.price(),
			currency: CURRENCY,
			turnaround_days: state.turnaround_days(),
			turnaround_label: self.locale.turnaround_forms().format(state.turnaround_days()),
			is_payment_processing: state.is_payment_processing(),
			analysis: state.analysis().cloned(),
			failure: state.failure().map(|f| f.to_string()),
		}
	}

	/// Reports the paid order to the host and closes the app.
	pub fn complete(&self) -> Result<(), SessionError> {
		let state = self.flow.state();
		if state.current_step() != Step::Confirmation {
			return Err(SessionError::NotComplete(state.current_step()));
		}

		let message = self
			.locale
			.paid_message(state.selected_language(), &state.quote());
		tracing::info!(message = %message, "Order complete");

		self.bridge
			.close(Some(&message))
			.map_err(|e| SessionError::Bridge(e.to_string()))
	}

	/// Closes the app without reporting anything.
	pub fn dismiss(&self) -> Result<(), SessionError> {
		self.bridge
			.close(None)
			.map_err(|e| SessionError::Bridge(e.to_string()))
	}

	fn sync_collector(&mut self) {
		let step = self.flow.state().current_step();
		self.collector
			.set_enabled(step == Step::Upload || step.is_transient());
	}
}
