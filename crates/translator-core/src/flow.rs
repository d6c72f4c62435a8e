//! Ordering state machine.
//!
//! [`OrderFlow`] consumes one [`FlowEvent`] at a time and moves the order
//! through Hero -> Upload -> Analyzing -> Analysis -> Pricing -> Confirmation.
//! Events that make no sense on the current step are rejected without touching
//! the state. Timed steps are driven through a [`Scheduler`]; only the
//! completion carrying the pending token is acted on.

use crate::state::OrderState;
use crate::timer::{Scheduler, TimerHandle};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use translator_config::FlowConfig;
use translator_types::{
	resolve_language, truncate_id, DocumentRef, FlowEvent, FlowFailure, PaymentRequest, Step,
	TimerJob, TimerOutcome, TimerToken, CURRENCY,
};

/// Errors returned when an event cannot be applied.
///
/// The order state is unchanged whenever one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
	#[error("Event '{event}' is not accepted on step {step}")]
	InvalidEvent { step: Step, event: &'static str },
	#[error("Invalid step transition from {from} to {to}")]
	InvalidTransition { from: Step, to: Step },
	#[error("A payment is being processed")]
	PaymentInProgress,
}

/// Step change produced by one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
	pub from: Step,
	pub to: Step,
}

impl Transition {
	fn stay(step: Step) -> Self {
		Self { from: step, to: step }
	}

	/// Whether the event moved the flow to another step.
	pub fn is_change(&self) -> bool {
		self.from != self.to
	}
}

/// The ordering state machine.
pub struct OrderFlow {
	state: OrderState,
	scheduler: Arc<dyn Scheduler>,
	delays: FlowConfig,
	next_token: u64,
	pending: Option<TimerHandle>,
}

impl OrderFlow {
	pub fn new(scheduler: Arc<dyn Scheduler>, delays: FlowConfig) -> Self {
		Self {
			state: OrderState::new(),
			scheduler,
			delays,
			next_token: 0,
			pending: None,
		}
	}

	pub fn state(&self) -> &OrderState {
		&self.state
	}

	/// Token of the timer the flow is waiting for, if any.
	pub fn pending_timer(&self) -> Option<TimerToken> {
		self.pending.as_ref().map(TimerHandle::token)
	}

	/// Applies one event.
	pub fn handle(&mut self, event: FlowEvent) -> Result<Transition, FlowError> {
		let from = self.state.current_step;
		let name = event.name();

		let result = match (from, event) {
			(Step::Hero, FlowEvent::Start) => self.move_to(Step::Upload),
			(Step::Upload, FlowEvent::Back) => {
				self.ensure(Step::Hero)?;
				self.state.failure = None;
				self.move_to(Step::Hero)
			},
			(Step::Upload | Step::Analyzing, FlowEvent::FileSelected(document)) => {
				self.begin_analysis(document)
			},
			(Step::Upload | Step::Analyzing, FlowEvent::UploadRejected { reason }) => {
				self.state.failure = Some(FlowFailure::UploadRejected(reason));
				Ok(Transition::stay(from))
			},
			(Step::Upload, FlowEvent::RetryAnalysis)
				if matches!(self.state.failure, Some(FlowFailure::Analysis(_))) =>
			{
				match self.state.document.clone() {
					Some(document) => self.begin_analysis(document),
					None => Err(FlowError::InvalidEvent { step: from, event: name }),
				}
			},
			(Step::Analyzing, FlowEvent::Back) => {
				self.ensure(Step::Upload)?;
				self.cancel_pending();
				self.move_to(Step::Upload)
			},
			(_, FlowEvent::TimerElapsed { token, outcome }) => self.on_timer(token, outcome),
			(Step::Analysis, FlowEvent::SelectLanguage(query)) => {
				self.state.selected_language = resolve_language(&query);
				Ok(Transition::stay(from))
			},
			(Step::Analysis, FlowEvent::SetNotary(enabled)) => {
				self.state.needs_notary = enabled;
				Ok(Transition::stay(from))
			},
			(Step::Analysis, FlowEvent::SetStamp(enabled)) => {
				self.state.needs_stamp = enabled;
				Ok(Transition::stay(from))
			},
			(Step::Analysis, FlowEvent::RequestPricing) => self.move_to(Step::Pricing),
			(Step::Analysis | Step::Confirmation, FlowEvent::Reset)
			| (Step::Confirmation, FlowEvent::StartNew) => self.reset(),
			(Step::Pricing, FlowEvent::Back) => {
				if self.state.is_payment_processing {
					return Err(FlowError::PaymentInProgress);
				}
				self.state.failure = None;
				self.move_to(Step::Analysis)
			},
			(Step::Pricing, FlowEvent::Pay) => self.begin_payment(),
			(step, _) => Err(FlowError::InvalidEvent { step, event: name }),
		};

		if let Ok(transition) = &result {
			if transition.is_change() {
				tracing::info!(from = %transition.from, to = %transition.to, event = name, "Step changed");
			}
		}
		result
	}

	fn begin_analysis(&mut self, document: DocumentRef) -> Result<Transition, FlowError> {
		let from = self.state.current_step;
		self.ensure(Step::Analyzing)?;

		tracing::info!(document = %document.name, size = document.size, "Document accepted");
		self.state.document = Some(document.clone());
		self.state.analysis = None;
		self.state.failure = None;
		self.state.current_step = Step::Analyzing;
		self.arm(self.delays.analysis_delay(), TimerJob::Analysis(document));

		Ok(Transition {
			from,
			to: Step::Analyzing,
		})
	}

	fn begin_payment(&mut self) -> Result<Transition, FlowError> {
		if self.state.is_payment_processing {
			return Err(FlowError::PaymentInProgress);
		}
		self.ensure(Step::Pricing)?;

		let request = PaymentRequest {
			order_id: uuid::Uuid::new_v4().to_string(),
			amount: self.state.price(),
			currency: CURRENCY.to_string(),
			language_code: self.state.selected_language.code().to_string(),
			needs_notary: self.state.needs_notary,
			needs_stamp: self.state.needs_stamp,
			document_name: self.state.uploaded_file_name().map(str::to_string),
		};
		tracing::info!(
			order_id = %truncate_id(&request.order_id),
			amount = request.amount,
			"Payment started"
		);

		self.state.is_payment_processing = true;
		self.state.failure = None;
		self.arm(self.delays.payment_delay(), TimerJob::Payment(request));

		Ok(Transition::stay(Step::Pricing))
	}

	fn on_timer(&mut self, token: TimerToken, outcome: TimerOutcome) -> Result<Transition, FlowError> {
		let from = self.state.current_step;

		if self.pending_timer() != Some(token) {
			tracing::debug!(%token, step = %from, "Ignoring stale timer");
			return Ok(Transition::stay(from));
		}

		match (from, outcome) {
			(Step::Analyzing, TimerOutcome::Analysis(Ok(report))) => {
				self.ensure(Step::Analysis)?;
				self.pending = None;
				self.state.failure = None;
				self.state.analysis = Some(report);
				self.move_to(Step::Analysis)
			},
			(Step::Analyzing, TimerOutcome::Analysis(Err(message))) => {
				self.ensure(Step::Upload)?;
				self.pending = None;
				tracing::warn!(error = %message, "Analysis failed");
				self.state.failure = Some(FlowFailure::Analysis(message));
				self.move_to(Step::Upload)
			},
			(Step::Pricing, TimerOutcome::Payment(Ok(receipt))) => {
				self.ensure(Step::Confirmation)?;
				self.pending = None;
				self.state.is_payment_processing = false;
				self.state.receipt = Some(receipt);
				self.move_to(Step::Confirmation)
			},
			(Step::Pricing, TimerOutcome::Payment(Err(message))) => {
				self.pending = None;
				tracing::warn!(error = %message, "Payment failed");
				self.state.is_payment_processing = false;
				self.state.failure = Some(FlowFailure::Payment(message));
				Ok(Transition::stay(from))
			},
			(step, _) => Err(FlowError::InvalidEvent {
				step,
				event: "timer_elapsed",
			}),
		}
	}

	/// Replaces the whole order with a fresh one.
	fn reset(&mut self) -> Result<Transition, FlowError> {
		let from = self.state.current_step;
		self.ensure(Step::Hero)?;
		self.cancel_pending();
		self.state = OrderState::new();
		Ok(Transition { from, to: Step::Hero })
	}

	fn move_to(&mut self, to: Step) -> Result<Transition, FlowError> {
		let from = self.state.current_step;
		self.ensure(to)?;
		self.state.current_step = to;
		Ok(Transition { from, to })
	}

	fn ensure(&self, to: Step) -> Result<(), FlowError> {
		let from = self.state.current_step;
		if is_valid_transition(from, to) {
			Ok(())
		} else {
			Err(FlowError::InvalidTransition { from, to })
		}
	}

	/// Starts a new timer, cancelling any pending one.
	fn arm(&mut self, after: std::time::Duration, job: TimerJob) {
		self.cancel_pending();
		self.next_token += 1;
		let token = TimerToken(self.next_token);
		self.pending = Some(self.scheduler.schedule(token, after, job));
	}

	fn cancel_pending(&mut self) {
		if let Some(mut handle) = self.pending.take() {
			tracing::debug!(token = %handle.token(), "Timer cancelled");
			handle.cancel();
		}
	}
}

/// Checks a step change against the static transition table.
fn is_valid_transition(from: Step, to: Step) -> bool {
	// Each step maps to the steps it may move to, itself included where an
	// event keeps the flow in place.
	static TRANSITIONS: Lazy<HashMap<Step, HashSet<Step>>> = Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(Step::Hero, HashSet::from([Step::Upload]));
		m.insert(
			Step::Upload,
			HashSet::from([Step::Hero, Step::Upload, Step::Analyzing]),
		);
		m.insert(
			Step::Analyzing,
			HashSet::from([Step::Analyzing, Step::Upload, Step::Analysis]),
		);
		m.insert(
			Step::Analysis,
			HashSet::from([Step::Analysis, Step::Pricing, Step::Hero]),
		);
		m.insert(
			Step::Pricing,
			HashSet::from([Step::Pricing, Step::Analysis, Step::Confirmation]),
		);
		m.insert(Step::Confirmation, HashSet::from([Step::Hero]));
		m
	});

	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::timer::manual::ManualScheduler;
	use std::time::Duration;
	use translator_types::{AnalysisReport, PaymentReceipt};

	fn flow() -> (OrderFlow, Arc<ManualScheduler>) {
		let scheduler = Arc::new(ManualScheduler::default());
		(OrderFlow::new(scheduler.clone(), FlowConfig::default()), scheduler)
	}

	fn document(name: &str) -> DocumentRef {
		DocumentRef {
			name: name.to_string(),
			mime: "application/pdf".to_string(),
			size: 2048,
			path: None,
		}
	}

	fn report() -> AnalysisReport {
		AnalysisReport {
			document_type: "Свідоцтво про шлюб".to_string(),
			detected_language: "Українська".to_string(),
			pages: Some(2),
			estimated_price: None,
			estimated_time: None,
			findings: Vec::new(),
			source: "test".to_string(),
		}
	}

	fn receipt(request: &PaymentRequest) -> PaymentReceipt {
		PaymentReceipt {
			order_id: request.order_id.clone(),
			amount: request.amount,
			currency: request.currency.clone(),
			reference: "ref-1".to_string(),
			paid_at: 0,
		}
	}

	fn analysis_done(token: TimerToken) -> FlowEvent {
		FlowEvent::TimerElapsed {
			token,
			outcome: TimerOutcome::Analysis(Ok(report())),
		}
	}

	/// Drives a fresh flow to the Analysis step.
	fn at_analysis() -> (OrderFlow, Arc<ManualScheduler>) {
		let (mut flow, scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::FileSelected(document("certificate.pdf"))).unwrap();
		flow.handle(analysis_done(scheduler.last().token)).unwrap();
		(flow, scheduler)
	}

	fn pay_and_confirm(flow: &mut OrderFlow, scheduler: &ManualScheduler) {
		flow.handle(FlowEvent::Pay).unwrap();
		let timer = scheduler.last();
		let TimerJob::Payment(request) = &timer.job else {
			panic!("expected payment job");
		};
		flow.handle(FlowEvent::TimerElapsed {
			token: timer.token,
			outcome: TimerOutcome::Payment(Ok(receipt(request))),
		})
		.unwrap();
	}

	#[test]
	fn test_happy_path_reaches_confirmation() {
		let (mut flow, scheduler) = flow();

		assert_eq!(
			flow.handle(FlowEvent::Start).unwrap(),
			Transition { from: Step::Hero, to: Step::Upload }
		);
		flow.handle(FlowEvent::FileSelected(document("certificate.pdf"))).unwrap();
		assert_eq!(flow.state().current_step(), Step::Analyzing);
		assert_eq!(flow.state().uploaded_file_name(), Some("certificate.pdf"));

		let timer = scheduler.last();
		assert_eq!(timer.after, Duration::from_millis(2200));
		flow.handle(analysis_done(timer.token)).unwrap();
		assert_eq!(flow.state().current_step(), Step::Analysis);
		assert!(flow.state().analysis().is_some());

		flow.handle(FlowEvent::RequestPricing).unwrap();
		flow.handle(FlowEvent::Pay).unwrap();
		assert!(flow.state().is_payment_processing());
		assert_eq!(scheduler.last().after, Duration::from_millis(2000));

		let timer = scheduler.last();
		let TimerJob::Payment(request) = &timer.job else {
			panic!("expected payment job");
		};
		assert_eq!(request.amount, 450);
		assert_eq!(request.document_name.as_deref(), Some("certificate.pdf"));

		flow.handle(FlowEvent::TimerElapsed {
			token: timer.token,
			outcome: TimerOutcome::Payment(Ok(receipt(request))),
		})
		.unwrap();

		assert_eq!(flow.state().current_step(), Step::Confirmation);
		assert!(!flow.state().is_payment_processing());
		assert!(flow.state().receipt().is_some());
		assert_eq!(flow.pending_timer(), None);
	}

	#[test]
	fn test_notary_toggle_restores_quote() {
		let (mut flow, _scheduler) = at_analysis();
		flow.handle(FlowEvent::SelectLanguage("Німецька".to_string())).unwrap();
		let before = flow.state().quote();

		flow.handle(FlowEvent::SetNotary(true)).unwrap();
		assert_eq!(flow.state().price(), before.price + 250);
		assert_eq!(flow.state().turnaround_days(), before.turnaround_days + 1);

		flow.handle(FlowEvent::SetNotary(false)).unwrap();
		assert_eq!(flow.state().quote(), before);
	}

	#[test]
	fn test_unknown_language_falls_back_to_default() {
		let (mut flow, _scheduler) = at_analysis();
		flow.handle(FlowEvent::SelectLanguage("de".to_string())).unwrap();
		flow.handle(FlowEvent::SelectLanguage("klingon".to_string())).unwrap();
		assert_eq!(flow.state().selected_language().code(), "en");
	}

	#[test]
	fn test_reset_from_analysis_restores_defaults() {
		let (mut flow, _scheduler) = at_analysis();
		flow.handle(FlowEvent::SelectLanguage("es".to_string())).unwrap();
		flow.handle(FlowEvent::SetStamp(true)).unwrap();

		let transition = flow.handle(FlowEvent::Reset).unwrap();
		assert_eq!(transition.to, Step::Hero);
		assert_eq!(flow.state(), &OrderState::new());
	}

	#[test]
	fn test_start_new_from_confirmation_restores_defaults() {
		let (mut flow, scheduler) = at_analysis();
		flow.handle(FlowEvent::SetNotary(true)).unwrap();
		flow.handle(FlowEvent::RequestPricing).unwrap();
		pay_and_confirm(&mut flow, &scheduler);
		assert_eq!(flow.state().current_step(), Step::Confirmation);

		flow.handle(FlowEvent::StartNew).unwrap();
		assert_eq!(flow.state(), &OrderState::new());
	}

	#[test]
	fn test_reselect_during_analyzing_ignores_old_timer() {
		let (mut flow, scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::FileSelected(document("first.pdf"))).unwrap();
		let first = scheduler.last();

		flow.handle(FlowEvent::FileSelected(document("second.pdf"))).unwrap();
		let second = scheduler.last();
		assert!(first.is_cancelled());
		assert_ne!(first.token, second.token);

		let transition = flow.handle(analysis_done(first.token)).unwrap();
		assert!(!transition.is_change());
		assert_eq!(flow.state().current_step(), Step::Analyzing);

		flow.handle(analysis_done(second.token)).unwrap();
		assert_eq!(flow.state().current_step(), Step::Analysis);
		assert_eq!(flow.state().uploaded_file_name(), Some("second.pdf"));
	}

	#[test]
	fn test_back_from_analyzing_cancels_timer() {
		let (mut flow, scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::FileSelected(document("scan.pdf"))).unwrap();
		let timer = scheduler.last();

		flow.handle(FlowEvent::Back).unwrap();
		assert!(timer.is_cancelled());
		assert_eq!(flow.state().current_step(), Step::Upload);

		flow.handle(analysis_done(timer.token)).unwrap();
		assert_eq!(flow.state().current_step(), Step::Upload);
	}

	#[test]
	fn test_invalid_events_leave_state_unchanged() {
		let (mut flow, _scheduler) = flow();
		let before = flow.state().clone();

		for event in [
			FlowEvent::Back,
			FlowEvent::Pay,
			FlowEvent::RequestPricing,
			FlowEvent::SetNotary(true),
			FlowEvent::FileSelected(document("early.pdf")),
			FlowEvent::StartNew,
			FlowEvent::RetryAnalysis,
		] {
			let name = event.name();
			assert_eq!(
				flow.handle(event),
				Err(FlowError::InvalidEvent { step: Step::Hero, event: name })
			);
			assert_eq!(flow.state(), &before);
		}
	}

	#[test]
	fn test_upload_rejection_keeps_step() {
		let (mut flow, _scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::UploadRejected {
			reason: "archive.zip is not supported".to_string(),
		})
		.unwrap();

		assert_eq!(flow.state().current_step(), Step::Upload);
		assert!(matches!(flow.state().failure(), Some(FlowFailure::UploadRejected(_))));

		flow.handle(FlowEvent::FileSelected(document("scan.pdf"))).unwrap();
		assert_eq!(flow.state().failure(), None);
	}

	#[test]
	fn test_upload_rejection_while_analyzing_keeps_timer() {
		let (mut flow, scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::FileSelected(document("scan.pdf"))).unwrap();
		let token = scheduler.last().token;

		let transition = flow
			.handle(FlowEvent::UploadRejected {
				reason: "bundle.zip is not supported".to_string(),
			})
			.unwrap();

		assert!(!transition.is_change());
		assert_eq!(flow.state().current_step(), Step::Analyzing);
		assert_eq!(flow.state().uploaded_file_name(), Some("scan.pdf"));
		assert!(matches!(flow.state().failure(), Some(FlowFailure::UploadRejected(_))));
		assert_eq!(flow.pending_timer(), Some(token));
		assert!(!scheduler.last().is_cancelled());

		flow.handle(FlowEvent::TimerElapsed {
			token,
			outcome: TimerOutcome::Analysis(Ok(report())),
		})
		.unwrap();
		assert_eq!(flow.state().current_step(), Step::Analysis);
		assert_eq!(flow.state().failure(), None);
	}

	#[test]
	fn test_analysis_failure_then_retry() {
		let (mut flow, scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::FileSelected(document("scan.pdf"))).unwrap();

		flow.handle(FlowEvent::TimerElapsed {
			token: scheduler.last().token,
			outcome: TimerOutcome::Analysis(Err("backend unavailable".to_string())),
		})
		.unwrap();
		assert_eq!(flow.state().current_step(), Step::Upload);
		assert_eq!(
			flow.state().failure(),
			Some(&FlowFailure::Analysis("backend unavailable".to_string()))
		);
		assert_eq!(flow.state().uploaded_file_name(), Some("scan.pdf"));

		flow.handle(FlowEvent::RetryAnalysis).unwrap();
		assert_eq!(flow.state().current_step(), Step::Analyzing);
		assert_eq!(flow.state().failure(), None);

		flow.handle(analysis_done(scheduler.last().token)).unwrap();
		assert_eq!(flow.state().current_step(), Step::Analysis);
	}

	#[test]
	fn test_declined_payment_stays_on_pricing() {
		let (mut flow, scheduler) = at_analysis();
		flow.handle(FlowEvent::RequestPricing).unwrap();
		flow.handle(FlowEvent::Pay).unwrap();

		flow.handle(FlowEvent::TimerElapsed {
			token: scheduler.last().token,
			outcome: TimerOutcome::Payment(Err("card declined".to_string())),
		})
		.unwrap();

		assert_eq!(flow.state().current_step(), Step::Pricing);
		assert!(!flow.state().is_payment_processing());
		assert_eq!(
			flow.state().failure(),
			Some(&FlowFailure::Payment("card declined".to_string()))
		);

		pay_and_confirm(&mut flow, &scheduler);
		assert_eq!(flow.state().current_step(), Step::Confirmation);
		assert_eq!(flow.state().failure(), None);
	}

	#[test]
	fn test_no_navigation_while_paying() {
		let (mut flow, _scheduler) = at_analysis();
		flow.handle(FlowEvent::RequestPricing).unwrap();
		flow.handle(FlowEvent::Pay).unwrap();

		assert_eq!(flow.handle(FlowEvent::Back), Err(FlowError::PaymentInProgress));
		assert_eq!(flow.handle(FlowEvent::Pay), Err(FlowError::PaymentInProgress));
		assert_eq!(flow.state().current_step(), Step::Pricing);
		assert!(flow.state().is_payment_processing());
	}

	#[test]
	fn test_dropping_flow_cancels_pending_timer() {
		let (mut flow, scheduler) = flow();
		flow.handle(FlowEvent::Start).unwrap();
		flow.handle(FlowEvent::FileSelected(document("scan.pdf"))).unwrap();

		drop(flow);
		assert!(scheduler.last().is_cancelled());
	}

	#[test]
	fn test_transition_table() {
		assert!(is_valid_transition(Step::Hero, Step::Upload));
		assert!(is_valid_transition(Step::Pricing, Step::Confirmation));
		assert!(!is_valid_transition(Step::Hero, Step::Confirmation));
		assert!(!is_valid_transition(Step::Confirmation, Step::Pricing));
		assert!(!is_valid_transition(Step::Upload, Step::Pricing));

		for from in Step::ALL {
			assert!(
				Step::ALL.iter().any(|to| *to != from && is_valid_transition(from, *to)),
				"{} has no way out",
				from
			);
		}
	}
}
