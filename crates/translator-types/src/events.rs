//! Event types for the ordering state machine.
//!
//! User actions and timer completions are both expressed as [`FlowEvent`]s so the
//! state machine has a single entry point. Timer completions carry the outcome of
//! the collaborator call that ran alongside the delay.

use crate::{AnalysisReport, DocumentRef, PaymentReceipt, PaymentRequest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one scheduled timer.
///
/// Tokens are never reused within a flow, so a completion carrying an old token
/// can always be told apart from the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "timer#{}", self.0)
	}
}

/// Work performed while a timer runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerJob {
	/// Analyze the uploaded document.
	Analysis(DocumentRef),
	/// Charge the order.
	Payment(PaymentRequest),
}

impl TimerJob {
	/// Short label used in logs.
	pub fn kind(&self) -> &'static str {
		match self {
			TimerJob::Analysis(_) => "analysis",
			TimerJob::Payment(_) => "payment",
		}
	}
}

/// Result of a [`TimerJob`], delivered when the timer elapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutcome {
	/// Analysis finished with a report or a user-facing error message.
	Analysis(Result<AnalysisReport, String>),
	/// Payment finished with a receipt or a user-facing error message.
	Payment(Result<PaymentReceipt, String>),
}

/// Events consumed by the ordering state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
	/// User starts from the landing screen.
	Start,
	/// User navigates one step back.
	Back,
	/// A document passed the upload collector.
	FileSelected(DocumentRef),
	/// The upload collector refused a document.
	UploadRejected { reason: String },
	/// User retries analysis after a failure.
	RetryAnalysis,
	/// User picks a target language by code or name.
	SelectLanguage(String),
	/// User sets the notarization add-on.
	SetNotary(bool),
	/// User sets the stamp add-on.
	SetStamp(bool),
	/// User proceeds to pricing.
	RequestPricing,
	/// User pays.
	Pay,
	/// User starts over.
	Reset,
	/// User creates a new request from the confirmation screen.
	StartNew,
	/// A scheduled timer elapsed.
	TimerElapsed {
		token: TimerToken,
		outcome: TimerOutcome,
	},
}

impl FlowEvent {
	/// Short label used in logs and errors.
	pub fn name(&self) -> &'static str {
		match self {
			FlowEvent::Start => "start",
			FlowEvent::Back => "back",
			FlowEvent::FileSelected(_) => "file_selected",
			FlowEvent::UploadRejected { .. } => "upload_rejected",
			FlowEvent::RetryAnalysis => "retry_analysis",
			FlowEvent::SelectLanguage(_) => "select_language",
			FlowEvent::SetNotary(_) => "set_notary",
			FlowEvent::SetStamp(_) => "set_stamp",
			FlowEvent::RequestPricing => "request_pricing",
			FlowEvent::Pay => "pay",
			FlowEvent::Reset => "reset",
			FlowEvent::StartNew => "start_new",
			FlowEvent::TimerElapsed { .. } => "timer_elapsed",
		}
	}
}

/// A failure shown inline on the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FlowFailure {
	/// The selected file was refused before analysis.
	UploadRejected(String),
	/// Analysis failed; the user may retry.
	Analysis(String),
	/// Payment was declined or failed; the user may pay again.
	Payment(String),
}

impl fmt::Display for FlowFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FlowFailure::UploadRejected(m) => write!(f, "Upload rejected: {}", m),
			FlowFailure::Analysis(m) => write!(f, "Analysis failed: {}", m),
			FlowFailure::Payment(m) => write!(f, "Payment failed: {}", m),
		}
	}
}
