//! Order state owned by the ordering flow.

use serde::Serialize;
use translator_pricing::{compute_price, compute_turnaround_days, Quote};
use translator_types::{
	default_language, AnalysisReport, DocumentRef, FlowFailure, LanguageOption, PaymentReceipt,
	Step,
};

/// Everything the flow knows about the order being placed.
///
/// Fields are only changed by [`crate::OrderFlow`]. Price and turnaround are not
/// stored; they are computed from the language and add-on flags on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderState {
	pub(crate) current_step: Step,
	pub(crate) document: Option<DocumentRef>,
	pub(crate) selected_language: LanguageOption,
	pub(crate) needs_notary: bool,
	pub(crate) needs_stamp: bool,
	pub(crate) is_payment_processing: bool,
	pub(crate) analysis: Option<AnalysisReport>,
	pub(crate) receipt: Option<PaymentReceipt>,
	pub(crate) failure: Option<FlowFailure>,
}

impl OrderState {
	/// A fresh order on the landing screen.
	pub fn new() -> Self {
		Self {
			current_step: Step::Hero,
			document: None,
			selected_language: default_language(),
			needs_notary: false,
			needs_stamp: false,
			is_payment_processing: false,
			analysis: None,
			receipt: None,
			failure: None,
		}
	}

	pub fn current_step(&self) -> Step {
		self.current_step
	}

	/// Display name of the accepted document.
	pub fn uploaded_file_name(&self) -> Option<&str> {
		self.document.as_ref().map(|d| d.name.as_str())
	}

	pub fn document(&self) -> Option<&DocumentRef> {
		self.document.as_ref()
	}

	pub fn selected_language(&self) -> &LanguageOption {
		&self.selected_language
	}

	pub fn needs_notary(&self) -> bool {
		self.needs_notary
	}

	pub fn needs_stamp(&self) -> bool {
		self.needs_stamp
	}

	pub fn is_payment_processing(&self) -> bool {
		self.is_payment_processing
	}

	/// Last successful analysis of the current document.
	pub fn analysis(&self) -> Option<&AnalysisReport> {
		self.analysis.as_ref()
	}

	pub fn receipt(&self) -> Option<&PaymentReceipt> {
		self.receipt.as_ref()
	}

	/// Failure banner shown on the current step, if any.
	pub fn failure(&self) -> Option<&FlowFailure> {
		self.failure.as_ref()
	}

	/// Order price in UAH.
	pub fn price(&self) -> u32 {
		compute_price(&self.selected_language, self.needs_notary, self.needs_stamp)
	}

	/// Turnaround in working days.
	pub fn turnaround_days(&self) -> u32 {
		compute_turnaround_days(&self.selected_language, self.needs_notary, self.needs_stamp)
	}

	pub fn quote(&self) -> Quote {
		Quote::new(&self.selected_language, self.needs_notary, self.needs_stamp)
	}
}

impl Default for OrderState {
	fn default() -> Self {
		Self::new()
	}
}
