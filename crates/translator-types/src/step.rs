//! Ordering steps of the translation flow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The step the ordering flow is currently on.
///
/// Exactly one step is active at a time. `Analyzing` is transient: it is entered
/// when a document is selected and left when the analysis timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
	/// Landing screen.
	Hero,
	/// Waiting for the user to pick or drop a document.
	Upload,
	/// Simulated analysis in flight.
	Analyzing,
	/// Analysis results with language and add-on options.
	Analysis,
	/// Price summary and payment.
	Pricing,
	/// Order placed.
	Confirmation,
}

impl Step {
	/// All steps in flow order.
	pub const ALL: [Step; 6] = [
		Step::Hero,
		Step::Upload,
		Step::Analyzing,
		Step::Analysis,
		Step::Pricing,
		Step::Confirmation,
	];

	/// Whether the step is left automatically by a timer.
	pub fn is_transient(&self) -> bool {
		matches!(self, Step::Analyzing)
	}
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Step::Hero => write!(f, "Hero"),
			Step::Upload => write!(f, "Upload"),
			Step::Analyzing => write!(f, "Analyzing"),
			Step::Analysis => write!(f, "Analysis"),
			Step::Pricing => write!(f, "Pricing"),
			Step::Confirmation => write!(f, "Confirmation"),
		}
	}
}
