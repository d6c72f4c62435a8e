//! Turnaround label formatting.
//!
//! Day counts fall into three fixed buckets: exactly one day, five or more days,
//! and everything else. The wording for each bucket comes from a
//! [`TurnaroundFormatter`], so a locale only has to supply three templates.

use serde::{Deserialize, Serialize};

/// Grammatical bucket for a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBucket {
	/// Exactly one day.
	Singular,
	/// 2-4 days (and 0).
	Few,
	/// Five or more days.
	Many,
}

/// Classifies a day count. The rule is fixed and not locale dependent.
pub fn day_bucket(days: u32) -> DayBucket {
	if days == 1 {
		DayBucket::Singular
	} else if days >= 5 {
		DayBucket::Many
	} else {
		DayBucket::Few
	}
}

/// Renders a turnaround in working days as a user-facing label.
pub trait TurnaroundFormatter: Send + Sync {
	fn format(&self, days: u32) -> String;
}

/// Three `{days}` templates, one per [`DayBucket`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralForms {
	pub singular: String,
	pub few: String,
	pub many: String,
}

impl PluralForms {
	pub fn new(singular: impl Into<String>, few: impl Into<String>, many: impl Into<String>) -> Self {
		Self {
			singular: singular.into(),
			few: few.into(),
			many: many.into(),
		}
	}

	fn template(&self, bucket: DayBucket) -> &str {
		match bucket {
			DayBucket::Singular => &self.singular,
			DayBucket::Few => &self.few,
			DayBucket::Many => &self.many,
		}
	}
}

impl TurnaroundFormatter for PluralForms {
	fn format(&self, days: u32) -> String {
		self.template(day_bucket(days)).replace("{days}", &days.to_string())
	}
}
