//! Pricing and turnaround calculator for translation orders.
//!
//! Price and turnaround are pure functions of the selected language and the two
//! add-on flags. Nothing here is cached: callers recompute on every read, so the
//! derived values can never drift from their inputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use translator_types::{LanguageOption, CURRENCY};

pub mod format;
pub mod locale;

pub use format::{day_bucket, DayBucket, PluralForms, TurnaroundFormatter};
pub use locale::Locale;

/// Surcharge in UAH for notarization.
pub const NOTARY_SURCHARGE: u32 = 250;
/// Surcharge in UAH for an official stamp.
pub const STAMP_SURCHARGE: u32 = 150;
/// Extra working days added by each add-on.
pub const ADDON_EXTRA_DAYS: u32 = 1;

/// Errors that can occur while setting up pricing.
#[derive(Debug, Error)]
pub enum PricingError {
	/// The configured locale has no turnaround wording.
	#[error("Unknown locale: {0}")]
	UnknownLocale(String),
}

/// Computes the order price in UAH.
pub fn compute_price(language: &LanguageOption, needs_notary: bool, needs_stamp: bool) -> u32 {
	let mut price = language.base_price();
	if needs_notary {
		price += NOTARY_SURCHARGE;
	}
	if needs_stamp {
		price += STAMP_SURCHARGE;
	}
	price
}

/// Computes the turnaround in working days.
pub fn compute_turnaround_days(
	language: &LanguageOption,
	needs_notary: bool,
	needs_stamp: bool,
) -> u32 {
	let extra = u32::from(needs_notary) * ADDON_EXTRA_DAYS + u32::from(needs_stamp) * ADDON_EXTRA_DAYS;
	language.base_turnaround_days() + extra
}

/// Derived price and turnaround for one set of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
	/// Target language code.
	pub language_code: String,
	/// Price in whole currency units.
	pub price: u32,
	/// Currency code.
	pub currency: String,
	/// Turnaround in working days.
	pub turnaround_days: u32,
}

impl Quote {
	/// Builds a quote from the three pricing inputs.
	pub fn new(language: &LanguageOption, needs_notary: bool, needs_stamp: bool) -> Self {
		Self {
			language_code: language.code().to_string(),
			price: compute_price(language, needs_notary, needs_stamp),
			currency: CURRENCY.to_string(),
			turnaround_days: compute_turnaround_days(language, needs_notary, needs_stamp),
		}
	}

	/// Renders the turnaround with the given formatter.
	pub fn turnaround_label(&self, formatter: &dyn TurnaroundFormatter) -> String {
		formatter.format(self.turnaround_days)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use translator_types::{catalog, find_language};

	const FLAGS: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

	#[test]
	fn test_price_over_whole_domain() {
		for language in catalog() {
			for (notary, stamp) in FLAGS {
				let expected = language.base_price() + 250 * u32::from(notary) + 150 * u32::from(stamp);
				assert_eq!(
					compute_price(language, notary, stamp),
					expected,
					"{} notary={} stamp={}",
					language.code(),
					notary,
					stamp
				);
			}
		}
	}

	#[test]
	fn test_turnaround_over_whole_domain() {
		for language in catalog() {
			for (notary, stamp) in FLAGS {
				let expected = language.base_turnaround_days() + u32::from(notary) + u32::from(stamp);
				assert_eq!(compute_turnaround_days(language, notary, stamp), expected);
			}
		}
	}

	#[test]
	fn test_quote_for_german_with_both_addons() {
		let german = find_language("de").unwrap();
		let quote = Quote::new(&german, true, true);

		assert_eq!(quote.price, 920);
		assert_eq!(quote.turnaround_days, 5);
		assert_eq!(quote.currency, "UAH");
		assert_eq!(quote.turnaround_label(&Locale::Uk.turnaround_forms()), "5 робочих днів");
	}

	#[test]
	fn test_quote_for_default_language() {
		let quote = Quote::new(&catalog()[0], false, false);
		assert_eq!(quote.price, 450);
		assert_eq!(quote.turnaround_days, 2);
		assert_eq!(quote.turnaround_label(&Locale::En.turnaround_forms()), "2 working days");
	}
}
