//! Locale presets for user-facing wording.

use crate::{PluralForms, PricingError, Quote, TurnaroundFormatter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use translator_types::LanguageOption;

/// Locales with built-in wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
	/// Ukrainian, the mini app's primary locale.
	#[default]
	Uk,
	/// English.
	En,
}

impl Locale {
	/// Turnaround wording for this locale.
	pub fn turnaround_forms(&self) -> PluralForms {
		match self {
			Locale::Uk => PluralForms::new("1 робочий день", "{days} робочі дні", "{days} робочих днів"),
			Locale::En => PluralForms::new("1 working day", "{days} working days", "{days} working days"),
		}
	}

	/// Message handed to the host once the order is paid.
	pub fn paid_message(&self, language: &LanguageOption, quote: &Quote) -> String {
		let turnaround = self.turnaround_forms().format(quote.turnaround_days);
		match self {
			Locale::Uk => format!(
				"Замовлення оплачено: переклад ({}), {} грн, термін {}.",
				language.name(),
				quote.price,
				turnaround
			),
			Locale::En => format!(
				"Order paid: {} translation, {} {}, ready in {}.",
				language.code().to_uppercase(),
				quote.price,
				quote.currency,
				turnaround
			),
		}
	}
}

impl FromStr for Locale {
	type Err = PricingError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"uk" | "uk-ua" | "ua" => Ok(Locale::Uk),
			"en" | "en-us" | "en-gb" => Ok(Locale::En),
			other => Err(PricingError::UnknownLocale(other.to_string())),
		}
	}
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Locale::Uk => write!(f, "uk"),
			Locale::En => write!(f, "en"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use translator_types::find_language;

	#[test]
	fn test_parse_locale() {
		assert_eq!("uk".parse::<Locale>().unwrap(), Locale::Uk);
		assert_eq!("EN-GB".parse::<Locale>().unwrap(), Locale::En);
		assert!(matches!(
			"fr".parse::<Locale>(),
			Err(PricingError::UnknownLocale(l)) if l == "fr"
		));
	}

	#[test]
	fn test_paid_message() {
		let polish = find_language("pl").unwrap();
		let quote = Quote::new(&polish, true, false);

		assert_eq!(
			Locale::Uk.paid_message(&polish, &quote),
			"Замовлення оплачено: переклад (Польська), 680 грн, термін 3 робочі дні."
		);
		assert_eq!(
			Locale::En.paid_message(&polish, &quote),
			"Order paid: PL translation, 680 UAH, ready in 3 working days."
		);
	}
}
