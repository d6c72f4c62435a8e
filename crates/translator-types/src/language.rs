//! The fixed catalog of target languages.
//!
//! The catalog is the only valid domain for a language selection. A
//! [`LanguageOption`] has no public constructor, so every value in circulation
//! is one of the catalog entries.

use serde::Serialize;
use std::fmt;

/// A target language with its base price (UAH) and base turnaround.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LanguageOption {
	code: &'static str,
	name: &'static str,
	base_price: u32,
	base_turnaround_days: u32,
}

impl LanguageOption {
	const fn entry(
		code: &'static str,
		name: &'static str,
		base_price: u32,
		base_turnaround_days: u32,
	) -> Self {
		Self {
			code,
			name,
			base_price,
			base_turnaround_days,
		}
	}

	/// Short language code (e.g. "en").
	pub fn code(&self) -> &'static str {
		self.code
	}

	/// Display name shown in the language picker.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Base price in UAH before add-ons.
	pub fn base_price(&self) -> u32 {
		self.base_price
	}

	/// Working days before add-ons.
	pub fn base_turnaround_days(&self) -> u32 {
		self.base_turnaround_days
	}
}

impl fmt::Display for LanguageOption {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name)
	}
}

static CATALOG: [LanguageOption; 4] = [
	LanguageOption::entry("en", "Англійська", 450, 2),
	LanguageOption::entry("de", "Німецька", 520, 3),
	LanguageOption::entry("pl", "Польська", 430, 2),
	LanguageOption::entry("es", "Іспанська", 480, 2),
];

/// Returns every catalog entry in display order.
pub fn catalog() -> &'static [LanguageOption] {
	&CATALOG
}

/// Returns the first catalog entry, used for fresh and reset orders.
pub fn default_language() -> LanguageOption {
	CATALOG[0]
}

/// Looks up a catalog entry by code or display name (case-insensitive).
pub fn find_language(query: &str) -> Option<LanguageOption> {
	let query = query.trim();
	CATALOG
		.iter()
		.find(|option| {
			option.code.eq_ignore_ascii_case(query) || option.name.to_lowercase() == query.to_lowercase()
		})
		.copied()
}

/// Resolves a selection to a catalog entry, falling back to the default.
pub fn resolve_language(query: &str) -> LanguageOption {
	find_language(query).unwrap_or_else(default_language)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_catalog_entries() {
		let codes: Vec<_> = catalog().iter().map(|l| l.code()).collect();
		assert_eq!(codes, vec!["en", "de", "pl", "es"]);

		let german = find_language("de").unwrap();
		assert_eq!(german.name(), "Німецька");
		assert_eq!(german.base_price(), 520);
		assert_eq!(german.base_turnaround_days(), 3);
	}

	#[test]
	fn test_find_by_name_and_code() {
		assert_eq!(find_language("Польська").unwrap().code(), "pl");
		assert_eq!(find_language("ES").unwrap().name(), "Іспанська");
		assert_eq!(find_language("  en ").unwrap().base_price(), 450);
		assert!(find_language("fr").is_none());
	}

	#[test]
	fn test_unknown_selection_falls_back_to_first_entry() {
		assert_eq!(resolve_language("Klingon"), default_language());
		assert_eq!(resolve_language(""), catalog()[0]);
	}
}
