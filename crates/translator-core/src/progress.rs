//! Progress indicator mapping.
//!
//! The indicator has five positions. `Analyzing` has none of its own and is shown
//! at the position of `Upload`.

use translator_pricing::Locale;
use translator_types::Step;

/// Steps that own a position in the progress indicator, in order.
pub const PROGRESS_STEPS: [Step; 5] = [
	Step::Hero,
	Step::Upload,
	Step::Analysis,
	Step::Pricing,
	Step::Confirmation,
];

/// Zero-based indicator position for a step.
pub fn progress_index(step: Step) -> usize {
	match step {
		Step::Hero => 0,
		Step::Upload | Step::Analyzing => 1,
		Step::Analysis => 2,
		Step::Pricing => 3,
		Step::Confirmation => 4,
	}
}

/// Indicator caption for a step.
pub fn progress_label(step: Step, locale: Locale) -> &'static str {
	const UK: [&str; 5] = ["Початок", "Завантаження", "Результати", "Оплата", "Готово"];
	const EN: [&str; 5] = ["Start", "Upload", "Results", "Payment", "Done"];

	let labels = match locale {
		Locale::Uk => &UK,
		Locale::En => &EN,
	};
	labels[progress_index(step)]
}
