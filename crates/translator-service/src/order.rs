//! Scripted walk through one order.

use std::error::Error;
use std::path::PathBuf;
use translator_core::OrderSession;
use translator_types::{FlowEvent, SelectedFile, Step};

/// What the user picks along the way.
#[derive(Debug, Clone)]
pub struct OrderOptions {
	pub file: PathBuf,
	pub language: String,
	pub needs_notary: bool,
	pub needs_stamp: bool,
}

/// Places an order: upload, analysis, options, payment, confirmation.
///
/// Stops at the first step that ends up showing a failure.
pub async fn run(session: &mut OrderSession, options: &OrderOptions) -> Result<(), Box<dyn Error>> {
	session.start()?;
	session.dispatch(FlowEvent::Start)?;

	let file = SelectedFile::from_path(&options.file)?;
	session.select_files([file])?;
	expect_step(session, Step::Analyzing)?;

	session.settle().await?;
	expect_step(session, Step::Analysis)?;

	if let Some(report) = session.view().analysis {
		tracing::info!(
			document_type = %report.document_type,
			language = %report.detected_language,
			source = %report.source,
			"Document analyzed"
		);
		for finding in &report.findings {
			tracing::info!(finding = %finding, "Finding");
		}
	}

	session.dispatch(FlowEvent::SelectLanguage(options.language.clone()))?;
	session.dispatch(FlowEvent::SetNotary(options.needs_notary))?;
	session.dispatch(FlowEvent::SetStamp(options.needs_stamp))?;

	let view = session.view();
	tracing::info!(
		language = view.language_code,
		price = view.price,
		currency = view.currency,
		turnaround = %view.turnaround_label,
		"Order configured"
	);

	session.dispatch(FlowEvent::RequestPricing)?;
	session.dispatch(FlowEvent::Pay)?;
	session.settle().await?;
	expect_step(session, Step::Confirmation)?;

	let summary = serde_json::to_string(&session.view())?;
	tracing::debug!(view = %summary, "Final order");
	session.complete()?;
	Ok(())
}

/// Fails with the shown failure, or a generic message, unless on `step`.
fn expect_step(session: &OrderSession, step: Step) -> Result<(), Box<dyn Error>> {
	let view = session.view();
	if view.step == step {
		return Ok(());
	}

	Err(view
		.failure
		.unwrap_or_else(|| format!("expected step {}, flow is on {}", step, view.step))
		.into())
}
