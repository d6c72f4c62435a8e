//! Document analysis results.

use serde::{Deserialize, Serialize};

/// Wire format returned by the upload endpoint (`POST /api/upload`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
	/// Detected document type (e.g. "Marriage certificate").
	pub document_type: String,
	/// Detected source language.
	pub language: String,
	/// Estimated price in UAH.
	pub price: f64,
	/// Human readable turnaround estimate.
	pub time: String,
}

/// Analysis results shown on the `Analysis` step.
///
/// The estimate fields are informational. The order price always comes from
/// the pricing calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
	/// Detected document type.
	pub document_type: String,
	/// Detected source language.
	pub detected_language: String,
	/// Page count, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pages: Option<u32>,
	/// Provider-side price estimate in UAH.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_price: Option<u32>,
	/// Provider-side turnaround estimate.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_time: Option<String>,
	/// Notable elements found in the document.
	#[serde(default)]
	pub findings: Vec<String>,
	/// Implementation that produced the report (e.g. "simulated", "http").
	pub source: String,
}

impl AnalysisReport {
	/// Converts an upload endpoint response into a report.
	pub fn from_response(response: AnalysisResponse, source: impl Into<String>) -> Self {
		let estimated_price = if response.price.is_finite() && response.price >= 0.0 {
			Some(response.price.round() as u32)
		} else {
			None
		};

		Self {
			document_type: response.document_type,
			detected_language: response.language,
			pages: None,
			estimated_price,
			estimated_time: Some(response.time).filter(|t| !t.is_empty()),
			findings: Vec::new(),
			source: source.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_report_from_response() {
		let response: AnalysisResponse = serde_json::from_str(
			r#"{"document_type":"Passport","language":"Ukrainian","price":449.6,"time":"2 days"}"#,
		)
		.unwrap();

		let report = AnalysisReport::from_response(response, "http");
		assert_eq!(report.document_type, "Passport");
		assert_eq!(report.detected_language, "Ukrainian");
		assert_eq!(report.estimated_price, Some(450));
		assert_eq!(report.estimated_time.as_deref(), Some("2 days"));
		assert_eq!(report.source, "http");
	}

	#[test]
	fn test_negative_price_is_dropped() {
		let response = AnalysisResponse {
			document_type: "Diploma".into(),
			language: "Polish".into(),
			price: -1.0,
			time: String::new(),
		};

		let report = AnalysisReport::from_response(response, "http");
		assert_eq!(report.estimated_price, None);
		assert_eq!(report.estimated_time, None);
	}
}
