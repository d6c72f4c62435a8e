//! Simulated analysis provider.
//!
//! Returns the same report for every document, so the flow can be demonstrated
//! without an analysis backend. A failure message can be configured to exercise
//! the retry path.

use crate::{AnalysisError, AnalysisFactory, AnalysisInterface, AnalysisRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use translator_types::{
	AnalysisReport, ConfigSchema, DocumentRef, ImplementationRegistry, ValidationError,
};

/// Configuration for the simulated provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedAnalysisConfig {
	/// Document type reported for every upload.
	#[serde(default = "default_document_type")]
	pub document_type: String,
	/// Source language reported for every upload.
	#[serde(default = "default_detected_language")]
	pub detected_language: String,
	/// Page count reported for every upload.
	#[serde(default = "default_pages")]
	pub pages: u32,
	/// When set, every analysis fails with this message.
	#[serde(default)]
	pub fail_with: Option<String>,
}

fn default_document_type() -> String {
	"Свідоцтво про шлюб".to_string()
}

fn default_detected_language() -> String {
	"Українська".to_string()
}

fn default_pages() -> u32 {
	2
}

impl Default for SimulatedAnalysisConfig {
	fn default() -> Self {
		Self {
			document_type: default_document_type(),
			detected_language: default_detected_language(),
			pages: default_pages(),
			fail_with: None,
		}
	}
}

impl ConfigSchema for SimulatedAnalysisConfig {
	fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
		if self.pages == 0 {
			return Err(ValidationError::InvalidValue {
				field: "pages".to_string(),
				message: "must be at least 1".to_string(),
			});
		}
		if self.document_type.trim().is_empty() {
			return Err(ValidationError::InvalidValue {
				field: "document_type".to_string(),
				message: "cannot be empty".to_string(),
			});
		}
		Ok(())
	}
}

/// Analysis provider with fixed results.
#[derive(Default)]
pub struct SimulatedAnalysis {
	config: SimulatedAnalysisConfig,
}

impl SimulatedAnalysis {
	pub fn new(config: SimulatedAnalysisConfig) -> Self {
		Self { config }
	}

	fn findings(&self) -> Vec<String> {
		vec![
			format!("{} сторінки, кольоровий скан з чітким текстом", self.config.pages),
			"Наявні підписи та печаті, що потребують перекладу".to_string(),
			"Формат відповідає вимогам для подачі в консульство".to_string(),
		]
	}
}

#[async_trait]
impl AnalysisInterface for SimulatedAnalysis {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(self.config.clone())
	}

	async fn analyze(&self, document: &DocumentRef) -> Result<AnalysisReport, AnalysisError> {
		if let Some(message) = &self.config.fail_with {
			return Err(AnalysisError::Failed(message.clone()));
		}

		tracing::debug!(document = %document.name, "Simulated analysis");

		Ok(AnalysisReport {
			document_type: self.config.document_type.clone(),
			detected_language: self.config.detected_language.clone(),
			pages: Some(self.config.pages),
			estimated_price: None,
			estimated_time: None,
			findings: self.findings(),
			source: Registry::NAME.to_string(),
		})
	}
}

/// Registry for the simulated analysis provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "simulated";
	type Factory = AnalysisFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn AnalysisInterface>, AnalysisError> {
			let simulated: SimulatedAnalysisConfig = config.clone().try_into().map_err(|e| {
				AnalysisError::Configuration(format!("Invalid simulated analysis config: {}", e))
			})?;
			simulated
				.validate(config)
				.map_err(|e| AnalysisError::Configuration(e.to_string()))?;

			Ok(Box::new(SimulatedAnalysis::new(simulated)))
		}
	}
}

impl AnalysisRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn document() -> DocumentRef {
		DocumentRef {
			name: "scan.png".to_string(),
			mime: "image/png".to_string(),
			size: 2048,
			path: None,
		}
	}

	#[tokio::test]
	async fn test_fixed_report() {
		let provider = SimulatedAnalysis::default();
		let report = provider.analyze(&document()).await.unwrap();

		assert_eq!(report.document_type, "Свідоцтво про шлюб");
		assert_eq!(report.pages, Some(2));
		assert_eq!(report.findings.len(), 3);
		assert!(report.findings[0].starts_with("2 сторінки"));
		assert_eq!(report.source, "simulated");
	}

	#[tokio::test]
	async fn test_configured_failure() {
		let config: toml::Value = toml::from_str(r#"fail_with = "scan is unreadable""#).unwrap();
		let provider = Registry::factory()(&config).unwrap();

		let err = provider.analyze(&document()).await.unwrap_err();
		assert!(matches!(err, AnalysisError::Failed(m) if m == "scan is unreadable"));
	}

	#[test]
	fn test_zero_pages_rejected() {
		let config: toml::Value = toml::from_str("pages = 0").unwrap();
		assert!(matches!(
			Registry::factory()(&config),
			Err(AnalysisError::Configuration(_))
		));
	}
}
