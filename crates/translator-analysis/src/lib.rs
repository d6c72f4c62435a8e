//! Document analysis module for the translation order flow.
//!
//! An analysis provider receives the uploaded document and reports its type,
//! detected language and a few notable findings. The `simulated` provider
//! returns fixed results; the `http` provider posts the file to the upload
//! endpoint of a real analysis backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use translator_types::{AnalysisReport, ConfigSchema, DocumentRef, ImplementationRegistry};

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod simulated;
}

/// Errors that can occur during document analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
	/// Error that occurs during network communication with the backend.
	#[error("Network error: {0}")]
	Network(String),
	/// The backend answered with a non-success status.
	#[error("Analysis rejected with status {status}")]
	Rejected { status: u16 },
	/// The backend answered with a body that is not a valid analysis.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The document could not be read.
	#[error("Document unavailable: {0}")]
	DocumentUnavailable(String),
	/// The provider could not analyze the document.
	#[error("Analysis failed: {0}")]
	Failed(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for analysis providers.
#[async_trait]
pub trait AnalysisInterface: Send + Sync {
	/// Returns the configuration schema for this provider.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Analyzes a document.
	async fn analyze(&self, document: &DocumentRef) -> Result<AnalysisReport, AnalysisError>;
}

/// Type alias for analysis provider factory functions.
pub type AnalysisFactory = fn(&toml::Value) -> Result<Box<dyn AnalysisInterface>, AnalysisError>;

/// Registry trait for analysis provider implementations.
pub trait AnalysisRegistry: ImplementationRegistry<Factory = AnalysisFactory> {}

/// Get all registered analysis provider implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AnalysisFactory)> {
	use implementations::{http, simulated};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(simulated::Registry::NAME, simulated::Registry::factory()),
	]
}

/// Service that routes analysis requests to the primary provider.
pub struct AnalysisService {
	/// Map of implementation names to their interfaces.
	implementations: HashMap<String, Arc<dyn AnalysisInterface>>,
	/// The implementation used for analysis.
	primary_implementation: String,
}

impl AnalysisService {
	/// Creates a new AnalysisService with the given implementations.
	pub fn new(
		implementations: HashMap<String, Arc<dyn AnalysisInterface>>,
		primary_implementation: String,
	) -> Result<Self, AnalysisError> {
		if !implementations.contains_key(&primary_implementation) {
			return Err(AnalysisError::Configuration(format!(
				"Primary implementation '{}' not found in available implementations",
				primary_implementation
			)));
		}

		Ok(Self {
			implementations,
			primary_implementation,
		})
	}

	/// Creates a service backed by a single provider.
	pub fn single(name: impl Into<String>, implementation: Arc<dyn AnalysisInterface>) -> Self {
		let name = name.into();
		Self {
			implementations: HashMap::from([(name.clone(), implementation)]),
			primary_implementation: name,
		}
	}

	/// Name of the provider in use.
	pub fn primary(&self) -> &str {
		&self.primary_implementation
	}

	/// Analyzes a document with the primary provider.
	pub async fn analyze(&self, document: &DocumentRef) -> Result<AnalysisReport, AnalysisError> {
		let implementation = self
			.implementations
			.get(&self.primary_implementation)
			.ok_or_else(|| {
				AnalysisError::Configuration(format!(
					"Primary implementation '{}' not available",
					self.primary_implementation
				))
			})?;

		tracing::debug!(provider = %self.primary_implementation, document = %document.name, "Analyzing document");
		implementation.analyze(document).await
	}
}

#[cfg(test)]
mod tests {
	use super::implementations::simulated::SimulatedAnalysis;
	use super::*;

	fn document() -> DocumentRef {
		DocumentRef {
			name: "certificate.pdf".to_string(),
			mime: "application/pdf".to_string(),
			size: 1024,
			path: None,
		}
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let result = AnalysisService::new(HashMap::new(), "http".to_string());
		assert!(matches!(result, Err(AnalysisError::Configuration(_))));
	}

	#[tokio::test]
	async fn test_service_uses_primary() {
		let service = AnalysisService::single("simulated", Arc::new(SimulatedAnalysis::default()));
		assert_eq!(service.primary(), "simulated");

		let report = service.analyze(&document()).await.unwrap();
		assert_eq!(report.source, "simulated");
	}
}
