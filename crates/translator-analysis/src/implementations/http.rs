//! HTTP analysis provider.
//!
//! Posts the document as multipart field `file` to `{base_url}/api/upload` and
//! expects `{ document_type, language, price, time }` back. Any non-2xx status is
//! a generic failure; there is no error body schema.

use crate::{AnalysisError, AnalysisFactory, AnalysisInterface, AnalysisRegistry};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use translator_types::{
	AnalysisReport, AnalysisResponse, ConfigSchema, DocumentRef, Field, FieldType,
	ImplementationRegistry, Schema, ValidationError,
};

const UPLOAD_PATH: &str = "/api/upload";

/// Analysis provider backed by the upload endpoint.
pub struct HttpAnalysis {
	client: reqwest::Client,
	base_url: String,
}

impl HttpAnalysis {
	/// Creates a provider for the given base URL.
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| AnalysisError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.into(),
		})
	}

	fn upload_url(&self) -> String {
		format!("{}{}", self.base_url.trim_end_matches('/'), UPLOAD_PATH)
	}

	async fn build_form(&self, document: &DocumentRef) -> Result<Form, AnalysisError> {
		let path = document.path.as_ref().ok_or_else(|| {
			AnalysisError::DocumentUnavailable(format!("{} has no local path", document.name))
		})?;

		let bytes = tokio::fs::read(path)
			.await
			.map_err(|e| AnalysisError::DocumentUnavailable(format!("{}: {}", path.display(), e)))?;

		let part = Part::bytes(bytes)
			.file_name(document.name.clone())
			.mime_str(&document.mime)
			.map_err(|e| AnalysisError::DocumentUnavailable(format!("Invalid MIME type: {}", e)))?;

		Ok(Form::new().part("file", part))
	}
}

#[async_trait]
impl AnalysisInterface for HttpAnalysis {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpAnalysisSchema)
	}

	async fn analyze(&self, document: &DocumentRef) -> Result<AnalysisReport, AnalysisError> {
		let form = self.build_form(document).await?;
		let url = self.upload_url();

		let response = self
			.client
			.post(&url)
			.multipart(form)
			.send()
			.await
			.map_err(|e| AnalysisError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			tracing::warn!(url = %url, status = %status, "Analysis request rejected");
			return Err(AnalysisError::Rejected {
				status: status.as_u16(),
			});
		}

		let body: AnalysisResponse = response
			.json()
			.await
			.map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

		Ok(AnalysisReport::from_response(body, Registry::NAME))
	}
}

/// Configuration schema for HttpAnalysis.
pub struct HttpAnalysisSchema;

impl ConfigSchema for HttpAnalysisSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String).with_validator(|value| {
				let url = value.as_str().unwrap_or_default();
				if url.starts_with("http://") || url.starts_with("https://") {
					Ok(())
				} else {
					Err(format!("'{}' is not an http(s) URL", url))
				}
			})],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP analysis provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = AnalysisFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn AnalysisInterface>, AnalysisError> {
			HttpAnalysisSchema
				.validate(config)
				.map_err(|e| AnalysisError::Configuration(format!("Invalid http analysis config: {}", e)))?;

			let base_url = config
				.get("base_url")
				.and_then(|v| v.as_str())
				.ok_or_else(|| AnalysisError::Configuration("base_url is required".into()))?;
			let timeout_seconds = config
				.get("timeout_seconds")
				.and_then(|v| v.as_integer())
				.unwrap_or(30) as u64;

			Ok(Box::new(HttpAnalysis::new(
				base_url,
				Duration::from_secs(timeout_seconds),
			)?))
		}
	}
}

impl AnalysisRegistry for Registry {}
