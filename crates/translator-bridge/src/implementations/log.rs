//! Host bridge that reports each call through `tracing`.
//!
//! Stands in for the container during standalone development, so the calls a
//! real host would receive are visible in the logs.

use crate::{BridgeError, BridgeFactory, BridgeRegistry, HostBridgeInterface};
use translator_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};

/// Logging host bridge.
pub struct LogBridge {
	label: String,
}

impl LogBridge {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
		}
	}
}

impl HostBridgeInterface for LogBridge {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogBridgeSchema)
	}

	fn ready(&self) -> Result<(), BridgeError> {
		tracing::info!(host = %self.label, "ready");
		Ok(())
	}

	fn expand(&self) -> Result<(), BridgeError> {
		tracing::info!(host = %self.label, "expand");
		Ok(())
	}

	fn send_data(&self, data: &str) -> Result<(), BridgeError> {
		tracing::info!(host = %self.label, data = %data, "sendData");
		Ok(())
	}

	fn show_alert(&self, message: &str) -> Result<(), BridgeError> {
		tracing::info!(host = %self.label, message = %message, "showAlert");
		Ok(())
	}

	fn close(&self) -> Result<(), BridgeError> {
		tracing::info!(host = %self.label, "close");
		Ok(())
	}
}

/// Configuration schema for LogBridge.
pub struct LogBridgeSchema;

impl ConfigSchema for LogBridgeSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("label", FieldType::String)]);
		schema.validate(config)
	}
}

/// Registry for the logging bridge implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = BridgeFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn HostBridgeInterface>, BridgeError> {
			LogBridgeSchema
				.validate(config)
				.map_err(|e| BridgeError::Configuration(format!("Invalid log bridge config: {}", e)))?;

			let label = config
				.get("label")
				.and_then(|v| v.as_str())
				.unwrap_or("webapp");
			Ok(Box::new(LogBridge::new(label)))
		}
	}
}

impl BridgeRegistry for Registry {}
