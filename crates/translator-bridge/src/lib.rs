//! Host bridge module for the translation order flow.
//!
//! When the app runs inside a chat-platform mini-app container, the container
//! supplies a bridge with lifecycle and messaging operations. The bridge is
//! optional: outside a container every operation of [`HostBridgeService`]
//! degrades to a no-op so the flow can run standalone.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use translator_types::{ConfigSchema, ImplementationRegistry};

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod memory;
}

/// Errors that can occur during host bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// The host refused or failed an operation.
	#[error("Host error: {0}")]
	Host(String),
	/// The outbound payload could not be serialized.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Capabilities exposed by a host container.
pub trait HostBridgeInterface: Send + Sync {
	/// Returns the configuration schema for this bridge implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Tells the host the app has loaded.
	fn ready(&self) -> Result<(), BridgeError>;

	/// Asks the host to give the app its full height.
	fn expand(&self) -> Result<(), BridgeError>;

	/// Sends a string payload to the host's bot backend.
	fn send_data(&self, data: &str) -> Result<(), BridgeError>;

	/// Shows a native alert.
	fn show_alert(&self, message: &str) -> Result<(), BridgeError>;

	/// Closes the app.
	fn close(&self) -> Result<(), BridgeError>;
}

/// Type alias for host bridge factory functions.
pub type BridgeFactory = fn(&toml::Value) -> Result<Box<dyn HostBridgeInterface>, BridgeError>;

/// Registry trait for host bridge implementations.
pub trait BridgeRegistry: ImplementationRegistry<Factory = BridgeFactory> {}

/// Get all registered host bridge implementations.
pub fn get_all_implementations() -> Vec<(&'static str, BridgeFactory)> {
	use implementations::{log, memory};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Payload sent to the host when the order is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidPayload {
	pub status: String,
	pub message: String,
}

impl PaidPayload {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			status: "paid".to_string(),
			message: message.into(),
		}
	}
}

/// Facade over an optional host bridge.
pub struct HostBridgeService {
	bridge: Option<Box<dyn HostBridgeInterface>>,
	bootstrapped: AtomicBool,
}

impl HostBridgeService {
	/// Creates the service around an injected bridge, if any.
	pub fn new(bridge: Option<Box<dyn HostBridgeInterface>>) -> Self {
		Self {
			bridge,
			bootstrapped: AtomicBool::new(false),
		}
	}

	/// Creates a service with no host attached.
	pub fn absent() -> Self {
		Self::new(None)
	}

	/// Whether a host bridge is attached.
	pub fn is_present(&self) -> bool {
		self.bridge.is_some()
	}

	/// Signals readiness and expands the container.
	///
	/// Runs once per service. Later calls do nothing once a bootstrap has
	/// succeeded; a failed one may be retried.
	pub fn bootstrap(&self) -> Result<(), BridgeError> {
		let Some(bridge) = &self.bridge else {
			return Ok(());
		};

		if self.bootstrapped.load(Ordering::SeqCst) {
			tracing::warn!("Host bridge already bootstrapped, ignoring");
			return Ok(());
		}

		bridge.ready()?;
		bridge.expand()?;
		self.bootstrapped.store(true, Ordering::SeqCst);
		tracing::debug!("Host bridge ready");
		Ok(())
	}

	/// Reports the result to the host and closes the app.
	///
	/// With a message, sends `{"status":"paid","message":...}` and shows it as an
	/// alert first. `close` is always attempted last; the first error seen is
	/// returned after it runs.
	pub fn close(&self, message: Option<&str>) -> Result<(), BridgeError> {
		let Some(bridge) = &self.bridge else {
			return Ok(());
		};

		let mut first_error = None;

		if let Some(message) = message {
			let sent = serde_json::to_string(&PaidPayload::new(message))
				.map_err(|e| BridgeError::Serialization(e.to_string()))
				.and_then(|payload| bridge.send_data(&payload));
			if let Err(e) = sent {
				tracing::warn!(error = %e, "Failed to deliver result to host");
				first_error = Some(e);
			}

			if let Err(e) = bridge.show_alert(message) {
				tracing::warn!(error = %e, "Failed to show alert");
				first_error.get_or_insert(e);
			}
		}

		if let Err(e) = bridge.close() {
			tracing::warn!(error = %e, "Failed to close host container");
			first_error.get_or_insert(e);
		}

		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}
