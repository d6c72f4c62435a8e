//! In-memory host bridge.
//!
//! Records every call in order. Useful for tests and for embedding the flow in
//! a host that inspects the calls afterwards.

use crate::{BridgeError, BridgeFactory, BridgeRegistry, HostBridgeInterface};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use translator_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};

/// A call received by [`MemoryBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
	Ready,
	Expand,
	SendData(String),
	ShowAlert(String),
	Close,
}

/// Shared view of the calls recorded by a [`MemoryBridge`].
#[derive(Debug, Clone, Default)]
pub struct BridgeCalls(Arc<Mutex<Vec<BridgeCall>>>);

impl BridgeCalls {
	/// Copies the recorded calls.
	pub fn snapshot(&self) -> Vec<BridgeCall> {
		self.0.lock().map(|calls| calls.clone()).unwrap_or_default()
	}

	fn push(&self, call: BridgeCall) -> Result<(), BridgeError> {
		self.0
			.lock()
			.map_err(|e| BridgeError::Host(format!("call log poisoned: {}", e)))?
			.push(call);
		Ok(())
	}
}

/// Host bridge that records calls in memory.
pub struct MemoryBridge {
	calls: BridgeCalls,
	reject_data: bool,
	ready_failures: AtomicUsize,
}

impl MemoryBridge {
	pub fn new() -> Self {
		Self {
			calls: BridgeCalls::default(),
			reject_data: false,
			ready_failures: AtomicUsize::new(0),
		}
	}

	/// A bridge whose first `failures` calls to `ready` fail, as a host that
	/// is still loading would.
	pub fn failing_ready(failures: usize) -> Self {
		Self {
			ready_failures: AtomicUsize::new(failures),
			..Self::new()
		}
	}

	/// A bridge whose `send_data` always fails, as a host would without a bot.
	pub fn rejecting_data() -> Self {
		Self {
			reject_data: true,
			..Self::new()
		}
	}

	/// Returns a handle for inspecting calls after the bridge is moved.
	pub fn calls_handle(&self) -> BridgeCalls {
		self.calls.clone()
	}
}

impl Default for MemoryBridge {
	fn default() -> Self {
		Self::new()
	}
}

impl HostBridgeInterface for MemoryBridge {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryBridgeSchema)
	}

	fn ready(&self) -> Result<(), BridgeError> {
		let remaining = self
			.ready_failures
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
		if remaining.is_ok() {
			return Err(BridgeError::Host("host not ready".to_string()));
		}
		self.calls.push(BridgeCall::Ready)
	}

	fn expand(&self) -> Result<(), BridgeError> {
		self.calls.push(BridgeCall::Expand)
	}

	fn send_data(&self, data: &str) -> Result<(), BridgeError> {
		if self.reject_data {
			return Err(BridgeError::Host("host does not accept data".to_string()));
		}
		self.calls.push(BridgeCall::SendData(data.to_string()))
	}

	fn show_alert(&self, message: &str) -> Result<(), BridgeError> {
		self.calls.push(BridgeCall::ShowAlert(message.to_string()))
	}

	fn close(&self) -> Result<(), BridgeError> {
		self.calls.push(BridgeCall::Close)
	}
}

/// Configuration schema for MemoryBridge.
pub struct MemoryBridgeSchema;

impl ConfigSchema for MemoryBridgeSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("reject_data", FieldType::Boolean)]);
		schema.validate(config)
	}
}

/// Registry for the memory bridge implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = BridgeFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn HostBridgeInterface>, BridgeError> {
			MemoryBridgeSchema
				.validate(config)
				.map_err(|e| BridgeError::Configuration(format!("Invalid memory bridge config: {}", e)))?;

			let reject_data = config
				.get("reject_data")
				.and_then(|v| v.as_bool())
				.unwrap_or(false);

			let bridge = if reject_data {
				MemoryBridge::rejecting_data()
			} else {
				MemoryBridge::new()
			};
			Ok(Box::new(bridge))
		}
	}
}

impl BridgeRegistry for Registry {}
