//! Builder for ordering sessions.
//!
//! Composes an [`OrderSession`] from the configuration and the factory maps of
//! each pluggable component. Every configured implementation with a known
//! factory is created and validated; the section's `primary` selects the one in
//! use.

use crate::flow::OrderFlow;
use crate::session::{OrderSession, ProviderRunner};
use crate::timer::TokioScheduler;
use crate::upload::UploadCollector;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use translator_analysis::{AnalysisError, AnalysisInterface, AnalysisService};
use translator_bridge::{BridgeError, HostBridgeInterface, HostBridgeService};
use translator_config::Config;
use translator_payment::{PaymentError, PaymentInterface, PaymentService};

/// Errors that can occur while building a session.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
	#[error("Runtime error: {0}")]
	Runtime(String),
}

/// Factory functions for each pluggable component, keyed by implementation name.
pub struct SessionFactories<AF, PF, BF> {
	pub analysis_factories: HashMap<String, AF>,
	pub payment_factories: HashMap<String, PF>,
	pub bridge_factories: HashMap<String, BF>,
}

/// Builder for constructing an [`OrderSession`].
pub struct SessionBuilder {
	config: Config,
	bridge_override: Option<Box<dyn HostBridgeInterface>>,
}

impl SessionBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			bridge_override: None,
		}
	}

	/// Uses the given host bridge instead of the configured one.
	pub fn with_bridge(mut self, bridge: Box<dyn HostBridgeInterface>) -> Self {
		self.bridge_override = Some(bridge);
		self
	}

	/// Builds the session. Must run inside a tokio runtime.
	pub async fn build<AF, PF, BF>(
		self,
		factories: SessionFactories<AF, PF, BF>,
	) -> Result<OrderSession, BuilderError>
	where
		AF: Fn(&toml::Value) -> Result<Box<dyn AnalysisInterface>, AnalysisError>,
		PF: Fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>,
		BF: Fn(&toml::Value) -> Result<Box<dyn HostBridgeInterface>, BridgeError>,
	{
		let runtime = tokio::runtime::Handle::try_current()
			.map_err(|e| BuilderError::Runtime(e.to_string()))?;

		// Create analysis implementations
		let mut analysis_impls: HashMap<String, Arc<dyn AnalysisInterface>> = HashMap::new();
		for (name, config) in &self.config.analysis.implementations {
			let Some(factory) = factories.analysis_factories.get(name) else {
				tracing::warn!(component = "analysis", implementation = %name, "No factory registered, skipping");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					// Validate the configuration using the implementation's schema
					if let Err(e) = implementation.config_schema().validate(config) {
						tracing::error!(
							component = "analysis",
							implementation = %name,
							error = %e,
							"Invalid configuration for analysis implementation"
						);
						return Err(BuilderError::Config(format!(
							"Invalid configuration for analysis implementation '{}': {}",
							name, e
						)));
					}
					let is_primary = &self.config.analysis.primary == name;
					tracing::info!(component = "analysis", implementation = %name, enabled = %is_primary, "Loaded");
					analysis_impls.insert(name.clone(), Arc::from(implementation));
				},
				Err(e) => {
					tracing::error!(
						component = "analysis",
						implementation = %name,
						error = %e,
						"Failed to create analysis implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create analysis implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		if analysis_impls.is_empty() {
			return Err(BuilderError::MissingComponent(
				"No analysis implementations available".into(),
			));
		}

		let analysis = AnalysisService::new(analysis_impls, self.config.analysis.primary.clone())
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		// Create payment implementations
		let mut payment_impls: HashMap<String, Arc<dyn PaymentInterface>> = HashMap::new();
		for (name, config) in &self.config.payment.implementations {
			let Some(factory) = factories.payment_factories.get(name) else {
				tracing::warn!(component = "payment", implementation = %name, "No factory registered, skipping");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					// Validate the configuration using the implementation's schema
					if let Err(e) = implementation.config_schema().validate(config) {
						tracing::error!(
							component = "payment",
							implementation = %name,
							error = %e,
							"Invalid configuration for payment implementation"
						);
						return Err(BuilderError::Config(format!(
							"Invalid configuration for payment implementation '{}': {}",
							name, e
						)));
					}
					let is_primary = &self.config.payment.primary == name;
					tracing::info!(component = "payment", implementation = %name, enabled = %is_primary, "Loaded");
					payment_impls.insert(name.clone(), Arc::from(implementation));
				},
				Err(e) => {
					tracing::error!(
						component = "payment",
						implementation = %name,
						error = %e,
						"Failed to create payment implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create payment implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		if payment_impls.is_empty() {
			return Err(BuilderError::MissingComponent(
				"No payment implementations available".into(),
			));
		}

		let payment = PaymentService::new(payment_impls, self.config.payment.primary.clone())
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		// Host bridge is optional
		let bridge = match (self.bridge_override, &self.config.bridge.primary) {
			(Some(bridge), _) => {
				tracing::info!(component = "bridge", implementation = "injected", "Loaded");
				Some(bridge)
			},
			(None, Some(name)) => {
				let factory = factories.bridge_factories.get(name).ok_or_else(|| {
					BuilderError::MissingComponent(format!("No factory for host bridge '{}'", name))
				})?;
				let empty = toml::Value::Table(toml::map::Map::new());
				let config = self.config.bridge.implementations.get(name).unwrap_or(&empty);
				let bridge = factory(config).map_err(|e| {
					BuilderError::Config(format!(
						"Failed to create host bridge '{}': {}",
						name, e
					))
				})?;
				bridge.config_schema().validate(config).map_err(|e| {
					BuilderError::Config(format!(
						"Invalid configuration for host bridge '{}': {}",
						name, e
					))
				})?;
				tracing::info!(component = "bridge", implementation = %name, "Loaded");
				Some(bridge)
			},
			(None, None) => {
				tracing::info!(component = "bridge", "No host bridge configured, running standalone");
				None
			},
		};

		let (event_tx, event_rx) = mpsc::unbounded_channel();
		let runner = Arc::new(ProviderRunner::new(Arc::new(analysis), Arc::new(payment)));
		let scheduler = Arc::new(TokioScheduler::new(runtime, runner, event_tx));
		let flow = OrderFlow::new(scheduler, self.config.flow.clone());

		Ok(OrderSession::new(
			flow,
			UploadCollector::new(self.config.upload.clone()),
			HostBridgeService::new(bridge),
			self.config.app.locale,
			event_rx,
		))
	}
}
