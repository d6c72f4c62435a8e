//! Payment module for the translation order flow.
//!
//! A payment provider charges the computed order amount and returns a receipt.
//! No real payment integration ships with the app; the `simulated` provider
//! approves or declines every charge according to its configuration.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use translator_types::{
	truncate_id, ConfigSchema, ImplementationRegistry, PaymentReceipt, PaymentRequest,
};

/// Re-export implementations
pub mod implementations {
	pub mod simulated;
}

/// Errors that can occur during payment processing.
#[derive(Debug, Error)]
pub enum PaymentError {
	/// The provider declined the charge.
	#[error("Payment declined: {0}")]
	Declined(String),
	/// The request is not something the provider can charge.
	#[error("Invalid payment request: {0}")]
	InvalidRequest(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for payment providers.
#[async_trait]
pub trait PaymentInterface: Send + Sync {
	/// Returns the configuration schema for this provider.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Charges the requested amount.
	async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Type alias for payment provider factory functions.
pub type PaymentFactory = fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>;

/// Registry trait for payment provider implementations.
pub trait PaymentRegistry: ImplementationRegistry<Factory = PaymentFactory> {}

/// Get all registered payment provider implementations.
pub fn get_all_implementations() -> Vec<(&'static str, PaymentFactory)> {
	use implementations::simulated;

	vec![(simulated::Registry::NAME, simulated::Registry::factory())]
}

/// Service that routes charges to the primary provider.
pub struct PaymentService {
	implementations: HashMap<String, Arc<dyn PaymentInterface>>,
	primary_implementation: String,
}

impl PaymentService {
	/// Creates a new PaymentService with the given implementations.
	pub fn new(
		implementations: HashMap<String, Arc<dyn PaymentInterface>>,
		primary_implementation: String,
	) -> Result<Self, PaymentError> {
		if !implementations.contains_key(&primary_implementation) {
			return Err(PaymentError::Configuration(format!(
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
	pub fn single(name: impl Into<String>, implementation: Arc<dyn PaymentInterface>) -> Self {
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

	/// Charges an order with the primary provider.
	///
	/// Zero amounts are refused before the provider is called.
	pub async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
		if request.amount == 0 {
			return Err(PaymentError::InvalidRequest("amount must be positive".to_string()));
		}

		let implementation = self
			.implementations
			.get(&self.primary_implementation)
			.ok_or_else(|| {
				PaymentError::Configuration(format!(
					"Primary implementation '{}' not available",
					self.primary_implementation
				))
			})?;

		tracing::info!(
			order_id = %truncate_id(&request.order_id),
			amount = request.amount,
			currency = %request.currency,
			provider = %self.primary_implementation,
			"Charging order"
		);

		let receipt = implementation.charge(request).await?;
		tracing::info!(
			order_id = %truncate_id(&receipt.order_id),
			reference = %receipt.reference,
			"Payment confirmed"
		);
		Ok(receipt)
	}
}

#[cfg(test)]
mod tests {
	use super::implementations::simulated::{SimulatedPayment, SimulatedPaymentConfig};
	use super::*;

	fn request(amount: u32) -> PaymentRequest {
		PaymentRequest {
			order_id: "order-1".to_string(),
			amount,
			currency: "UAH".to_string(),
			language_code: "en".to_string(),
			needs_notary: false,
			needs_stamp: false,
			document_name: None,
		}
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let result = PaymentService::new(HashMap::new(), "simulated".to_string());
		assert!(matches!(result, Err(PaymentError::Configuration(_))));
	}

	#[tokio::test]
	async fn test_zero_amount_refused() {
		let service = PaymentService::single(
			"simulated",
			Arc::new(SimulatedPayment::new(SimulatedPaymentConfig::default())),
		);
		let err = service.charge(&request(0)).await.unwrap_err();
		assert!(matches!(err, PaymentError::InvalidRequest(_)));
	}

	#[tokio::test]
	async fn test_service_charges_primary() {
		let service = PaymentService::single(
			"simulated",
			Arc::new(SimulatedPayment::new(SimulatedPaymentConfig::default())),
		);
		assert_eq!(service.primary(), "simulated");

		let receipt = service.charge(&request(450)).await.unwrap();
		assert_eq!(receipt.amount, 450);
		assert_eq!(receipt.order_id, "order-1");
	}

	#[test]
	fn test_registered_implementations() {
		let names: Vec<_> = get_all_implementations().into_iter().map(|(n, _)| n).collect();
		assert_eq!(names, vec!["simulated"]);
	}
}
