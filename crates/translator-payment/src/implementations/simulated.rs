//! Simulated payment provider.

use crate::{PaymentError, PaymentFactory, PaymentInterface, PaymentRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use translator_types::{
	current_timestamp, ConfigSchema, ImplementationRegistry, PaymentReceipt, PaymentRequest,
	ValidationError,
};

/// What the simulated provider does with every charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatedOutcome {
	#[default]
	Approve,
	Decline,
}

/// Configuration for the simulated provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPaymentConfig {
	#[serde(default)]
	pub outcome: SimulatedOutcome,
	/// Reason reported when declining.
	#[serde(default = "default_decline_message")]
	pub decline_message: String,
}

fn default_decline_message() -> String {
	"Оплату відхилено банком".to_string()
}

impl Default for SimulatedPaymentConfig {
	fn default() -> Self {
		Self {
			outcome: SimulatedOutcome::default(),
			decline_message: default_decline_message(),
		}
	}
}

impl ConfigSchema for SimulatedPaymentConfig {
	fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
		if self.outcome == SimulatedOutcome::Decline && self.decline_message.trim().is_empty() {
			return Err(ValidationError::InvalidValue {
				field: "decline_message".to_string(),
				message: "cannot be empty when declining".to_string(),
			});
		}
		Ok(())
	}
}

/// Payment provider that never contacts a payment network.
pub struct SimulatedPayment {
	config: SimulatedPaymentConfig,
}

impl SimulatedPayment {
	pub fn new(config: SimulatedPaymentConfig) -> Self {
		Self { config }
	}
}

#[async_trait]
impl PaymentInterface for SimulatedPayment {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(self.config.clone())
	}

	async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
		match self.config.outcome {
			SimulatedOutcome::Decline => {
				Err(PaymentError::Declined(self.config.decline_message.clone()))
			},
			SimulatedOutcome::Approve => Ok(PaymentReceipt {
				order_id: request.order_id.clone(),
				amount: request.amount,
				currency: request.currency.clone(),
				reference: format!("sim-{}", uuid::Uuid::new_v4().simple()),
				paid_at: current_timestamp(),
			}),
		}
	}
}

/// Registry for the simulated payment provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "simulated";
	type Factory = PaymentFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PaymentInterface>, PaymentError> {
			let simulated: SimulatedPaymentConfig = config.clone().try_into().map_err(|e| {
				PaymentError::Configuration(format!("Invalid simulated payment config: {}", e))
			})?;
			simulated
				.validate(config)
				.map_err(|e| PaymentError::Configuration(e.to_string()))?;

			Ok(Box::new(SimulatedPayment::new(simulated)))
		}
	}
}

impl PaymentRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn request() -> PaymentRequest {
		PaymentRequest {
			order_id: "order-42".to_string(),
			amount: 920,
			currency: "UAH".to_string(),
			language_code: "de".to_string(),
			needs_notary: true,
			needs_stamp: true,
			document_name: Some("certificate.pdf".to_string()),
		}
	}

	#[tokio::test]
	async fn test_approves_by_default() {
		let provider = Registry::factory()(&toml::Value::Table(Default::default())).unwrap();
		let receipt = provider.charge(&request()).await.unwrap();

		assert_eq!(receipt.amount, 920);
		assert_eq!(receipt.currency, "UAH");
		assert!(receipt.reference.starts_with("sim-"));
	}

	#[tokio::test]
	async fn test_declines_when_configured() {
		let config: toml::Value = toml::from_str(
			r#"
outcome = "decline"
decline_message = "insufficient funds"
"#,
		)
		.unwrap();
		let provider = Registry::factory()(&config).unwrap();

		let err = provider.charge(&request()).await.unwrap_err();
		assert!(matches!(err, PaymentError::Declined(m) if m == "insufficient funds"));
	}

	#[test]
	fn test_unknown_outcome_rejected() {
		let config: toml::Value = toml::from_str(r#"outcome = "maybe""#).unwrap();
		assert!(matches!(
			Registry::factory()(&config),
			Err(PaymentError::Configuration(_))
		));
	}
}
