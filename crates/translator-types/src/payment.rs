//! Payment request and receipt types.

use serde::{Deserialize, Serialize};

/// Currency every price in the flow is expressed in.
pub const CURRENCY: &str = "UAH";

/// A charge submitted when the user pays on the `Pricing` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
	/// Client-side order identifier.
	pub order_id: String,
	/// Amount in whole currency units.
	pub amount: u32,
	/// Currency code.
	pub currency: String,
	/// Target language code.
	pub language_code: String,
	/// Notarization requested.
	pub needs_notary: bool,
	/// Stamp requested.
	pub needs_stamp: bool,
	/// Name of the uploaded document.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub document_name: Option<String>,
}

/// Proof of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
	/// Order identifier the charge belongs to.
	pub order_id: String,
	/// Amount charged.
	pub amount: u32,
	/// Currency code.
	pub currency: String,
	/// Provider reference for the charge.
	pub reference: String,
	/// Unix timestamp of the charge.
	pub paid_at: u64,
}
