//! Common types module for the translation order flow.
//!
//! This module defines the domain types shared by every crate in the workspace:
//! the ordering steps, the fixed language catalog, document references, analysis
//! and payment records, and the events consumed by the ordering state machine.

/// Analysis result types returned by document analysis providers.
pub mod analysis;
/// Document references produced by the upload collector.
pub mod document;
/// Events driving the ordering state machine.
pub mod events;
/// The fixed language catalog.
pub mod language;
/// Payment request and receipt types.
pub mod payment;
/// Self-registration trait for pluggable implementations.
pub mod registry;
/// Ordering steps.
pub mod step;
/// Utility helpers.
pub mod utils;
/// Configuration validation types for implementation tables.
pub mod validation;

pub use analysis::*;
pub use document::*;
pub use events::*;
pub use language::{catalog, default_language, find_language, resolve_language, LanguageOption};
pub use payment::*;
pub use registry::*;
pub use step::*;
pub use utils::{current_timestamp, truncate_id};
pub use validation::*;
