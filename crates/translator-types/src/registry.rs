//! Registry trait for self-registering implementations.
//!
//! Analysis providers, payment providers and host bridges each expose a
//! `Registry` struct so the session builder can look them up by the name used
//! in the configuration file.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This matches the key under the section's `implementations` table, for example
	/// "simulated" for `[analysis.implementations.simulated]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
