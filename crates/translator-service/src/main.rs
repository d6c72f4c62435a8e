//! Main entry point for the translation order runner.
//!
//! Drives one ordering session from the landing screen to confirmation with a
//! document from disk, using the providers and host bridge named in the
//! configuration. Without a configuration file the simulated providers and the
//! logging bridge are used.

use clap::Parser;
use std::path::PathBuf;
use translator_config::Config;
use translator_core::{SessionBuilder, SessionFactories};

mod order;

use order::OrderOptions;

// Import implementations from individual crates
use translator_analysis::implementations::{http, simulated as simulated_analysis};
use translator_bridge::implementations::{log as log_bridge, memory};
use translator_payment::implementations::simulated as simulated_payment;
use translator_types::ImplementationRegistry;

/// Command-line arguments for the order runner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Document to upload
	#[arg(short, long)]
	file: PathBuf,

	/// Target language, by code or name
	#[arg(long, default_value = "en")]
	language: String,

	/// Order notarization
	#[arg(long)]
	notary: bool,

	/// Order an official stamp
	#[arg(long)]
	stamp: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started translator");

	let config = match &args.config {
		Some(path) => Config::from_file(path).await?,
		None => Config::standalone(),
	};
	tracing::info!("Loaded configuration [{}]", config.app.id);

	let mut session = SessionBuilder::new(config).build(factories()).await?;

	let options = OrderOptions {
		file: args.file,
		language: args.language,
		needs_notary: args.notary,
		needs_stamp: args.stamp,
	};

	if let Err(e) = order::run(&mut session, &options).await {
		tracing::error!(error = %e, "Order was not completed");
		if let Err(close_error) = session.dismiss() {
			tracing::warn!(error = %close_error, "Failed to close host container");
		}
		return Err(e);
	}

	tracing::info!("Stopped translator");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
	($interface:path, $error:path, $( $name:expr => $factory:expr ),* $(,)?) => {{
		let mut factories = std::collections::HashMap::new();
		$(
			factories.insert(
				$name.to_string(),
				$factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
			);
		)*
		factories
	}};
}

type Factories = SessionFactories<
	translator_analysis::AnalysisFactory,
	translator_payment::PaymentFactory,
	translator_bridge::BridgeFactory,
>;

/// Wires up every implementation the runner knows about.
fn factories() -> Factories {
	let analysis_factories = create_factory_map!(
		translator_analysis::AnalysisInterface,
		translator_analysis::AnalysisError,
		http::Registry::NAME => http::Registry::factory(),
		simulated_analysis::Registry::NAME => simulated_analysis::Registry::factory(),
	);

	let payment_factories = create_factory_map!(
		translator_payment::PaymentInterface,
		translator_payment::PaymentError,
		simulated_payment::Registry::NAME => simulated_payment::Registry::factory(),
	);

	let bridge_factories = create_factory_map!(
		translator_bridge::HostBridgeInterface,
		translator_bridge::BridgeError,
		log_bridge::Registry::NAME => log_bridge::Registry::factory(),
		memory::Registry::NAME => memory::Registry::factory(),
	);

	SessionFactories {
		analysis_factories,
		payment_factories,
		bridge_factories,
	}
}
