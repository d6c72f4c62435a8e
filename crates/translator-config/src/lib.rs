//! Configuration module for the translation order flow.
//!
//! Configuration is read from a TOML file. Before parsing, `${VAR}` and
//! `${VAR:-default}` placeholders are replaced with environment values, which is
//! how the analysis endpoint's base URL is normally supplied:
//!
//! ```toml
//! [analysis.implementations.http]
//! base_url = "${TRANSLATOR_API_URL:-http://localhost:8000}"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use translator_pricing::Locale;

/// Environment variable selecting the analysis endpoint base URL.
pub const API_URL_ENV: &str = "TRANSLATOR_API_URL";
/// Base URL used when [`API_URL_ENV`] is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Longest delay accepted for either simulated timer.
const MAX_DELAY_MS: u64 = 60_000;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Application identity and locale.
	pub app: AppConfig,
	/// Timer settings for the simulated steps.
	#[serde(default)]
	pub flow: FlowConfig,
	/// Upload validation rules.
	#[serde(default)]
	pub upload: UploadConfig,
	/// Document analysis providers.
	pub analysis: ProviderConfig,
	/// Payment providers.
	pub payment: ProviderConfig,
	/// Host bridge. No primary means the app runs without a host.
	#[serde(default)]
	pub bridge: BridgeConfig,
}

/// Application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
	/// Identifier used in logs.
	pub id: String,
	/// Locale for user-facing wording.
	#[serde(default)]
	pub locale: Locale,
}

/// Delays of the two simulated steps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
	/// Time spent on the `Analyzing` step.
	#[serde(default = "default_analysis_delay_ms")]
	pub analysis_delay_ms: u64,
	/// Time spent processing a payment.
	#[serde(default = "default_payment_delay_ms")]
	pub payment_delay_ms: u64,
}

fn default_analysis_delay_ms() -> u64 {
	2200
}

fn default_payment_delay_ms() -> u64 {
	2000
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			analysis_delay_ms: default_analysis_delay_ms(),
			payment_delay_ms: default_payment_delay_ms(),
		}
	}
}

impl FlowConfig {
	pub fn analysis_delay(&self) -> Duration {
		Duration::from_millis(self.analysis_delay_ms)
	}

	pub fn payment_delay(&self) -> Duration {
		Duration::from_millis(self.payment_delay_ms)
	}
}

/// Upload validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
	/// Reject files that fail the type or size check.
	#[serde(default = "default_enforce")]
	pub enforce: bool,
	/// Accepted MIME types.
	#[serde(default = "default_accepted_mime")]
	pub accepted_mime: Vec<String>,
	/// Largest accepted file.
	#[serde(default = "default_max_size_bytes")]
	pub max_size_bytes: u64,
}

fn default_enforce() -> bool {
	true
}

fn default_accepted_mime() -> Vec<String> {
	vec![
		"application/pdf".to_string(),
		"image/png".to_string(),
		"image/jpeg".to_string(),
	]
}

fn default_max_size_bytes() -> u64 {
	10 * 1024 * 1024 // 10 MiB
}

impl Default for UploadConfig {
	fn default() -> Self {
		Self {
			enforce: default_enforce(),
			accepted_mime: default_accepted_mime(),
			max_size_bytes: default_max_size_bytes(),
		}
	}
}

/// A section with a primary implementation and per-implementation tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of implementation names to their raw configuration.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Host bridge section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BridgeConfig {
	/// Which implementation to use, if any.
	pub primary: Option<String>,
	/// Map of implementation names to their raw configuration.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with the default in
/// `${VAR_NAME:-default}` when the variable is unset. Inputs are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let var_name = &caps[1];
		match std::env::var(var_name) {
			Ok(value) => value,
			Err(_) => match caps.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					missing.get_or_insert_with(|| var_name.to_string());
					String::new()
				},
			},
		}
	});

	if let Some(var_name) = missing {
		return Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		)));
	}

	Ok(resolved.into_owned())
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.as_ref().display(), e),
			))
		})?;
		content.parse()
	}

	/// Builds a configuration for running without a config file.
	///
	/// Uses the simulated analysis and payment providers and the logging host
	/// bridge. The http analysis table is still filled in from
	/// [`API_URL_ENV`] so switching `analysis.primary` is enough to go live.
	pub fn standalone() -> Self {
		let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());

		let mut http = toml::map::Map::new();
		http.insert("base_url".to_string(), toml::Value::String(base_url));

		let empty = || toml::Value::Table(toml::map::Map::new());

		Self {
			app: AppConfig {
				id: "translator-standalone".to_string(),
				locale: Locale::default(),
			},
			flow: FlowConfig::default(),
			upload: UploadConfig::default(),
			analysis: ProviderConfig {
				primary: "simulated".to_string(),
				implementations: HashMap::from([
					("simulated".to_string(), empty()),
					("http".to_string(), toml::Value::Table(http)),
				]),
			},
			payment: ProviderConfig {
				primary: "simulated".to_string(),
				implementations: HashMap::from([("simulated".to_string(), empty())]),
			},
			bridge: BridgeConfig {
				primary: Some("log".to_string()),
				implementations: HashMap::from([("log".to_string(), empty())]),
			},
		}
	}

	/// Validates cross-field constraints that serde cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.app.id.trim().is_empty() {
			return Err(ConfigError::Validation("App ID cannot be empty".into()));
		}

		for (name, value) in [
			("analysis_delay_ms", self.flow.analysis_delay_ms),
			("payment_delay_ms", self.flow.payment_delay_ms),
		] {
			if value == 0 || value > MAX_DELAY_MS {
				return Err(ConfigError::Validation(format!(
					"flow.{} must be between 1 and {}",
					name, MAX_DELAY_MS
				)));
			}
		}

		if self.upload.enforce && self.upload.accepted_mime.is_empty() {
			return Err(ConfigError::Validation(
				"upload.accepted_mime cannot be empty while enforce is on".into(),
			));
		}
		if self.upload.max_size_bytes == 0 {
			return Err(ConfigError::Validation(
				"upload.max_size_bytes must be greater than 0".into(),
			));
		}

		validate_provider("analysis", &self.analysis)?;
		validate_provider("payment", &self.payment)?;

		if let Some(primary) = &self.bridge.primary {
			if !self.bridge.implementations.contains_key(primary) {
				return Err(ConfigError::Validation(format!(
					"Primary bridge '{}' not found in implementations",
					primary
				)));
			}
		}

		Ok(())
	}
}

fn validate_provider(section: &str, provider: &ProviderConfig) -> Result<(), ConfigError> {
	if provider.primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	if !provider.implementations.contains_key(&provider.primary) {
		return Err(ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, provider.primary
		)));
	}
	Ok(())
}

/// Parses TOML, resolving environment variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const BASIC: &str = r#"
[app]
id = "mk-translations"
locale = "en"

[flow]
analysis_delay_ms = 1500

[analysis]
primary = "simulated"
[analysis.implementations.simulated]
[analysis.implementations.http]
base_url = "${TEST_TRANSLATOR_URL:-http://localhost:8000}"

[payment]
primary = "simulated"
[payment.implementations.simulated]
outcome = "approve"

[bridge]
primary = "memory"
[bridge.implementations.memory]
"#;

	#[test]
	fn test_parse_basic_config() {
		let config: Config = BASIC.parse().unwrap();

		assert_eq!(config.app.id, "mk-translations");
		assert_eq!(config.app.locale, Locale::En);
		assert_eq!(config.flow.analysis_delay(), Duration::from_millis(1500));
		assert_eq!(config.flow.payment_delay(), Duration::from_millis(2000));
		assert!(config.upload.enforce);
		assert_eq!(config.upload.accepted_mime.len(), 3);
		assert_eq!(config.bridge.primary.as_deref(), Some("memory"));

		let http = &config.analysis.implementations["http"];
		assert_eq!(
			http.get("base_url").and_then(|v| v.as_str()),
			Some("http://localhost:8000")
		);
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_RESOLVE_HOST", "api.local");
		std::env::set_var("TEST_RESOLVE_PORT", "9000");

		let result = resolve_env_vars("url = \"http://${TEST_RESOLVE_HOST}:${TEST_RESOLVE_PORT}\"").unwrap();
		assert_eq!(result, "url = \"http://api.local:9000\"");

		std::env::remove_var("TEST_RESOLVE_HOST");
		std::env::remove_var("TEST_RESOLVE_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let result = resolve_env_vars("value = \"${MISSING_TRANSLATOR_VAR:-fallback}\"").unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${MISSING_TRANSLATOR_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("MISSING_TRANSLATOR_VAR"));
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let config_str = BASIC.replace("primary = \"memory\"", "primary = \"telegram\"");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("telegram"));
	}

	#[test]
	fn test_zero_delay_rejected() {
		let config_str = BASIC.replace("analysis_delay_ms = 1500", "analysis_delay_ms = 0");
		assert!(matches!(
			config_str.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_unknown_locale_rejected() {
		let config_str = BASIC.replace("locale = \"en\"", "locale = \"fr\"");
		assert!(matches!(config_str.parse::<Config>(), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_standalone_is_valid() {
		let config = Config::standalone();
		config.validate().unwrap();
		assert_eq!(config.analysis.primary, "simulated");
		assert!(config.analysis.implementations.contains_key("http"));
		assert_eq!(config.flow.analysis_delay_ms, 2200);
		assert_eq!(config.flow.payment_delay_ms, 2000);
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(BASIC.as_bytes()).unwrap();

		let config = Config::from_file(file.path()).await.unwrap();
		assert_eq!(config.app.id, "mk-translations");

		let missing = Config::from_file("/nonexistent/translator.toml").await;
		assert!(matches!(missing, Err(ConfigError::Io(_))));
	}
}
