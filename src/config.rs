//! Configuration for the file manager and the data channel
//!
//! Priority chain, lowest first:
//! 1. Built-in defaults (`Config::default()`)
//! 2. Config file (`.toml`, or `.json`/`.json5`)
//! 3. Environment variables (`VIFILES_*` prefix)
//!
//! The datastore mapping and session credentials are not configuration:
//! they come from the RPC layer at run time.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{FileManagerError, Result};
use crate::task::PollPolicy;
use crate::transfer::{TransferAuthMode, DEFAULT_CHUNK_SIZE};

const ENV_PREFIX: &str = "VIFILES_";

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	/// Task polling
	pub poll: PollConfig,

	/// HTTP data channel
	pub transfer: TransferConfig,
}

/// Task polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
	/// First interval between status fetches
	pub interval_ms: u64,

	/// Upper bound for the interval when backing off
	pub max_interval_ms: u64,

	/// Growth factor per fetch (1.0 = fixed interval)
	pub multiplier: f64,

	/// Give up waiting after this long (the remote task keeps running)
	pub timeout_secs: Option<u64>,
}

impl Default for PollConfig {
	fn default() -> Self {
		PollConfig { interval_ms: 2000, max_interval_ms: 2000, multiplier: 1.0, timeout_secs: None }
	}
}

impl PollConfig {
	pub fn policy(&self) -> PollPolicy {
		PollPolicy::backoff(
			Duration::from_millis(self.interval_ms),
			Duration::from_millis(self.max_interval_ms),
			self.multiplier,
		)
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_secs.map(Duration::from_secs)
	}
}

/// Data channel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferConfig {
	/// Largest piece written to a download sink at once
	pub chunk_size: usize,

	/// TCP/TLS connect timeout
	pub connect_timeout_secs: u64,

	/// Maximum silence while reading a response
	pub read_timeout_secs: u64,

	/// Accept self-signed host certificates
	pub accept_invalid_certs: bool,

	/// Cookie forwarding or Basic authentication
	pub auth_mode: TransferAuthMode,

	/// Suffix cut from the RPC endpoint to get the data channel base URL
	pub api_suffix: String,

	/// Datacenter sent as `dcPath`
	pub datacenter: Option<String>,
}

impl Default for TransferConfig {
	fn default() -> Self {
		TransferConfig {
			chunk_size: DEFAULT_CHUNK_SIZE,
			connect_timeout_secs: 30,
			read_timeout_secs: 300,
			accept_invalid_certs: false,
			auth_mode: TransferAuthMode::Auto,
			api_suffix: "/sdk".to_string(),
			datacenter: None,
		}
	}
}

// ============================================================================
// LOADING
// ============================================================================

impl Config {
	/// Load a config file, picking the format from its extension
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| FileManagerError::Config {
			message: format!("Cannot read {}: {}", path.display(), e),
		})?;

		match path.extension().and_then(|e| e.to_str()) {
			Some("toml") => Self::from_toml_str(&content),
			Some("json") | Some("json5") => Self::from_json5_str(&content),
			_ => Err(FileManagerError::Config {
				message: format!("Unsupported config format: {}", path.display()),
			}),
		}
	}

	pub fn from_toml_str(content: &str) -> Result<Self> {
		toml::from_str(content).map_err(|e| FileManagerError::Config { message: e.to_string() })
	}

	pub fn from_json5_str(content: &str) -> Result<Self> {
		json5::from_str(content).map_err(|e| FileManagerError::Config { message: e.to_string() })
	}

	/// Apply `VIFILES_*` overrides from the process environment
	pub fn apply_env(&mut self) -> Result<()> {
		self.apply_env_from(|key| std::env::var(key).ok())
	}

	/// Apply overrides using `lookup` as the environment
	pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

		if let Some(v) = get("POLL_INTERVAL_MS") {
			self.poll.interval_ms = parse_env("POLL_INTERVAL_MS", &v)?;
			self.poll.max_interval_ms = self.poll.max_interval_ms.max(self.poll.interval_ms);
		}
		if let Some(v) = get("POLL_MAX_INTERVAL_MS") {
			self.poll.max_interval_ms = parse_env("POLL_MAX_INTERVAL_MS", &v)?;
		}
		if let Some(v) = get("POLL_MULTIPLIER") {
			self.poll.multiplier = parse_env("POLL_MULTIPLIER", &v)?;
		}
		if let Some(v) = get("POLL_TIMEOUT_SECS") {
			self.poll.timeout_secs = Some(parse_env("POLL_TIMEOUT_SECS", &v)?);
		}
		if let Some(v) = get("CHUNK_SIZE") {
			self.transfer.chunk_size = parse_env("CHUNK_SIZE", &v)?;
		}
		if let Some(v) = get("ACCEPT_INVALID_CERTS") {
			self.transfer.accept_invalid_certs = parse_env("ACCEPT_INVALID_CERTS", &v)?;
		}
		if let Some(v) = get("AUTH_MODE") {
			self.transfer.auth_mode = match v.as_str() {
				"auto" => TransferAuthMode::Auto,
				"basic" => TransferAuthMode::Basic,
				"cookie-forward" => TransferAuthMode::CookieForward,
				other => {
					return Err(FileManagerError::Config {
						message: format!("{}AUTH_MODE: unknown mode '{}'", ENV_PREFIX, other),
					})
				}
			};
		}
		if let Some(v) = get("DATACENTER") {
			self.transfer.datacenter = if v.is_empty() { None } else { Some(v) };
		}
		Ok(())
	}

	/// Check value ranges
	pub fn validate(&self) -> Result<()> {
		let invalid = |message: String| Err(FileManagerError::Config { message });

		if self.poll.interval_ms == 0 {
			return invalid("poll.intervalMs must be greater than 0".to_string());
		}
		if self.poll.max_interval_ms < self.poll.interval_ms {
			return invalid(format!(
				"poll.maxIntervalMs ({}) is smaller than poll.intervalMs ({})",
				self.poll.max_interval_ms, self.poll.interval_ms
			));
		}
		if !self.poll.multiplier.is_finite() || self.poll.multiplier < 1.0 {
			return invalid(format!("poll.multiplier must be >= 1.0, got {}", self.poll.multiplier));
		}
		if self.poll.timeout_secs == Some(0) {
			return invalid("poll.timeoutSecs must be greater than 0".to_string());
		}
		if self.transfer.chunk_size == 0 {
			return invalid("transfer.chunkSize must be greater than 0".to_string());
		}
		if self.transfer.api_suffix.is_empty() {
			return invalid("transfer.apiSuffix must not be empty".to_string());
		}
		Ok(())
	}
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
	T::Err: std::fmt::Display,
{
	value.trim().parse().map_err(|e: T::Err| FileManagerError::Config {
		message: format!("{}{}: invalid value '{}': {}", ENV_PREFIX, name, value, e),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn test_config_default() {
		let config = Config::default();
		assert_eq!(config.poll.interval_ms, 2000);
		assert_eq!(config.transfer.chunk_size, 16 * 1024);
		assert_eq!(config.transfer.api_suffix, "/sdk");
		assert_eq!(config.transfer.auth_mode, TransferAuthMode::Auto);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_default_policy_is_fixed_two_seconds() {
		assert_eq!(Config::default().poll.policy(), PollPolicy::fixed(Duration::from_secs(2)));
	}

	#[test]
	fn test_config_serialization() {
		let config = Config::default();
		let json = serde_json::to_string(&config).expect("Failed to serialize");
		assert!(json.contains("\"chunkSize\""));
		let deserialized: Config = serde_json::from_str(&json).expect("Failed to deserialize");
		assert_eq!(config, deserialized);
	}

	#[test]
	fn test_env_overrides() {
		let env: HashMap<&str, &str> = [
			("VIFILES_POLL_INTERVAL_MS", "250"),
			("VIFILES_POLL_TIMEOUT_SECS", "60"),
			("VIFILES_AUTH_MODE", "basic"),
			("VIFILES_DATACENTER", "dc-east"),
		]
		.into_iter()
		.collect();

		let mut config = Config::default();
		config.apply_env_from(|k| env.get(k).map(|v| v.to_string())).unwrap();
		assert_eq!(config.poll.interval_ms, 250);
		assert_eq!(config.poll.timeout(), Some(Duration::from_secs(60)));
		assert_eq!(config.transfer.auth_mode, TransferAuthMode::Basic);
		assert_eq!(config.transfer.datacenter.as_deref(), Some("dc-east"));
	}

	#[test]
	fn test_env_rejects_garbage() {
		let mut config = Config::default();
		let result = config.apply_env_from(|k| {
			(k == "VIFILES_CHUNK_SIZE").then(|| "sixteen".to_string())
		});
		assert!(matches!(result, Err(FileManagerError::Config { .. })));
	}

	#[test]
	fn test_validate_rejects_bad_values() {
		let mut config = Config::default();
		config.transfer.chunk_size = 0;
		assert!(config.validate().is_err());

		let mut config = Config::default();
		config.poll.multiplier = 0.5;
		assert!(config.validate().is_err());

		let mut config = Config::default();
		config.poll.max_interval_ms = 10;
		assert!(config.validate().is_err());
	}
}

// vim: ts=4
