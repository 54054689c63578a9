//! Config file loading tests

use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use vifiles::config::Config;
use vifiles::transfer::TransferAuthMode;
use vifiles::{FileManagerError, PollPolicy};

#[test]
fn test_load_toml() {
	let dir = TempDir::new().unwrap();
	let file = dir.path().join("vifiles.toml");
	fs::write(
		&file,
		r#"
[poll]
intervalMs = 500
maxIntervalMs = 8000
multiplier = 2.0
timeoutSecs = 600

[transfer]
chunkSize = 65536
acceptInvalidCerts = true
authMode = "cookie-forward"
datacenter = "dc1"
"#,
	)
	.unwrap();

	let config = Config::load(&file).unwrap();
	assert_eq!(
		config.poll.policy(),
		PollPolicy::backoff(Duration::from_millis(500), Duration::from_millis(8000), 2.0)
	);
	assert_eq!(config.poll.timeout(), Some(Duration::from_secs(600)));
	assert_eq!(config.transfer.chunk_size, 65536);
	assert!(config.transfer.accept_invalid_certs);
	assert_eq!(config.transfer.auth_mode, TransferAuthMode::CookieForward);
	assert_eq!(config.transfer.datacenter.as_deref(), Some("dc1"));
	assert!(config.validate().is_ok());
}

#[test]
fn test_load_json5_with_comments() {
	let dir = TempDir::new().unwrap();
	let file = dir.path().join("vifiles.json5");
	fs::write(
		&file,
		r#"{
	// lab hosts use self-signed certificates
	transfer: {
		acceptInvalidCerts: true,
		apiSuffix: "/sdk",
	},
}"#,
	)
	.unwrap();

	let config = Config::load(&file).unwrap();
	assert!(config.transfer.accept_invalid_certs);
	assert_eq!(config.poll, Config::default().poll);
}

#[test]
fn test_partial_file_keeps_defaults() {
	let config = Config::from_toml_str("[transfer]\nreadTimeoutSecs = 30\n").unwrap();
	assert_eq!(config.transfer.read_timeout_secs, 30);
	assert_eq!(config.transfer.chunk_size, 16 * 1024);
	assert_eq!(config.transfer.api_suffix, "/sdk");
	assert_eq!(config.poll.interval_ms, 2000);
}

#[test]
fn test_unsupported_extension() {
	let dir = TempDir::new().unwrap();
	let file = dir.path().join("vifiles.yaml");
	fs::write(&file, "poll: {}\n").unwrap();

	assert!(matches!(Config::load(&file), Err(FileManagerError::Config { .. })));
}

#[test]
fn test_missing_file() {
	let dir = TempDir::new().unwrap();
	let result = Config::load(dir.path().join("absent.toml"));
	match result {
		Err(FileManagerError::Config { message }) => assert!(message.contains("absent.toml")),
		other => panic!("expected Config error, got {:?}", other),
	}
}

#[test]
fn test_malformed_toml() {
	assert!(matches!(
		Config::from_toml_str("[poll\nintervalMs = "),
		Err(FileManagerError::Config { .. })
	));
}

// vim: ts=4
