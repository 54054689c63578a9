//! Logging prelude module for convenient access to tracing macros.
//!
//! ```ignore
//! use crate::logging::*;
//!
//! debug!("Submitting {}", request.operation());
//! warn!("Task {} finished in error state", task.id());
//! ```

pub use tracing::{debug, error, info, trace, warn};

/// Initialize the tracing subscriber with environment filter support.
///
/// Library code never installs a subscriber on its own; applications embedding
/// the crate call this once at startup. The level defaults to INFO and can be
/// changed with `RUST_LOG`:
///
/// ```bash
/// RUST_LOG=vifiles=debug my-tool
/// RUST_LOG=vifiles::task=trace,vifiles::transfer=debug my-tool
/// ```
pub fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();
}

/// Like [`init_tracing`], but does nothing if a subscriber is already set.
///
/// Handy in tests, where several cases may try to install one.
pub fn try_init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
		)
		.with_test_writer()
		.try_init();
}

// vim: ts=4
