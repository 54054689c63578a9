//! Error types for datastore file operations

use std::error::Error;
use std::fmt;
use std::io;
use std::time::Duration;

use crate::rpc::types::RpcFault;
use crate::task::{ErrorDetail, TaskState};

/// Result type used by the public operations of this crate
pub type Result<T> = std::result::Result<T, FileManagerError>;

/// Main error type for datastore file operations
#[derive(Debug)]
pub enum FileManagerError {
	/// Malformed datastore-qualified path
	Parse(PathError),

	/// Datastore name could not be resolved
	Lookup(LookupError),

	/// The remote service rejected the call without creating a task
	Api { operation: &'static str, fault: RpcFault },

	/// The remote task ran and finished in the error state
	TaskFailed { operation: &'static str, detail: ErrorDetail },

	/// The remote service answered with a response of the wrong shape
	UnexpectedResponse { operation: &'static str, expected: &'static str },

	/// Task handle misuse (nested)
	Task(TaskError),

	/// Data channel failure (nested)
	Transfer(TransferError),

	/// A caller-supplied wait bound was exceeded
	Timeout { elapsed: Duration },

	/// Invalid configuration
	Config { message: String },
}

impl fmt::Display for FileManagerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FileManagerError::Parse(e) => write!(f, "Path error: {}", e),
			FileManagerError::Lookup(e) => write!(f, "Lookup error: {}", e),
			FileManagerError::Api { operation, fault } => {
				write!(f, "{} rejected by service: {}", operation, fault)
			}
			FileManagerError::TaskFailed { operation, detail } => {
				write!(f, "{} task failed: {}", operation, detail)
			}
			FileManagerError::UnexpectedResponse { operation, expected } => {
				write!(f, "Unexpected response to {}: expected {}", operation, expected)
			}
			FileManagerError::Task(e) => write!(f, "Task error: {}", e),
			FileManagerError::Transfer(e) => write!(f, "Transfer error: {}", e),
			FileManagerError::Timeout { elapsed } => {
				write!(f, "Timed out after {:?} waiting for task", elapsed)
			}
			FileManagerError::Config { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
		}
	}
}

impl Error for FileManagerError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			FileManagerError::Parse(e) => Some(e),
			FileManagerError::Lookup(e) => Some(e),
			FileManagerError::Api { fault, .. } => Some(fault),
			FileManagerError::Task(e) => Some(e),
			FileManagerError::Transfer(e) => Some(e),
			_ => None,
		}
	}
}

impl From<PathError> for FileManagerError {
	fn from(e: PathError) -> Self {
		FileManagerError::Parse(e)
	}
}

impl From<LookupError> for FileManagerError {
	fn from(e: LookupError) -> Self {
		FileManagerError::Lookup(e)
	}
}

impl From<TaskError> for FileManagerError {
	fn from(e: TaskError) -> Self {
		FileManagerError::Task(e)
	}
}

impl From<TransferError> for FileManagerError {
	fn from(e: TransferError) -> Self {
		FileManagerError::Transfer(e)
	}
}

/// Datastore path parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
	/// Input does not look like `[datastore] relative/path`
	InvalidPathFormat { input: String },

	/// The bracketed datastore name is empty
	EmptyDatastoreName { input: String },
}

impl fmt::Display for PathError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathError::InvalidPathFormat { input } => {
				write!(f, "Invalid datastore path '{}': expected '[datastore] path'", input)
			}
			PathError::EmptyDatastoreName { input } => {
				write!(f, "Empty datastore name in '{}'", input)
			}
		}
	}
}

impl Error for PathError {}

/// Datastore resolution errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
	/// No known datastore carries this display name
	UnknownDatastore { name: String },
}

impl fmt::Display for LookupError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LookupError::UnknownDatastore { name } => write!(f, "Unknown datastore: {}", name),
		}
	}
}

impl Error for LookupError {}

/// Task handle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
	/// Error detail requested from a task that has not failed
	NotInErrorState { state: TaskState },
}

impl fmt::Display for TaskError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TaskError::NotInErrorState { state } => {
				write!(f, "Task is not in error state (current state: {})", state)
			}
		}
	}
}

impl Error for TaskError {}

/// Data channel errors
#[derive(Debug)]
pub enum TransferError {
	/// Connection, TLS or timeout failure reported by the HTTP transport
	Connection { url: String, source: Box<dyn Error + Send + Sync> },

	/// The server answered with a non-2xx status
	Status { url: String, status: u16 },

	/// RPC endpoint URL does not end with the expected API suffix
	InvalidServiceUrl { url: String, suffix: String },

	/// Resource URL could not be assembled
	InvalidUrl { url: String, message: String },

	/// Cookie forwarding requested but the session has no cookies
	NoSessionCookies,

	/// Local I/O error while reading the payload or writing the sink
	Io(io::Error),
}

impl fmt::Display for TransferError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransferError::Connection { url, source } => {
				write!(f, "Request to {} failed: {}", url, source)
			}
			TransferError::Status { url, status } => {
				write!(f, "Request to {} returned HTTP {}", url, status)
			}
			TransferError::InvalidServiceUrl { url, suffix } => {
				write!(f, "Service URL '{}' does not contain '{}'", url, suffix)
			}
			TransferError::InvalidUrl { url, message } => {
				write!(f, "Invalid URL '{}': {}", url, message)
			}
			TransferError::NoSessionCookies => {
				write!(f, "Cookie forwarding requested but the session has no cookies")
			}
			TransferError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for TransferError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			TransferError::Connection { source, .. } => Some(source.as_ref()),
			TransferError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for TransferError {
	fn from(e: io::Error) -> Self {
		TransferError::Io(e)
	}
}


// vim: ts=4
