//! Contract of the RPC layer consumed by this crate
//!
//! Marshalling, transport and login live behind this trait. The file manager
//! and task poller depend only on it, never on a concrete SOAP stack.

use async_trait::async_trait;

use super::types::*;
use crate::datastore::DatastoreMap;
use crate::types::{DatastoreRef, ManagedObjectRef};

/// Result type for RPC calls
pub type RpcResult<T> = Result<T, RpcFault>;

/// Operations the management service must provide
#[async_trait]
pub trait ViService: Send + Sync {
	// === Structural operations ===

	/// Submit a structural request
	///
	/// Task-based requests answer with [`RpcResponse::Task`]; `MakeDirectory`
	/// answers with [`RpcResponse::Completed`]. A rejected call is an
	/// [`RpcFault`].
	async fn invoke(&self, request: StructuralRequest) -> RpcResult<RpcResponse>;

	/// Fetch the current status of a task
	async fn fetch_task_status(&self, task: &TaskRef) -> RpcResult<TaskStatus>;

	// === Inventory ===

	/// Datastores visible to the session, reference → display name
	///
	/// Called once per operation; the result is not cached.
	async fn datastores(&self) -> RpcResult<DatastoreMap>;

	/// File browser object of a datastore
	async fn datastore_browser(&self, datastore: &DatastoreRef) -> RpcResult<ManagedObjectRef>;

	/// The service's file manager object
	fn file_manager(&self) -> ManagedObjectRef;

	// === Session ===

	/// Authentication material of the current session
	///
	/// Read only. Re-login is the RPC layer's business; callers take a fresh
	/// snapshot afterwards.
	fn session_auth(&self) -> SessionAuth;
}

// vim: ts=4
