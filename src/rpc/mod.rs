//! RPC collaborator contract
//!
//! ```ignore
//! use vifiles::rpc::{StructuralRequest, ViService};
//!
//! let response = service.invoke(request).await?;
//! if let RpcResponse::Task(task) = response {
//!     let status = service.fetch_task_status(&task).await?;
//! }
//! ```

pub mod traits;
pub mod types;

pub use traits::{RpcResult, ViService};
pub use types::{
	FileQueryFlags, FileQueryKind, FileTransferSpec, RemoteFileInfo, RpcFault, RpcResponse,
	SearchResults, SearchSpec, SessionAuth, SessionCookie, StructuralRequest, TaskRef, TaskResult,
	TaskStatus,
};

// vim: ts=4
