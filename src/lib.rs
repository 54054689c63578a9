//! # vifiles - Datastore file management for virtualization hosts
//!
//! Files on a datastore cannot be reached directly. Structural operations
//! (search, mkdir, move, copy, delete) are requests to the management
//! service, which runs most of them as asynchronous tasks. File contents go
//! over a separate HTTP data channel authenticated with the same session.
//!
//! The RPC layer itself is not part of this crate: it is consumed through the
//! [`rpc::ViService`] trait.
//!
//! ## Structural operations
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vifiles::{DatastorePath, FileManager, FileOpOptions, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let files = FileManager::new(Arc::new(my_service));
//!     let folder: DatastorePath = "[datastore1] vm01".parse()?;
//!
//!     for entry in files.search(&folder, &SearchOptions::default()).await? {
//!         println!("{:?} {}", entry.kind, entry.path);
//!     }
//!
//!     files
//!         .copy_file(
//!             &folder.join("vm01.vmdk"),
//!             &"[datastore2] backup/vm01.vmdk".parse()?,
//!             &FileOpOptions::new().force(true),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Byte transfer
//!
//! ```rust,ignore
//! use vifiles::config::Config;
//! use vifiles::transfer::{ReqwestTransport, TransferChannel};
//!
//! let config = Config::default();
//! let channel = TransferChannel::from_service(
//!     ReqwestTransport::new(&config.transfer)?,
//!     &my_service,
//!     &config.transfer,
//! )?;
//! let outcome = channel.upload_file("seed.iso", &"[datastore1] iso/seed.iso".parse()?).await?;
//! println!("replaced existing file: {}", outcome.replaced());
//! ```

pub mod client;
pub mod config;
pub mod datastore;
pub mod error;
pub mod logging;
pub mod rpc;
pub mod task;
pub mod transfer;
pub mod types;

// Re-export commonly used types
pub use client::{
	Completion, DeleteOptions, FileManager, FileOpOptions, MakeDirectoryOptions, SearchOptions,
};
pub use config::Config;
pub use datastore::{DatastoreMap, DatastorePath};
pub use error::{FileManagerError, LookupError, PathError, Result, TaskError, TransferError};
pub use rpc::ViService;
pub use task::{ErrorDetail, OperationTask, PollPolicy, TaskPoller, TaskState};
pub use transfer::{TransferChannel, TransferSession, UploadOutcome};
pub use types::{DatastoreRef, FileEntry, FileKind, ManagedObjectRef};

// vim: ts=4
