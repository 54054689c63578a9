//! Request and response shapes exchanged with the management service
//!
//! These are the only things this crate hands to, or takes from, the RPC
//! layer. They derive `Serialize` so an RPC implementation can marshal them
//! without a second set of types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::task::{ErrorDetail, TaskState};
use crate::types::ManagedObjectRef;

/// Opaque reference to a remote task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRef(pub ManagedObjectRef);

impl TaskRef {
	pub fn new(value: impl Into<String>) -> Self {
		TaskRef(ManagedObjectRef::new("Task", value))
	}
}

impl fmt::Display for TaskRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Fault raised by the service when it rejects a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcFault {
	pub fault_type: String,
	pub message: String,
}

impl RpcFault {
	pub fn new(fault_type: impl Into<String>, message: impl Into<String>) -> Self {
		Self { fault_type: fault_type.into(), message: message.into() }
	}
}

impl fmt::Display for RpcFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.fault_type, self.message)
	}
}

impl Error for RpcFault {}

/// Kinds of files a datastore search asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileQueryKind {
	#[serde(rename = "FileQuery")]
	File,
	#[serde(rename = "FolderFileQuery")]
	Folder,
	#[serde(rename = "FloppyImageFileQuery")]
	FloppyImage,
	#[serde(rename = "IsoImageFileQuery")]
	IsoImage,
	#[serde(rename = "VmConfigFileQuery")]
	VmConfig,
	#[serde(rename = "TemplateConfigFileQuery")]
	TemplateConfig,
	#[serde(rename = "VmDiskFileQuery")]
	VmDisk,
	#[serde(rename = "VmLogFileQuery")]
	VmLog,
	#[serde(rename = "VmNvramFileQuery")]
	VmNvram,
	#[serde(rename = "VmSnapshotFileQuery")]
	VmSnapshot,
}

impl FileQueryKind {
	pub const ALL: [FileQueryKind; 10] = [
		FileQueryKind::FloppyImage,
		FileQueryKind::File,
		FileQueryKind::Folder,
		FileQueryKind::IsoImage,
		FileQueryKind::VmConfig,
		FileQueryKind::TemplateConfig,
		FileQueryKind::VmDisk,
		FileQueryKind::VmLog,
		FileQueryKind::VmNvram,
		FileQueryKind::VmSnapshot,
	];
}

/// Which per-file details the service should report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQueryFlags {
	pub file_owner: bool,
	pub file_size: bool,
	pub file_type: bool,
	pub modification: bool,
}

impl FileQueryFlags {
	pub fn all() -> Self {
		Self { file_owner: true, file_size: true, file_type: true, modification: true }
	}
}

/// Search specification sent with a datastore search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpec {
	pub query: Vec<FileQueryKind>,
	pub details: FileQueryFlags,
	pub search_case_insensitive: bool,
	pub sort_folders_first: bool,
	pub match_pattern: Vec<String>,
}

impl SearchSpec {
	/// Spec covering every file kind with every detail flag set
	pub fn all_kinds(case_insensitive: bool, folders_first: bool, patterns: Vec<String>) -> Self {
		Self {
			query: FileQueryKind::ALL.to_vec(),
			details: FileQueryFlags::all(),
			search_case_insensitive: case_insensitive,
			sort_folders_first: folders_first,
			match_pattern: patterns,
		}
	}
}

/// Source/destination pair shared by move and copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTransferSpec {
	#[serde(rename = "_this")]
	pub file_manager: ManagedObjectRef,
	pub source_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_datacenter: Option<String>,
	pub destination_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub destination_datacenter: Option<String>,
	pub force: bool,
}

/// A structural operation to submit to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum StructuralRequest {
	#[serde(rename = "SearchDatastore_Task", rename_all = "camelCase")]
	SearchDatastore {
		#[serde(rename = "_this")]
		browser: ManagedObjectRef,
		datastore_path: String,
		search_spec: SearchSpec,
	},
	#[serde(rename = "MakeDirectory", rename_all = "camelCase")]
	MakeDirectory {
		#[serde(rename = "_this")]
		file_manager: ManagedObjectRef,
		name: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		datacenter: Option<String>,
		create_parent_directories: bool,
	},
	#[serde(rename = "MoveDatastoreFile_Task")]
	MoveFile(FileTransferSpec),
	#[serde(rename = "CopyDatastoreFile_Task")]
	CopyFile(FileTransferSpec),
	#[serde(rename = "DeleteDatastoreFile_Task", rename_all = "camelCase")]
	DeleteFile {
		#[serde(rename = "_this")]
		file_manager: ManagedObjectRef,
		name: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		datacenter: Option<String>,
	},
}

impl StructuralRequest {
	/// Remote method name of this request
	pub fn operation(&self) -> &'static str {
		match self {
			StructuralRequest::SearchDatastore { .. } => "SearchDatastore_Task",
			StructuralRequest::MakeDirectory { .. } => "MakeDirectory",
			StructuralRequest::MoveFile(_) => "MoveDatastoreFile_Task",
			StructuralRequest::CopyFile(_) => "CopyDatastoreFile_Task",
			StructuralRequest::DeleteFile { .. } => "DeleteDatastoreFile_Task",
		}
	}

	pub fn is_task(&self) -> bool {
		!matches!(self, StructuralRequest::MakeDirectory { .. })
	}
}

/// What the service returned for a structural request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcResponse {
	/// The operation runs asynchronously as this task
	Task(TaskRef),
	/// The operation finished within the call
	Completed,
}

/// One file record of a search result, as the service reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileInfo {
	/// Info type name, e.g. `VmDiskFileInfo`
	pub info_type: String,
	pub path: String,
	pub file_size: Option<u64>,
	pub modification: Option<DateTime<Utc>>,
	pub owner: Option<String>,
}

/// Result of a finished datastore search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
	pub folder_path: Option<String>,
	/// `None` when the service omitted the file list
	pub file: Option<Vec<RemoteFileInfo>>,
}

/// Payload attached to a successful task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
	Search(SearchResults),
	/// Any other result, passed through untouched
	Other(serde_json::Value),
}

/// Task status snapshot fetched from the service
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
	pub state: TaskState,
	pub error: Option<ErrorDetail>,
	pub result: Option<TaskResult>,
}

impl TaskStatus {
	pub fn running() -> Self {
		Self { state: TaskState::Running, error: None, result: None }
	}

	pub fn success(result: Option<TaskResult>) -> Self {
		Self { state: TaskState::Success, error: None, result }
	}

	pub fn failed(detail: ErrorDetail) -> Self {
		Self { state: TaskState::Error, error: Some(detail), result: None }
	}
}

/// A cookie held by the RPC session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
	pub name: String,
	pub value: String,
	pub version: Option<String>,
	pub path: Option<String>,
	pub domain: Option<String>,
}

impl SessionCookie {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { name: name.into(), value: value.into(), version: None, path: None, domain: None }
	}

	pub fn with_version(mut self, version: impl Into<String>) -> Self {
		self.version = Some(version.into());
		self
	}

	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}
}

/// Authentication material of the logged-in RPC session
#[derive(Clone, PartialEq, Eq)]
pub struct SessionAuth {
	/// Full RPC endpoint URL, e.g. `https://esx01/sdk`
	pub service_url: String,
	pub user: String,
	pub password: String,
	pub cookies: Vec<SessionCookie>,
}

impl fmt::Debug for SessionAuth {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionAuth")
			.field("service_url", &self.service_url)
			.field("user", &self.user)
			.field("password", &"<redacted>")
			.field("cookies", &self.cookies.len())
			.finish()
	}
}


// vim: ts=4
