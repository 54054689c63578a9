//! Structural file operations on datastores
//!
//! [`FileManager`] turns search, mkdir, move, copy and delete into requests
//! for the management service. Everything but mkdir runs remotely as a task;
//! with `sync_run` set (the default) the call polls that task to completion,
//! otherwise the live [`OperationTask`] is handed back to the caller.
//!
//! Nothing is retried: a move or copy that failed half-way cannot be safely
//! replayed without knowing what the service already did.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::datastore::{resolve_datastore_ref, DatastoreMap, DatastorePath};
use crate::error::{FileManagerError, Result};
use crate::logging::*;
use crate::rpc::traits::ViService;
use crate::rpc::types::{
	FileTransferSpec, RemoteFileInfo, RpcResponse, SearchResults, SearchSpec, StructuralRequest,
	TaskResult,
};
use crate::task::{OperationTask, PollPolicy, TaskPoller, TaskState};
use crate::types::{DatastoreRef, FileEntry, FileKind};

/// Options for [`FileManager::search`]
#[derive(Debug, Clone)]
pub struct SearchOptions {
	pub case_insensitive: bool,
	pub folders_first: bool,
	pub match_patterns: Vec<String>,
}

impl Default for SearchOptions {
	fn default() -> Self {
		Self { case_insensitive: true, folders_first: true, match_patterns: Vec::new() }
	}
}

impl SearchOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn case_insensitive(mut self, value: bool) -> Self {
		self.case_insensitive = value;
		self
	}

	pub fn folders_first(mut self, value: bool) -> Self {
		self.folders_first = value;
		self
	}

	/// Add a name pattern such as `*.vmdk`
	pub fn match_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.match_patterns.push(pattern.into());
		self
	}
}

/// Options for [`FileManager::move_file`] and [`FileManager::copy_file`]
#[derive(Debug, Clone)]
pub struct FileOpOptions {
	pub source_datacenter: Option<String>,
	pub destination_datacenter: Option<String>,
	/// Overwrite a conflicting destination
	pub force: bool,
	/// Wait for the task instead of returning it
	pub sync_run: bool,
}

impl Default for FileOpOptions {
	fn default() -> Self {
		Self { source_datacenter: None, destination_datacenter: None, force: false, sync_run: true }
	}
}

impl FileOpOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn source_datacenter(mut self, dc: impl Into<String>) -> Self {
		self.source_datacenter = Some(dc.into());
		self
	}

	pub fn destination_datacenter(mut self, dc: impl Into<String>) -> Self {
		self.destination_datacenter = Some(dc.into());
		self
	}

	pub fn force(mut self, value: bool) -> Self {
		self.force = value;
		self
	}

	pub fn sync_run(mut self, value: bool) -> Self {
		self.sync_run = value;
		self
	}
}

/// Options for [`FileManager::make_directory_with`]
#[derive(Debug, Clone, Default)]
pub struct MakeDirectoryOptions {
	pub datacenter: Option<String>,
	pub create_parent_directories: bool,
}

impl MakeDirectoryOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn datacenter(mut self, dc: impl Into<String>) -> Self {
		self.datacenter = Some(dc.into());
		self
	}

	pub fn create_parent_directories(mut self, value: bool) -> Self {
		self.create_parent_directories = value;
		self
	}
}

/// Options for [`FileManager::delete_file`]
#[derive(Debug, Clone)]
pub struct DeleteOptions {
	pub datacenter: Option<String>,
	pub sync_run: bool,
}

impl Default for DeleteOptions {
	fn default() -> Self {
		Self { datacenter: None, sync_run: true }
	}
}

impl DeleteOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn datacenter(mut self, dc: impl Into<String>) -> Self {
		self.datacenter = Some(dc.into());
		self
	}

	pub fn sync_run(mut self, value: bool) -> Self {
		self.sync_run = value;
		self
	}
}

/// Outcome of a task-based operation
#[derive(Debug)]
pub enum Completion {
	/// The task finished successfully
	Completed,
	/// The task was submitted and is left to the caller
	Pending(OperationTask),
}

impl Completion {
	pub fn is_completed(&self) -> bool {
		matches!(self, Completion::Completed)
	}

	pub fn into_task(self) -> Option<OperationTask> {
		match self {
			Completion::Completed => None,
			Completion::Pending(task) => Some(task),
		}
	}
}

/// Client for structural operations on datastore files
pub struct FileManager<S: ViService + ?Sized> {
	service: Arc<S>,
	policy: PollPolicy,
	timeout: Option<Duration>,
}

impl<S: ViService + ?Sized> FileManager<S> {
	pub fn new(service: Arc<S>) -> Self {
		Self { service, policy: PollPolicy::default(), timeout: None }
	}

	/// Build a file manager with the poll policy from `config`
	pub fn from_config(service: Arc<S>, config: &Config) -> Result<Self> {
		config.validate()?;
		Ok(Self { service, policy: config.poll.policy(), timeout: config.poll.timeout() })
	}

	pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Bound every synchronous wait; expiry fails with `Timeout`
	pub fn with_timeout(mut self, limit: Duration) -> Self {
		self.timeout = Some(limit);
		self
	}

	pub fn service(&self) -> &Arc<S> {
		&self.service
	}

	/// Poller bound to this manager's service and policy
	pub fn poller(&self) -> TaskPoller<'_, S> {
		TaskPoller::new(&*self.service, self.policy)
	}

	/// Drive a pending task to completion
	///
	/// Fails with [`FileManagerError::TaskFailed`] carrying the service's
	/// error detail when the task ends in the error state, and with
	/// [`FileManagerError::Timeout`] when a configured bound runs out first.
	pub async fn wait(&self, task: &mut OperationTask) -> Result<()> {
		let poller = self.poller();
		let state = match self.timeout {
			Some(limit) => poller.wait_until_timeout(task, &TaskState::TERMINAL, limit).await?,
			None => poller.wait_for_completion(task).await?,
		};
		match state {
			TaskState::Success => {
				debug!("{} task {} succeeded", task.operation(), task.id());
				Ok(())
			}
			_ => {
				let detail = task.error()?.clone();
				warn!("{} task {} failed: {}", task.operation(), task.id(), detail);
				Err(FileManagerError::TaskFailed { operation: task.operation(), detail })
			}
		}
	}

	// === Operations ===

	/// List the files in the folder `path`
	///
	/// Always waits for the search task. The entries come back in the order
	/// the service produced them. A result without a file list, whether the
	/// folder is empty or the service left the field out, yields an empty
	/// vector.
	pub async fn search(&self, path: &DatastorePath, options: &SearchOptions) -> Result<Vec<FileEntry>> {
		let datastore = self.resolve(path.datastore(), &self.known_datastores().await?)?;
		let browser = self.service.datastore_browser(&datastore).await.map_err(|fault| {
			FileManagerError::Api { operation: "RetrieveDatastoreBrowser", fault }
		})?;

		let request = StructuralRequest::SearchDatastore {
			browser,
			datastore_path: path.to_string(),
			search_spec: SearchSpec::all_kinds(
				options.case_insensitive,
				options.folders_first,
				options.match_patterns.clone(),
			),
		};

		let mut task = self.submit_task(request).await?;
		self.wait(&mut task).await?;

		let results = match task.into_result() {
			None => SearchResults::default(),
			Some(TaskResult::Search(results)) => results,
			Some(TaskResult::Other(value)) => serde_json::from_value(value).map_err(|e| {
				debug!("Search result did not decode: {}", e);
				FileManagerError::UnexpectedResponse {
					operation: "SearchDatastore_Task",
					expected: "search results",
				}
			})?,
		};

		let entries: Vec<FileEntry> =
			results.file.unwrap_or_default().into_iter().map(into_file_entry).collect();
		info!("Found {} entries in {}", entries.len(), path);
		Ok(entries)
	}

	/// Create the directory `path`
	///
	/// This is a single call, no task is involved.
	pub async fn make_directory(&self, path: &DatastorePath, create_parent_directories: bool) -> Result<()> {
		let options = MakeDirectoryOptions::new().create_parent_directories(create_parent_directories);
		self.make_directory_with(path, &options).await
	}

	/// [`make_directory`](Self::make_directory) with a datacenter
	pub async fn make_directory_with(&self, path: &DatastorePath, options: &MakeDirectoryOptions) -> Result<()> {
		self.resolve(path.datastore(), &self.known_datastores().await?)?;

		let request = StructuralRequest::MakeDirectory {
			file_manager: self.service.file_manager(),
			name: path.to_string(),
			datacenter: options.datacenter.clone(),
			create_parent_directories: options.create_parent_directories,
		};
		let operation = request.operation();

		debug!("Submitting {} for {}", operation, path);
		match self.service.invoke(request).await {
			Ok(RpcResponse::Completed) => {
				info!("Created directory {}", path);
				Ok(())
			}
			Ok(RpcResponse::Task(_)) => {
				Err(FileManagerError::UnexpectedResponse { operation, expected: "completion" })
			}
			Err(fault) => Err(FileManagerError::Api { operation, fault }),
		}
	}

	/// Move `source` to `destination`
	pub async fn move_file(
		&self,
		source: &DatastorePath,
		destination: &DatastorePath,
		options: &FileOpOptions,
	) -> Result<Completion> {
		let spec = self.transfer_spec(source, destination, options).await?;
		self.run(StructuralRequest::MoveFile(spec), options.sync_run).await
	}

	/// Copy `source` to `destination`, leaving the source in place
	pub async fn copy_file(
		&self,
		source: &DatastorePath,
		destination: &DatastorePath,
		options: &FileOpOptions,
	) -> Result<Completion> {
		let spec = self.transfer_spec(source, destination, options).await?;
		self.run(StructuralRequest::CopyFile(spec), options.sync_run).await
	}

	/// Delete the file or folder `path`
	///
	/// Folders are removed with their whole content. The service also lets a
	/// disk in use by a running virtual machine be deleted, which can corrupt
	/// that machine; guarding against it is up to the caller.
	pub async fn delete_file(&self, path: &DatastorePath, options: &DeleteOptions) -> Result<Completion> {
		self.resolve(path.datastore(), &self.known_datastores().await?)?;

		let request = StructuralRequest::DeleteFile {
			file_manager: self.service.file_manager(),
			name: path.to_string(),
			datacenter: options.datacenter.clone(),
		};
		self.run(request, options.sync_run).await
	}

	// === Helpers ===

	async fn known_datastores(&self) -> Result<DatastoreMap> {
		self.service
			.datastores()
			.await
			.map_err(|fault| FileManagerError::Api { operation: "RetrieveDatastores", fault })
	}

	fn resolve(&self, name: &str, known: &DatastoreMap) -> Result<DatastoreRef> {
		Ok(resolve_datastore_ref(name, known)?)
	}

	async fn transfer_spec(
		&self,
		source: &DatastorePath,
		destination: &DatastorePath,
		options: &FileOpOptions,
	) -> Result<FileTransferSpec> {
		let known = self.known_datastores().await?;
		self.resolve(source.datastore(), &known)?;
		self.resolve(destination.datastore(), &known)?;

		Ok(FileTransferSpec {
			file_manager: self.service.file_manager(),
			source_name: source.to_string(),
			source_datacenter: options.source_datacenter.clone(),
			destination_name: destination.to_string(),
			destination_datacenter: options.destination_datacenter.clone(),
			force: options.force,
		})
	}

	async fn submit_task(&self, request: StructuralRequest) -> Result<OperationTask> {
		let operation = request.operation();
		debug!("Submitting {}", operation);

		match self.service.invoke(request).await {
			Ok(RpcResponse::Task(id)) => {
				debug!("{} running as {}", operation, id);
				Ok(OperationTask::new(id).with_operation(operation))
			}
			Ok(RpcResponse::Completed) => {
				Err(FileManagerError::UnexpectedResponse { operation, expected: "task reference" })
			}
			Err(fault) => Err(FileManagerError::Api { operation, fault }),
		}
	}

	async fn run(&self, request: StructuralRequest, sync_run: bool) -> Result<Completion> {
		let mut task = self.submit_task(request).await?;
		if !sync_run {
			return Ok(Completion::Pending(task));
		}
		self.wait(&mut task).await?;
		info!("{} finished", task.operation());
		Ok(Completion::Completed)
	}
}

fn into_file_entry(info: RemoteFileInfo) -> FileEntry {
	FileEntry {
		kind: FileKind::from_info_type(&info.info_type),
		path: info.path,
		size_bytes: info.file_size,
		modified_at: info.modification,
		owner: info.owner,
	}
}


// vim: ts=4
