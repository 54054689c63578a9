#![allow(dead_code)]

//! Test doubles for the RPC layer and the HTTP data channel

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;

use vifiles::rpc::types::*;
use vifiles::rpc::{RpcResult, ViService};
use vifiles::transfer::{AuthHeader, GetResponse, HttpTransport, ResponseBody};
use vifiles::{DatastoreMap, DatastoreRef, ErrorDetail, ManagedObjectRef, TransferError};

// ============================================================================
// Scripted management service
// ============================================================================

/// In-memory `ViService`
///
/// Every submitted task plays back the next script queued with
/// `script_task`; the last status of a script repeats forever. Without a
/// script a task succeeds on the first fetch.
pub struct MockService {
	datastores: Mutex<DatastoreMap>,
	scripts: Mutex<VecDeque<Vec<TaskStatus>>>,
	tasks: Mutex<HashMap<TaskRef, VecDeque<TaskStatus>>>,
	rejections: Mutex<VecDeque<RpcFault>>,
	requests: Mutex<Vec<StructuralRequest>>,
	status_calls: AtomicUsize,
	next_task: AtomicUsize,
	session: SessionAuth,
}

impl MockService {
	pub fn new() -> Self {
		vifiles::logging::try_init_tracing();

		let mut datastores = DatastoreMap::new();
		datastores.insert(DatastoreRef::new("datastore-1"), "ds1".to_string());
		datastores.insert(DatastoreRef::new("datastore-2"), "ds2".to_string());

		Self {
			datastores: Mutex::new(datastores),
			scripts: Mutex::new(VecDeque::new()),
			tasks: Mutex::new(HashMap::new()),
			rejections: Mutex::new(VecDeque::new()),
			requests: Mutex::new(Vec::new()),
			status_calls: AtomicUsize::new(0),
			next_task: AtomicUsize::new(1),
			session: SessionAuth {
				service_url: "https://esx01.lab/sdk".to_string(),
				user: "root".to_string(),
				password: "vmware".to_string(),
				cookies: vec![],
			},
		}
	}

	pub fn with_cookies(mut self, cookies: Vec<SessionCookie>) -> Self {
		self.session.cookies = cookies;
		self
	}

	/// Statuses reported for the next submitted task
	pub fn script_task(&self, statuses: Vec<TaskStatus>) {
		self.scripts.lock().unwrap().push_back(statuses);
	}

	/// Make the next `invoke` fail with `fault`
	pub fn reject_next(&self, fault: RpcFault) {
		self.rejections.lock().unwrap().push_back(fault);
	}

	pub fn add_datastore(&self, reference: &str, name: &str) {
		self.datastores.lock().unwrap().insert(DatastoreRef::new(reference), name.to_string());
	}

	pub fn requests(&self) -> Vec<StructuralRequest> {
		self.requests.lock().unwrap().clone()
	}

	pub fn status_calls(&self) -> usize {
		self.status_calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ViService for MockService {
	async fn invoke(&self, request: StructuralRequest) -> RpcResult<RpcResponse> {
		self.requests.lock().unwrap().push(request.clone());

		if let Some(fault) = self.rejections.lock().unwrap().pop_front() {
			return Err(fault);
		}
		if !request.is_task() {
			return Ok(RpcResponse::Completed);
		}

		let id = TaskRef::new(format!("task-{}", self.next_task.fetch_add(1, Ordering::SeqCst)));
		let script = self
			.scripts
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| vec![TaskStatus::success(None)]);
		self.tasks.lock().unwrap().insert(id.clone(), script.into());
		Ok(RpcResponse::Task(id))
	}

	async fn fetch_task_status(&self, task: &TaskRef) -> RpcResult<TaskStatus> {
		self.status_calls.fetch_add(1, Ordering::SeqCst);
		let mut tasks = self.tasks.lock().unwrap();
		let queue = tasks
			.get_mut(task)
			.ok_or_else(|| RpcFault::new("ManagedObjectNotFound", format!("{} is gone", task)))?;
		if queue.len() > 1 {
			Ok(queue.pop_front().unwrap())
		} else {
			Ok(queue.front().cloned().unwrap())
		}
	}

	async fn datastores(&self) -> RpcResult<DatastoreMap> {
		Ok(self.datastores.lock().unwrap().clone())
	}

	async fn datastore_browser(&self, datastore: &DatastoreRef) -> RpcResult<ManagedObjectRef> {
		Ok(ManagedObjectRef::new("HostDatastoreBrowser", format!("browser-{}", datastore.0.value)))
	}

	fn file_manager(&self) -> ManagedObjectRef {
		ManagedObjectRef::new("FileManager", "FileManager")
	}

	fn session_auth(&self) -> SessionAuth {
		self.session.clone()
	}
}

pub fn failed(fault_type: &str, message: &str) -> TaskStatus {
	TaskStatus::failed(ErrorDetail::new(fault_type, message))
}

// ============================================================================
// Echoing HTTP transport
// ============================================================================

/// Stores PUT bodies by URL and serves them back on GET
pub struct MemoryTransport {
	files: Mutex<HashMap<String, Vec<u8>>>,
	auth_seen: Mutex<Vec<AuthHeader>>,
	urls_seen: Mutex<Vec<String>>,
	/// Size of the pieces a GET body is delivered in
	pub body_chunk: usize,
	/// Status every request answers with, overriding normal behavior
	pub forced_status: Option<u16>,
	/// Fail every request as if the host were unreachable
	pub unreachable: bool,
}

impl MemoryTransport {
	pub fn new() -> Self {
		Self {
			files: Mutex::new(HashMap::new()),
			auth_seen: Mutex::new(Vec::new()),
			urls_seen: Mutex::new(Vec::new()),
			body_chunk: 40_000,
			forced_status: None,
			unreachable: false,
		}
	}

	pub fn auth_seen(&self) -> Vec<AuthHeader> {
		self.auth_seen.lock().unwrap().clone()
	}

	pub fn urls_seen(&self) -> Vec<String> {
		self.urls_seen.lock().unwrap().clone()
	}

	fn record(&self, url: &Url, auth: &AuthHeader) -> Result<(), TransferError> {
		self.auth_seen.lock().unwrap().push(auth.clone());
		self.urls_seen.lock().unwrap().push(url.to_string());
		if self.unreachable {
			return Err(TransferError::Connection {
				url: url.to_string(),
				source: "connection refused".into(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl HttpTransport for MemoryTransport {
	async fn put(&self, url: &Url, auth: &AuthHeader, body: Vec<u8>) -> Result<u16, TransferError> {
		self.record(url, auth)?;
		if let Some(status) = self.forced_status {
			return Ok(status);
		}
		let existed = self.files.lock().unwrap().insert(url.to_string(), body).is_some();
		Ok(if existed { 200 } else { 201 })
	}

	async fn get(&self, url: &Url, auth: &AuthHeader) -> Result<GetResponse, TransferError> {
		self.record(url, auth)?;
		let stored = self.files.lock().unwrap().get(url.as_str()).cloned();
		let (status, data) = match (self.forced_status, stored) {
			(Some(status), _) => (status, Vec::new()),
			(None, Some(data)) => (200, data),
			(None, None) => (404, b"Not Found".to_vec()),
		};
		let chunks: VecDeque<Vec<u8>> =
			data.chunks(self.body_chunk.max(1)).map(|c| c.to_vec()).collect();
		Ok(GetResponse { status, body: Box::new(MemoryBody { chunks }) })
	}
}

struct MemoryBody {
	chunks: VecDeque<Vec<u8>>,
}

#[async_trait]
impl ResponseBody for MemoryBody {
	async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
		Ok(self.chunks.pop_front())
	}
}

// vim: ts=4
