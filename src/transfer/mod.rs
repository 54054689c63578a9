//! Byte transfer over the HTTP data channel
//!
//! File contents never travel over the RPC channel. Uploads are a PUT and
//! downloads a GET of
//!
//! ```text
//! <service base>/folder/<encoded relative path>?dsName=<datastore>[&dcPath=<datacenter>]
//! ```
//!
//! authenticated with the RPC session's cookies or credentials, so no second
//! login is needed.

pub mod http;
pub mod session;

pub use http::{GetResponse, HttpTransport, ReqwestTransport, ResponseBody};
pub use session::{cookie_header, service_base_url, AuthHeader, TransferAuthMode, TransferSession};

use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::config::TransferConfig;
use crate::datastore::DatastorePath;
use crate::error::TransferError;
use crate::logging::*;
use crate::rpc::traits::ViService;

/// Default size of the pieces written to a download sink
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// What an upload did to the remote path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
	/// A file already existed and was overwritten (HTTP 200)
	Replaced,
	/// The file is new (any other 2xx)
	Created,
}

impl UploadOutcome {
	fn from_status(status: u16) -> Self {
		if status == 200 {
			UploadOutcome::Replaced
		} else {
			UploadOutcome::Created
		}
	}

	pub fn replaced(&self) -> bool {
		matches!(self, UploadOutcome::Replaced)
	}
}

/// Uploads and downloads datastore files
pub struct TransferChannel<T: HttpTransport> {
	transport: T,
	session: TransferSession,
	datacenter: Option<String>,
	chunk_size: usize,
}

impl<T: HttpTransport> TransferChannel<T> {
	pub fn new(transport: T, session: TransferSession) -> Self {
		Self { transport, session, datacenter: None, chunk_size: DEFAULT_CHUNK_SIZE }
	}

	/// Build a channel riding on `service`'s current session
	pub fn from_service<S: ViService + ?Sized>(
		transport: T,
		service: &S,
		config: &TransferConfig,
	) -> Result<Self, TransferError> {
		let session = TransferSession::from_session_auth(
			&service.session_auth(),
			config.auth_mode,
			&config.api_suffix,
		)?;
		let mut channel = Self::new(transport, session).with_chunk_size(config.chunk_size);
		channel.datacenter = config.datacenter.clone();
		Ok(channel)
	}

	/// Address datastores of a specific datacenter (`dcPath`)
	pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
		self.datacenter = Some(datacenter.into());
		self
	}

	pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
		self.chunk_size = chunk_size.max(1);
		self
	}

	/// Rebind the channel to a session obtained after a re-login
	pub fn with_session(mut self, session: TransferSession) -> Self {
		self.session = session;
		self
	}

	pub fn session(&self) -> &TransferSession {
		&self.session
	}

	pub fn chunk_size(&self) -> usize {
		self.chunk_size
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Full data channel URL of `remote`
	///
	/// Paths with `.` or `..` segments are refused: the URL would resolve
	/// outside the `/folder` namespace.
	pub fn resource_url(&self, remote: &DatastorePath) -> Result<Url, TransferError> {
		if remote.has_dot_segments() {
			return Err(TransferError::InvalidUrl {
				url: remote.to_string(),
				message: "'.' and '..' segments cannot be addressed over the data channel".to_string(),
			});
		}
		let raw = format!(
			"{}/folder{}",
			self.session.service_url().trim_end_matches('/'),
			remote.to_url_resource()
		);
		let mut url = Url::parse(&raw)
			.map_err(|e| TransferError::InvalidUrl { url: raw.clone(), message: e.to_string() })?;
		{
			let mut query = url.query_pairs_mut();
			query.append_pair("dsName", remote.datastore());
			if let Some(dc) = &self.datacenter {
				query.append_pair("dcPath", dc);
			}
		}
		Ok(url)
	}

	/// Store `data` at `remote`, replacing any existing file
	pub async fn upload(&self, data: Vec<u8>, remote: &DatastorePath) -> Result<UploadOutcome, TransferError> {
		let url = self.resource_url(remote)?;
		let size = data.len();
		debug!("PUT {} ({} bytes)", url, size);

		let status = self.transport.put(&url, &self.session.auth_header(), data).await?;
		if !(200..300).contains(&status) {
			return Err(TransferError::Status { url: url.to_string(), status });
		}

		let outcome = UploadOutcome::from_status(status);
		info!("Uploaded {} bytes to {} ({:?})", size, remote, outcome);
		Ok(outcome)
	}

	/// Upload the local file at `local`
	pub async fn upload_file(
		&self,
		local: impl AsRef<Path>,
		remote: &DatastorePath,
	) -> Result<UploadOutcome, TransferError> {
		let data = tokio::fs::read(local.as_ref()).await?;
		self.upload(data, remote).await
	}

	/// Stream `remote` into `sink`, returning the number of bytes written
	pub async fn download<W>(&self, remote: &DatastorePath, sink: &mut W) -> Result<u64, TransferError>
	where
		W: AsyncWrite + Unpin + Send + ?Sized,
	{
		let body = self.open_download(remote).await?;
		let written = self.write_body(body, sink).await?;
		info!("Downloaded {} bytes from {}", written, remote);
		Ok(written)
	}

	/// Download `remote` into the local file `local`, overwriting it
	///
	/// The body goes to a sibling `.part` file that is renamed over `local`
	/// once complete; a failed request or transfer leaves `local` untouched.
	pub async fn download_file(
		&self,
		remote: &DatastorePath,
		local: impl AsRef<Path>,
	) -> Result<u64, TransferError> {
		let local = local.as_ref();
		let body = self.open_download(remote).await?;

		let partial = partial_path(local);
		let result = async {
			let mut file = tokio::fs::File::create(&partial).await?;
			let written = self.write_body(body, &mut file).await?;
			file.sync_all().await?;
			drop(file);
			tokio::fs::rename(&partial, local).await?;
			Ok::<u64, TransferError>(written)
		}
		.await;

		match result {
			Ok(written) => {
				info!("Downloaded {} bytes from {} to {}", written, remote, local.display());
				Ok(written)
			}
			Err(e) => {
				if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
					debug!("Could not remove {}: {}", partial.display(), cleanup);
				}
				Err(e)
			}
		}
	}

	/// Send the GET for `remote` and check its status
	async fn open_download(&self, remote: &DatastorePath) -> Result<Box<dyn ResponseBody>, TransferError> {
		let url = self.resource_url(remote)?;
		debug!("GET {}", url);

		let GetResponse { status, body } = self.transport.get(&url, &self.session.auth_header()).await?;
		if !(200..300).contains(&status) {
			return Err(TransferError::Status { url: url.to_string(), status });
		}
		Ok(body)
	}

	async fn write_body<W>(&self, mut body: Box<dyn ResponseBody>, sink: &mut W) -> Result<u64, TransferError>
	where
		W: AsyncWrite + Unpin + Send + ?Sized,
	{
		let mut written = 0u64;
		while let Some(chunk) = body.next_chunk().await? {
			for piece in chunk.chunks(self.chunk_size) {
				sink.write_all(piece).await?;
				written += piece.len() as u64;
			}
		}
		sink.flush().await?;
		Ok(written)
	}
}

/// `dir/name` becomes `dir/.name.part`
fn partial_path(local: &Path) -> PathBuf {
	let name = local.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
	local.with_file_name(format!(".{}.part", name))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_upload_outcome_from_status() {
		assert!(UploadOutcome::from_status(200).replaced());
		assert_eq!(UploadOutcome::from_status(201), UploadOutcome::Created);
		assert_eq!(UploadOutcome::from_status(204), UploadOutcome::Created);
	}

	#[test]
	fn test_partial_path_is_sibling() {
		assert_eq!(partial_path(Path::new("/tmp/iso/seed.iso")), PathBuf::from("/tmp/iso/.seed.iso.part"));
		assert_eq!(partial_path(Path::new("seed.iso")), PathBuf::from(".seed.iso.part"));
	}
}

// vim: ts=4
