//! HTTP transport used by the data channel
//!
//! The channel talks to the transport through [`HttpTransport`] so that the
//! request building, status handling and chunked writing can be exercised
//! without a server. [`ReqwestTransport`] is the production implementation.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use super::session::AuthHeader;
use crate::config::TransferConfig;
use crate::error::TransferError;

/// Body of a GET response, read chunk by chunk
#[async_trait]
pub trait ResponseBody: Send {
	/// Next piece of the body, `None` at end of stream
	async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError>;
}

/// Status and streaming body of a GET
pub struct GetResponse {
	pub status: u16,
	pub body: Box<dyn ResponseBody>,
}

/// Minimal HTTP client contract needed for uploads and downloads
#[async_trait]
pub trait HttpTransport: Send + Sync {
	/// PUT `body` to `url`, returning the response status
	async fn put(&self, url: &Url, auth: &AuthHeader, body: Vec<u8>) -> Result<u16, TransferError>;

	/// GET `url`, returning status and body stream
	async fn get(&self, url: &Url, auth: &AuthHeader) -> Result<GetResponse, TransferError>;
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	/// Build a client from the transfer settings
	pub fn new(config: &TransferConfig) -> Result<Self, TransferError> {
		let client = reqwest::Client::builder()
			.connect_timeout(Duration::from_secs(config.connect_timeout_secs))
			.read_timeout(Duration::from_secs(config.read_timeout_secs))
			.danger_accept_invalid_certs(config.accept_invalid_certs)
			.build()
			.map_err(|e| TransferError::Connection {
				url: String::new(),
				source: format!("Failed to build HTTP client: {}", e).into(),
			})?;
		Ok(Self { client })
	}

	/// Use an already configured client
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

fn connection_error(url: &Url, e: reqwest::Error) -> TransferError {
	TransferError::Connection { url: url.to_string(), source: Box::new(e) }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn put(&self, url: &Url, auth: &AuthHeader, body: Vec<u8>) -> Result<u16, TransferError> {
		let response = self
			.client
			.put(url.as_str())
			.header(auth.name, auth.value.as_str())
			.body(body)
			.send()
			.await
			.map_err(|e| connection_error(url, e))?;
		Ok(response.status().as_u16())
	}

	async fn get(&self, url: &Url, auth: &AuthHeader) -> Result<GetResponse, TransferError> {
		let response = self
			.client
			.get(url.as_str())
			.header(auth.name, auth.value.as_str())
			.send()
			.await
			.map_err(|e| connection_error(url, e))?;
		let status = response.status().as_u16();
		Ok(GetResponse { status, body: Box::new(ReqwestBody { url: url.clone(), response }) })
	}
}

struct ReqwestBody {
	url: Url,
	response: reqwest::Response,
}

#[async_trait]
impl ResponseBody for ReqwestBody {
	async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
		match self.response.chunk().await {
			Ok(chunk) => Ok(chunk.map(|bytes| bytes.to_vec())),
			Err(e) => Err(connection_error(&self.url, e)),
		}
	}
}

// vim: ts=4
