//! Authentication for the data channel, derived from the RPC session

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::TransferError;
use crate::rpc::types::{SessionAuth, SessionCookie};

/// How the data channel authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransferAuthMode {
	/// Forward session cookies when the session has any, Basic otherwise
	#[default]
	Auto,
	Basic,
	CookieForward,
}

/// Authentication material for the data channel
///
/// Built once from the RPC session and reused for every transfer. A re-login
/// yields a new value; an existing one is never updated in place.
#[derive(Clone, PartialEq, Eq)]
pub enum TransferSession {
	Basic { service_url: String, user: String, password: String },
	CookieForward { service_url: String, cookies: Vec<SessionCookie> },
}

impl TransferSession {
	/// Select the session for `auth` according to `mode`
	///
	/// `api_suffix` is the trailing part of the RPC endpoint (`/sdk`) that is
	/// cut off to obtain the data channel's base URL.
	pub fn from_session_auth(
		auth: &SessionAuth,
		mode: TransferAuthMode,
		api_suffix: &str,
	) -> Result<Self, TransferError> {
		let service_url = service_base_url(&auth.service_url, api_suffix)?;

		let use_cookies = match mode {
			TransferAuthMode::Auto => !auth.cookies.is_empty(),
			TransferAuthMode::Basic => false,
			TransferAuthMode::CookieForward => {
				if auth.cookies.is_empty() {
					return Err(TransferError::NoSessionCookies);
				}
				true
			}
		};

		if use_cookies {
			debug!("Data channel forwards {} session cookie(s)", auth.cookies.len());
			Ok(TransferSession::CookieForward { service_url, cookies: auth.cookies.clone() })
		} else {
			debug!("Data channel uses Basic authentication as {}", auth.user);
			Ok(TransferSession::Basic {
				service_url,
				user: auth.user.clone(),
				password: auth.password.clone(),
			})
		}
	}

	/// Base URL every resource URL is built on
	pub fn service_url(&self) -> &str {
		match self {
			TransferSession::Basic { service_url, .. } => service_url,
			TransferSession::CookieForward { service_url, .. } => service_url,
		}
	}

	pub fn is_cookie_forward(&self) -> bool {
		matches!(self, TransferSession::CookieForward { .. })
	}

	/// The header that authenticates a request
	pub fn auth_header(&self) -> AuthHeader {
		match self {
			TransferSession::Basic { user, password, .. } => AuthHeader {
				name: "Authorization",
				value: format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password))),
			},
			TransferSession::CookieForward { cookies, .. } => {
				AuthHeader { name: "Cookie", value: cookie_header(cookies) }
			}
		}
	}
}

impl fmt::Debug for TransferSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransferSession::Basic { service_url, user, .. } => f
				.debug_struct("Basic")
				.field("service_url", service_url)
				.field("user", user)
				.finish_non_exhaustive(),
			TransferSession::CookieForward { service_url, cookies } => f
				.debug_struct("CookieForward")
				.field("service_url", service_url)
				.field("cookies", &cookies.len())
				.finish(),
		}
	}
}

/// A single authentication header
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
	pub name: &'static str,
	pub value: String,
}

impl fmt::Debug for AuthHeader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthHeader").field("name", &self.name).finish_non_exhaustive()
	}
}

/// Cut the API suffix off the RPC endpoint URL
///
/// `https://esx01/sdk` becomes `https://esx01`. Everything from the last
/// occurrence of `api_suffix` on is dropped.
pub fn service_base_url(endpoint: &str, api_suffix: &str) -> Result<String, TransferError> {
	match endpoint.rfind(api_suffix) {
		Some(pos) if !api_suffix.is_empty() => Ok(endpoint[..pos].to_string()),
		_ => Err(TransferError::InvalidServiceUrl {
			url: endpoint.to_string(),
			suffix: api_suffix.to_string(),
		}),
	}
}

/// Rebuild a `Cookie` header value from session cookies
///
/// Per cookie: `$Version`, `name=value`, `$Path`, `$Domain`, the attributes
/// only when set. Cookies are joined in session order.
pub fn cookie_header(cookies: &[SessionCookie]) -> String {
	let mut parts = Vec::new();
	for cookie in cookies {
		if let Some(version) = &cookie.version {
			parts.push(format!("$Version={}", version));
		}
		parts.push(format!("{}={}", cookie.name, cookie.value));
		if let Some(path) = &cookie.path {
			parts.push(format!("$Path={}", path));
		}
		if let Some(domain) = &cookie.domain {
			parts.push(format!("$Domain={}", domain));
		}
	}
	parts.join("; ")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn auth(cookies: Vec<SessionCookie>) -> SessionAuth {
		SessionAuth {
			service_url: "https://esx01.lab/sdk".to_string(),
			user: "root".to_string(),
			password: "secret".to_string(),
			cookies,
		}
	}

	#[test]
	fn test_cookie_header_attribute_order() {
		let cookie = SessionCookie::new("sid", "abc").with_path("/sdk").with_version("1");
		assert_eq!(cookie_header(&[cookie]), "$Version=1; sid=abc; $Path=/sdk");
	}

	#[test]
	fn test_cookie_header_with_domain_and_plain_cookie() {
		let cookies = vec![
			SessionCookie::new("vmware_soap_session", "\"52a\"")
				.with_path("/")
				.with_domain("esx01.lab"),
			SessionCookie::new("lang", "en"),
		];
		assert_eq!(
			cookie_header(&cookies),
			"vmware_soap_session=\"52a\"; $Path=/; $Domain=esx01.lab; lang=en"
		);
	}

	#[test]
	fn test_service_base_url() {
		assert_eq!(service_base_url("https://esx01/sdk", "/sdk").unwrap(), "https://esx01");
		assert_eq!(
			service_base_url("https://vc/sdk/vimService/sdk", "/sdk").unwrap(),
			"https://vc/sdk/vimService"
		);
		assert!(service_base_url("https://esx01/api", "/sdk").is_err());
	}

	#[test]
	fn test_auto_prefers_cookies() {
		let session = TransferSession::from_session_auth(
			&auth(vec![SessionCookie::new("sid", "abc")]),
			TransferAuthMode::Auto,
			"/sdk",
		)
		.unwrap();
		assert!(session.is_cookie_forward());
		assert_eq!(session.service_url(), "https://esx01.lab");
		assert_eq!(session.auth_header(), AuthHeader { name: "Cookie", value: "sid=abc".to_string() });
	}

	#[test]
	fn test_auto_falls_back_to_basic() {
		let session =
			TransferSession::from_session_auth(&auth(vec![]), TransferAuthMode::Auto, "/sdk").unwrap();
		assert!(!session.is_cookie_forward());
		// base64("root:secret")
		assert_eq!(session.auth_header().value, "Basic cm9vdDpzZWNyZXQ=");
	}

	#[test]
	fn test_forced_basic_ignores_cookies() {
		let session = TransferSession::from_session_auth(
			&auth(vec![SessionCookie::new("sid", "abc")]),
			TransferAuthMode::Basic,
			"/sdk",
		)
		.unwrap();
		assert_eq!(session.auth_header().name, "Authorization");
	}

	#[test]
	fn test_forced_cookie_forward_needs_cookies() {
		let result =
			TransferSession::from_session_auth(&auth(vec![]), TransferAuthMode::CookieForward, "/sdk");
		assert!(matches!(result, Err(TransferError::NoSessionCookies)));
	}

	#[test]
	fn test_debug_hides_secrets() {
		let session =
			TransferSession::from_session_auth(&auth(vec![]), TransferAuthMode::Basic, "/sdk").unwrap();
		assert!(!format!("{:?}", session).contains("secret"));
	}
}

// vim: ts=4
