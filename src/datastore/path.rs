//! `[datastore] relative/path` parsing and URL resource encoding

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::PathError;

/// Datastore name in brackets, exactly one space, then the relative path
///
/// `(?s)` lets the relative part carry newlines; the whole input is kept.
static DATASTORE_PATH: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)^\[(.*?)\] (.*)$").expect("datastore path pattern is valid"));

/// Characters escaped inside a single path segment (WHATWG path-segment set)
const SEGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}')
	.add(b'%')
	.add(b'/')
	.add(b'\\');

/// A path on a named datastore
///
/// The relative part never starts with `/`; the datastore name is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatastorePath {
	datastore: String,
	relative: String,
}

impl DatastorePath {
	/// Build a path from its parts, dropping leading separators from `relative`
	pub fn new(datastore: impl Into<String>, relative: impl AsRef<str>) -> Result<Self, PathError> {
		let datastore = datastore.into();
		if datastore.is_empty() {
			return Err(PathError::EmptyDatastoreName {
				input: format!("[] {}", relative.as_ref()),
			});
		}
		let relative = relative.as_ref().trim_start_matches('/').to_string();
		Ok(Self { datastore, relative })
	}

	/// Parse `[datastore] relative/path`
	///
	/// The datastore name is the shortest bracketed prefix followed by a
	/// space, so `[a] b] c` names datastore `a` with path `b] c`.
	pub fn parse(input: &str) -> Result<Self, PathError> {
		let caps = DATASTORE_PATH
			.captures(input)
			.ok_or_else(|| PathError::InvalidPathFormat { input: input.to_string() })?;
		let datastore = &caps[1];
		if datastore.is_empty() {
			return Err(PathError::EmptyDatastoreName { input: input.to_string() });
		}
		Self::new(datastore, &caps[2])
	}

	pub fn datastore(&self) -> &str {
		&self.datastore
	}

	pub fn relative_path(&self) -> &str {
		&self.relative
	}

	/// Path of `name` inside this folder
	pub fn join(&self, name: &str) -> DatastorePath {
		let name = name.trim_start_matches('/');
		let relative = if self.relative.is_empty() {
			name.to_string()
		} else if self.relative.ends_with('/') {
			format!("{}{}", self.relative, name)
		} else {
			format!("{}/{}", self.relative, name)
		};
		DatastorePath { datastore: self.datastore.clone(), relative }
	}

	/// Whether any segment of the relative path is `.` or `..`
	///
	/// URL parsers resolve such segments even when percent-encoded, so these
	/// paths cannot be addressed over the data channel.
	pub fn has_dot_segments(&self) -> bool {
		self.relative.split('/').any(|seg| seg == "." || seg == "..")
	}

	/// Percent-encoded resource for the data channel, see [`to_url_resource`]
	pub fn to_url_resource(&self) -> String {
		to_url_resource(&self.relative)
	}
}

impl fmt::Display for DatastorePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.datastore, self.relative)
	}
}

impl FromStr for DatastorePath {
	type Err = PathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for DatastorePath {
	type Error = PathError;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		Self::parse(&s)
	}
}

impl From<DatastorePath> for String {
	fn from(p: DatastorePath) -> Self {
		p.to_string()
	}
}

/// Turn a raw relative path into an absolute, percent-encoded URL path
///
/// Separators are kept, every segment is escaped on its own. The input must
/// be a raw path; already-encoded input gets its `%` escaped again.
pub fn to_url_resource(relative_path: &str) -> String {
	let segments: Vec<String> = relative_path
		.trim_start_matches('/')
		.split('/')
		.map(|seg| utf8_percent_encode(seg, SEGMENT).to_string())
		.collect();
	format!("/{}", segments.join("/"))
}


// vim: ts=4
