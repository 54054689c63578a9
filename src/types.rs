//! Records shared between the RPC contract and the public API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a managed object on the remote service (type + id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectRef {
	#[serde(rename = "type")]
	pub kind: String,
	pub value: String,
}

impl ManagedObjectRef {
	pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
		Self { kind: kind.into(), value: value.into() }
	}
}

impl fmt::Display for ManagedObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind, self.value)
	}
}

/// Remote reference of a datastore
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatastoreRef(pub ManagedObjectRef);

impl DatastoreRef {
	pub fn new(value: impl Into<String>) -> Self {
		DatastoreRef(ManagedObjectRef::new("Datastore", value))
	}

	pub fn as_object(&self) -> &ManagedObjectRef {
		&self.0
	}
}

impl fmt::Display for DatastoreRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Kind of a file found by a datastore search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
	File,
	Folder,
	Vm,
	VmDisk,
	VmConfig,
	VmLog,
	VmNvram,
	VmSnapshot,
	Iso,
	Floppy,
	Template,
}

impl FileKind {
	/// Map the file info type name reported by the service
	///
	/// Unrecognized names fall back to [`FileKind::File`], the base type every
	/// other info type derives from.
	pub fn from_info_type(info_type: &str) -> Self {
		match info_type {
			"FolderFileInfo" => FileKind::Folder,
			"VmFileInfo" => FileKind::Vm,
			"VmDiskFileInfo" => FileKind::VmDisk,
			"VmConfigFileInfo" => FileKind::VmConfig,
			"VmLogFileInfo" => FileKind::VmLog,
			"VmNvramFileInfo" => FileKind::VmNvram,
			"VmSnapshotFileInfo" => FileKind::VmSnapshot,
			"IsoImageFileInfo" => FileKind::Iso,
			"FloppyImageFileInfo" => FileKind::Floppy,
			"TemplateConfigFileInfo" => FileKind::Template,
			_ => FileKind::File,
		}
	}

	pub fn is_folder(&self) -> bool {
		matches!(self, FileKind::Folder)
	}
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
	pub kind: FileKind,
	/// Path as reported by the service, relative to the searched folder
	pub path: String,
	pub size_bytes: Option<u64>,
	pub modified_at: Option<DateTime<Utc>>,
	pub owner: Option<String>,
}


// vim: ts=4
