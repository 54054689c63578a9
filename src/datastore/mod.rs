//! Datastore path addressing
//!
//! Paths on a datastore are written `[datastoreName] relative/path`. This
//! module parses and formats that form, resolves the datastore name against
//! the mapping the service reports, and produces the URL resource used by
//! the HTTP data channel.

pub mod path;
pub mod registry;

pub use path::{to_url_resource, DatastorePath};
pub use registry::{resolve_datastore_ref, DatastoreMap};

// vim: ts=4
