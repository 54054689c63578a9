//! Datastore name resolution

use std::collections::HashMap;
use tracing::{trace, warn};

use crate::error::LookupError;
use crate::types::DatastoreRef;

/// Datastores known to the service, keyed by reference, valued by display name
pub type DatastoreMap = HashMap<DatastoreRef, String>;

/// Find the reference of the datastore whose display name is exactly `name`
///
/// Matching is case-sensitive. Display names are not unique on the service
/// side; when several references share `name`, which one is returned depends
/// on map iteration order and is not stable across calls. A warning is logged
/// in that case so callers can spot the ambiguity.
pub fn resolve_datastore_ref(name: &str, known: &DatastoreMap) -> Result<DatastoreRef, LookupError> {
	let mut matches = known.iter().filter(|(_, v)| v.as_str() == name).map(|(k, _)| k);

	let found = matches
		.next()
		.cloned()
		.ok_or_else(|| LookupError::UnknownDatastore { name: name.to_string() })?;

	let others = matches.count();
	if others > 0 {
		warn!("Datastore name '{}' is ambiguous ({} references), using {}", name, others + 1, found);
	} else {
		trace!("Resolved datastore '{}' to {}", name, found);
	}

	Ok(found)
}


// vim: ts=4
