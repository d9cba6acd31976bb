//! # Lister Boundary
//!
//! The engine never talks to a cloud itself. Listing a collection and
//! fetching a single record by id are capabilities supplied by the caller;
//! their failures are opaque [`BoxError`]s.

use osq_core::{BoxError, LookupTarget, ResourceType};
use serde_json::{Map, Value};

/// Native filter arguments handed to a lister, keyed by API parameter name.
pub type NativeFilters = Map<String, Value>;

/// Lists raw resource records matching native filters.
///
/// Must accept an empty filter set (list everything) and be free of side
/// effects.
pub trait ResourceLister {
    fn list(&self, resource: ResourceType, filters: &NativeFilters) -> Result<Vec<Value>, BoxError>;
}

/// Fetches one auxiliary record by id; `Ok(None)` when it does not exist.
pub trait AuxiliaryLookup {
    fn get(&self, target: LookupTarget, id: &str) -> Result<Option<Value>, BoxError>;
}

/// A lookup that never finds anything. Derived properties resolve to null.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl AuxiliaryLookup for NoLookup {
    fn get(&self, _target: LookupTarget, _id: &str) -> Result<Option<Value>, BoxError> {
        Ok(None)
    }
}
