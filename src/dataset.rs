//! External dataset boundary: retrieval of externally-stored numeric arrays.

use crate::attr::Value;
use crate::errors::{MeshError, MeshResult};
use crate::float_types::Real;
use hashbrown::HashMap;

/// Resolves an external array reference to its stored numeric values.
///
/// Implementations are expected to probe candidate backing-file paths in
/// order — the declared path, the declared path rebased to the package
/// folder, then the bare filename within the package folder — opening each
/// under a scoped handle that is released after the attempt. The first
/// candidate that opens and yields data wins; failed probes advance silently
/// to the next candidate, and exhaustion is a [`MeshError::NotFound`].
///
/// The binary on-disk layout of the backing datasets is outside this crate's
/// scope, so no file-backed implementation ships here.
pub trait DatasetStore {
    /// Retrieve the flat numeric values behind `reference`.
    ///
    /// `owner` is the object the array belongs to and `path` the array's dot
    /// path within it; stores may use both to locate package-relative data.
    fn read_external_array(
        &self,
        reference: &Value,
        owner: &Value,
        path: &str,
    ) -> MeshResult<Vec<Real>>;
}

/// In-memory store keyed by the reference's declared dataset path.
#[derive(Debug, Default)]
pub struct MemoryDatasetStore {
    datasets: HashMap<String, Vec<Real>>,
}

impl MemoryDatasetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, values: Vec<Real>) {
        self.datasets.insert(path.into(), values);
    }
}

/// The declared dataset path inside an external array reference.
///
/// Accepts either a bare text reference or an object carrying a
/// `PathInExternalFile`/`PathInHdfFile` attribute.
pub fn declared_path(reference: &Value) -> Option<&str> {
    if let Some(path) = reference.as_str() {
        return Some(path);
    }
    reference
        .get("PathInExternalFile")
        .or_else(|| reference.get("PathInHdfFile"))
        .and_then(Value::as_str)
}

impl DatasetStore for MemoryDatasetStore {
    fn read_external_array(
        &self,
        reference: &Value,
        _owner: &Value,
        path: &str,
    ) -> MeshResult<Vec<Real>> {
        let declared = declared_path(reference)
            .ok_or_else(|| MeshError::not_found(format!("external array at {path} has no dataset path")))?;
        self.datasets
            .get(declared)
            .cloned()
            .ok_or_else(|| MeshError::not_found(format!("dataset {declared}")))
    }
}
