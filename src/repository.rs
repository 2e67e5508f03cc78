//! Object repository boundary: identifier/UUID lookup of interchange objects.

use crate::attr::Value;
use hashbrown::HashMap;

/// Resolves typed object references (DORs) to their target objects.
///
/// Implemented by the container layer; this crate only consumes it. Lookups
/// must be cheap and safe for concurrent read access if decode calls are to
/// run concurrently.
pub trait Repository {
    fn object_by_identifier(&self, identifier: &str) -> Option<&Value>;
    fn object_by_uuid(&self, uuid: &str) -> Option<&Value>;
}

/// In-memory repository, for tests and in-process assembly.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    objects: Vec<Value>,
    by_identifier: HashMap<String, usize>,
    by_uuid: HashMap<String, usize>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object under an identifier and/or a UUID.
    pub fn insert(
        &mut self,
        identifier: Option<&str>,
        uuid: Option<&str>,
        object: Value,
    ) {
        let slot = self.objects.len();
        self.objects.push(object);
        if let Some(id) = identifier {
            self.by_identifier.insert(id.to_string(), slot);
        }
        if let Some(uuid) = uuid {
            self.by_uuid.insert(uuid.to_string(), slot);
        }
    }
}

impl Repository for MemoryRepository {
    fn object_by_identifier(&self, identifier: &str) -> Option<&Value> {
        self.by_identifier
            .get(identifier)
            .map(|&slot| &self.objects[slot])
    }

    fn object_by_uuid(&self, uuid: &str) -> Option<&Value> {
        self.by_uuid.get(uuid).map(|&slot| &self.objects[slot])
    }
}
