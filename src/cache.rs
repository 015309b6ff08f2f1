use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::any::Object;

/// Instances of resolved services, keyed by service name
#[derive(Default)]
pub(crate) struct Cache {
    map: BTreeMap<String, Object>,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<Object> {
        self.map.get(name).cloned()
    }

    /// Inserts the instance unless one is already cached, returning the cached one.
    pub(crate) fn insert_or_get(&mut self, name: &str, object: Object) -> Object {
        if let Some(cached) = self.map.get(name) {
            return cached.clone();
        }
        self.map.insert(name.into(), object.clone());
        object
    }

    #[inline]
    #[must_use]
    pub(crate) fn names(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }
}
