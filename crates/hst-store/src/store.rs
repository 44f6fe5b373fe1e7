use std::any::type_name;
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::storable::Storable;

/// Key-addressed store of heterogeneous [`Storable`] objects.
///
/// Keys iterate in lexicographic order. The store owns its objects; they
/// are dropped with the store or on [`remove`](Self::remove) /
/// [`clear`](Self::clear).
#[derive(Default)]
pub struct ObjectStore {
    objects: BTreeMap<String, Box<dyn Storable>>,
}

impl ObjectStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the object under `key`, creating an empty `T` on first use.
    ///
    /// Fails with [`StoreError::TypeMismatch`] if `key` already holds an
    /// object of another type.
    pub fn get<T: Storable + Default>(&mut self, key: &str) -> StoreResult<&mut T> {
        let object = self.objects.entry(key.to_string()).or_insert_with(|| {
            debug!(key, kind = type_name::<T>(), "creating store object");
            Box::new(T::default())
        });
        let found = object.kind_name();
        object
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| StoreError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found,
            })
    }

    /// Read-only typed lookup of an existing object.
    pub fn get_as<T: Storable>(&self, key: &str) -> StoreResult<&T> {
        let object = self
            .objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        object
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| StoreError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found: object.kind_name(),
            })
    }

    /// Untyped lookup.
    pub fn get_dyn(&self, key: &str) -> Option<&dyn Storable> {
        self.objects.get(key).map(|object| object.as_ref())
    }

    /// Store `object` under `key`, returning the object it replaced.
    pub fn insert<T: Storable>(&mut self, key: &str, object: T) -> Option<Box<dyn Storable>> {
        self.objects.insert(key.to_string(), Box::new(object))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Remove and return the object under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Storable>> {
        self.objects.remove(key)
    }

    /// Drop every object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All keys, in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// All `(key, object)` pairs, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Storable)> {
        self.objects
            .iter()
            .map(|(key, object)| (key.as_str(), object.as_ref()))
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
