//! Singleton registry owned by the host

use super::error::{HostError, HostResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-keyed store of shared singletons.
///
/// One value per type. Values are handed out as `Arc<T>` so hosted services
/// and callers can hold on to them after the host is gone.
#[derive(Default)]
pub struct Services {
    map: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value`, replacing any earlier value of the same type
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.insert_arc(value.clone());
        value
    }

    /// Register an already shared value
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.map.insert(TypeId::of::<T>(), value);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|value| value.clone().downcast::<T>().ok())
    }

    /// Like [`Services::get`], but a missing value is an error
    pub fn get_required<T: Send + Sync + 'static>(&self) -> HostResult<Arc<T>> {
        self.get::<T>()
            .ok_or(HostError::MissingService(std::any::type_name::<T>()))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").field("len", &self.map.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Greeting(&'static str);

    #[test]
    fn test_singleton_roundtrip() {
        let mut services = Services::new();
        assert!(services.is_empty());

        let stored = services.add_singleton(Greeting("hi"));
        let fetched = services.get::<Greeting>().unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(fetched.0, "hi");
        assert!(services.contains::<Greeting>());
    }

    #[test]
    fn test_replaces_same_type() {
        let mut services = Services::new();
        services.add_singleton(Greeting("one"));
        services.add_singleton(Greeting("two"));
        assert_eq!(services.len(), 1);
        assert_eq!(services.get::<Greeting>().unwrap().0, "two");
    }

    #[test]
    fn test_missing_required() {
        let services = Services::new();
        let err = services.get_required::<Greeting>().unwrap_err();
        assert!(matches!(err, HostError::MissingService(name) if name.ends_with("Greeting")));
    }
}
