//! Nullable beacon registry: thread-safe in-memory storage for testing.

use presence_store::{BeaconRegistry, MemoryBeaconRegistry, StoreError};
use presence_types::{BeaconRegistration, SessionId};

/// An in-memory beacon registry keyed by session id, with optional failure injection.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullBeaconRegistry {
    inner: MemoryBeaconRegistry,
    /// When set, every call fails with this backend error.
    failure: Option<String>,
}

impl NullBeaconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with `registrations`.
    pub fn with_registrations(registrations: impl IntoIterator<Item = BeaconRegistration>) -> Self {
        let registry = Self::new();
        for registration in registrations {
            // The inner lock is fresh and cannot be poisoned.
            let _ = registry.inner.put(registration);
        }
        registry
    }

    /// A registry whose backend is down: every read and write fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            inner: MemoryBeaconRegistry::new(),
            failure: Some(message.into()),
        }
    }

    /// Mark the session's registration inactive. Returns false if there is none.
    pub fn deactivate(&self, session_id: &SessionId) -> bool {
        self.inner.deactivate(session_id).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl BeaconRegistry for NullBeaconRegistry {
    fn put(&self, registration: BeaconRegistration) -> Result<(), StoreError> {
        self.check()?;
        self.inner.put(registration)
    }

    fn get(&self, session_id: &SessionId) -> Result<Option<BeaconRegistration>, StoreError> {
        self.check()?;
        self.inner.get(session_id)
    }
}
