//! Process-local beacon registry.

use crate::{BeaconRegistry, StoreError};
use presence_types::{BeaconRegistration, SessionId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registrations held in memory for the lifetime of the process.
///
/// Reads take a shared lock, so concurrent verifications never block each other;
/// a re-registration briefly takes the write lock and replaces the entry.
#[derive(Default)]
pub struct MemoryBeaconRegistry {
    registrations: RwLock<HashMap<SessionId, BeaconRegistration>>,
}

impl MemoryBeaconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's registration with an inactive copy. Returns whether one existed.
    pub fn deactivate(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let mut map = self.registrations.write().map_err(|_| poisoned())?;
        let Some(old) = map.remove(session_id) else {
            return Ok(false);
        };
        map.insert(
            session_id.clone(),
            BeaconRegistration {
                active: false,
                ..old
            },
        );
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.registrations.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("registry lock poisoned".into())
}

impl BeaconRegistry for MemoryBeaconRegistry {
    fn put(&self, registration: BeaconRegistration) -> Result<(), StoreError> {
        self.registrations
            .write()
            .map_err(|_| poisoned())?
            .insert(registration.session_id.clone(), registration);
        Ok(())
    }

    fn get(&self, session_id: &SessionId) -> Result<Option<BeaconRegistration>, StoreError> {
        Ok(self
            .registrations
            .read()
            .map_err(|_| poisoned())?
            .get(session_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_types::Timestamp;

    fn registration(session: &str, active: bool) -> BeaconRegistration {
        BeaconRegistration {
            session_id: SessionId::new(session).unwrap(),
            beacon_id: "beacon-1".into(),
            threshold: -65,
            registrar_coordinate: None,
            created_at: Timestamp::new(0),
            active,
        }
    }

    #[test]
    fn get_active_filters_inactive_registrations() {
        let registry = MemoryBeaconRegistry::new();
        registry.put(registration("live", true)).unwrap();
        registry.put(registration("closed", false)).unwrap();

        let live = SessionId::new("live").unwrap();
        let closed = SessionId::new("closed").unwrap();
        assert!(registry.get_active(&live).unwrap().is_some());
        assert!(registry.get(&closed).unwrap().is_some());
        assert!(registry.get_active(&closed).unwrap().is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn deactivate_marks_registration_inactive() {
        let registry = MemoryBeaconRegistry::new();
        registry.put(registration("s", true)).unwrap();
        let session = SessionId::new("s").unwrap();
        assert!(registry.deactivate(&session).unwrap());
        assert!(registry.get_active(&session).unwrap().is_none());
        assert!(!registry.deactivate(&SessionId::new("other").unwrap()).unwrap());
    }

    #[test]
    fn deactivate_leaves_previously_read_registration_untouched() {
        let registry = MemoryBeaconRegistry::new();
        let mut original = registration("s", true);
        original.registrar_coordinate = Some(presence_types::Coordinate::new(19.076, 72.8777));
        registry.put(original.clone()).unwrap();
        let session = SessionId::new("s").unwrap();

        let before = registry.get(&session).unwrap().unwrap();
        assert!(registry.deactivate(&session).unwrap());
        let after = registry.get(&session).unwrap().unwrap();

        assert!(before.active);
        assert_eq!(before, original);
        assert_eq!(
            after,
            BeaconRegistration {
                active: false,
                ..original
            }
        );
        assert_eq!(registry.len(), 1);
    }
}
