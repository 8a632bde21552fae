//! Beacon registry storage trait.

use crate::StoreError;
use presence_types::{BeaconRegistration, SessionId};

/// Key-value store of beacon registrations, keyed by session id.
///
/// Readers treat the registry as read-only; writes come from the registration
/// operation. Concurrent re-registrations are last-writer-wins.
pub trait BeaconRegistry: Send + Sync {
    /// Store a registration, replacing any previous one for the same session.
    fn put(&self, registration: BeaconRegistration) -> Result<(), StoreError>;

    /// Look up the registration for a session.
    fn get(&self, session_id: &SessionId) -> Result<Option<BeaconRegistration>, StoreError>;

    /// Look up the registration for a session only if it is still active.
    fn get_active(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<BeaconRegistration>, StoreError> {
        Ok(self.get(session_id)?.filter(|r| r.active))
    }
}
