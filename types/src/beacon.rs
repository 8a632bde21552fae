//! Beacon registration owned by an attendance session.

use crate::{Coordinate, SessionId, Timestamp};
use serde::{Deserialize, Serialize};

/// A short-range radio beacon registered by the session's registrar.
///
/// Registrations are never updated in place: re-registering a session replaces the
/// previous entry wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeaconRegistration {
    pub session_id: SessionId,
    /// Identifier broadcast by the beacon (usually a UUID).
    pub beacon_id: String,
    /// Minimum acceptable RSSI in dBm.
    pub threshold: i32,
    /// Where the registrar stood when the beacon was started, if known.
    pub registrar_coordinate: Option<Coordinate>,
    pub created_at: Timestamp,
    pub active: bool,
}

impl BeaconRegistration {
    /// Whether `scanned` names this beacon. Beacon ids compare case-insensitively.
    pub fn matches_beacon(&self, scanned: &str) -> bool {
        self.beacon_id.eq_ignore_ascii_case(scanned.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beacon_ids_match_case_insensitively() {
        let reg = BeaconRegistration {
            session_id: SessionId::new("s1").unwrap(),
            beacon_id: "550e8400-e29b-41d4-a716-446655440000".into(),
            threshold: -65,
            registrar_coordinate: None,
            created_at: Timestamp::new(0),
            active: true,
        };
        assert!(reg.matches_beacon("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!reg.matches_beacon("550e8400-0000-0000-0000-000000000000"));
    }
}
