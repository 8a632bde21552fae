//! Beacon registration and the standalone radio proximity check.

use crate::radio::{RadioCheckResult, RadioProximityScorer};
use crate::VerificationError;
use presence_store::BeaconRegistry;
use presence_types::{BeaconRegistration, Coordinate, SessionId, Timestamp};
use tracing::info;

/// Register (or re-register) the beacon for a session.
///
/// The new registration is active and replaces any previous one for the session.
pub fn register_beacon(
    registry: &dyn BeaconRegistry,
    session_id: SessionId,
    beacon_id: &str,
    threshold: i32,
    registrar_coordinate: Option<Coordinate>,
) -> Result<BeaconRegistration, VerificationError> {
    let beacon_id = beacon_id.trim();
    if beacon_id.is_empty() {
        return Err(VerificationError::InvalidBeacon("beacon id is empty".into()));
    }
    if let Some(coordinate) = &registrar_coordinate {
        coordinate.validate()?;
    }

    let registration = BeaconRegistration {
        session_id,
        beacon_id: beacon_id.to_string(),
        threshold,
        registrar_coordinate,
        created_at: Timestamp::now(),
        active: true,
    };
    registry.put(registration.clone())?;

    info!(
        session = %registration.session_id,
        beacon = %registration.beacon_id,
        threshold,
        "beacon registered"
    );
    Ok(registration)
}

/// Check a scanned beacon's RSSI samples against the session's registration.
pub fn check_beacon_proximity(
    registry: &dyn BeaconRegistry,
    session_id: &SessionId,
    beacon_id: &str,
    samples: &[i32],
) -> Result<RadioCheckResult, VerificationError> {
    let registration = registry
        .get_active(session_id)?
        .ok_or_else(|| VerificationError::BeaconNotFound(session_id.to_string()))?;

    if !registration.matches_beacon(beacon_id) {
        return Err(VerificationError::BeaconMismatch {
            scanned: beacon_id.to_string(),
            registered: registration.beacon_id,
        });
    }

    RadioProximityScorer::new().evaluate(samples, registration.threshold)
}
