//! The JSON request file consumed by `presence verify`.

use anyhow::Context;
use presence_store::BeaconRegistry;
use presence_types::SessionId;
use presence_verification::{register_beacon, VerificationError, VerificationRequest};
use serde::Deserialize;
use std::path::Path;

/// A beacon to register before the claim is verified.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BeaconEntry {
    pub beacon_id: String,
    /// Defaults to the request's `session_id`.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Defaults to the configured `default_rssi_threshold`.
    #[serde(default)]
    pub threshold: Option<i32>,
}

/// A verification request plus an optional beacon registration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RequestFile {
    #[serde(flatten)]
    pub request: VerificationRequest,
    #[serde(default)]
    pub beacon: Option<BeaconEntry>,
}

impl RequestFile {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid request file")
    }

    /// Register the file's beacon, if any, anchored at the request's registrar position.
    pub fn apply_beacon(
        &self,
        registry: &dyn BeaconRegistry,
        default_threshold: i32,
    ) -> Result<(), VerificationError> {
        let Some(beacon) = &self.beacon else {
            return Ok(());
        };
        let session_id = beacon
            .session_id
            .clone()
            .or_else(|| self.request.session_id.clone())
            .ok_or_else(|| {
                VerificationError::InvalidBeacon("beacon registration needs a session_id".into())
            })?;
        register_beacon(
            registry,
            session_id,
            &beacon.beacon_id,
            beacon.threshold.unwrap_or(default_threshold),
            Some(self.request.anchor),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_store::MemoryBeaconRegistry;

    const REQUEST: &str = r#"{
        "anchor": {"latitude": 19.076, "longitude": 72.8777},
        "claimant": {"latitude": 19.07601, "longitude": 72.8777},
        "session_id": "lecture-42",
        "beacon_id": "beacon-a",
        "rssi_samples": [-60, -61, -60],
        "probe_image": "selfie.jpg",
        "reference_image": "enrolled.jpg",
        "beacon": {"beacon_id": "BEACON-A"}
    }"#;

    #[test]
    fn parses_flattened_request_and_beacon() {
        let file = RequestFile::from_json_str(REQUEST).unwrap();
        assert_eq!(file.request.session_id.as_ref().unwrap().as_str(), "lecture-42");
        assert_eq!(file.request.rssi_samples, Some(vec![-60, -61, -60]));
        let beacon = file.beacon.as_ref().unwrap();
        assert_eq!(beacon.beacon_id, "BEACON-A");
        assert_eq!(beacon.threshold, None);
    }

    #[test]
    fn beacon_inherits_session_and_default_threshold() {
        let file = RequestFile::from_json_str(REQUEST).unwrap();
        let registry = MemoryBeaconRegistry::new();
        file.apply_beacon(&registry, -65).unwrap();

        let session = SessionId::new("lecture-42").unwrap();
        let registration = registry.get_active(&session).unwrap().unwrap();
        assert_eq!(registration.threshold, -65);
        assert_eq!(registration.registrar_coordinate, Some(file.request.anchor));
        assert!(registration.matches_beacon("beacon-a"));
    }

    #[test]
    fn beacon_without_any_session_is_rejected() {
        let mut file = RequestFile::from_json_str(REQUEST).unwrap();
        file.request.session_id = None;
        let registry = MemoryBeaconRegistry::new();
        assert!(matches!(
            file.apply_beacon(&registry, -65),
            Err(VerificationError::InvalidBeacon(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn request_without_beacon_registers_nothing() {
        let file = RequestFile::from_json_str(
            r#"{
                "anchor": {"latitude": 0.0, "longitude": 0.0},
                "claimant": {"latitude": 0.0, "longitude": 0.0},
                "probe_image": "a.jpg",
                "reference_image": "b.jpg"
            }"#,
        )
        .unwrap();
        let registry = MemoryBeaconRegistry::new();
        file.apply_beacon(&registry, -65).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn malformed_request_is_an_error() {
        assert!(RequestFile::from_json_str(r#"{"anchor": 5}"#).is_err());
    }
}
