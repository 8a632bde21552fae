//! Location proximity: geodesic distance between two coordinates against a radius.

use crate::VerificationError;
use geographiclib_rs::{Geodesic, InverseGeodesic};
use presence_types::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Distance reported when the check could not be computed.
pub const ERROR_DISTANCE_M: f64 = -1.0;

/// Outcome of one location proximity evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCheckResult {
    pub allowed: bool,
    /// Rounded to 2 decimals, or [`ERROR_DISTANCE_M`] when the inputs were malformed.
    pub distance_m: f64,
    pub radius_m: f64,
    pub message: String,
}

impl GeoCheckResult {
    /// Whether this result is the error sentinel rather than a measured distance.
    pub fn is_error(&self) -> bool {
        self.distance_m < 0.0
    }

    /// Whether the claimant passed: allowed and actually measured.
    pub fn passed(&self) -> bool {
        self.allowed && !self.is_error()
    }
}

/// Scores location proximity on the WGS-84 ellipsoid.
pub struct GeoProximityScorer {
    ellipsoid: Geodesic,
}

impl Default for GeoProximityScorer {
    fn default() -> Self {
        Self {
            ellipsoid: Geodesic::wgs84(),
        }
    }
}

impl GeoProximityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate whether `b` lies within `radius_m` meters of `a`.
    ///
    /// Never fails: malformed input yields `allowed = false` with the
    /// [`ERROR_DISTANCE_M`] sentinel and an error message.
    pub fn evaluate(&self, a: &Coordinate, b: &Coordinate, radius_m: f64) -> GeoCheckResult {
        match self.try_evaluate(a, b, radius_m) {
            Ok(result) => result,
            Err(e) => {
                warn!("error validating proximity: {e}");
                GeoCheckResult {
                    allowed: false,
                    distance_m: ERROR_DISTANCE_M,
                    radius_m,
                    message: format!("ERROR: error validating proximity: {e}"),
                }
            }
        }
    }

    /// Like [`evaluate`](Self::evaluate) but surfaces malformed input as an error.
    pub fn try_evaluate(
        &self,
        a: &Coordinate,
        b: &Coordinate,
        radius_m: f64,
    ) -> Result<GeoCheckResult, VerificationError> {
        a.validate()?;
        b.validate()?;
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(VerificationError::InvalidRadius(radius_m));
        }

        // Boundary comparisons use the rounded value.
        let distance_m = round_to(self.distance_m(a, b), 2);
        let allowed = distance_m <= radius_m;

        let message = if allowed {
            let margin = round_to(radius_m - distance_m, 2);
            let message = format!(
                "SUCCESS: within range ({distance_m:.2}m / {radius_m:.2}m, {margin:.2}m to spare)"
            );
            info!("{message}");
            message
        } else {
            let overage = round_to(distance_m - radius_m, 2);
            let message = format!("FAILED: {overage:.2}m outside the allowed radius of {radius_m:.2}m");
            warn!("{message}");
            message
        };

        Ok(GeoCheckResult {
            allowed,
            distance_m,
            radius_m,
            message,
        })
    }

    /// Unrounded geodesic distance in meters.
    pub fn distance_m(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        let s12: f64 = self
            .ellipsoid
            .inverse(a.latitude, a.longitude, b.latitude, b.longitude);
        s12
    }
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
