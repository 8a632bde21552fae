//! Approximate location of this host from its public IP address.

use crate::{http_client, GeolocationError, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use presence_types::Coordinate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Default ipapi.co-compatible endpoint.
pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

/// A coarse, IP-derived location. City-level accuracy at best.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub ip: Option<String>,
    pub timezone: Option<String>,
}

impl IpLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Looks up the caller's location by IP.
#[async_trait]
pub trait IpGeolocator: Send + Sync {
    async fn locate(&self) -> Result<IpLocation, GeolocationError>;
}

/// Raw ipapi.co response. Error responses carry `error: true` and a `reason`.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl TryFrom<IpApiResponse> for IpLocation {
    type Error = GeolocationError;

    fn try_from(raw: IpApiResponse) -> Result<Self, Self::Error> {
        if raw.error {
            return Err(GeolocationError::InvalidResponse(
                raw.reason.unwrap_or_else(|| "service reported an error".into()),
            ));
        }
        let (Some(latitude), Some(longitude)) = (raw.latitude, raw.longitude) else {
            return Err(GeolocationError::InvalidResponse(
                "response has no coordinates".into(),
            ));
        };
        Ok(Self {
            latitude,
            longitude,
            city: raw.city,
            region: raw.region,
            country: raw.country_name,
            ip: raw.ip,
            timezone: raw.timezone,
        })
    }
}

/// Client for an ipapi.co-compatible JSON endpoint.
pub struct IpApiClient {
    http_client: reqwest::Client,
    url: String,
}

impl IpApiClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: http_client(timeout),
            url: url.into(),
        }
    }

    async fn fetch(&self) -> Result<IpLocation, GeolocationError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let raw: IpApiResponse = response.json().await?;
        IpLocation::try_from(raw)
    }
}

impl Default for IpApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_GEOLOCATION_URL)
    }
}

#[async_trait]
impl IpGeolocator for IpApiClient {
    async fn locate(&self) -> Result<IpLocation, GeolocationError> {
        info!("fetching location via IP");
        let result = self.fetch().await;

        match &result {
            Ok(location) => info!(
                latitude = location.latitude,
                longitude = location.longitude,
                city = location.city.as_deref().unwrap_or("unknown"),
                "location fetched"
            ),
            Err(e) => error!("{e}"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<IpLocation, GeolocationError> {
        let raw: IpApiResponse = serde_json::from_str(json).unwrap();
        IpLocation::try_from(raw)
    }

    #[test]
    fn test_parse_full_response() {
        let location = parse(
            r#"{
                "ip": "203.0.113.7",
                "city": "Mumbai",
                "region": "Maharashtra",
                "country": "IN",
                "country_name": "India",
                "latitude": 19.076,
                "longitude": 72.8777,
                "timezone": "Asia/Kolkata"
            }"#,
        )
        .unwrap();
        assert_eq!(location.country.as_deref(), Some("India"));
        assert_eq!(location.city.as_deref(), Some("Mumbai"));
        assert_eq!(location.coordinate(), Coordinate::new(19.076, 72.8777));
    }

    #[test]
    fn test_missing_coordinates_is_invalid() {
        let err = parse(r#"{"ip": "203.0.113.7", "city": "Mumbai"}"#).unwrap_err();
        assert!(matches!(err, GeolocationError::InvalidResponse(_)));
    }

    #[test]
    fn test_error_payload_is_invalid() {
        let err = parse(r#"{"error": true, "reason": "RateLimited"}"#).unwrap_err();
        match err {
            GeolocationError::InvalidResponse(reason) => assert_eq!(reason, "RateLimited"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Port 9 on localhost is not listening.
        let client = IpApiClient::with_timeout("http://127.0.0.1:9/json/", Duration::from_secs(2));
        let err = client.locate().await.unwrap_err();
        assert!(matches!(
            err,
            GeolocationError::Network(_) | GeolocationError::Timeout
        ));
    }
}
