use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("request timed out while fetching location")]
    Timeout,

    #[error("network error while fetching location: {0}")]
    Network(String),

    #[error("invalid geolocation response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GeolocationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
