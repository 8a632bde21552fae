//! Attendance session identifier.

use crate::PresenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an attendance session, as issued by the session service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Create a session id, rejecting blank strings.
    pub fn new(raw: impl Into<String>) -> Result<Self, PresenceError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(PresenceError::InvalidSessionId("session id is empty".into()));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = PresenceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}
