//! Fundamental types for attendance presence verification.
//!
//! This crate defines the value types shared by every other crate in the workspace:
//! coordinates, session identifiers, beacon registrations and timestamps.

pub mod beacon;
pub mod coordinate;
pub mod error;
pub mod session;
pub mod time;

pub use beacon::BeaconRegistration;
pub use coordinate::Coordinate;
pub use error::PresenceError;
pub use session::SessionId;
pub use time::Timestamp;
