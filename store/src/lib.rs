//! Storage for presence verification.
//!
//! Every storage backend (a database, or in-memory for testing) implements the
//! traits here. The verification pipeline depends only on the traits.

pub mod beacon;
pub mod error;
pub mod memory;

pub use beacon::BeaconRegistry;
pub use error::StoreError;
pub use memory::MemoryBeaconRegistry;
