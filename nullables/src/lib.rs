//! Nullable infrastructure for deterministic testing.
//!
//! Everything the verification pipeline reaches outside itself for (the beacon
//! registry, the face matcher, the document extractor) sits behind a trait. This
//! crate provides test-friendly implementations that:
//! - Return scripted values
//! - Record what they were asked
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod collaborator;
pub mod store;

pub use collaborator::{NullDocumentExtractor, NullFaceMatcher};
pub use store::NullBeaconRegistry;
