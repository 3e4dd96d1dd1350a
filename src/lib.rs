//! Backend agnostic data access: criteria and joins are described once and
//! run by any backend, natively when the backend can, in process otherwise.
//!
//! Backends live in their own crates (`trove-sqlite`, `trove-memory`).
pub use trove_core::*;
