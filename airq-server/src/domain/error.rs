//! Domain error types.
//!
//! These describe requests that cannot be satisfied from the data at hand.
//! They are distinct from provider and storage failures.

/// No online station with usable coordinates and a computable distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no online station with valid coordinates")]
pub struct AllStationsOffline;
