//! Persisted comparison output.

pub mod builder;
pub mod tiers;
pub mod verify;
