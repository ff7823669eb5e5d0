//! Difference detection between two snapshots.

/// Snapshot pair comparison.
pub mod compare;
/// The difference record.
pub mod record;
