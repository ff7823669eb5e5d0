/// Engine configuration.
pub mod config;
/// Shared vocabulary types.
pub mod core;
/// Error taxonomy.
pub mod error;
