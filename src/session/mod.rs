//! Session-oriented comparison API.

pub mod comparison;
pub mod convergence;
pub mod fingerprint;
