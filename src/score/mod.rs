//! Difference scoring.
//!
//! A record's delta strings are parsed into a [`magnitude::MagnitudeSummary`], then
//! [`scorer::score_difference`] turns record and magnitude into a confidence score.

pub mod magnitude;
pub mod rules;
pub mod scorer;
