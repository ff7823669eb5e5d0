//! Folding scored records into per-cell scores.

pub mod cells;
pub mod specificity;
