//! Input contract: element snapshots as captured by an extractor.

pub mod model;
