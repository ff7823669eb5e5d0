//! Logical grid overlaid on a rendered page.

pub mod mapper;
