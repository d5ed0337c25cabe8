//! Speaker selection
//!
//! Decides which persona holds the floor next, from expertise relevance,
//! recency and the rotation rules of the current phase.

pub mod relevance;
pub mod selector;
