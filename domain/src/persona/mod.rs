//! Persona domain
//!
//! Board members, their expertise and model fallback chains, and the
//! validated registry that holds them.

pub mod entities;
pub mod registry;
