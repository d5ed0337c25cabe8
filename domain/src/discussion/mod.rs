//! Discussion domain
//!
//! The [`entities::Discussion`] aggregate with its append-only transcript of
//! [`entities::Turn`]s, and the [`phase::PhaseController`] that walks it
//! through Opening, Debate and Synthesis.

pub mod entities;
pub mod phase;
