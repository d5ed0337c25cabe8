//! Chat messages exchanged with completion models.

pub mod entities;
