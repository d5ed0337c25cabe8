//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: upstream completion models (GPT, Claude, Gemini, etc.)
//! - [`topic::Topic`]: a validated discussion topic
//! - [`error::DomainError`]: domain-level errors and the shared [`error::ErrorCategory`]

pub mod error;
pub mod model;
pub mod string;
pub mod topic;
