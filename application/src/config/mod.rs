//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`CallerSettings`]: per-call timeout, retry policy and generation parameters
//! - [`DiscussionSettings`]: phase targets, speaker selection and context window

pub mod caller_settings;
pub mod discussion_settings;

pub use caller_settings::CallerSettings;
pub use discussion_settings::DiscussionSettings;
