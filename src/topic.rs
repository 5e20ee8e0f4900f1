//! Topic handling module
//!
//! This module provides the parsed forms of published topics and
//! subscription filters, together with their validation rules.

// Submodules
pub mod error;
pub mod filter_level;
/// Topic filter parsing and single-topic matching
pub mod topic_filter;
pub mod topic_path;


// Re-export commonly used types for convenience
pub use error::{
	FilterResult, PathResult, TopicError, TopicResult, TrieResult,
};
// Re-export constants and validation utilities
pub use error::{limits, validation};
pub use filter_level::{
	FilterLevel, MULTI_WILDCARD, SINGLE_WILDCARD, TopicFilterError,
};
pub use topic_filter::TopicFilter;
pub use topic_path::{SYSTEM_TOPIC_PREFIX, TopicPath, TopicPathError};
