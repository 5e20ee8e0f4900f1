//! Error types and utilities for the topic module
//!
//! This module contains the composite error type and shared constants
//! for the whole crate, while individual error types remain in their
//! respective modules.

use thiserror::Error;

use super::filter_level::TopicFilterError;
use super::topic_path::TopicPathError;
use crate::filter::FilterIteratorError;
use crate::trie::TopicTrieError;

/// Comprehensive error type for all topic index operations
///
/// Aggregates the errors of the parsing, storage and traversal layers so a
/// broker can surface a single error type while keeping the detailed cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
	/// Published topic parsing or validation error
	#[error("Topic path error: {0}")]
	Path(#[from] TopicPathError),

	/// Topic filter parsing or validation error
	#[error("Topic filter error: {0}")]
	Filter(#[from] TopicFilterError),

	/// Topic trie operation error
	#[error("Topic trie error: {0}")]
	Trie(#[from] TopicTrieError),

	/// Filter iterator read while not positioned
	#[error("Filter iterator error: {0}")]
	Iterator(#[from] FilterIteratorError),
}

/// Convenient Result type for topic index operations
pub type TopicResult<T> = Result<T, TopicError>;

/// Convenient Result type for topic path operations
pub type PathResult<T> = Result<T, TopicPathError>;

/// Convenient Result type for filter operations
pub type FilterResult<T> = Result<T, TopicFilterError>;

/// Convenient Result type for trie operations
pub type TrieResult<T> = Result<T, TopicTrieError>;

/// Topic processing limits and constants
pub mod limits {
	/// Maximum topic nesting depth allowed
	pub const MAX_TOPIC_DEPTH: usize = 32;

	/// Maximum length of a single topic level
	pub const MAX_LEVEL_LENGTH: usize = 256;

	/// Maximum total topic path length
	pub const MAX_TOPIC_LENGTH: usize = 1024;
}

/// Validation utilities for topic operations
pub mod validation {
	use super::limits::*;
	use super::{TopicFilterError, TopicPathError};

	/// Validates a published topic for basic constraints.
	///
	/// Wildcard characters are rejected anywhere in a level; empty levels
	/// (`a//b`) are legal.
	pub fn validate_topic(path: &str) -> Result<(), TopicPathError> {
		if path.is_empty() {
			return Err(TopicPathError::EmptyTopic);
		}

		if path.len() > MAX_TOPIC_LENGTH {
			return Err(TopicPathError::limit_exceeded(format!(
				"Topic too long: {} > {}",
				path.len(),
				MAX_TOPIC_LENGTH
			)));
		}

		let depth = path.split('/').count();
		if depth > MAX_TOPIC_DEPTH {
			return Err(TopicPathError::limit_exceeded(format!(
				"Topic too deep: {depth} levels > {MAX_TOPIC_DEPTH}"
			)));
		}

		for (index, level) in path.split('/').enumerate() {
			if level.len() > MAX_LEVEL_LENGTH {
				return Err(TopicPathError::limit_exceeded(format!(
					"Level {index} too long: {} > {MAX_LEVEL_LENGTH}",
					level.len()
				)));
			}

			if level.contains('\0') {
				return Err(TopicPathError::invalid_level(level, index));
			}

			if level.contains(['+', '#']) {
				return Err(TopicPathError::wildcard_in_topic(path, index));
			}
		}

		Ok(())
	}

	/// Validates a filter for the limits shared with published topics.
	///
	/// Wildcard placement is checked while the levels are parsed.
	pub fn validate_filter(pattern: &str) -> Result<(), TopicFilterError> {
		if pattern.is_empty() {
			return Err(TopicFilterError::EmptyFilter);
		}

		if pattern.len() > MAX_TOPIC_LENGTH {
			return Err(TopicFilterError::limit_exceeded(format!(
				"Filter too long: {} > {}",
				pattern.len(),
				MAX_TOPIC_LENGTH
			)));
		}

		let depth = pattern.split('/').count();
		if depth > MAX_TOPIC_DEPTH {
			return Err(TopicFilterError::limit_exceeded(format!(
				"Filter too deep: {depth} levels > {MAX_TOPIC_DEPTH}"
			)));
		}

		for (index, level) in pattern.split('/').enumerate() {
			if level.len() > MAX_LEVEL_LENGTH {
				return Err(TopicFilterError::limit_exceeded(format!(
					"Level {index} too long: {} > {MAX_LEVEL_LENGTH}",
					level.len()
				)));
			}
			if level.contains('\0') {
				return Err(TopicFilterError::invalid_level(level, index));
			}
		}

		Ok(())
	}
}
