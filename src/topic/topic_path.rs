//! Published topic paths

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};

use arcstr::{ArcStr, Substr};
use thiserror::Error;

use super::validation;

/// First character of a system topic level (`$SYS/...`)
pub const SYSTEM_TOPIC_PREFIX: char = '$';

/// Errors for published topic parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicPathError {
	/// Empty topic is not valid
	#[error("Topic cannot be empty")]
	EmptyTopic,

	/// Wildcards are only legal in filters
	#[error("Topic '{topic}' contains a wildcard at level {position}")]
	WildcardInTopic {
		/// The rejected topic
		topic: String,
		/// Index of the offending level
		position: usize,
	},

	/// A level contains a forbidden character
	#[error("Invalid topic level '{level}' at position {position}")]
	InvalidLevel {
		/// The rejected level
		level: String,
		/// Index of the offending level
		position: usize,
	},

	/// Depth or length limit exceeded
	#[error("Topic limit exceeded: {details}")]
	LimitExceeded {
		/// Which limit and by how much
		details: String,
	},
}

impl TopicPathError {
	/// Creates a new WildcardInTopic error
	pub fn wildcard_in_topic(topic: impl Into<String>, position: usize) -> Self {
		Self::WildcardInTopic {
			topic: topic.into(),
			position,
		}
	}

	/// Creates a new InvalidLevel error
	pub fn invalid_level(level: impl Into<String>, position: usize) -> Self {
		Self::InvalidLevel {
			level: level.into(),
			position,
		}
	}

	/// Creates a new LimitExceeded error
	pub fn limit_exceeded(details: impl Into<String>) -> Self {
		Self::LimitExceeded {
			details: details.into(),
		}
	}
}

impl From<Infallible> for TopicPathError {
	fn from(never: Infallible) -> Self {
		match never {}
	}
}

/// A validated, wildcard-free topic split into levels.
///
/// Levels are `Substr` views into the single shared topic string, so cloning
/// a path or handing its levels to the trie never copies text. Equality,
/// hashing and ordering follow the level sequence.
#[derive(Debug, Clone)]
pub struct TopicPath {
	path: ArcStr,
	levels: Vec<Substr>,
}

impl TopicPath {
	/// Parses and validates a published topic.
	pub fn new(path: impl Into<ArcStr>) -> Result<Self, TopicPathError> {
		let path = path.into();
		validation::validate_topic(&path)?;
		let levels = path.split('/').map(|s| path.substr_from(s)).collect();
		Ok(Self { path, levels })
	}

	/// Builds a topic from an already split level sequence.
	pub fn from_levels<I, S>(levels: I) -> Result<Self, TopicPathError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut path = String::new();
		for (i, level) in levels.into_iter().enumerate() {
			let level = level.as_ref();
			if level.contains('/') {
				return Err(TopicPathError::invalid_level(level, i));
			}
			if i > 0 {
				path.push('/');
			}
			path.push_str(level);
		}
		Self::new(path)
	}

	/// Returns the full topic string.
	pub fn path(&self) -> ArcStr {
		self.path.clone()
	}

	pub fn as_str(&self) -> &str {
		&self.path
	}

	/// Returns the topic levels in order.
	pub fn levels(&self) -> &[Substr] {
		&self.levels
	}

	/// Number of levels; a valid topic always has at least one.
	pub fn len(&self) -> usize {
		self.levels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.levels.is_empty()
	}

	/// Returns true if the level at `first_matchable_depth` (1-based)
	/// starts with [`SYSTEM_TOPIC_PREFIX`].
	pub fn is_system_topic(&self, first_matchable_depth: usize) -> bool {
		first_matchable_depth
			.checked_sub(1)
			.and_then(|index| self.levels.get(index))
			.is_some_and(|level| level.starts_with(SYSTEM_TOPIC_PREFIX))
	}
}

impl PartialEq for TopicPath {
	fn eq(&self, other: &Self) -> bool {
		self.levels == other.levels
	}
}

impl Eq for TopicPath {}

impl Hash for TopicPath {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.levels.hash(state)
	}
}

impl PartialOrd for TopicPath {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TopicPath {
	fn cmp(&self, other: &Self) -> Ordering {
		self.levels.cmp(&other.levels)
	}
}

impl fmt::Display for TopicPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.path)
	}
}

impl TryFrom<&str> for TopicPath {
	type Error = TopicPathError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<String> for TopicPath {
	type Error = TopicPathError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<ArcStr> for TopicPath {
	type Error = TopicPathError;

	fn try_from(value: ArcStr) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<&TopicPath> for TopicPath {
	type Error = TopicPathError;

	fn try_from(value: &TopicPath) -> Result<Self, Self::Error> {
		Ok(value.clone())
	}
}
