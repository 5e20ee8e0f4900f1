use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::slice::Iter;

use arcstr::ArcStr;
use smallvec::SmallVec;

use super::filter_level::{FilterLevel, TopicFilterError};
use super::topic_path::TopicPath;
use super::validation;

/// Inline capacity covering the usual filter depth
type Levels = SmallVec<[FilterLevel; 8]>;

/// Parsed MQTT topic filter with wildcard support.
///
/// Equality, hashing and ordering follow the level sequence, using the
/// [`FilterLevel`] order (literals, then `+`, then `#`) at every depth.
#[derive(Debug, Clone)]
pub struct TopicFilter {
	pattern: ArcStr, // original filter as a string "sensors/+/data"
	levels: Levels,
}

impl TopicFilter {
	/// Parses and validates a topic filter.
	pub fn new(pattern: impl Into<ArcStr>) -> Result<Self, TopicFilterError> {
		let pattern = pattern.into();
		validation::validate_filter(&pattern)?;

		let levels: Result<Levels, _> = pattern
			.split('/')
			.map(|s| pattern.substr_from(s))
			.map(FilterLevel::try_from)
			.collect();
		let levels = levels?;
		Self::check_hash_position(&levels, &pattern)?;

		Ok(Self { pattern, levels })
	}

	/// Builds a filter from already parsed levels.
	pub fn from_levels<I>(levels: I) -> Result<Self, TopicFilterError>
	where I: IntoIterator<Item = FilterLevel> {
		let levels: Levels = levels.into_iter().collect();
		if levels.is_empty() {
			return Err(TopicFilterError::EmptyFilter);
		}
		for level in &levels {
			if let FilterLevel::Literal(name) = level {
				// Re-parse so hand-built literals obey the same rules
				FilterLevel::try_from(name.clone())?;
			}
		}
		let pattern = ArcStr::from(Self::to_pattern(&levels));
		validation::validate_filter(&pattern)?;
		Self::check_hash_position(&levels, &pattern)?;
		Ok(Self { pattern, levels })
	}

	/// Builds a filter from levels taken out of a trie.
	///
	/// Skips the limits check: a trie path at the maximum depth followed by
	/// `#` is one level deeper than a parsed filter may be.
	pub(crate) fn from_valid_levels<I>(levels: I) -> Self
	where I: IntoIterator<Item = FilterLevel> {
		let levels: Levels = levels.into_iter().collect();
		let pattern = ArcStr::from(Self::to_pattern(&levels));
		Self { pattern, levels }
	}

	fn check_hash_position(
		levels: &[FilterLevel],
		pattern: &str,
	) -> Result<(), TopicFilterError> {
		if let Some(hash_pos) = levels
			.iter()
			.position(|l| matches!(l, FilterLevel::MultiWildcard))
		{
			if hash_pos != levels.len() - 1 {
				return Err(TopicFilterError::hash_position(pattern));
			}
		}
		Ok(())
	}

	fn to_pattern(levels: &[FilterLevel]) -> String {
		let mut pattern = String::with_capacity(
			levels.len() + levels.iter().map(|l| l.as_str().len()).sum::<usize>(),
		);
		levels.iter().enumerate().for_each(|(i, level)| {
			if i > 0 {
				pattern.push('/');
			}
			pattern.push_str(level.as_str());
		});
		pattern
	}

	/// Returns the filter string.
	pub fn pattern(&self) -> ArcStr {
		self.pattern.clone()
	}

	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns iterator over filter levels.
	pub fn iter(&self) -> Iter<'_, FilterLevel> {
		self.levels.iter()
	}

	/// Returns filter levels as slice.
	pub fn levels(&self) -> &[FilterLevel] {
		&self.levels
	}

	/// Returns number of levels in the filter.
	pub fn len(&self) -> usize {
		self.levels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.levels.is_empty()
	}

	/// Returns true if the filter ends with a multi-level wildcard (#).
	pub fn contains_hash(&self) -> bool {
		self.levels
			.last()
			.is_some_and(|l| matches!(l, FilterLevel::MultiWildcard))
	}

	/// Returns true if any level is a wildcard.
	pub fn has_wildcards(&self) -> bool {
		self.levels.iter().any(FilterLevel::is_wildcard)
	}

	/// Checks a single topic against this filter without a trie.
	///
	/// `first_matchable_depth` is the 1-based depth at which a `$` level marks
	/// a system topic; wildcards covering that level never match it. Levels
	/// above that depth (a tenant id) are never matched by wildcards.
	pub fn matches(&self, topic: &TopicPath, first_matchable_depth: usize) -> bool {
		let topic_levels = topic.levels();
		let system_index = first_matchable_depth.saturating_sub(1);
		let is_system = topic.is_system_topic(first_matchable_depth);

		for (i, level) in self.levels.iter().enumerate() {
			match level {
				| FilterLevel::Literal(expected) => {
					if topic_levels.get(i) != Some(expected) {
						return false;
					}
				}
				| FilterLevel::SingleWildcard => {
					if i >= topic_levels.len()
						|| i < system_index || (is_system && i == system_index)
					{
						return false;
					}
				}
				| FilterLevel::MultiWildcard => {
					return i >= system_index && !(is_system && i == system_index);
				}
			}
		}
		self.levels.len() == topic_levels.len()
	}
}

impl PartialEq for TopicFilter {
	fn eq(&self, other: &Self) -> bool {
		self.levels == other.levels
	}
}

impl Eq for TopicFilter {}

impl Hash for TopicFilter {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.levels.hash(state)
	}
}

impl PartialOrd for TopicFilter {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TopicFilter {
	fn cmp(&self, other: &Self) -> Ordering {
		self.levels.cmp(&other.levels)
	}
}

impl fmt::Display for TopicFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

impl TryFrom<String> for TopicFilter {
	type Error = TopicFilterError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<&str> for TopicFilter {
	type Error = TopicFilterError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<ArcStr> for TopicFilter {
	type Error = TopicFilterError;

	fn try_from(value: ArcStr) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<&TopicFilter> for TopicFilter {
	type Error = TopicFilterError;

	fn try_from(value: &TopicFilter) -> Result<Self, Self::Error> {
		Ok(value.clone())
	}
}
