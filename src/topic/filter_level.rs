//! Topic filter level types

use std::convert::{Infallible, TryFrom};

use arcstr::Substr;
use thiserror::Error;

/// Single-level wildcard token
pub const SINGLE_WILDCARD: &str = "+";

/// Multi-level wildcard token
pub const MULTI_WILDCARD: &str = "#";

/// Error types for topic filter parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicFilterError {
	/// Hash wildcard (#) used not at the end of the filter
	#[error(
		"Invalid topic filter '{filter}': # wildcard can only be the last \
		 level"
	)]
	HashPosition {
		/// The invalid filter
		filter: String,
	},

	/// Wildcard characters (+ or #) used incorrectly
	#[error("Invalid wildcard usage: {usage}")]
	WildcardUsage {
		/// Description of invalid usage
		usage: String,
	},

	/// Empty filter is not valid
	#[error("Topic filter cannot be empty")]
	EmptyFilter,

	/// A level contains a forbidden character
	#[error("Invalid filter level '{level}' at position {position}")]
	InvalidLevel {
		/// The rejected level
		level: String,
		/// Index of the offending level
		position: usize,
	},

	/// Depth or length limit exceeded
	#[error("Filter limit exceeded: {details}")]
	LimitExceeded {
		/// Which limit and by how much
		details: String,
	},
}

impl TopicFilterError {
	/// Creates a new HashPosition error
	pub fn hash_position(filter: impl Into<String>) -> Self {
		Self::HashPosition {
			filter: filter.into(),
		}
	}

	/// Creates a new WildcardUsage error
	pub fn wildcard_usage(usage: impl Into<String>) -> Self {
		Self::WildcardUsage {
			usage: usage.into(),
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

impl From<Infallible> for TopicFilterError {
	fn from(never: Infallible) -> Self {
		match never {}
	}
}

/// One level of a topic filter: a literal name or a wildcard.
///
/// The derived ordering is the traversal order of filter iteration: literal
/// names by their natural string order, then `+`, then `#`. Variant order
/// below is load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterLevel {
	/// Literal level, matched by exact text
	Literal(Substr),
	/// Single-level wildcard `+`
	SingleWildcard,
	/// Multi-level wildcard `#`
	MultiWildcard,
}

impl FilterLevel {
	/// Creates a literal level.
	pub fn literal(name: impl Into<Substr>) -> Self {
		FilterLevel::Literal(name.into())
	}

	/// Returns the token this level represents.
	pub fn as_str(&self) -> &str {
		match self {
			| FilterLevel::Literal(s) => s,
			| FilterLevel::SingleWildcard => SINGLE_WILDCARD,
			| FilterLevel::MultiWildcard => MULTI_WILDCARD,
		}
	}

	/// Returns true if this level is a wildcard (+ or #).
	pub fn is_wildcard(&self) -> bool {
		!matches!(self, FilterLevel::Literal(_))
	}
}

impl std::fmt::Display for FilterLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl TryFrom<Substr> for FilterLevel {
	type Error = TopicFilterError;

	fn try_from(level: Substr) -> Result<Self, Self::Error> {
		let res = match level.as_str() {
			| SINGLE_WILDCARD => FilterLevel::SingleWildcard,
			| MULTI_WILDCARD => FilterLevel::MultiWildcard,
			| _ if level.contains(['+', '#']) => {
				return Err(TopicFilterError::wildcard_usage(level.as_str()));
			}
			| _ if level.contains('/') => {
				return Err(TopicFilterError::wildcard_usage(format!(
					"level separator inside '{level}'"
				)));
			}
			| _ => FilterLevel::Literal(level),
		};
		Ok(res)
	}
}

impl TryFrom<&str> for FilterLevel {
	type Error = TopicFilterError;

	fn try_from(level: &str) -> Result<Self, Self::Error> {
		Self::try_from(Substr::from(level))
	}
}
