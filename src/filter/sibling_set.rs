use std::fmt;
use std::sync::Arc;

use arcstr::Substr;

use crate::topic::FilterLevel;
use crate::trie::TopicNode;

/// One filter depth viewed as an ordered level space.
///
/// Holds the trie nodes matched by the parent filter level; their children
/// are the siblings at this depth. Level seeks take the min/max over each
/// parent's ordered child map, so moving between levels never scans the
/// children.
pub struct SiblingSet<V> {
	parents: Arc<[Arc<TopicNode<V>>]>,
}

impl<V> Clone for SiblingSet<V> {
	fn clone(&self) -> Self {
		Self {
			parents: Arc::clone(&self.parents),
		}
	}
}

impl<V> fmt::Debug for SiblingSet<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SiblingSet")
			.field("parents", &self.parents.len())
			.field("first", &self.first_name())
			.field("last", &self.last_name())
			.finish()
	}
}

impl<V> SiblingSet<V> {
	pub(crate) fn new(parents: Vec<Arc<TopicNode<V>>>) -> Self {
		Self {
			parents: parents.into(),
		}
	}

	/// The top level of a trie: the root's children.
	pub(crate) fn root(root: Arc<TopicNode<V>>) -> Self {
		Self::new(vec![root])
	}

	/// All sibling nodes, grouped by parent.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<TopicNode<V>>> {
		self.parents.iter().flat_map(|parent| parent.children())
	}

	pub fn is_empty(&self) -> bool {
		!self.parents.iter().any(|parent| parent.has_children())
	}

	/// Siblings named exactly `name`, at most one per parent.
	pub fn named(&self, name: &str) -> Vec<Arc<TopicNode<V>>> {
		self.parents
			.iter()
			.filter_map(|parent| parent.child(name))
			.cloned()
			.collect()
	}

	/// Siblings a wildcard may match.
	pub fn matchable(&self) -> Vec<Arc<TopicNode<V>>> {
		self.iter()
			.filter(|node| node.is_wildcard_matchable())
			.cloned()
			.collect()
	}

	pub fn has_matchable(&self) -> bool {
		self.iter().any(|node| node.is_wildcard_matchable())
	}

	fn first_name(&self) -> Option<&Substr> {
		self.parents
			.iter()
			.filter_map(|parent| parent.first_child_level())
			.min()
	}

	fn last_name(&self) -> Option<&Substr> {
		self.parents
			.iter()
			.filter_map(|parent| parent.last_child_level())
			.max()
	}

	fn name_after(&self, name: &str) -> Option<&Substr> {
		self.parents
			.iter()
			.filter_map(|parent| parent.child_level_after(name))
			.min()
	}

	fn name_before(&self, name: &str) -> Option<&Substr> {
		self.parents
			.iter()
			.filter_map(|parent| parent.child_level_before(name))
			.max()
	}

	/// True when a filter node for `level` exists at this depth.
	pub fn contains(&self, level: &FilterLevel) -> bool {
		match level {
			| FilterLevel::Literal(name) => {
				self.parents.iter().any(|parent| parent.child(name).is_some())
			}
			| FilterLevel::SingleWildcard => self.has_matchable(),
			| FilterLevel::MultiWildcard => true,
		}
	}

	/// Smallest level at this depth. `#` always exists, so there is one.
	pub fn first_level(&self) -> FilterLevel {
		match self.first_name() {
			| Some(name) => FilterLevel::Literal(name.clone()),
			| None => FilterLevel::MultiWildcard,
		}
	}

	/// Largest level at this depth.
	pub fn last_level(&self) -> FilterLevel {
		FilterLevel::MultiWildcard
	}

	/// Smallest existing level strictly greater than `level`.
	///
	/// `level` itself need not exist, which is what lets a seek jump from
	/// a missing literal straight to its successor.
	pub fn level_after(&self, level: &FilterLevel) -> Option<FilterLevel> {
		match level {
			| FilterLevel::Literal(name) => Some(
				match self.name_after(name) {
					| Some(next) => FilterLevel::Literal(next.clone()),
					| None if self.has_matchable() => {
						FilterLevel::SingleWildcard
					}
					| None => FilterLevel::MultiWildcard,
				},
			),
			| FilterLevel::SingleWildcard => Some(FilterLevel::MultiWildcard),
			| FilterLevel::MultiWildcard => None,
		}
	}

	/// Largest existing level strictly less than `level`.
	pub fn level_before(&self, level: &FilterLevel) -> Option<FilterLevel> {
		let last_literal =
			|| self.last_name().map(|name| FilterLevel::Literal(name.clone()));
		match level {
			| FilterLevel::Literal(name) => self
				.name_before(name)
				.map(|prev| FilterLevel::Literal(prev.clone())),
			| FilterLevel::SingleWildcard => last_literal(),
			| FilterLevel::MultiWildcard if self.has_matchable() => {
				Some(FilterLevel::SingleWildcard)
			}
			| FilterLevel::MultiWildcard => last_literal(),
		}
	}
}
