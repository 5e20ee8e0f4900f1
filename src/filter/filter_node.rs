use std::sync::Arc;

use arcstr::Substr;

use super::sibling_set::SiblingSet;
use crate::topic::FilterLevel;
use crate::trie::TopicNode;

type Nodes<V> = Vec<Arc<TopicNode<V>>>;

/// One level of a filter evaluated against a trie snapshot.
///
/// Each variant keeps the siblings it was built from and the subset of them
/// it matched. Nodes are cheap views: they share the snapshot's trie nodes
/// and hold no state of their own.
pub enum FilterNode<V> {
	/// Exact level name; also matches protected system levels
	Literal {
		name: Substr,
		siblings: SiblingSet<V>,
		matched: Nodes<V>,
	},
	/// `+`: every wildcard-matchable sibling
	SingleWildcard {
		siblings: SiblingSet<V>,
		matched: Nodes<V>,
	},
	/// `#`: every matchable sibling subtree plus the parent's own topics
	MultiWildcard {
		siblings: SiblingSet<V>,
		matched: Nodes<V>,
		inherited: Nodes<V>,
	},
}

impl<V> FilterNode<V> {
	/// Builds the node for `level` over `siblings`.
	///
	/// `parent` is the filter node one level up, `None` at the top level.
	/// Returns `None` when nothing at this depth can back the level: an
	/// absent literal, or `+` with only protected siblings.
	pub fn from_level(
		level: &FilterLevel,
		siblings: SiblingSet<V>,
		parent: Option<&FilterNode<V>>,
	) -> Option<Self> {
		match level {
			| FilterLevel::Literal(name) => {
				let matched = siblings.named(name);
				(!matched.is_empty()).then(|| FilterNode::Literal {
					name: name.clone(),
					siblings,
					matched,
				})
			}
			| FilterLevel::SingleWildcard => {
				let matched = siblings.matchable();
				(!matched.is_empty())
					.then_some(FilterNode::SingleWildcard { siblings, matched })
			}
			| FilterLevel::MultiWildcard => {
				let inherited: Nodes<V> = parent
					.map(|parent| {
						parent
							.matched()
							.iter()
							.filter(|node| node.is_topic())
							.cloned()
							.collect()
					})
					.unwrap_or_default();
				Some(FilterNode::MultiWildcard {
					matched: siblings.matchable(),
					siblings,
					inherited,
				})
			}
		}
	}

	/// The filter token this node stands for.
	pub fn level(&self) -> FilterLevel {
		match self {
			| FilterNode::Literal { name, .. } => FilterLevel::Literal(name.clone()),
			| FilterNode::SingleWildcard { .. } => FilterLevel::SingleWildcard,
			| FilterNode::MultiWildcard { .. } => FilterLevel::MultiWildcard,
		}
	}

	/// Compares the token without building a [`FilterLevel`].
	pub fn is_level(&self, level: &FilterLevel) -> bool {
		match (self, level) {
			| (FilterNode::Literal { name, .. }, FilterLevel::Literal(other)) => {
				name == other
			}
			| (FilterNode::SingleWildcard { .. }, FilterLevel::SingleWildcard)
			| (FilterNode::MultiWildcard { .. }, FilterLevel::MultiWildcard) => {
				true
			}
			| _ => false,
		}
	}

	pub fn siblings(&self) -> &SiblingSet<V> {
		match self {
			| FilterNode::Literal { siblings, .. }
			| FilterNode::SingleWildcard { siblings, .. }
			| FilterNode::MultiWildcard { siblings, .. } => siblings,
		}
	}

	/// Siblings selected by this level.
	pub fn matched(&self) -> &[Arc<TopicNode<V>>] {
		match self {
			| FilterNode::Literal { matched, .. }
			| FilterNode::SingleWildcard { matched, .. }
			| FilterNode::MultiWildcard { matched, .. } => matched,
		}
	}

	/// The level space one depth below, `None` for `#`.
	pub fn child_siblings(&self) -> Option<SiblingSet<V>> {
		match self {
			| FilterNode::Literal { matched, .. }
			| FilterNode::SingleWildcard { matched, .. } => {
				Some(SiblingSet::new(matched.clone()))
			}
			| FilterNode::MultiWildcard { .. } => None,
		}
	}

	/// Locates the child node for `level`, if it exists.
	pub fn seek_child(&self, level: &FilterLevel) -> Option<FilterNode<V>> {
		let siblings = self.child_siblings()?;
		FilterNode::from_level(level, siblings, Some(self))
	}

	/// Published topics matched by the filter path ending at this node.
	pub fn backing_topics(&self) -> Vec<&TopicNode<V>> {
		match self {
			| FilterNode::Literal { matched, .. }
			| FilterNode::SingleWildcard { matched, .. } => matched
				.iter()
				.map(Arc::as_ref)
				.filter(|node| node.is_topic())
				.collect(),
			| FilterNode::MultiWildcard {
				matched, inherited, ..
			} => {
				let mut topics: Vec<&TopicNode<V>> =
					inherited.iter().map(Arc::as_ref).collect();
				for node in matched {
					node.collect_matchable_topics(&mut topics);
				}
				topics
			}
		}
	}

	/// Same as `!self.backing_topics().is_empty()` without collecting.
	pub fn has_backing_topics(&self) -> bool {
		match self {
			| FilterNode::Literal { matched, .. }
			| FilterNode::SingleWildcard { matched, .. } => {
				matched.iter().any(|node| node.is_topic())
			}
			| FilterNode::MultiWildcard {
				matched, inherited, ..
			} => {
				!inherited.is_empty()
					|| matched.iter().any(|node| node.has_matchable_topic())
			}
		}
	}
}
