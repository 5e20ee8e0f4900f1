use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::ops::Bound;
use std::sync::Arc;

use arcstr::{ArcStr, Substr};

use super::config::PrunePolicy;
use crate::topic::{SYSTEM_TOPIC_PREFIX, TopicPath};

/// Node in the topic trie representing one level of a published topic.
///
/// Nodes are shared between trie versions through `Arc`. Writers go through
/// `Arc::make_mut`, so a node still referenced by a snapshot or an iterator is
/// copied before it changes and readers keep seeing the old version.
#[derive(Debug, Clone)]
pub struct TopicNode<V> {
	/// Level name; empty for the synthetic root
	level: Substr,

	/// Fixed at creation: false for `$` levels at the first matchable depth
	/// and for tenant levels above it
	wildcard_matchable: bool,

	/// Children ordered by level name for range seeks
	children: BTreeMap<Substr, Arc<TopicNode<V>>>,

	/// Set only while the node is a published topic
	topic: Option<TopicPath>,

	values: HashSet<V>,
}

impl<V> TopicNode<V> {
	pub(crate) fn root() -> Self {
		Self::new(Substr::from(ArcStr::new()), true)
	}

	fn new(level: Substr, wildcard_matchable: bool) -> Self {
		Self {
			level,
			wildcard_matchable,
			children: BTreeMap::new(),
			topic: None,
			values: HashSet::new(),
		}
	}

	pub fn level(&self) -> &Substr {
		&self.level
	}

	/// Whether `+` and `#` may match this node.
	pub fn is_wildcard_matchable(&self) -> bool {
		self.wildcard_matchable
	}

	/// True when a topic was published at exactly this node.
	pub fn is_topic(&self) -> bool {
		self.topic.is_some()
	}

	pub fn topic(&self) -> Option<&TopicPath> {
		self.topic.as_ref()
	}

	pub fn values(&self) -> &HashSet<V> {
		&self.values
	}

	pub fn child(&self, level: &str) -> Option<&Arc<TopicNode<V>>> {
		self.children.get(level)
	}

	/// Children in level-name order.
	pub fn children(
		&self,
	) -> impl DoubleEndedIterator<Item = &Arc<TopicNode<V>>> {
		self.children.values()
	}

	pub fn has_children(&self) -> bool {
		!self.children.is_empty()
	}

	pub fn first_child_level(&self) -> Option<&Substr> {
		self.children.keys().next()
	}

	pub fn last_child_level(&self) -> Option<&Substr> {
		self.children.keys().next_back()
	}

	/// Smallest child level strictly greater than `level`.
	pub fn child_level_after(&self, level: &str) -> Option<&Substr> {
		self.children
			.range::<str, _>((Bound::Excluded(level), Bound::Unbounded))
			.next()
			.map(|(name, _)| name)
	}

	/// Largest child level strictly less than `level`.
	pub fn child_level_before(&self, level: &str) -> Option<&Substr> {
		self.children
			.range::<str, _>((Bound::Unbounded, Bound::Excluded(level)))
			.next_back()
			.map(|(name, _)| name)
	}

	/// Follows `levels` by exact name.
	pub fn find(&self, levels: &[Substr]) -> Option<&TopicNode<V>> {
		levels.iter().try_fold(self, |node, level| {
			node.children.get(level.as_str()).map(Arc::as_ref)
		})
	}

	/// Collects every published topic in this subtree reachable by a
	/// wildcard, this node included. Non-matchable subtrees are skipped.
	pub fn collect_matchable_topics<'a>(
		&'a self,
		out: &mut Vec<&'a TopicNode<V>>,
	) {
		let mut pending = vec![self];
		while let Some(node) = pending.pop() {
			if !node.wildcard_matchable {
				continue;
			}
			if node.is_topic() {
				out.push(node);
			}
			pending.extend(node.children.values().map(Arc::as_ref));
		}
	}

	/// Early-exit form of [`Self::collect_matchable_topics`].
	pub fn has_matchable_topic(&self) -> bool {
		let mut pending = vec![self];
		while let Some(node) = pending.pop() {
			if !node.wildcard_matchable {
				continue;
			}
			if node.is_topic() {
				return true;
			}
			pending.extend(node.children.values().map(Arc::as_ref));
		}
		false
	}

	/// Number of published topics in this subtree.
	pub fn topic_count(&self) -> usize {
		let mut count = 0;
		let mut pending = vec![self];
		while let Some(node) = pending.pop() {
			count += usize::from(node.is_topic());
			pending.extend(node.children.values().map(Arc::as_ref));
		}
		count
	}

	fn is_prunable(&self) -> bool {
		self.topic.is_none() && self.children.is_empty()
	}
}

impl<V: Clone + Eq + Hash> TopicNode<V> {
	/// Inserts `value` under `topic`, creating missing path nodes.
	///
	/// Returns false if the value was already stored for this topic.
	pub(crate) fn insert(
		root: &mut Arc<Self>,
		topic: &TopicPath,
		value: V,
		first_matchable_depth: usize,
	) -> bool {
		let mut node = Arc::make_mut(root);
		for (i, level) in topic.levels().iter().enumerate() {
			let depth = i + 1;
			let child = node.children.entry(level.clone()).or_insert_with(|| {
				let matchable = depth > first_matchable_depth
					|| (depth == first_matchable_depth
						&& !level.starts_with(SYSTEM_TOPIC_PREFIX));
				Arc::new(TopicNode::new(level.clone(), matchable))
			});
			node = Arc::make_mut(child);
		}
		if node.topic.is_none() {
			node.topic = Some(topic.clone());
		}
		node.values.insert(value)
	}

	/// Removes `value`, or every value when `None`, from the node at
	/// `levels`. Returns how many values were removed.
	///
	/// Nodes are copied on the way down, so callers check with
	/// [`Self::find`] first and skip the call when nothing would change.
	pub(crate) fn remove(
		node: &mut Arc<Self>,
		levels: &[Substr],
		value: Option<&V>,
		prune_policy: PrunePolicy,
	) -> usize {
		let node = Arc::make_mut(node);
		match levels {
			| [] => {
				let removed = match value {
					| Some(value) => usize::from(node.values.remove(value)),
					| None => {
						let count = node.values.len();
						node.values.clear();
						count
					}
				};
				if node.values.is_empty() {
					node.topic = None;
				}
				removed
			}
			| [level, rest @ ..] => {
				let Some(child) = node.children.get_mut(level.as_str()) else {
					return 0;
				};
				let removed = Self::remove(child, rest, value, prune_policy);
				if prune_policy == PrunePolicy::Eager && child.is_prunable() {
					node.children.remove(level.as_str());
				}
				removed
			}
		}
	}
}
