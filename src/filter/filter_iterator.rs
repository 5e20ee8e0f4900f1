use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use super::filter_node::FilterNode;
use super::sibling_set::SiblingSet;
use crate::topic::{FilterLevel, TopicFilter};
use crate::trie::{MatchSet, TopicNode};

/// Errors from reading an iterator that is not on a valid position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterIteratorError {
	#[error("Filter iterator has no current element")]
	NoCurrentElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
	BeforeFirst,
	Positioned,
	Exhausted,
}

/// Ordered, seekable walk over every filter that matches at least one
/// stored topic.
///
/// The key space is the set of filters whose level chain exists in the
/// snapshot the iterator was created from. Keys are visited in [`TopicFilter`]
/// order: a filter comes right before its extensions, and at each depth
/// literals come first, then `+`, then `#`. Positions whose filter matches
/// no topic are skipped.
///
/// The iterator owns a snapshot of the trie, so writes made after its
/// creation are never observed.
///
/// # Example
///
/// ```
/// use mqtt_topic_index::{TopicFilter, TopicTrie};
///
/// let trie = TopicTrie::new();
/// trie.add_topic("sensors/kitchen", 1).unwrap();
///
/// let mut iter = trie.filter_iter();
/// iter.seek(&TopicFilter::new("sensors/+").unwrap());
/// assert_eq!(iter.key().unwrap().as_str(), "sensors/+");
/// iter.next();
/// assert_eq!(iter.key().unwrap().as_str(), "sensors/+/#");
/// iter.next();
/// assert_eq!(iter.key().unwrap().as_str(), "sensors/#");
/// ```
pub struct FilterIterator<V> {
	root: SiblingSet<V>,
	/// Frame `i` is the filter node at depth `i + 1`
	stack: Vec<FilterNode<V>>,
	cursor: Cursor,
}

impl<V> FilterIterator<V> {
	pub(crate) fn new(root: Arc<TopicNode<V>>) -> Self {
		Self {
			root: SiblingSet::root(root),
			stack: Vec::new(),
			cursor: Cursor::BeforeFirst,
		}
	}

	/// True when `key` and `value` can be read.
	pub fn is_valid(&self) -> bool {
		self.cursor == Cursor::Positioned
	}

	/// True once the iterator has moved past the last key.
	pub fn is_exhausted(&self) -> bool {
		self.cursor == Cursor::Exhausted
	}

	/// Moves to the smallest valid key greater than or equal to `filter`.
	pub fn seek(&mut self, filter: &TopicFilter) {
		self.stack.clear();
		for level in filter.iter() {
			if self.push_level(level) {
				continue;
			}
			// Missing token: the next key is the next existing token here
			let Some(siblings) = self.child_siblings() else {
				break;
			};
			if !self.push_next_level(&siblings, level)
				&& !self.skip_subtree_forward()
			{
				self.exhaust();
				trace!(filter = %filter, "Seek ran past the last key");
				return;
			}
			break;
		}
		self.settle_forward();
		trace!(filter = %filter, valid = self.is_valid(), "Seek");
	}

	/// Moves to the largest valid key less than or equal to `filter`.
	pub fn seek_for_prev(&mut self, filter: &TopicFilter) {
		self.stack.clear();
		for level in filter.iter() {
			if self.push_level(level) {
				continue;
			}
			let Some(siblings) = self.child_siblings() else {
				break;
			};
			if self.push_prev_level(&siblings, level) {
				self.descend_last();
			} else if self.stack.is_empty() {
				self.rewind();
				trace!(filter = %filter, "Seek ran before the first key");
				return;
			}
			// otherwise the parent itself is the largest smaller key
			break;
		}
		self.settle_backward();
		trace!(filter = %filter, valid = self.is_valid(), "Seek for prev");
	}

	/// Moves to the smallest valid key.
	pub fn seek_to_first(&mut self) {
		self.stack.clear();
		let first = self.root.first_level();
		self.push_level(&first);
		self.settle_forward();
	}

	/// Moves to the largest valid key.
	pub fn seek_to_last(&mut self) {
		self.stack.clear();
		let last = self.root.last_level();
		self.push_level(&last);
		self.settle_backward();
	}

	/// Advances to the next valid key.
	///
	/// From before-first this is the first key; an exhausted iterator stays
	/// exhausted.
	#[allow(clippy::should_implement_trait)]
	pub fn next(&mut self) {
		match self.cursor {
			| Cursor::BeforeFirst => self.seek_to_first(),
			| Cursor::Exhausted => {}
			| Cursor::Positioned => {
				if self.step_forward() {
					self.settle_forward();
				} else {
					self.exhaust();
				}
			}
		}
	}

	/// Moves back to the previous valid key.
	///
	/// From exhausted this is the last key; stepping back from the first key
	/// returns to before-first.
	pub fn prev(&mut self) {
		match self.cursor {
			| Cursor::BeforeFirst => {}
			| Cursor::Exhausted => self.seek_to_last(),
			| Cursor::Positioned => {
				if self.step_backward() {
					self.settle_backward();
				} else {
					self.rewind();
				}
			}
		}
	}

	/// The filter at the current position.
	pub fn key(&self) -> Result<TopicFilter, FilterIteratorError> {
		if !self.is_valid() {
			return Err(FilterIteratorError::NoCurrentElement);
		}
		Ok(TopicFilter::from_valid_levels(
			self.stack.iter().map(FilterNode::level),
		))
	}

	/// Compares the current key with `filter`, `None` when not valid.
	pub fn cmp_key(&self, filter: &TopicFilter) -> Option<Ordering> {
		self.is_valid().then(|| {
			self.stack
				.iter()
				.map(FilterNode::level)
				.cmp(filter.iter().cloned())
		})
	}

	/// True when positioned exactly on `filter`.
	pub fn is_at(&self, filter: &TopicFilter) -> bool {
		self.is_valid()
			&& self.stack.len() == filter.len()
			&& self
				.stack
				.iter()
				.zip(filter.iter())
				.all(|(node, level)| node.is_level(level))
	}

	fn exhaust(&mut self) {
		self.stack.clear();
		self.cursor = Cursor::Exhausted;
	}

	fn rewind(&mut self) {
		self.stack.clear();
		self.cursor = Cursor::BeforeFirst;
	}

	/// Level space below the current frame; the top level when the stack
	/// is empty, `None` below `#`.
	fn child_siblings(&self) -> Option<SiblingSet<V>> {
		match self.stack.last() {
			| Some(node) => node.child_siblings(),
			| None => Some(self.root.clone()),
		}
	}

	/// Pushes the frame for `level` one depth below the current frame.
	fn push_level(&mut self, level: &FilterLevel) -> bool {
		let Some(siblings) = self.child_siblings() else {
			return false;
		};
		self.push_in(level, siblings)
	}

	fn push_in(&mut self, level: &FilterLevel, siblings: SiblingSet<V>) -> bool {
		match FilterNode::from_level(level, siblings, self.stack.last()) {
			| Some(node) => {
				self.stack.push(node);
				true
			}
			| None => false,
		}
	}

	/// Pushes the smallest existing token after `level` in `siblings`.
	fn push_next_level(
		&mut self,
		siblings: &SiblingSet<V>,
		level: &FilterLevel,
	) -> bool {
		let mut next = siblings.level_after(level);
		while let Some(level) = next {
			if self.push_in(&level, siblings.clone()) {
				return true;
			}
			next = siblings.level_after(&level);
		}
		false
	}

	/// Pushes the largest existing token before `level` in `siblings`.
	fn push_prev_level(
		&mut self,
		siblings: &SiblingSet<V>,
		level: &FilterLevel,
	) -> bool {
		let mut prev = siblings.level_before(level);
		while let Some(level) = prev {
			if self.push_in(&level, siblings.clone()) {
				return true;
			}
			prev = siblings.level_before(&level);
		}
		false
	}

	/// Descends to the last key in the current frame's subtree.
	fn descend_last(&mut self) {
		while let Some(siblings) = self.child_siblings() {
			let last = siblings.last_level();
			if !self.push_in(&last, siblings) {
				break;
			}
		}
	}

	/// True when some key below the top frame can be valid.
	fn may_descend(&self) -> bool {
		self.stack.last().is_some_and(|node| {
			node.child_siblings().is_some()
				&& node
					.matched()
					.iter()
					.any(|matched| matched.is_topic() || matched.has_children())
		})
	}

	/// Pre-order successor, valid or not. False when none remains.
	fn step_forward(&mut self) -> bool {
		if self.may_descend() {
			if let Some(siblings) = self.child_siblings() {
				let first = siblings.first_level();
				if self.push_in(&first, siblings) {
					return true;
				}
			}
		}
		self.skip_subtree_forward()
	}

	/// Leaves the top frame's subtree for the next key after it.
	fn skip_subtree_forward(&mut self) -> bool {
		while let Some(node) = self.stack.pop() {
			let siblings = node.siblings().clone();
			if self.push_next_level(&siblings, &node.level()) {
				return true;
			}
		}
		false
	}

	/// Pre-order predecessor, valid or not. False when none remains.
	fn step_backward(&mut self) -> bool {
		let Some(node) = self.stack.pop() else {
			return false;
		};
		let siblings = node.siblings().clone();
		if self.push_prev_level(&siblings, &node.level()) {
			self.descend_last();
			return true;
		}
		!self.stack.is_empty()
	}

	/// Skips forward from the current position to the first valid one.
	fn settle_forward(&mut self) {
		while let Some(node) = self.stack.last() {
			if node.has_backing_topics() {
				self.cursor = Cursor::Positioned;
				return;
			}
			if !self.step_forward() {
				break;
			}
		}
		self.exhaust();
	}

	fn settle_backward(&mut self) {
		while let Some(node) = self.stack.last() {
			if node.has_backing_topics() {
				self.cursor = Cursor::Positioned;
				return;
			}
			if !self.step_backward() {
				break;
			}
		}
		self.rewind();
	}
}

impl<V: Clone + Eq + Hash> FilterIterator<V> {
	/// Topics matched by the current key, with their values.
	pub fn value(&self) -> Result<MatchSet<V>, FilterIteratorError> {
		let node = self
			.stack
			.last()
			.filter(|_| self.is_valid())
			.ok_or(FilterIteratorError::NoCurrentElement)?;
		Ok(Self::match_set(node))
	}

	/// Value for `filter` when the iterator sits exactly on it.
	pub(crate) fn value_at(&self, filter: &TopicFilter) -> Option<MatchSet<V>> {
		if !self.is_at(filter) {
			return None;
		}
		self.stack.last().map(Self::match_set)
	}

	fn match_set(node: &FilterNode<V>) -> MatchSet<V> {
		node.backing_topics()
			.into_iter()
			.filter_map(|topic| {
				topic.topic().map(|path| (path.clone(), topic.values().clone()))
			})
			.collect()
	}
}

impl<V> fmt::Debug for FilterIterator<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FilterIterator")
			.field("cursor", &self.cursor)
			.field("key", &self.key().ok().map(|key| key.to_string()))
			.finish()
	}
}
