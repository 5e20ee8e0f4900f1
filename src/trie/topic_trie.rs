use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace};

use super::config::TrieSettings;
use super::topic_node::TopicNode;
use crate::filter::FilterIterator;
use crate::topic::{
	FilterLevel, TopicFilter, TopicFilterError, TopicPath, TopicPathError,
};

/// Topics matched by a filter, each with its stored values
pub type MatchSet<V> = BTreeMap<TopicPath, HashSet<V>>;

/// Errors that can occur during topic trie operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicTrieError {
	/// Topic failed parsing or validation
	#[error("Invalid topic: {0}")]
	InvalidTopic(#[from] TopicPathError),

	/// Filter failed parsing or validation
	#[error("Invalid filter: {0}")]
	InvalidFilter(#[from] TopicFilterError),

	/// Tenant-scoped topic without a tenant id or without levels after it
	#[error(
		"Topic '{topic}' needs a non-empty tenant id and at least one more \
		 level"
	)]
	MissingTenantLevel { topic: String },

	/// Tenant-scoped filter with a wildcard in place of the tenant id
	#[error("Filter '{filter}' cannot use a wildcard for the tenant id")]
	TenantLevelWildcard { filter: String },
}

impl TopicTrieError {
	/// Creates a new MissingTenantLevel error
	pub fn missing_tenant_level(topic: impl Into<String>) -> Self {
		Self::MissingTenantLevel {
			topic: topic.into(),
		}
	}

	/// Creates a new TenantLevelWildcard error
	pub fn tenant_level_wildcard(filter: impl Into<String>) -> Self {
		Self::TenantLevelWildcard {
			filter: filter.into(),
		}
	}
}

impl From<Infallible> for TopicTrieError {
	fn from(never: Infallible) -> Self {
		match never {}
	}
}

/// Shared index of published topics and their values.
///
/// All methods take `&self`: writers serialize on an internal mutex and
/// publish a new root atomically, readers load the current root without
/// locking.
/// Share the trie between threads with `Arc<TopicTrie<V>>`.
///
/// ```
/// use mqtt_topic_index::TopicTrie;
///
/// let trie = TopicTrie::new();
/// trie.add_topic("sensors/temperature/living-room", "alice").unwrap();
/// trie.add_topic("sensors/humidity/living-room", "bob").unwrap();
///
/// let matches = trie.query("sensors/+/living-room").unwrap();
/// assert_eq!(matches.len(), 2);
/// ```
pub struct TopicTrie<V> {
	root: ArcSwap<TopicNode<V>>,
	writer: Mutex<()>,
	settings: TrieSettings,
}

impl<V> Default for TopicTrie<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> fmt::Debug for TopicTrie<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TopicTrie")
			.field("settings", &self.settings)
			.field("topics", &self.topic_count())
			.finish()
	}
}

impl<V> TopicTrie<V> {
	pub fn new() -> Self {
		Self::with_settings(TrieSettings::default())
	}

	pub fn with_settings(settings: TrieSettings) -> Self {
		Self {
			root: ArcSwap::from_pointee(TopicNode::root()),
			writer: Mutex::new(()),
			settings,
		}
	}

	pub fn settings(&self) -> &TrieSettings {
		&self.settings
	}

	/// Point-in-time view; later writes do not affect it.
	pub fn snapshot(&self) -> TrieSnapshot<V> {
		TrieSnapshot {
			root: self.root.load_full(),
			settings: self.settings.clone(),
		}
	}

	/// Iterator over the current contents.
	pub fn filter_iter(&self) -> FilterIterator<V> {
		self.snapshot().filter_iter()
	}

	/// Number of stored topics.
	pub fn topic_count(&self) -> usize {
		self.snapshot().topic_count()
	}

	pub fn is_empty(&self) -> bool {
		self.snapshot().is_empty()
	}

	/// Drops every topic. Existing snapshots keep their contents.
	pub fn clear(&self) {
		let _writer = self.writer.lock();
		self.root.store(Arc::new(TopicNode::root()));
		debug!("Cleared topic trie");
	}
}

impl<V: Clone + Eq + Hash> TopicTrie<V> {
	/// Stores `value` under `topic`.
	///
	/// Returns false if the value was already stored for the topic.
	pub fn add_topic<T>(&self, topic: T, value: V) -> Result<bool, TopicTrieError>
	where
		T: TryInto<TopicPath>,
		T::Error: Into<TopicTrieError>,
	{
		let topic = check_topic(&self.settings, topic)?;
		let first_matchable_depth = self.settings.first_matchable_depth();
		let added = {
			let _writer = self.writer.lock();
			let mut root = self.root.load_full();
			let added =
				TopicNode::insert(&mut root, &topic, value, first_matchable_depth);
			self.root.store(root);
			added
		};
		debug!(topic = %topic, added, "Added topic value");
		Ok(added)
	}

	/// Removes one value from `topic`.
	///
	/// Absent topics and values are not an error; they return `Ok(false)`.
	pub fn remove_value<T>(
		&self,
		topic: T,
		value: &V,
	) -> Result<bool, TopicTrieError>
	where
		T: TryInto<TopicPath>,
		T::Error: Into<TopicTrieError>,
	{
		let topic = check_topic(&self.settings, topic)?;
		let _writer = self.writer.lock();
		let mut root = self.root.load_full();
		let stored = root
			.find(topic.levels())
			.is_some_and(|node| node.values().contains(value));
		if !stored {
			trace!(topic = %topic, "Value not stored, nothing to remove");
			return Ok(false);
		}
		let removed = TopicNode::remove(
			&mut root,
			topic.levels(),
			Some(value),
			self.settings.prune_policy,
		);
		self.root.store(root);
		debug!(
			topic = %topic,
			prune_policy = ?self.settings.prune_policy,
			"Removed topic value"
		);
		Ok(removed > 0)
	}

	/// Removes every value of `topic`, returning how many there were.
	pub fn remove_topic<T>(&self, topic: T) -> Result<usize, TopicTrieError>
	where
		T: TryInto<TopicPath>,
		T::Error: Into<TopicTrieError>,
	{
		let topic = check_topic(&self.settings, topic)?;
		let _writer = self.writer.lock();
		let mut root = self.root.load_full();
		if !root.find(topic.levels()).is_some_and(TopicNode::is_topic) {
			trace!(topic = %topic, "Topic not stored, nothing to remove");
			return Ok(0);
		}
		let removed = TopicNode::remove(
			&mut root,
			topic.levels(),
			None,
			self.settings.prune_policy,
		);
		self.root.store(root);
		debug!(topic = %topic, removed, "Removed topic");
		Ok(removed)
	}

	/// Values stored under exactly `topic`.
	pub fn lookup_exact<T>(
		&self,
		topic: T,
	) -> Result<Option<HashSet<V>>, TopicTrieError>
	where
		T: TryInto<TopicPath>,
		T::Error: Into<TopicTrieError>,
	{
		self.snapshot().lookup_exact(topic)
	}

	/// Every stored topic matched by `filter`.
	pub fn query<F>(&self, filter: F) -> Result<MatchSet<V>, TopicTrieError>
	where
		F: TryInto<TopicFilter>,
		F::Error: Into<TopicTrieError>,
	{
		self.snapshot().query(filter)
	}

	/// Evaluates many filters against one snapshot.
	pub fn query_many<I, F>(
		&self,
		filters: I,
	) -> Result<BTreeMap<TopicFilter, MatchSet<V>>, TopicTrieError>
	where
		I: IntoIterator<Item = F>,
		F: TryInto<TopicFilter>,
		F::Error: Into<TopicTrieError>,
	{
		self.snapshot().query_many(filters)
	}
}

/// Immutable view of a [`TopicTrie`] at one point in time.
pub struct TrieSnapshot<V> {
	root: Arc<TopicNode<V>>,
	settings: TrieSettings,
}

impl<V> Clone for TrieSnapshot<V> {
	fn clone(&self) -> Self {
		Self {
			root: Arc::clone(&self.root),
			settings: self.settings.clone(),
		}
	}
}

impl<V> TrieSnapshot<V> {
	/// Synthetic root node; its children are the top-level topics.
	pub fn root(&self) -> &TopicNode<V> {
		&self.root
	}

	pub fn filter_iter(&self) -> FilterIterator<V> {
		FilterIterator::new(Arc::clone(&self.root))
	}

	pub fn topic_count(&self) -> usize {
		self.root.topic_count()
	}

	pub fn is_empty(&self) -> bool {
		// retained path nodes may outlive their topics
		!self.root.has_children() || self.topic_count() == 0
	}
}

impl<V: Clone + Eq + Hash> TrieSnapshot<V> {
	pub fn lookup_exact<T>(
		&self,
		topic: T,
	) -> Result<Option<HashSet<V>>, TopicTrieError>
	where
		T: TryInto<TopicPath>,
		T::Error: Into<TopicTrieError>,
	{
		let topic = check_topic(&self.settings, topic)?;
		Ok(self
			.root
			.find(topic.levels())
			.filter(|node| node.is_topic())
			.map(|node| node.values().clone()))
	}

	pub fn query<F>(&self, filter: F) -> Result<MatchSet<V>, TopicTrieError>
	where
		F: TryInto<TopicFilter>,
		F::Error: Into<TopicTrieError>,
	{
		let filter = check_filter(&self.settings, filter)?;
		let mut iter = self.filter_iter();
		iter.seek(&filter);
		let matches = iter.value_at(&filter).unwrap_or_default();
		trace!(filter = %filter, matches = matches.len(), "Query");
		Ok(matches)
	}

	/// Evaluates `filters` in sorted order with a single iterator.
	///
	/// The iterator only seeks when it sits before the next filter, so
	/// filters falling in a gap between valid keys cost one comparison.
	pub fn query_many<I, F>(
		&self,
		filters: I,
	) -> Result<BTreeMap<TopicFilter, MatchSet<V>>, TopicTrieError>
	where
		I: IntoIterator<Item = F>,
		F: TryInto<TopicFilter>,
		F::Error: Into<TopicTrieError>,
	{
		let filters = filters
			.into_iter()
			.map(|filter| check_filter(&self.settings, filter))
			.collect::<Result<BTreeSet<_>, _>>()?;

		let mut iter = self.filter_iter();
		let mut results = BTreeMap::new();
		let mut seeks = 0usize;
		for filter in filters {
			let behind = !iter.is_exhausted()
				&& iter.cmp_key(&filter).is_none_or(Ordering::is_lt);
			if behind {
				iter.seek(&filter);
				seeks += 1;
			}
			let matches = iter.value_at(&filter).unwrap_or_default();
			results.insert(filter, matches);
		}
		trace!(filters = results.len(), seeks, "Query many");
		Ok(results)
	}
}

fn check_topic<T>(
	settings: &TrieSettings,
	topic: T,
) -> Result<TopicPath, TopicTrieError>
where
	T: TryInto<TopicPath>,
	T::Error: Into<TopicTrieError>,
{
	let topic = topic.try_into().map_err(Into::into)?;
	if settings.tenant_scoped
		&& (topic.len() < 2 || topic.levels()[0].is_empty())
	{
		return Err(TopicTrieError::missing_tenant_level(topic.as_str()));
	}
	Ok(topic)
}

fn check_filter<F>(
	settings: &TrieSettings,
	filter: F,
) -> Result<TopicFilter, TopicTrieError>
where
	F: TryInto<TopicFilter>,
	F::Error: Into<TopicTrieError>,
{
	let filter = filter.try_into().map_err(Into::into)?;
	if settings.tenant_scoped
		&& !matches!(filter.levels().first(), Some(FilterLevel::Literal(_)))
	{
		return Err(TopicTrieError::tenant_level_wildcard(filter.as_str()));
	}
	Ok(filter)
}
