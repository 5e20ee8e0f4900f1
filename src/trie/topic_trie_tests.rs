//! Tests for TopicTrie storage and queries

use std::collections::HashSet;

use super::{PrunePolicy, TopicTrie, TopicTrieError, TrieSettings};
use crate::topic::{TopicFilterError, TopicPathError};

fn trie_with(topics: &[&str]) -> TopicTrie<usize> {
	let trie = TopicTrie::new();
	for (i, topic) in topics.iter().enumerate() {
		trie.add_topic(*topic, i).expect("Topic should be valid");
	}
	trie
}

// Checks each filter against the expected matching topics
fn check_queries(trie: &TopicTrie<usize>, expected: &[(&str, &[&str])]) {
	for (filter, topics) in expected {
		let matches = trie.query(*filter).expect("Filter should be valid");
		let mut actual: Vec<String> =
			matches.keys().map(ToString::to_string).collect();
		actual.sort();
		let mut expected: Vec<String> =
			topics.iter().map(ToString::to_string).collect();
		expected.sort();
		assert_eq!(actual, expected, "Unexpected matches for filter '{filter}'");
	}
}

mod storage_tests {
	use super::*;

	#[test]
	fn test_add_lookup_remove_round_trip() {
		let trie = TopicTrie::new();

		assert!(trie.add_topic("a/b/c", "alice").unwrap());
		assert!(trie.add_topic("a/b/c", "bob").unwrap());
		assert!(!trie.add_topic("a/b/c", "alice").unwrap());

		let values = trie.lookup_exact("a/b/c").unwrap();
		assert_eq!(values, Some(HashSet::from(["alice", "bob"])));

		assert!(trie.remove_value("a/b/c", &"alice").unwrap());
		assert_eq!(
			trie.lookup_exact("a/b/c").unwrap(),
			Some(HashSet::from(["bob"]))
		);

		assert!(trie.remove_value("a/b/c", &"bob").unwrap());
		assert_eq!(trie.lookup_exact("a/b/c").unwrap(), None);
		assert!(trie.is_empty());
	}

	#[test]
	fn test_absent_removals_are_noops() {
		let trie = trie_with(&["a/b"]);

		assert!(!trie.remove_value("a/b", &42).unwrap());
		assert!(!trie.remove_value("x/y", &0).unwrap());
		assert!(!trie.remove_value("a", &0).unwrap());
		assert_eq!(trie.remove_topic("x/y").unwrap(), 0);
		assert_eq!(trie.topic_count(), 1);
	}

	#[test]
	fn test_remove_topic_drops_all_values() {
		let trie = trie_with(&["a/b", "a/b", "a/c"]);
		trie.add_topic("a/b", 10).unwrap();

		assert_eq!(trie.remove_topic("a/b").unwrap(), 3);
		assert_eq!(trie.lookup_exact("a/b").unwrap(), None);
		assert_eq!(trie.topic_count(), 1);
	}

	#[test]
	fn test_path_nodes_are_not_topics() {
		let trie = trie_with(&["a/b/c"]);

		assert_eq!(trie.lookup_exact("a").unwrap(), None);
		assert_eq!(trie.lookup_exact("a/b").unwrap(), None);
		assert_eq!(trie.topic_count(), 1);
	}

	#[test]
	fn test_shared_prefix() {
		let trie = trie_with(&["a/b", "a/c", "a"]);
		let snapshot = trie.snapshot();

		let a = snapshot.root().child("a").unwrap();
		assert_eq!(a.children().count(), 2);
		assert!(a.is_topic());
		assert_eq!(snapshot.root().children().count(), 1);
	}

	#[test]
	fn test_system_nodes_not_wildcard_matchable() {
		let trie = trie_with(&["$SYS/broker", "a/$SYS"]);
		let snapshot = trie.snapshot();
		let root = snapshot.root();

		let sys = root.child("$SYS").unwrap();
		assert!(!sys.is_wildcard_matchable());
		assert!(sys.child("broker").unwrap().is_wildcard_matchable());
		let nested = root.child("a").unwrap().child("$SYS").unwrap();
		assert!(nested.is_wildcard_matchable());
	}

	#[test]
	fn test_eager_pruning() {
		let trie = trie_with(&["a/b/c", "a/x"]);

		trie.remove_topic("a/b/c").unwrap();
		let snapshot = trie.snapshot();
		let a = snapshot.root().child("a").unwrap();
		assert!(a.child("b").is_none());
		assert!(a.child("x").is_some());

		trie.remove_topic("a/x").unwrap();
		assert!(!trie.snapshot().root().has_children());
	}

	#[test]
	fn test_retain_keeps_path_nodes() {
		let trie = TopicTrie::with_settings(
			TrieSettings::default().with_prune_policy(PrunePolicy::Retain),
		);
		trie.add_topic("a/b/c", 1).unwrap();
		trie.remove_value("a/b/c", &1).unwrap();

		let snapshot = trie.snapshot();
		let b = snapshot.root().child("a").unwrap().child("b").unwrap();
		let c = b.child("c").unwrap();
		assert!(!c.is_topic());
		assert!(c.values().is_empty());
		assert!(trie.is_empty());
		assert_eq!(trie.lookup_exact("a/b/c").unwrap(), None);
		assert!(trie.query("#").unwrap().is_empty());

		// the retained node becomes a topic again
		trie.add_topic("a/b/c", 2).unwrap();
		assert_eq!(trie.query("a/+/c").unwrap().len(), 1);
	}

	#[test]
	fn test_clear() {
		let trie = trie_with(&["a", "b/c"]);
		let before = trie.snapshot();

		trie.clear();
		assert!(trie.is_empty());
		assert_eq!(before.topic_count(), 2);
	}

	#[test]
	fn test_snapshot_isolation() {
		let trie = trie_with(&["a/b"]);
		let snapshot = trie.snapshot();

		trie.add_topic("a/c", 1).unwrap();
		trie.remove_topic("a/b").unwrap();

		assert_eq!(snapshot.query("a/+").unwrap().len(), 1);
		assert!(snapshot.lookup_exact("a/b").unwrap().is_some());
		assert!(trie.lookup_exact("a/b").unwrap().is_none());
	}
}

mod validation_tests {
	use super::*;

	#[test]
	fn test_invalid_topics_rejected() {
		let trie = TopicTrie::<u8>::new();

		assert_eq!(
			trie.add_topic("", 1),
			Err(TopicTrieError::InvalidTopic(TopicPathError::EmptyTopic))
		);
		assert!(matches!(
			trie.add_topic("a/+/b", 1),
			Err(TopicTrieError::InvalidTopic(
				TopicPathError::WildcardInTopic { .. }
			))
		));
		assert!(matches!(
			trie.lookup_exact("a/#"),
			Err(TopicTrieError::InvalidTopic(_))
		));
	}

	#[test]
	fn test_invalid_filters_rejected() {
		let trie = trie_with(&["a/b"]);

		assert_eq!(
			trie.query("a/#/b"),
			Err(TopicTrieError::InvalidFilter(TopicFilterError::hash_position(
				"a/#/b"
			)))
		);
		assert_eq!(
			trie.query(""),
			Err(TopicTrieError::InvalidFilter(TopicFilterError::EmptyFilter))
		);
		assert!(matches!(
			trie.query("a/b+"),
			Err(TopicTrieError::InvalidFilter(
				TopicFilterError::WildcardUsage { .. }
			))
		));
	}

	#[test]
	fn test_tenant_rules() {
		let trie = TopicTrie::with_settings(TrieSettings::tenant_scoped());

		assert_eq!(
			trie.add_topic("tenant-a", 1),
			Err(TopicTrieError::missing_tenant_level("tenant-a"))
		);
		assert_eq!(
			trie.add_topic("/lights", 1),
			Err(TopicTrieError::missing_tenant_level("/lights"))
		);
		assert_eq!(
			trie.query("+/lights"),
			Err(TopicTrieError::tenant_level_wildcard("+/lights"))
		);
		assert_eq!(
			trie.query("#"),
			Err(TopicTrieError::tenant_level_wildcard("#"))
		);
		assert!(trie.add_topic("tenant-a/lights", 1).unwrap());
	}
}

mod query_tests {
	use super::*;

	#[test]
	fn test_literal_and_wildcard_queries() {
		let trie = trie_with(&[
			"sensors/temperature/living-room",
			"sensors/humidity/living-room",
			"sensors/temperature/kitchen",
			"devices",
			"devices/lights/kitchen",
			"devices/lights/hall/ceiling",
		]);

		check_queries(&trie, &[
			(
				"sensors/+/living-room",
				&[
					"sensors/temperature/living-room",
					"sensors/humidity/living-room",
				],
			),
			("sensors/temperature/kitchen", &["sensors/temperature/kitchen"]),
			("sensors/temperature", &[]),
			(
				"devices/#",
				&[
					"devices",
					"devices/lights/kitchen",
					"devices/lights/hall/ceiling",
				],
			),
			("devices/+", &[]),
			("devices/+/+", &["devices/lights/kitchen"]),
			("+/+/kitchen", &[
				"sensors/temperature/kitchen",
				"devices/lights/kitchen",
			]),
			("+", &["devices"]),
			("nothing/#", &[]),
		]);
		assert_eq!(trie.query("#").unwrap().len(), 6);
	}

	#[test]
	fn test_system_topic_queries() {
		let trie = trie_with(&[
			"$SYS/broker/clients",
			"$SYS",
			"broker/$SYS",
			"home/lights",
		]);

		check_queries(&trie, &[
			("#", &["broker/$SYS", "home/lights"]),
			("+/broker/clients", &[]),
			("+", &[]),
			("+/$SYS", &["broker/$SYS"]),
			("$SYS/broker/clients", &["$SYS/broker/clients"]),
			("$SYS/#", &["$SYS", "$SYS/broker/clients"]),
			("$SYS/+/clients", &["$SYS/broker/clients"]),
			("$SYS", &["$SYS"]),
		]);
	}

	#[test]
	fn test_tenant_queries() {
		let trie = TopicTrie::with_settings(TrieSettings::tenant_scoped());
		trie.add_topic("tenant-a/$SYS/uptime", 1).unwrap();
		trie.add_topic("tenant-a/lights", 2).unwrap();
		trie.add_topic("tenant-b/lights", 3).unwrap();

		let matches = trie.query("tenant-a/#").unwrap();
		assert_eq!(matches.len(), 1);
		assert!(trie.query("tenant-a/+/uptime").unwrap().is_empty());
		assert_eq!(trie.query("tenant-a/$SYS/+").unwrap().len(), 1);
		assert_eq!(trie.query("tenant-b/+").unwrap().len(), 1);
	}

	#[test]
	fn test_empty_levels() {
		let trie = trie_with(&["a//b", "/x"]);

		check_queries(&trie, &[
			("a/+/b", &["a//b"]),
			("a//b", &["a//b"]),
			("+/x", &["/x"]),
			("/#", &["/x"]),
		]);
	}

	#[test]
	fn test_query_many() {
		let trie = trie_with(&["a/b", "a/c", "d/e", "$SYS/x"]);

		let results = trie
			.query_many(["d/#", "a/+", "a/b", "zz/top", "a/+", "$SYS/#", "#"])
			.unwrap();

		assert_eq!(results.len(), 6);
		let count = |filter: &str| {
			results
				.iter()
				.find(|(key, _)| key.as_str() == filter)
				.map(|(_, matches)| matches.len())
		};
		assert_eq!(count("a/+"), Some(2));
		assert_eq!(count("a/b"), Some(1));
		assert_eq!(count("d/#"), Some(1));
		assert_eq!(count("zz/top"), Some(0));
		assert_eq!(count("$SYS/#"), Some(1));
		assert_eq!(count("#"), Some(3));

		for (filter, matches) in &results {
			assert_eq!(matches, &trie.query(filter).unwrap());
		}
	}

	#[test]
	fn test_query_many_rejects_invalid_filter() {
		let trie = trie_with(&["a/b"]);
		assert!(trie.query_many(["a/+", "a/#/b"]).is_err());
	}
}
