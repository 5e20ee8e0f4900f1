#![allow(dead_code)]

pub mod tracing;

use mqtt_topic_index::{TopicTrie, TrieSettings};

/// Trie holding `topics`, each with its index as the value
pub fn trie_with(topics: &[&str]) -> TopicTrie<usize> {
	let trie = TopicTrie::new();
	for (i, topic) in topics.iter().enumerate() {
		trie.add_topic(*topic, i).expect("Topic should be valid");
	}
	trie
}

/// Tenant-scoped variant of [`trie_with`]
pub fn tenant_trie_with(topics: &[&str]) -> TopicTrie<usize> {
	let trie = TopicTrie::with_settings(TrieSettings::tenant_scoped());
	for (i, topic) in topics.iter().enumerate() {
		trie.add_topic(*topic, i).expect("Topic should be valid");
	}
	trie
}

/// Matched topic names for `filter`, sorted
pub fn matched_topics(trie: &TopicTrie<usize>, filter: &str) -> Vec<String> {
	let mut topics: Vec<String> = trie
		.query(filter)
		.expect("Filter should be valid")
		.keys()
		.map(ToString::to_string)
		.collect();
	topics.sort();
	topics
}
