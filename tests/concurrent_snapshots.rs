//! Readers and iterators running alongside writers

mod support;

use std::sync::Arc;
use std::thread;

use mqtt_topic_index::TopicTrie;

const WRITERS: usize = 4;
const TOPICS_PER_WRITER: usize = 200;

#[test]
fn test_concurrent_writers_all_land() {
	support::tracing::setup();
	let trie = Arc::new(TopicTrie::new());

	let handles: Vec<_> = (0 .. WRITERS)
		.map(|writer| {
			let trie = Arc::clone(&trie);
			thread::spawn(move || {
				for i in 0 .. TOPICS_PER_WRITER {
					let topic = format!("w{writer}/sensors/{i}");
					trie.add_topic(topic.as_str(), writer).unwrap();
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(trie.topic_count(), WRITERS * TOPICS_PER_WRITER);
	let matches = trie.query("+/sensors/+").unwrap();
	assert_eq!(matches.len(), WRITERS * TOPICS_PER_WRITER);
}

#[test]
fn test_iterator_sees_stable_snapshot_during_writes() {
	support::tracing::setup();
	let trie = Arc::new(support::trie_with(&["fixed/a", "fixed/b", "other/c"]));

	let mut iter = trie.filter_iter();
	iter.seek_to_first();
	let first = iter.key().unwrap();

	let writer = {
		let trie = Arc::clone(&trie);
		thread::spawn(move || {
			for i in 0 .. 500 {
				let topic = format!("fixed/{i}");
				trie.add_topic(topic.as_str(), i).unwrap();
				trie.remove_topic("other/c").unwrap();
			}
			trie.clear();
		})
	};

	let mut keys = vec![first.to_string()];
	iter.next();
	while iter.is_valid() {
		let matches = iter.value().unwrap();
		assert!(matches.len() <= 3);
		keys.push(iter.key().unwrap().to_string());
		iter.next();
	}
	writer.join().unwrap();

	// the walk is the same as a fresh iterator over the original topics
	let expected = support::trie_with(&["fixed/a", "fixed/b", "other/c"]);
	let mut fresh = expected.filter_iter();
	fresh.seek_to_first();
	let mut expected_keys = Vec::new();
	while fresh.is_valid() {
		expected_keys.push(fresh.key().unwrap().to_string());
		fresh.next();
	}
	assert_eq!(keys, expected_keys);
	assert!(trie.is_empty());
}

#[test]
fn test_readers_never_see_partial_inserts() {
	support::tracing::setup();
	let trie = Arc::new(TopicTrie::new());

	let writer = {
		let trie = Arc::clone(&trie);
		thread::spawn(move || {
			for i in 0 .. 300 {
				let topic = format!("deep/{i}/level/leaf");
				trie.add_topic(topic.as_str(), i).unwrap();
			}
		})
	};

	let readers: Vec<_> = (0 .. 3)
		.map(|_| {
			let trie = Arc::clone(&trie);
			thread::spawn(move || {
				for _ in 0 .. 100 {
					let snapshot = trie.snapshot();
					let leaves = snapshot.query("deep/+/level/leaf").unwrap();
					// every topic is complete: path nodes and value together
					assert_eq!(leaves.len(), snapshot.topic_count());
					assert!(leaves.values().all(|values| values.len() == 1));
				}
			})
		})
		.collect();

	writer.join().unwrap();
	for reader in readers {
		reader.join().unwrap();
	}
	assert_eq!(trie.topic_count(), 300);
}
