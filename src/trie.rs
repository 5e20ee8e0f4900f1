//! Topic storage module
//!
//! A copy-on-write trie of published topics. Every node is one topic level;
//! nodes that end a published topic carry the topic and its values.

pub mod config;
pub mod topic_node;
/// Shared trie handle, snapshots and queries
pub mod topic_trie;

#[cfg(test)]
mod topic_trie_tests;

pub use config::{PrunePolicy, TrieSettings};
pub use topic_node::TopicNode;
pub use topic_trie::{MatchSet, TopicTrie, TopicTrieError, TrieSnapshot};
