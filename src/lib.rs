//! # MQTT Topic Index
//!
//! Topic-matching core for MQTT-style publish/subscribe brokers: a shared
//! trie of published topics and an ordered, seekable walk over the wildcard
//! filters that match them.
//!
//! ## Features
//!
//! - **Topic Trie**: Stores every published topic with a set of subscriber values
//! - **Wildcard Queries**: `+` matches one level, `#` matches any remaining levels
//! - **System Topics**: `$`-prefixed first levels are never matched by wildcards
//! - **Snapshots**: Readers and iterators see a stable copy-on-write view
//! - **Ordered Iteration**: Seek to any filter and step through matching filters
//!   in sorted order, for merge-style evaluation of many filters
//! - **Tenant Scoping**: Optional tenant id level that wildcards never replace
//!
//! ## Quick Start
//!
//! ```rust
//! use mqtt_topic_index::TopicTrie;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let trie = TopicTrie::new();
//!     trie.add_topic("sensors/temperature/living-room", "alice")?;
//!     trie.add_topic("sensors/temperature/kitchen", "bob")?;
//!     trie.add_topic("$SYS/broker/clients", "monitor")?;
//!
//!     // Single-level wildcard
//!     let matches = trie.query("sensors/+/living-room")?;
//!     assert_eq!(matches.len(), 1);
//!
//!     // Multi-level wildcards skip system topics
//!     let matches = trie.query("#")?;
//!     assert_eq!(matches.len(), 2);
//!
//!     // System topics still match literally
//!     assert!(trie.lookup_exact("$SYS/broker/clients")?.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Ordered Iteration
//!
//! Every filter that matches at least one topic is a key. Keys come in
//! [`TopicFilter`] order: a filter before its extensions, literals before
//! `+`, and `+` before `#`.
//!
//! ```rust
//! use mqtt_topic_index::TopicTrie;
//!
//! let trie = TopicTrie::new();
//! trie.add_topic("a/b", 1).unwrap();
//!
//! let mut iter = trie.filter_iter();
//! iter.seek_to_first();
//! let mut keys = Vec::new();
//! while iter.is_valid() {
//!     keys.push(iter.key().unwrap().to_string());
//!     iter.next();
//! }
//! assert_eq!(keys, [
//!     "a/b", "a/b/#", "a/+", "a/+/#", "a/#",
//!     "+/b", "+/b/#", "+/+", "+/+/#", "+/#", "#",
//! ]);
//! ```

// Core modules
pub mod filter;
pub mod topic;
pub mod trie;

// === Core Public API ===
pub use trie::{
	MatchSet, PrunePolicy, TopicTrie, TopicTrieError, TrieSettings,
	TrieSnapshot,
};

// Topic and filter types
pub use topic::{FilterLevel, TopicFilter, TopicPath};

// Traversal types
pub use filter::{FilterIterator, FilterIteratorError, FilterNode};

/// Result type alias for operations that may fail with TopicError
pub type Result<T> = std::result::Result<T, topic::TopicError>;

/// Prelude module for convenient imports
///
/// ```rust
/// use mqtt_topic_index::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most broker integrations

	pub use crate::{
		MatchSet, Result, TopicFilter, TopicPath, TopicTrie, TrieSettings,
	};
}

/// Error types used throughout the library
///
/// ```rust
/// use mqtt_topic_index::errors::*;
/// ```
pub mod errors {
	//! All error types used in the library

	pub use crate::filter::FilterIteratorError;
	pub use crate::topic::{TopicError, TopicFilterError, TopicPathError};
	pub use crate::trie::TopicTrieError;
}
