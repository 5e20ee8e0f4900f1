//! Filter traversal module
//!
//! Evaluates topic filters against a trie snapshot level by level, and walks
//! the space of matching filters in sorted order.

pub mod filter_iterator;
pub mod filter_node;
pub mod sibling_set;


pub use filter_iterator::{FilterIterator, FilterIteratorError};
pub use filter_node::FilterNode;
pub use sibling_set::SiblingSet;
