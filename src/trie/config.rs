//! Configuration for topic trie construction

use serde::{Deserialize, Serialize};

/// What happens to trie nodes left without values and children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrunePolicy {
	/// Remove empty nodes as soon as their last value goes
	#[default]
	Eager,
	/// Keep path nodes; they stop being user topics but stay in the trie
	Retain,
}

/// Trie-level behavior settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrieSettings {
	/// First level of every topic is a tenant id that wildcards cannot
	/// replace; system-topic protection then applies to the second level
	pub tenant_scoped: bool,
	/// Cleanup of emptied nodes after removals
	pub prune_policy: PrunePolicy,
}

impl Default for TrieSettings {
	fn default() -> Self {
		Self {
			tenant_scoped: false,
			prune_policy: PrunePolicy::Eager,
		}
	}
}

impl TrieSettings {
	/// Settings for a tenant-scoped trie
	pub fn tenant_scoped() -> Self {
		Self {
			tenant_scoped: true,
			..Self::default()
		}
	}

	/// Set the pruning policy
	pub fn with_prune_policy(mut self, prune_policy: PrunePolicy) -> Self {
		self.prune_policy = prune_policy;
		self
	}

	/// 1-based depth of the first level wildcards can match
	pub fn first_matchable_depth(&self) -> usize {
		if self.tenant_scoped { 2 } else { 1 }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let settings = TrieSettings::default();
		assert!(!settings.tenant_scoped);
		assert_eq!(settings.prune_policy, PrunePolicy::Eager);
		assert_eq!(settings.first_matchable_depth(), 1);
		assert_eq!(TrieSettings::tenant_scoped().first_matchable_depth(), 2);
	}

	#[test]
	fn test_partial_config_deserializes() {
		let settings: TrieSettings =
			serde_json::from_str(r#"{ "prune_policy": "retain" }"#).unwrap();
		assert_eq!(
			settings,
			TrieSettings::default().with_prune_policy(PrunePolicy::Retain)
		);

		let settings: TrieSettings =
			serde_json::from_str(r#"{ "tenant_scoped": true }"#).unwrap();
		assert_eq!(settings, TrieSettings::tenant_scoped());
	}
}
