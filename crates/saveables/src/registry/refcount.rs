//! Reference counts keyed by model.

use std::hash::Hash;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::warn;

/// Insertion-ordered reference counts.
///
/// A key is present exactly while its count is at least one: the entry is
/// erased the moment the count returns to zero, so `contains` doubles as
/// "is this model open".
#[derive(Debug, Clone)]
pub struct RefCounts<K> {
	counts: IndexMap<K, usize, FxBuildHasher>,
}

impl<K> Default for RefCounts<K> {
	fn default() -> Self {
		Self {
			counts: IndexMap::default(),
		}
	}
}

impl<K: Hash + Eq> RefCounts<K> {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one reference; returns true when the key went from 0 to 1.
	pub fn increment(&mut self, key: K) -> bool {
		let count = self.counts.entry(key).or_insert(0);
		*count += 1;
		*count == 1
	}

	/// Drops one reference; returns true when the key reached 0 and was erased.
	///
	/// Decrementing an absent key is logged and ignored.
	pub fn decrement(&mut self, key: &K) -> bool {
		let Some(count) = self.counts.get_mut(key) else {
			warn!("Ignored reference count decrement for an untracked key");
			return false;
		};
		if *count > 1 {
			*count -= 1;
			return false;
		}
		self.counts.shift_remove(key);
		true
	}

	/// Current count; zero for absent keys.
	pub fn count(&self, key: &K) -> usize {
		self.counts.get(key).copied().unwrap_or(0)
	}

	/// Returns true while the key has at least one reference.
	pub fn contains(&self, key: &K) -> bool {
		self.counts.contains_key(key)
	}

	/// Keys in first-referenced order.
	pub fn keys(&self) -> impl Iterator<Item = &K> {
		self.counts.keys()
	}

	/// `(key, count)` pairs in first-referenced order.
	pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
		self.counts.iter().map(|(key, count)| (key, *count))
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}
}
