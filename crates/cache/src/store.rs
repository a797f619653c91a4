//! Unbounded base store.

use rustc_hash::FxHashMap as HashMap;

use crate::key::CacheKey;
use crate::traits::CacheStore;
use crate::value::CachedValue;

/// Plain map, the default base implementation (`PERPETUAL`).
#[derive(Debug, Default)]
pub struct PerpetualStore {
	id: String,
	entries: HashMap<CacheKey, CachedValue>,
}

impl PerpetualStore {
	/// Creates an empty store for the cache `id`.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			entries: HashMap::default(),
		}
	}
}

impl CacheStore for PerpetualStore {
	fn id(&self) -> &str {
		&self.id
	}

	fn put(&mut self, key: CacheKey, value: CachedValue) {
		self.entries.insert(key, value);
	}

	fn get(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.entries.get(key).cloned()
	}

	fn remove(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.entries.remove(key)
	}

	fn clear(&mut self) {
		self.entries.clear();
	}

	fn len(&self) -> usize {
		self.entries.len()
	}

	fn describe(&self) -> String {
		"Perpetual".to_string()
	}
}
