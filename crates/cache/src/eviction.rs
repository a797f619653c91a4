//! Size-bounded eviction layers.
//!
//! Both layers track keys only and evict from the wrapped store once the
//! bound is exceeded. The bound is set through the `size` property.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::error::{CacheError, Result};
use crate::key::CacheKey;
use crate::traits::CacheStore;
use crate::value::CachedValue;

/// Bound applied when no `size` is configured.
pub const DEFAULT_SIZE: usize = 1024;

fn parse_size(cache: &str, value: &str) -> Result<NonZeroUsize> {
	value
		.trim()
		.parse::<usize>()
		.ok()
		.and_then(NonZeroUsize::new)
		.ok_or_else(|| CacheError::InvalidProperty {
			cache: cache.to_string(),
			name: "size".to_string(),
			value: value.to_string(),
			reason: "expected a positive integer",
		})
}

fn default_size() -> NonZeroUsize {
	NonZeroUsize::new(DEFAULT_SIZE).unwrap_or(NonZeroUsize::MIN)
}

/// Evicts the least recently used key (`LRU`).
pub struct LruEviction {
	delegate: Box<dyn CacheStore>,
	keys: LruCache<CacheKey, ()>,
}

impl LruEviction {
	/// Wraps `delegate` with the default bound.
	pub fn new(delegate: Box<dyn CacheStore>) -> Self {
		Self {
			delegate,
			keys: LruCache::new(default_size()),
		}
	}

	/// Changes the bound, evicting the oldest keys when shrinking.
	pub fn set_size(&mut self, size: NonZeroUsize) {
		while self.keys.len() > size.get() {
			if let Some((eldest, ())) = self.keys.pop_lru() {
				self.delegate.remove(&eldest);
			}
		}
		self.keys.resize(size);
	}
}

impl CacheStore for LruEviction {
	fn id(&self) -> &str {
		self.delegate.id()
	}

	fn put(&mut self, key: CacheKey, value: CachedValue) {
		self.delegate.put(key.clone(), value);
		if let Some((evicted, ())) = self.keys.push(key.clone(), ())
			&& evicted != key
		{
			tracing::trace!(cache = self.delegate.id(), key = %evicted, "lru eviction");
			self.delegate.remove(&evicted);
		}
	}

	fn get(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.keys.get(key);
		self.delegate.get(key)
	}

	fn remove(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.keys.pop(key);
		self.delegate.remove(key)
	}

	fn clear(&mut self) {
		self.keys.clear();
		self.delegate.clear();
	}

	fn len(&self) -> usize {
		self.delegate.len()
	}

	fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
		if name == "size" {
			let size = parse_size(self.delegate.id(), value)?;
			self.set_size(size);
		}
		Ok(())
	}

	fn describe(&self) -> String {
		format!("Lru({})", self.delegate.describe())
	}
}

/// Evicts the oldest inserted key (`FIFO`).
pub struct FifoEviction {
	delegate: Box<dyn CacheStore>,
	keys: VecDeque<CacheKey>,
	size: NonZeroUsize,
}

impl FifoEviction {
	/// Wraps `delegate` with the default bound.
	pub fn new(delegate: Box<dyn CacheStore>) -> Self {
		Self {
			delegate,
			keys: VecDeque::new(),
			size: default_size(),
		}
	}

	fn evict_overflow(&mut self) {
		while self.keys.len() > self.size.get() {
			if let Some(oldest) = self.keys.pop_front() {
				tracing::trace!(cache = self.delegate.id(), key = %oldest, "fifo eviction");
				self.delegate.remove(&oldest);
			}
		}
	}
}

impl CacheStore for FifoEviction {
	fn id(&self) -> &str {
		self.delegate.id()
	}

	fn put(&mut self, key: CacheKey, value: CachedValue) {
		if !self.keys.contains(&key) {
			self.keys.push_back(key.clone());
		}
		self.delegate.put(key, value);
		self.evict_overflow();
	}

	fn get(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.delegate.get(key)
	}

	fn remove(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.keys.retain(|k| k != key);
		self.delegate.remove(key)
	}

	fn clear(&mut self) {
		self.keys.clear();
		self.delegate.clear();
	}

	fn len(&self) -> usize {
		self.delegate.len()
	}

	fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
		if name == "size" {
			self.size = parse_size(self.delegate.id(), value)?;
			self.evict_overflow();
		}
		Ok(())
	}

	fn describe(&self) -> String {
		format!("Fifo({})", self.delegate.describe())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::store::PerpetualStore;
	use crate::value::Value;

	fn val(i: i64) -> CachedValue {
		Arc::new(Value::Int(i))
	}

	fn key(s: &str) -> CacheKey {
		CacheKey::from(s)
	}

	#[test]
	fn lru_evicts_least_recently_used() {
		let mut cache = LruEviction::new(Box::new(PerpetualStore::new("ns")));
		cache.set_property("size", "2").unwrap();

		cache.put(key("a"), val(1));
		cache.put(key("b"), val(2));
		assert!(cache.get(&key("a")).is_some());
		cache.put(key("c"), val(3));

		assert!(cache.get(&key("b")).is_none());
		assert!(cache.get(&key("a")).is_some());
		assert!(cache.get(&key("c")).is_some());
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn lru_reput_does_not_evict_itself() {
		let mut cache = LruEviction::new(Box::new(PerpetualStore::new("ns")));
		cache.set_property("size", "1").unwrap();
		cache.put(key("a"), val(1));
		cache.put(key("a"), val(2));
		assert_eq!(cache.get(&key("a")), Some(val(2)));
	}

	#[test]
	fn lru_shrinking_evicts_from_delegate() {
		let mut cache = LruEviction::new(Box::new(PerpetualStore::new("ns")));
		for k in ["a", "b", "c"] {
			cache.put(key(k), val(0));
		}
		cache.set_property("size", "1").unwrap();
		assert_eq!(cache.len(), 1);
		assert!(cache.get(&key("c")).is_some());
	}

	#[test]
	fn fifo_evicts_in_insertion_order() {
		let mut cache = FifoEviction::new(Box::new(PerpetualStore::new("ns")));
		cache.set_property("size", "2").unwrap();

		cache.put(key("a"), val(1));
		cache.put(key("b"), val(2));
		cache.get(&key("a"));
		cache.put(key("c"), val(3));

		assert!(cache.get(&key("a")).is_none());
		assert!(cache.get(&key("b")).is_some());
		assert_eq!(cache.describe(), "Fifo(Perpetual)");
	}

	#[test]
	fn invalid_size_is_rejected() {
		let mut cache = LruEviction::new(Box::new(PerpetualStore::new("ns")));
		let err = cache.set_property("size", "0").unwrap_err();
		assert!(matches!(err, CacheError::InvalidProperty { ref name, .. } if name == "size"));
		cache.set_property("unrelated", "x").unwrap();
	}
}
