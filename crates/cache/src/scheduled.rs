//! Interval flush layer.

use std::time::{Duration, Instant};

use crate::key::CacheKey;
use crate::traits::CacheStore;
use crate::value::CachedValue;

/// Clears the wrapped store once `interval` has elapsed since the last clear.
///
/// The check runs lazily on every access; no background thread is involved.
pub struct ScheduledStore {
	delegate: Box<dyn CacheStore>,
	interval: Duration,
	last_clear: Instant,
}

impl ScheduledStore {
	pub fn new(delegate: Box<dyn CacheStore>, interval: Duration) -> Self {
		Self {
			delegate,
			interval,
			last_clear: Instant::now(),
		}
	}

	fn is_stale(&self) -> bool {
		self.last_clear.elapsed() >= self.interval
	}

	fn flush_if_stale(&mut self) {
		if self.is_stale() {
			tracing::trace!(cache = self.delegate.id(), "scheduled flush");
			self.clear();
		}
	}
}

impl CacheStore for ScheduledStore {
	fn id(&self) -> &str {
		self.delegate.id()
	}

	fn put(&mut self, key: CacheKey, value: CachedValue) {
		self.flush_if_stale();
		self.delegate.put(key, value);
	}

	fn get(&mut self, key: &CacheKey) -> Option<CachedValue> {
		if self.is_stale() {
			self.clear();
			return None;
		}
		self.delegate.get(key)
	}

	fn remove(&mut self, key: &CacheKey) -> Option<CachedValue> {
		self.flush_if_stale();
		self.delegate.remove(key)
	}

	fn clear(&mut self) {
		self.last_clear = Instant::now();
		self.delegate.clear();
	}

	fn len(&self) -> usize {
		if self.is_stale() { 0 } else { self.delegate.len() }
	}

	fn describe(&self) -> String {
		format!("Scheduled({})", self.delegate.describe())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;

	use super::*;
	use crate::store::PerpetualStore;
	use crate::value::Value;

	#[test]
	fn flushes_after_interval() {
		let mut cache = ScheduledStore::new(
			Box::new(PerpetualStore::new("ns")),
			Duration::from_millis(20),
		);
		cache.put(CacheKey::from("k"), Arc::new(Value::Int(1)));
		assert!(cache.get(&CacheKey::from("k")).is_some());

		thread::sleep(Duration::from_millis(40));
		assert_eq!(cache.len(), 0);
		assert!(cache.get(&CacheKey::from("k")).is_none());
	}

	#[test]
	fn keeps_values_within_interval() {
		let mut cache = ScheduledStore::new(
			Box::new(PerpetualStore::new("ns")),
			Duration::from_secs(3600),
		);
		cache.put(CacheKey::from("k"), Arc::new(Value::Null));
		assert_eq!(cache.len(), 1);
	}
}
