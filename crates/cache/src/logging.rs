//! Hit-ratio logging layer.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::key::CacheKey;
use crate::traits::Cache;
use crate::value::CachedValue;

/// Counts lookups and hits and logs the running hit ratio on every lookup.
pub struct LoggingCache {
	delegate: Box<dyn Cache>,
	requests: AtomicU64,
	hits: AtomicU64,
}

impl LoggingCache {
	pub fn new(delegate: Box<dyn Cache>) -> Self {
		Self {
			delegate,
			requests: AtomicU64::new(0),
			hits: AtomicU64::new(0),
		}
	}

	/// Ratio of hits to lookups so far, `0.0` before the first lookup.
	pub fn hit_ratio(&self) -> f64 {
		let requests = self.requests.load(Ordering::Relaxed);
		if requests == 0 {
			return 0.0;
		}
		self.hits.load(Ordering::Relaxed) as f64 / requests as f64
	}
}

impl Cache for LoggingCache {
	fn id(&self) -> &str {
		self.delegate.id()
	}

	fn put(&self, key: CacheKey, value: CachedValue) -> Result<()> {
		self.delegate.put(key, value)
	}

	fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		self.requests.fetch_add(1, Ordering::Relaxed);
		let value = self.delegate.get(key)?;
		if value.is_some() {
			self.hits.fetch_add(1, Ordering::Relaxed);
		}
		tracing::debug!(cache = self.delegate.id(), hit_ratio = self.hit_ratio(), "cache lookup");
		Ok(value)
	}

	fn remove(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		self.delegate.remove(key)
	}

	fn clear(&self) {
		self.delegate.clear();
	}

	fn len(&self) -> usize {
		self.delegate.len()
	}

	fn describe(&self) -> String {
		format!("Logging({})", self.delegate.describe())
	}
}
