//! Synchronization layer, the boundary between single-owner and shared layers.

use parking_lot::Mutex;

use crate::error::Result;
use crate::key::CacheKey;
use crate::traits::{Cache, CacheStore};
use crate::value::CachedValue;

/// Serializes access to the inner store behind one lock.
pub struct SynchronizedCache {
	id: String,
	inner: Mutex<Box<dyn CacheStore>>,
}

impl SynchronizedCache {
	pub fn new(inner: Box<dyn CacheStore>) -> Self {
		Self {
			id: inner.id().to_string(),
			inner: Mutex::new(inner),
		}
	}
}

impl Cache for SynchronizedCache {
	fn id(&self) -> &str {
		&self.id
	}

	fn put(&self, key: CacheKey, value: CachedValue) -> Result<()> {
		self.inner.lock().put(key, value);
		Ok(())
	}

	fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		Ok(self.inner.lock().get(key))
	}

	fn remove(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		Ok(self.inner.lock().remove(key))
	}

	fn clear(&self) {
		self.inner.lock().clear();
	}

	fn len(&self) -> usize {
		self.inner.lock().len()
	}

	fn describe(&self) -> String {
		format!("Synchronized({})", self.inner.lock().describe())
	}
}
