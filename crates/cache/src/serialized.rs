//! Read-write copy layer.

use std::sync::Arc;

use crate::error::{CacheError, Result};
use crate::key::CacheKey;
use crate::traits::Cache;
use crate::value::{CachedValue, Value};

/// Stores encoded values and decodes a fresh copy on every hit, so callers
/// never share a mutable result.
pub struct SerializedCache {
	delegate: Box<dyn Cache>,
}

impl SerializedCache {
	pub fn new(delegate: Box<dyn Cache>) -> Self {
		Self { delegate }
	}

	fn encode(&self, value: &Value) -> Result<CachedValue> {
		let bytes = postcard::to_allocvec(value).map_err(|error| CacheError::Serialization {
			cache: self.delegate.id().to_string(),
			error,
		})?;
		Ok(Arc::new(Value::Bytes(bytes)))
	}

	fn decode(&self, stored: &Value) -> Result<CachedValue> {
		let Value::Bytes(bytes) = stored else {
			// Foreign entry written below this layer; copy it structurally.
			return Ok(Arc::new(stored.clone()));
		};
		let value = postcard::from_bytes::<Value>(bytes).map_err(|error| {
			CacheError::Serialization {
				cache: self.delegate.id().to_string(),
				error,
			}
		})?;
		Ok(Arc::new(value))
	}
}

impl Cache for SerializedCache {
	fn id(&self) -> &str {
		self.delegate.id()
	}

	fn put(&self, key: CacheKey, value: CachedValue) -> Result<()> {
		let encoded = self.encode(&value)?;
		self.delegate.put(key, encoded)
	}

	fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		match self.delegate.get(key)? {
			Some(stored) => self.decode(&stored).map(Some),
			None => Ok(None),
		}
	}

	fn remove(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		match self.delegate.remove(key)? {
			Some(stored) => self.decode(&stored).map(Some),
			None => Ok(None),
		}
	}

	fn clear(&self) {
		self.delegate.clear();
	}

	fn len(&self) -> usize {
		self.delegate.len()
	}

	fn describe(&self) -> String {
		format!("Serialized({})", self.delegate.describe())
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::store::PerpetualStore;
	use crate::sync::SynchronizedCache;

	#[test]
	fn hits_are_independent_copies() {
		let cache = SerializedCache::new(Box::new(SynchronizedCache::new(Box::new(
			PerpetualStore::new("ns"),
		))));
		let mut row = BTreeMap::new();
		row.insert("title".to_string(), Value::Text("hello".into()));
		row.insert("tags".to_string(), Value::List(vec![Value::Int(1), Value::Null]));
		let original = Arc::new(Value::Record(row));

		cache.put(CacheKey::from("k"), original.clone()).unwrap();
		let first = cache.get(&CacheKey::from("k")).unwrap().unwrap();
		let second = cache.get(&CacheKey::from("k")).unwrap().unwrap();

		assert_eq!(*first, *original);
		assert!(!Arc::ptr_eq(&first, &second));
		assert!(!Arc::ptr_eq(&first, &original));
	}
}
