//! Cache capability traits.
//!
//! A chain has two halves. Inner layers (base store, eviction, scheduled
//! flush) implement [`CacheStore`] and take `&mut self`: they are owned by
//! exactly one wrapper and never shared. The synchronization layer turns a
//! boxed store into a [`Cache`], which takes `&self` and is `Send + Sync`; all
//! outer layers wrap a [`Cache`].

use std::sync::Arc;

use crate::error::Result;
use crate::key::CacheKey;
use crate::value::CachedValue;

/// Single-owner cache layer.
pub trait CacheStore: Send {
	/// Cache id, the owning namespace.
	fn id(&self) -> &str;

	/// Stores a value.
	fn put(&mut self, key: CacheKey, value: CachedValue);

	/// Looks a value up. Eviction layers record the access.
	fn get(&mut self, key: &CacheKey) -> Option<CachedValue>;

	/// Removes a value.
	fn remove(&mut self, key: &CacheKey) -> Option<CachedValue>;

	/// Removes every value.
	fn clear(&mut self);

	/// Number of stored values.
	fn len(&self) -> usize;

	/// Returns true when nothing is stored.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Applies a named property.
	///
	/// Layers consume the names they understand; every other name is accepted
	/// and ignored.
	fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
		let _ = (name, value);
		Ok(())
	}

	/// Layer description, outermost first, e.g. `Lru(Perpetual)`.
	fn describe(&self) -> String;
}

/// Shareable cache layer.
pub trait Cache: Send + Sync {
	/// Cache id, the owning namespace.
	fn id(&self) -> &str;

	/// Stores a value.
	fn put(&self, key: CacheKey, value: CachedValue) -> Result<()>;

	/// Looks a value up.
	fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>>;

	/// Removes a value.
	fn remove(&self, key: &CacheKey) -> Result<Option<CachedValue>>;

	/// Removes every value.
	fn clear(&self);

	/// Number of stored values.
	fn len(&self) -> usize;

	/// Returns true when nothing is stored.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Layer description, outermost first.
	fn describe(&self) -> String;
}

/// A finished cache chain, shared by every statement bound to it.
pub type SharedCache = Arc<dyn Cache>;
