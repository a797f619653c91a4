//! Cache chain assembly.
//!
//! [`CacheBuilder`] turns one namespace's cache declaration into a finished
//! [`SharedCache`]. Layers are applied in a fixed order:
//!
//! base → eviction → scheduled flush → synchronized → logging → serialized →
//! blocking
//!
//! Scheduled, serialized and blocking are optional; the rest are always
//! present. Base and eviction kinds are looked up by alias in
//! [`CacheProviders`].

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;

use crate::blocking::BlockingCache;
use crate::error::{CacheError, Result};
use crate::eviction::{FifoEviction, LruEviction};
use crate::logging::LoggingCache;
use crate::scheduled::ScheduledStore;
use crate::serialized::SerializedCache;
use crate::store::PerpetualStore;
use crate::sync::SynchronizedCache;
use crate::traits::{Cache, CacheStore, SharedCache};

/// Constructs a base store for a cache id.
pub type BaseFactory = Box<dyn Fn(&str) -> Box<dyn CacheStore> + Send + Sync>;

/// Wraps a store in an eviction layer.
pub type EvictionFactory = Box<dyn Fn(Box<dyn CacheStore>) -> Box<dyn CacheStore> + Send + Sync>;

/// Base alias used when a declaration names none.
pub const DEFAULT_BASE: &str = "PERPETUAL";
/// Eviction alias used when a declaration names none.
pub const DEFAULT_EVICTION: &str = "LRU";

/// Alias table for pluggable base and eviction implementations.
///
/// Aliases are case-insensitive.
pub struct CacheProviders {
	bases: HashMap<String, BaseFactory>,
	evictions: HashMap<String, EvictionFactory>,
}

impl Default for CacheProviders {
	fn default() -> Self {
		let mut providers = Self {
			bases: HashMap::default(),
			evictions: HashMap::default(),
		};
		providers.register_base(DEFAULT_BASE, |id| Box::new(PerpetualStore::new(id)));
		providers.register_eviction("LRU", |inner| Box::new(LruEviction::new(inner)));
		providers.register_eviction("FIFO", |inner| Box::new(FifoEviction::new(inner)));
		providers
	}
}

impl CacheProviders {
	/// Creates a table holding the built-in `PERPETUAL`, `LRU` and `FIFO`.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers or replaces a base implementation.
	pub fn register_base<F>(&mut self, alias: &str, factory: F)
	where
		F: Fn(&str) -> Box<dyn CacheStore> + Send + Sync + 'static,
	{
		self.bases.insert(alias.to_ascii_uppercase(), Box::new(factory));
	}

	/// Registers or replaces an eviction implementation.
	pub fn register_eviction<F>(&mut self, alias: &str, factory: F)
	where
		F: Fn(Box<dyn CacheStore>) -> Box<dyn CacheStore> + Send + Sync + 'static,
	{
		self.evictions.insert(alias.to_ascii_uppercase(), Box::new(factory));
	}

	/// Returns true when `alias` names a base implementation.
	pub fn has_base(&self, alias: &str) -> bool {
		self.bases.contains_key(&alias.to_ascii_uppercase())
	}

	/// Returns true when `alias` names an eviction implementation.
	pub fn has_eviction(&self, alias: &str) -> bool {
		self.evictions.contains_key(&alias.to_ascii_uppercase())
	}

	fn base(&self, alias: &str) -> Result<&BaseFactory> {
		self.bases.get(&alias.to_ascii_uppercase()).ok_or_else(|| CacheError::UnknownKind {
			layer: "base",
			name: alias.to_string(),
		})
	}

	fn eviction(&self, alias: &str) -> Result<&EvictionFactory> {
		self.evictions
			.get(&alias.to_ascii_uppercase())
			.ok_or_else(|| CacheError::UnknownKind {
				layer: "eviction",
				name: alias.to_string(),
			})
	}
}

/// One namespace's cache declaration.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
	id: String,
	implementation: Option<String>,
	eviction: Option<String>,
	flush_interval: Option<Duration>,
	size: Option<usize>,
	read_write: bool,
	blocking: bool,
	properties: IndexMap<String, String>,
}

impl CacheBuilder {
	/// Starts a declaration for the cache `id` (the namespace).
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			implementation: None,
			eviction: None,
			flush_interval: None,
			size: None,
			read_write: true,
			blocking: false,
			properties: IndexMap::new(),
		}
	}

	pub fn implementation(mut self, alias: Option<impl Into<String>>) -> Self {
		self.implementation = alias.map(Into::into);
		self
	}

	pub fn eviction(mut self, alias: Option<impl Into<String>>) -> Self {
		self.eviction = alias.map(Into::into);
		self
	}

	pub fn flush_interval(mut self, interval: Option<Duration>) -> Self {
		self.flush_interval = interval;
		self
	}

	pub fn size(mut self, size: Option<usize>) -> Self {
		self.size = size;
		self
	}

	/// Read-write caches hand out a copy on every hit. Defaults to true.
	pub fn read_write(mut self, read_write: bool) -> Self {
		self.read_write = read_write;
		self
	}

	pub fn blocking(mut self, blocking: bool) -> Self {
		self.blocking = blocking;
		self
	}

	pub fn properties(mut self, properties: IndexMap<String, String>) -> Self {
		self.properties = properties;
		self
	}

	/// Cache id.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Assembles the chain.
	pub fn build(&self, providers: &CacheProviders) -> Result<SharedCache> {
		let base_alias = self.implementation.as_deref().unwrap_or(DEFAULT_BASE);
		let eviction_alias = self.eviction.as_deref().unwrap_or(DEFAULT_EVICTION);

		let make_base = providers.base(base_alias)?;
		let mut store = make_base(&self.id);
		for (name, value) in &self.properties {
			store.set_property(name, value)?;
		}

		let wrap_eviction = providers.eviction(eviction_alias)?;
		let mut store = wrap_eviction(store);
		if let Some(size) = self.size {
			store.set_property("size", &size.to_string())?;
		}
		for (name, value) in &self.properties {
			store.set_property(name, value)?;
		}

		if let Some(interval) = self.flush_interval {
			store = Box::new(ScheduledStore::new(store, interval));
		}

		let mut cache: Box<dyn Cache> = Box::new(SynchronizedCache::new(store));
		cache = Box::new(LoggingCache::new(cache));
		if self.read_write {
			cache = Box::new(SerializedCache::new(cache));
		}
		if self.blocking {
			let mut blocking = BlockingCache::new(cache);
			if let Some(timeout) = self.blocking_timeout()? {
				blocking = blocking.with_timeout(timeout);
			}
			cache = Box::new(blocking);
		}

		tracing::debug!(cache = %self.id, chain = %cache.describe(), "built cache");
		Ok(Arc::from(cache))
	}

	fn blocking_timeout(&self) -> Result<Option<Duration>> {
		let Some(raw) = self.properties.get("timeout") else {
			return Ok(None);
		};
		raw.trim()
			.parse::<u64>()
			.map(|ms| Some(Duration::from_millis(ms)))
			.map_err(|_| CacheError::InvalidProperty {
				cache: self.id.clone(),
				name: "timeout".to_string(),
				value: raw.clone(),
				reason: "expected milliseconds",
			})
	}
}
