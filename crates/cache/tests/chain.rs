//! End-to-end behavior of assembled cache chains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;
use mapforge_cache::{CacheBuilder, CacheKey, CacheProviders, CacheStore, PerpetualStore, Value};
use pretty_assertions::assert_eq;

fn row(n: i64) -> Arc<Value> {
	Arc::new(Value::List(vec![Value::Int(n), Value::Text(format!("row {n}"))]))
}

#[test]
fn lru_bound_applies_through_chain() {
	let cache = CacheBuilder::new("blog.Post")
		.size(Some(2))
		.build(&CacheProviders::new())
		.unwrap();

	cache.put(CacheKey::from("a"), row(1)).unwrap();
	cache.put(CacheKey::from("b"), row(2)).unwrap();
	cache.get(&CacheKey::from("a")).unwrap();
	cache.put(CacheKey::from("c"), row(3)).unwrap();

	assert_eq!(cache.len(), 2);
	assert!(cache.get(&CacheKey::from("b")).unwrap().is_none());
	assert_eq!(cache.get(&CacheKey::from("a")).unwrap(), Some(row(1)));
}

#[test]
fn fifo_ignores_access_order() {
	let cache = CacheBuilder::new("blog.Post")
		.eviction(Some("FIFO"))
		.size(Some(2))
		.build(&CacheProviders::new())
		.unwrap();

	cache.put(CacheKey::from("a"), row(1)).unwrap();
	cache.put(CacheKey::from("b"), row(2)).unwrap();
	cache.get(&CacheKey::from("a")).unwrap();
	cache.put(CacheKey::from("c"), row(3)).unwrap();

	assert!(cache.get(&CacheKey::from("a")).unwrap().is_none());
	assert!(cache.get(&CacheKey::from("c")).unwrap().is_some());
}

#[test]
fn scheduled_flush_clears_after_interval() {
	let cache = CacheBuilder::new("blog.Post")
		.flush_interval(Some(Duration::from_millis(25)))
		.build(&CacheProviders::new())
		.unwrap();

	cache.put(CacheKey::from("a"), row(1)).unwrap();
	assert!(cache.get(&CacheKey::from("a")).unwrap().is_some());
	thread::sleep(Duration::from_millis(50));
	assert!(cache.get(&CacheKey::from("a")).unwrap().is_none());
}

#[test]
fn read_write_returns_copies() {
	let cache = CacheBuilder::new("blog.Post").build(&CacheProviders::new()).unwrap();
	let original = row(7);
	cache.put(CacheKey::from("k"), original.clone()).unwrap();

	let hit = cache.get(&CacheKey::from("k")).unwrap().unwrap();
	assert_eq!(hit, original);
	assert!(!Arc::ptr_eq(&hit, &original));
}

#[test]
fn read_only_shares_instances() {
	let cache = CacheBuilder::new("blog.Post")
		.read_write(false)
		.build(&CacheProviders::new())
		.unwrap();
	let original = row(7);
	cache.put(CacheKey::from("k"), original.clone()).unwrap();

	let hit = cache.get(&CacheKey::from("k")).unwrap().unwrap();
	assert!(Arc::ptr_eq(&hit, &original));
}

#[test]
fn blocking_serializes_concurrent_misses() {
	let cache = CacheBuilder::new("blog.Post")
		.blocking(true)
		.build(&CacheProviders::new())
		.unwrap();
	let key = CacheKey::from("slow");
	let loads = Arc::new(AtomicUsize::new(0));
	let start = Arc::new(Barrier::new(4));

	let workers: Vec<_> = (0..4)
		.map(|_| {
			let cache = cache.clone();
			let key = key.clone();
			let loads = loads.clone();
			let start = start.clone();
			thread::spawn(move || {
				start.wait();
				match cache.get(&key).unwrap() {
					Some(value) => value,
					None => {
						loads.fetch_add(1, Ordering::SeqCst);
						thread::sleep(Duration::from_millis(20));
						let value = row(42);
						cache.put(key, value.clone()).unwrap();
						value
					}
				}
			})
		})
		.collect();

	for worker in workers {
		assert_eq!(worker.join().unwrap(), row(42));
	}
	assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn properties_reach_custom_base() {
	struct Tagged {
		inner: PerpetualStore,
		tag: Option<String>,
	}

	impl CacheStore for Tagged {
		fn id(&self) -> &str {
			self.inner.id()
		}
		fn put(&mut self, key: CacheKey, value: Arc<Value>) {
			self.inner.put(key, value);
		}
		fn get(&mut self, key: &CacheKey) -> Option<Arc<Value>> {
			self.inner.get(key)
		}
		fn remove(&mut self, key: &CacheKey) -> Option<Arc<Value>> {
			self.inner.remove(key)
		}
		fn clear(&mut self) {
			self.inner.clear();
		}
		fn len(&self) -> usize {
			self.inner.len()
		}
		fn set_property(&mut self, name: &str, value: &str) -> mapforge_cache::Result<()> {
			if name == "tag" {
				self.tag = Some(value.to_string());
			}
			Ok(())
		}
		fn describe(&self) -> String {
			format!("Tagged[{}]", self.tag.as_deref().unwrap_or("-"))
		}
	}

	let mut providers = CacheProviders::new();
	providers.register_base("TAGGED", |id| {
		Box::new(Tagged {
			inner: PerpetualStore::new(id),
			tag: None,
		})
	});
	let mut properties = IndexMap::new();
	properties.insert("tag".to_string(), "hot".to_string());

	let cache = CacheBuilder::new("blog.Post")
		.implementation(Some("tagged"))
		.read_write(false)
		.properties(properties)
		.build(&providers)
		.unwrap();
	assert_eq!(cache.describe(), "Logging(Synchronized(Lru(Tagged[hot])))");
}
