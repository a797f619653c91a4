//! Per-key blocking layer.
//!
//! A lookup takes a lock on its key. On a hit the lock is released at once; on
//! a miss it stays held until the caller stores the value (or removes the key),
//! so concurrent callers missing on the same key wait for the first one to
//! populate it instead of all querying the database.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap as HashMap;

use crate::error::{CacheError, Result};
use crate::key::CacheKey;
use crate::traits::Cache;
use crate::value::CachedValue;

#[derive(Default)]
struct Latch {
	open: Mutex<bool>,
	cond: Condvar,
}

impl Latch {
	fn open(&self) {
		*self.open.lock() = true;
		self.cond.notify_all();
	}

	/// Waits until opened. Returns false when `deadline` passes first.
	fn wait(&self, deadline: Option<Instant>) -> bool {
		let mut open = self.open.lock();
		while !*open {
			match deadline {
				Some(deadline) => {
					if self.cond.wait_until(&mut open, deadline).timed_out() {
						return *open;
					}
				}
				None => self.cond.wait(&mut open),
			}
		}
		true
	}
}

/// Blocks concurrent misses on the same key (`blocking=#true`).
pub struct BlockingCache {
	delegate: Box<dyn Cache>,
	locks: Mutex<HashMap<CacheKey, Arc<Latch>>>,
	timeout: Option<Duration>,
}

impl BlockingCache {
	pub fn new(delegate: Box<dyn Cache>) -> Self {
		Self {
			delegate,
			locks: Mutex::new(HashMap::default()),
			timeout: None,
		}
	}

	/// Bounds how long a caller waits for another caller's lock.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	fn acquire(&self, key: &CacheKey) -> Result<()> {
		let deadline = self.timeout.map(|t| Instant::now() + t);
		loop {
			let held = {
				let mut locks = self.locks.lock();
				match locks.get(key) {
					Some(latch) => latch.clone(),
					None => {
						locks.insert(key.clone(), Arc::new(Latch::default()));
						return Ok(());
					}
				}
			};
			tracing::trace!(cache = self.delegate.id(), %key, "waiting for key lock");
			if !held.wait(deadline) {
				return Err(CacheError::LockTimeout {
					cache: self.delegate.id().to_string(),
					key: key.clone(),
				});
			}
		}
	}

	fn release(&self, key: &CacheKey) -> Result<()> {
		let latch = self.locks.lock().remove(key);
		match latch {
			Some(latch) => {
				latch.open();
				Ok(())
			}
			None => Err(CacheError::UnacquiredLock {
				cache: self.delegate.id().to_string(),
				key: key.clone(),
			}),
		}
	}
}

impl Cache for BlockingCache {
	fn id(&self) -> &str {
		self.delegate.id()
	}

	/// Stores the value and releases the caller's lock on `key`.
	fn put(&self, key: CacheKey, value: CachedValue) -> Result<()> {
		let stored = self.delegate.put(key.clone(), value);
		self.release(&key)?;
		stored
	}

	fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		self.acquire(key)?;
		let value = match self.delegate.get(key) {
			Ok(value) => value,
			Err(error) => {
				self.release(key)?;
				return Err(error);
			}
		};
		if value.is_some() {
			self.release(key)?;
		}
		Ok(value)
	}

	/// Releases the caller's lock on `key` without touching the stored value.
	fn remove(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
		self.release(key)?;
		Ok(None)
	}

	fn clear(&self) {
		self.delegate.clear();
	}

	fn len(&self) -> usize {
		self.delegate.len()
	}

	fn describe(&self) -> String {
		format!("Blocking({})", self.delegate.describe())
	}
}
