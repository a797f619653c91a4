//! Namespace caches for mapforge.
//!
//! Every namespace that declares a cache gets one chain of layers built by
//! [`CacheBuilder`]. Inner layers implement [`CacheStore`]; the chain is
//! shared across threads through [`SharedCache`] once synchronized.

pub mod blocking;
pub mod builder;
pub mod error;
pub mod eviction;
pub mod key;
pub mod logging;
pub mod scheduled;
pub mod serialized;
pub mod store;
pub mod sync;
pub mod traits;
pub mod value;

pub use builder::{CacheBuilder, CacheProviders, DEFAULT_BASE, DEFAULT_EVICTION};
pub use error::{CacheError, Result};
pub use key::CacheKey;
pub use store::PerpetualStore;
pub use traits::{Cache, CacheStore, SharedCache};
pub use value::{CachedValue, Value};
