//! Error types for cache construction and access.

use thiserror::Error;

use crate::key::CacheKey;

/// Errors raised while building or using a cache chain.
#[derive(Debug, Error)]
pub enum CacheError {
	/// No base or eviction implementation is registered under the alias.
	#[error("unknown {layer} cache implementation '{name}'")]
	UnknownKind {
		/// `base` or `eviction`.
		layer: &'static str,
		/// The alias that failed to resolve.
		name: String,
	},

	/// A property value could not be applied to a cache layer.
	#[error("invalid value {value:?} for cache property '{name}' on {cache}: {reason}")]
	InvalidProperty {
		/// Cache id.
		cache: String,
		/// Property name.
		name: String,
		/// Raw property value.
		value: String,
		/// Why the value was rejected.
		reason: &'static str,
	},

	/// A read-write copy could not be encoded or decoded.
	#[error("failed to copy value in cache {cache}: {error}")]
	Serialization {
		/// Cache id.
		cache: String,
		/// The underlying codec error.
		error: postcard::Error,
	},

	/// A waiter gave up on a key held by another caller.
	#[error("timed out waiting for lock on key {key} in cache {cache}")]
	LockTimeout {
		/// Cache id.
		cache: String,
		/// The contended key.
		key: CacheKey,
	},

	/// A caller released a key lock it never acquired.
	#[error("attempt to release unacquired lock on key {key} in cache {cache}")]
	UnacquiredLock {
		/// Cache id.
		cache: String,
		/// The key.
		key: CacheKey,
	},
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
