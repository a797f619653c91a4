//! Cached values.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A cached query result.
///
/// Values are plain data so the read-write layer can hand out independent
/// copies by round-tripping them through an encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// SQL `NULL`.
	Null,
	/// Boolean column value.
	Bool(bool),
	/// Integral column value.
	Int(i64),
	/// Floating point column value.
	Float(f64),
	/// Text column value.
	Text(String),
	/// Binary column value.
	Bytes(Vec<u8>),
	/// Ordered rows or collection elements.
	List(Vec<Value>),
	/// One mapped row: property name to value.
	Record(BTreeMap<String, Value>),
}

/// Value handle stored in and returned from caches.
///
/// Read-only caches return the same allocation on every hit; read-write caches
/// return a fresh one.
pub type CachedValue = Arc<Value>;
