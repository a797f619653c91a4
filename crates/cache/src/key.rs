//! Composite cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key built from the ordered parts that identify one cached result
/// (statement id, bounds, parameter values, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
	parts: Vec<String>,
}

impl CacheKey {
	/// Creates an empty key.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a part.
	pub fn update(&mut self, part: impl fmt::Display) {
		self.parts.push(part.to_string());
	}

	/// Appends a part, builder style.
	pub fn with(mut self, part: impl fmt::Display) -> Self {
		self.update(part);
		self
	}

	/// Key parts in order.
	pub fn parts(&self) -> &[String] {
		&self.parts
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.parts.join(":"))
	}
}

impl From<&str> for CacheKey {
	fn from(part: &str) -> Self {
		Self::new().with(part)
	}
}
