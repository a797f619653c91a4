//! Deferred-resolution outcomes.
//!
//! A build step that needs an artifact which is not registered yet returns
//! [`Outcome::Incomplete`] naming what it waits for. Callers park the request
//! in one of the registry's pending queues and retry it on the next drain.

use std::fmt;

use strum::Display;

/// Kinds of registry artifacts, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ArtifactKind {
	#[strum(to_string = "result map")]
	ResultMap,
	#[strum(to_string = "parameter map")]
	ParameterMap,
	#[strum(to_string = "cache")]
	Cache,
	#[strum(to_string = "cache reference")]
	CacheRef,
	#[strum(to_string = "sql fragment")]
	SqlFragment,
	#[strum(to_string = "statement")]
	Statement,
	#[strum(to_string = "type")]
	Type,
	#[strum(to_string = "mapper")]
	Mapper,
}

/// The missing dependency an incomplete build step waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
	/// Kind of the missing artifact.
	pub kind: ArtifactKind,
	/// Qualified id of the missing artifact.
	pub id: String,
}

impl Unresolved {
	pub fn new(kind: ArtifactKind, id: impl Into<String>) -> Self {
		Self { kind, id: id.into() }
	}
}

impl fmt::Display for Unresolved {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} '{}'", self.kind, self.id)
	}
}

/// Result of a build step that may depend on artifacts registered later.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<T> {
	/// The artifact was built (and registered, where applicable).
	Resolved(T),
	/// A dependency is missing; retry later.
	Incomplete(Unresolved),
}

impl<T> Outcome<T> {
	/// Shorthand for an incomplete outcome.
	pub fn waiting_on(kind: ArtifactKind, id: impl Into<String>) -> Self {
		Self::Incomplete(Unresolved::new(kind, id))
	}

	pub fn is_resolved(&self) -> bool {
		matches!(self, Self::Resolved(_))
	}

	/// Returns the resolved value, if any.
	pub fn resolved(self) -> Option<T> {
		match self {
			Self::Resolved(value) => Some(value),
			Self::Incomplete(_) => None,
		}
	}

	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
		match self {
			Self::Resolved(value) => Outcome::Resolved(f(value)),
			Self::Incomplete(missing) => Outcome::Incomplete(missing),
		}
	}
}

/// Unwraps a resolved value or returns `Ok(Outcome::Incomplete(..))` from the
/// enclosing function.
macro_rules! resolved {
	($outcome:expr) => {
		match $outcome {
			$crate::outcome::Outcome::Resolved(value) => value,
			$crate::outcome::Outcome::Incomplete(missing) => {
				return Ok($crate::outcome::Outcome::Incomplete(missing));
			}
		}
	};
}
pub(crate) use resolved;

/// One pending entry that survived the final drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReport {
	/// Kind of the parked artifact.
	pub kind: ArtifactKind,
	/// Id of the parked artifact (for cache references, the referencing namespace).
	pub id: String,
	/// What it was still waiting for on its last attempt.
	pub blocked_on: Unresolved,
}

impl fmt::Display for PendingReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} '{}' is waiting for {}",
			self.kind, self.id, self.blocked_on
		)
	}
}
