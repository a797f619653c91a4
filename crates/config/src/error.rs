//! Error types for configuration compilation.

use mapforge_cache::CacheError;
use mapforge_node::NodeError;
use thiserror::Error;

use crate::outcome::{ArtifactKind, PendingReport};

/// Errors that abort a load. Forward references are not errors; they travel
/// as [`Outcome::Incomplete`](crate::Outcome::Incomplete) until the final
/// drain turns survivors into [`ConfigError::Unresolved`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading or coercing a document.
	#[error(transparent)]
	Node(#[from] NodeError),

	/// Error assembling a cache chain.
	#[error(transparent)]
	Cache(#[from] CacheError),

	/// A mapper document has no namespace.
	#[error("mapper namespace cannot be empty")]
	EmptyNamespace,

	/// A declared id contains a dot and is not qualified with the current namespace.
	#[error("dots are not allowed in element names, please remove it from '{0}'")]
	DottedId(String),

	/// A settings entry names no known setting.
	#[error("unknown setting '{name}'{}", did_you_mean(.suggestion))]
	UnknownSetting {
		/// The setting name as written.
		name: String,
		/// Closest known setting name.
		suggestion: Option<String>,
	},

	/// A setting value could not be converted.
	#[error("invalid value {value:?} for setting '{name}': {reason}")]
	InvalidSetting {
		/// Setting name.
		name: String,
		/// Raw value.
		value: String,
		/// Why the value was rejected.
		reason: &'static str,
	},

	/// A collection has neither `java-type` nor `result-map`, and its property
	/// has no setter to infer the type from.
	#[error("ambiguous collection type for property '{0}'; specify 'java-type' or 'result-map'")]
	AmbiguousCollection(String),

	/// An element specifies more than one of mutually exclusive attributes.
	#[error("<{element}> may only specify one of {attributes}")]
	ExclusiveAttributes {
		/// Element name.
		element: &'static str,
		/// The competing attributes, for display.
		attributes: &'static str,
	},

	/// A mapper document declares its own cache and references another one.
	#[error("namespace '{0}' declares both <cache> and <cache-ref>")]
	ConflictingCaches(String),

	/// A cache implementation reported an id other than its namespace.
	#[error("cache for namespace '{namespace}' reports id '{id}'")]
	CacheIdMismatch {
		/// Namespace declaring the cache.
		namespace: String,
		/// Id the built cache reports.
		id: String,
	},

	/// A child element is not valid in its parent.
	#[error("unexpected <{element}> inside <{parent}>")]
	UnexpectedElement {
		/// Parent element name.
		parent: String,
		/// Offending child element name.
		element: String,
	},

	/// A type alias or type name is not registered.
	#[error("could not resolve type alias '{0}'")]
	UnknownType(String),

	/// A JDBC type name is not recognized.
	#[error("unknown JDBC type '{0}'")]
	UnknownJdbcType(String),

	/// An alias is already bound to another type.
	#[error("alias '{alias}' is already mapped to '{existing}', cannot map it to '{requested}'")]
	AliasConflict {
		/// The alias.
		alias: String,
		/// Type the alias resolves to.
		existing: String,
		/// Type the caller tried to bind.
		requested: String,
	},

	/// `environments` has no `default` and the caller chose none.
	#[error("no environment specified")]
	NoEnvironment,

	/// An `environment` element has no `id`.
	#[error("environment requires an id attribute")]
	EnvironmentWithoutId,

	/// The selected environment lacks a required child.
	#[error("environment '{id}' requires a <{element}> element")]
	IncompleteEnvironment {
		/// Environment id.
		id: String,
		/// Missing child element.
		element: &'static str,
	},

	/// The selected environment id matches no declared environment.
	#[error("environment '{0}' is not declared")]
	UnknownEnvironment(String),

	/// A database id provider alias is not registered.
	#[error("unknown database id provider '{0}'")]
	UnknownDatabaseIdProvider(String),

	/// A result or parameter mapping is inconsistent.
	#[error("invalid mapping for property '{property}': {reason}")]
	InvalidMapping {
		/// Property (or constructor argument, or column) the mapping binds.
		property: String,
		/// What is wrong with it.
		reason: &'static str,
	},

	/// An artifact id is registered twice.
	#[error("{kind} '{id}' is already registered")]
	Duplicate {
		/// Artifact kind.
		kind: ArtifactKind,
		/// Qualified id.
		id: String,
	},

	/// An include expands into itself.
	#[error("sql fragment '{0}' includes itself")]
	IncludeCycle(String),

	/// An include lists the same property twice.
	#[error("variable '{0}' defined twice in the same include definition")]
	DuplicateIncludeProperty(String),

	/// A configuration builder was asked to parse a second time.
	#[error("each configuration builder can only be used once")]
	AlreadyParsed,

	/// Error raised while loading a mapper document.
	#[error("error parsing mapper '{resource}': {source}")]
	Mapper {
		/// Resource path, URL or class the document came from.
		resource: String,
		/// The underlying error.
		#[source]
		source: Box<ConfigError>,
	},

	/// Definitions still waiting on a dependency after the final drain.
	#[error("unresolved definitions after loading: {}", display_reports(.0))]
	Unresolved(Vec<PendingReport>),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
	suggestion
		.as_ref()
		.map(|s| format!(", did you mean '{s}'?"))
		.unwrap_or_default()
}

fn display_reports(reports: &[PendingReport]) -> String {
	reports
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}

impl ConfigError {
	/// Wraps `self` with the mapper resource it came from, unless already wrapped.
	pub(crate) fn in_mapper(self, resource: &str) -> Self {
		match self {
			wrapped @ Self::Mapper { .. } => wrapped,
			other => Self::Mapper {
				resource: resource.to_string(),
				source: Box::new(other),
			},
		}
	}
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
