//! Error types for document reading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a document into a [`Node`] tree.
///
/// [`Node`]: crate::Node
#[derive(Debug, Error)]
pub enum NodeError {
	/// Error parsing KDL syntax.
	#[error("KDL parse error: {0}")]
	Kdl(#[from] kdl::KdlError),

	/// The document does not consist of exactly one expected root node.
	#[error("expected a single <{expected}> root node, found {found}")]
	UnexpectedRoot {
		/// Name of the root node the caller asked for.
		expected: String,
		/// Description of what was found instead.
		found: String,
	},

	/// A required attribute is absent.
	#[error("<{element}> requires attribute '{attribute}'")]
	MissingAttribute {
		/// Element name.
		element: String,
		/// Attribute name.
		attribute: String,
	},

	/// An attribute could not be coerced to the requested type.
	#[error("invalid value {value:?} for attribute '{attribute}' on <{element}>: expected {expected}")]
	InvalidAttribute {
		/// Element name.
		element: String,
		/// Attribute name.
		attribute: String,
		/// The raw attribute value.
		value: String,
		/// Human readable description of the expected type.
		expected: &'static str,
	},

	/// Error reading a document from disk.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The resource is not known to the loader.
	#[error("could not find resource {0}")]
	ResourceNotFound(String),

	/// A URL could not be parsed.
	#[error("invalid URL {url:?}: {error}")]
	InvalidUrl {
		/// The raw URL text.
		url: String,
		/// The underlying parse error.
		error: url::ParseError,
	},

	/// The URL scheme cannot be loaded.
	#[error("unsupported URL scheme '{scheme}' in {url}")]
	UnsupportedScheme {
		/// The URL scheme.
		scheme: String,
		/// The full URL.
		url: String,
	},
}

/// Result type for document reading operations.
pub type Result<T> = std::result::Result<T, NodeError>;
