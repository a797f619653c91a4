//! Resource loading for configuration and mapping documents.
//!
//! Documents are addressed either by a resource path, resolved by a
//! [`ResourceLoader`], or by a URL. Only `file` URLs are loadable.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap as HashMap;
use url::Url;

use crate::error::{NodeError, Result};

/// Source of documents addressed by resource path.
pub trait ResourceLoader {
	/// Reads the resource text.
	fn load(&self, resource: &str) -> Result<String>;

	/// Returns true if the resource can be loaded.
	fn exists(&self, resource: &str) -> bool;
}

/// Loads resources relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileLoader {
	root: PathBuf,
}

impl FileLoader {
	/// Creates a loader resolving resources below `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	fn path(&self, resource: &str) -> PathBuf {
		self.root.join(resource.trim_start_matches('/'))
	}
}

impl ResourceLoader for FileLoader {
	fn load(&self, resource: &str) -> Result<String> {
		let path = self.path(resource);
		if !path.is_file() {
			return Err(NodeError::ResourceNotFound(resource.to_string()));
		}
		read_file(&path)
	}

	fn exists(&self, resource: &str) -> bool {
		self.path(resource).is_file()
	}
}

/// In-memory resources, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
	docs: HashMap<String, String>,
}

impl MemoryLoader {
	/// Creates an empty loader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a resource, replacing any previous text at the same path.
	pub fn with(mut self, resource: impl Into<String>, text: impl Into<String>) -> Self {
		self.insert(resource, text);
		self
	}

	/// Adds a resource in place.
	pub fn insert(&mut self, resource: impl Into<String>, text: impl Into<String>) {
		self.docs.insert(resource.into(), text.into());
	}
}

impl ResourceLoader for MemoryLoader {
	fn load(&self, resource: &str) -> Result<String> {
		self.docs
			.get(resource)
			.cloned()
			.ok_or_else(|| NodeError::ResourceNotFound(resource.to_string()))
	}

	fn exists(&self, resource: &str) -> bool {
		self.docs.contains_key(resource)
	}
}

/// Reads the document behind a URL.
pub fn load_url(raw: &str) -> Result<String> {
	let url = Url::parse(raw).map_err(|error| NodeError::InvalidUrl {
		url: raw.to_string(),
		error,
	})?;
	if url.scheme() != "file" {
		return Err(NodeError::UnsupportedScheme {
			scheme: url.scheme().to_string(),
			url: raw.to_string(),
		});
	}
	let path = url
		.to_file_path()
		.map_err(|()| NodeError::ResourceNotFound(raw.to_string()))?;
	read_file(&path)
}

fn read_file(path: &Path) -> Result<String> {
	tracing::trace!(path = %path.display(), "reading document");
	std::fs::read_to_string(path).map_err(|error| NodeError::Io {
		path: path.to_path_buf(),
		error,
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn memory_loader_round_trips() {
		let loader = MemoryLoader::new().with("a.kdl", "mapper");
		assert!(loader.exists("a.kdl"));
		assert_eq!(loader.load("a.kdl").unwrap(), "mapper");
		assert!(matches!(
			loader.load("b.kdl"),
			Err(NodeError::ResourceNotFound(_))
		));
	}

	#[test]
	fn file_loader_reads_below_root() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::create_dir_all(dir.path().join("blog")).unwrap();
		std::fs::write(dir.path().join("blog/Author.kdl"), "mapper").unwrap();

		let loader = FileLoader::new(dir.path());
		assert!(loader.exists("blog/Author.kdl"));
		assert!(!loader.exists("blog/Missing.kdl"));
		assert_eq!(loader.load("/blog/Author.kdl").unwrap(), "mapper");
	}

	#[test]
	fn url_loading_requires_file_scheme() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("m.kdl");
		std::fs::write(&path, "mapper").unwrap();

		let url = Url::from_file_path(&path).unwrap();
		assert_eq!(load_url(url.as_str()).unwrap(), "mapper");

		let err = load_url("https://example.com/m.kdl").unwrap_err();
		assert!(matches!(err, NodeError::UnsupportedScheme { ref scheme, .. } if scheme == "https"));
		assert!(matches!(
			load_url("not a url"),
			Err(NodeError::InvalidUrl { .. })
		));
	}
}
