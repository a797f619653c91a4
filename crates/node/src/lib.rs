//! Document model for mapforge.
//!
//! Configuration and mapping documents are written in KDL (v2). This crate
//! reads them into a read-only [`Node`] tree that the builders in
//! `mapforge-config` walk:
//!
//! - [`reader`] converts KDL into nodes, substituting `${name}` variables
//! - [`Node`] exposes ordered attributes with typed coercion, body text and
//!   children
//! - [`resource`] loads documents by resource path or `file` URL

pub mod error;
pub mod node;
pub mod reader;
pub mod resource;
pub mod vars;

pub use error::{NodeError, Result};
pub use node::Node;
pub use reader::{read_properties, read_root};
pub use resource::{FileLoader, MemoryLoader, ResourceLoader, load_url};
pub use vars::{Variables, substitute};
