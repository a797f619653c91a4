//! Mapping configuration compiler for mapforge.
//!
//! This crate turns a `configuration` document and the mapper documents it
//! lists into a resolved [`Configuration`]: result maps with inheritance,
//! nested maps and discriminators, parameter maps, cache chains, sql fragments
//! and statements, all keyed by namespace-qualified ids.
//!
//! Documents may reference each other in any order. A build step that needs
//! something not registered yet returns [`Outcome::Incomplete`] and is parked
//! in one of three pending queues (result maps, cache references,
//! statements). The queues are retried once after every mapper document and
//! once more at the end of the load; whatever is still pending then fails the
//! load with [`ConfigError::Unresolved`].
//!
//! # Example
//!
//! ```
//! use mapforge_config::ConfigBuilder;
//! use mapforge_config::types::{TypeAliasRegistry, TypeDescriptor};
//! use mapforge_node::MemoryLoader;
//!
//! let mut types = TypeAliasRegistry::new();
//! types.register_type(TypeDescriptor::bean("blog.Author").with_property("id", "int"));
//!
//! let loader = MemoryLoader::new().with(
//!     "blog/AuthorMapper.kdl",
//!     r#"
//! mapper namespace="blog.AuthorMapper" {
//!     select id="find" result-type="blog.Author" "select * from author where id = #{id}"
//! }
//! "#,
//! );
//!
//! let config = ConfigBuilder::new(
//!     r#"configuration { mappers { mapper resource="blog/AuthorMapper.kdl" } }"#,
//! )
//! .loader(loader)
//! .types(types)
//! .parse()
//! .unwrap();
//!
//! assert!(config.has_statement("blog.AuthorMapper.find"));
//! ```

pub mod assistant;
pub mod builder;
pub mod environment;
pub mod error;
pub mod mapper;
pub mod mapping;
pub mod outcome;
pub mod registry;
pub mod settings;
pub mod types;

pub use assistant::BuilderAssistant;
pub use builder::ConfigBuilder;
pub use environment::{Component, DatabaseIdProvider, Environment, VendorDatabaseIdProvider};
pub use error::{ConfigError, Result};
pub use mapper::MapperBuilder;
pub use outcome::{ArtifactKind, Outcome, PendingReport, Unresolved};
pub use registry::{CacheBinding, Configuration, DrainSummary};
pub use settings::Settings;
