//! Mapper document parsing.
//!
//! A mapper document is a single `mapper` node:
//!
//! ```kdl
//! mapper namespace="blog.AuthorMapper" {
//!     cache eviction="FIFO" size=512
//!     result-map id="author" type="Author" {
//!         id property="id" column="author_id"
//!         result property="name" column="author_name"
//!     }
//!     sql id="columns" "author_id, author_name"
//!     select id="find" result-map="author" "select" {
//!         include refid="columns"
//!         text "from author where author_id = #{id}"
//!     }
//! }
//! ```
//!
//! Sections are processed in a fixed order: cache, parameter maps, result
//! maps, fragments, statements. Anything that references an artifact not yet
//! registered is parked in the registry's pending queues, which are drained
//! once the document is done.

mod include;
mod result_map;
mod statement;

use std::time::Duration;

use mapforge_cache::CacheBuilder;
use mapforge_node::{Node, read_root};

pub(crate) use self::statement::parse_statement;
use crate::assistant::{BuilderAssistant, ParameterMappingSpec};
use crate::error::{ConfigError, Result};
use crate::mapping::SqlFragment;
use crate::outcome::Outcome;
use crate::registry::{Configuration, PendingStatement};
use crate::types::TypeKind;

/// Element names accepted directly below `mapper`.
const MAPPER_ELEMENTS: &[&str] = &[
	"cache",
	"cache-ref",
	"parameter-map",
	"result-map",
	"sql",
	"select",
	"insert",
	"update",
	"delete",
];

/// Statement element names.
pub(crate) const STATEMENT_ELEMENTS: &[&str] = &["select", "insert", "update", "delete"];

/// Parses one mapper document into a [`Configuration`].
pub struct MapperBuilder<'a> {
	config: &'a mut Configuration,
	resource: String,
	root: Node,
}

impl<'a> MapperBuilder<'a> {
	/// Reads `text`, substituting the configuration's variables.
	///
	/// `resource` identifies the document in errors and in the loaded set.
	pub fn new(config: &'a mut Configuration, resource: &str, text: &str) -> Result<Self> {
		let root = read_root(text, "mapper", config.variables())
			.map_err(|e| ConfigError::from(e).in_mapper(resource))?;
		Ok(Self {
			config,
			resource: resource.to_string(),
			root,
		})
	}

	/// Registers the document's artifacts and retries pending definitions.
	///
	/// A document already loaded under the same resource is skipped, but the
	/// pending queues are still drained.
	pub fn parse(self) -> Result<()> {
		let Self {
			config,
			resource,
			root,
		} = self;

		if config.is_resource_loaded(&resource) {
			tracing::debug!(%resource, "mapper already loaded");
		} else {
			load_document(config, &resource, &root).map_err(|e| e.in_mapper(&resource))?;
		}
		config.drain_pending()?;
		Ok(())
	}
}

fn load_document(config: &mut Configuration, resource: &str, root: &Node) -> Result<()> {
	let namespace = root.attr("namespace").unwrap_or_default();
	let assistant = BuilderAssistant::new(namespace, resource)?;
	tracing::debug!(resource, namespace, "parsing mapper");

	if let Some(child) = root
		.children()
		.iter()
		.find(|c| !MAPPER_ELEMENTS.contains(&c.name()))
	{
		return Err(ConfigError::UnexpectedElement {
			parent: root.name().to_string(),
			element: child.name().to_string(),
		});
	}

	cache_element(config, &assistant, root)?;
	for node in root.children_named("parameter-map") {
		parameter_map_element(config, &assistant, node)?;
	}
	for node in root.children_named("result-map") {
		result_map::parse_result_map(config, &assistant, node, None, Vec::new())?;
	}

	let database_id = config.database_id().map(str::to_string);
	if let Some(required) = database_id.as_deref() {
		sql_elements(config, &assistant, root, Some(required))?;
	}
	sql_elements(config, &assistant, root, None)?;
	if let Some(required) = database_id.as_deref() {
		statement_elements(config, &assistant, root, Some(required))?;
	}
	statement_elements(config, &assistant, root, None)?;

	config.add_loaded_resource(resource);
	bind_namespace(config, namespace)
}

/// Decides whether a definition takes part in the current pass.
///
/// With a required database id only definitions qualified with exactly that
/// id are accepted. Otherwise only unqualified definitions are, and only while
/// no qualified definition occupies the id. `existing` is the database id of
/// the definition already registered under the same id, if any.
pub(crate) fn database_id_matches(
	declared: Option<&str>,
	required: Option<&str>,
	existing: Option<Option<&str>>,
) -> bool {
	match required {
		Some(required) => declared == Some(required),
		None => declared.is_none() && existing.is_none_or(|db| db.is_none()),
	}
}

fn cache_element(config: &mut Configuration, assistant: &BuilderAssistant, root: &Node) -> Result<()> {
	let cache = root.child("cache");
	let cache_ref = root.child("cache-ref");
	if cache.is_some() && cache_ref.is_some() {
		return Err(ConfigError::ConflictingCaches(assistant.namespace().to_string()));
	}

	if let Some(node) = cache_ref {
		let target = node.required_attr("namespace")?;
		if let Outcome::Incomplete(missing) = assistant.use_cache_ref(config, target) {
			tracing::trace!(%missing, "cache reference parked");
		}
	}

	if let Some(node) = cache {
		let builder = CacheBuilder::new(assistant.namespace())
			.implementation(node.attr("type"))
			.eviction(node.attr("eviction"))
			.flush_interval(
				node.parse_attr::<u64>("flush-interval", "milliseconds")?
					.map(Duration::from_millis),
			)
			.size(node.parse_attr::<usize>("size", "a non-negative integer")?)
			.read_write(!node.bool_attr_or("read-only", false)?)
			.blocking(node.bool_attr_or("blocking", false)?)
			.properties(node.children_as_properties());
		assistant.use_new_cache(config, builder)?;
	}
	Ok(())
}

fn parameter_map_element(config: &mut Configuration, assistant: &BuilderAssistant, node: &Node) -> Result<()> {
	let id = node.required_attr("id")?;
	let parameter_type = config.types().resolve_optional(node.attr("type"))?;

	let mut mappings = Vec::new();
	for param in node.children() {
		if param.name() != "parameter" {
			return Err(ConfigError::UnexpectedElement {
				parent: node.name().to_string(),
				element: param.name().to_string(),
			});
		}
		let spec = ParameterMappingSpec {
			property: param.required_attr("property")?.to_string(),
			java_type: param.attr("java-type").map(str::to_string),
			jdbc_type: param.attr("jdbc-type").map(str::to_string),
			result_map: param.attr("result-map").map(str::to_string),
			mode: param.parse_attr("mode", "IN, OUT or INOUT")?.unwrap_or_default(),
			type_handler: param.attr("type-handler").map(str::to_string),
			numeric_scale: param.int_attr("numeric-scale")?,
		};
		mappings.push(assistant.build_parameter_mapping(config, parameter_type.as_deref(), spec)?);
	}
	assistant.add_parameter_map(config, id, parameter_type, mappings)?;
	Ok(())
}

fn sql_elements(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	root: &Node,
	required: Option<&str>,
) -> Result<()> {
	for node in root.children_named("sql") {
		let id = assistant.qualify_id(node.required_attr("id")?)?;
		let declared = node.attr("database-id");
		let existing = config.sql_fragment(&id).map(|f| f.database_id.as_deref());
		if !database_id_matches(declared, required, existing) {
			continue;
		}
		config.add_sql_fragment(SqlFragment {
			id,
			database_id: declared.map(str::to_string),
			body: node.clone(),
		})?;
	}
	Ok(())
}

fn statement_elements(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	root: &Node,
	required: Option<&str>,
) -> Result<()> {
	for node in root
		.children()
		.iter()
		.filter(|c| STATEMENT_ELEMENTS.contains(&c.name()))
	{
		if let Outcome::Incomplete(missing) = parse_statement(config, assistant, node, required)? {
			let id = assistant.qualify_ref(node.attr_or("id", ""));
			tracing::debug!(%id, waiting_on = %missing, "deferring statement");
			config.pending.statements.push(PendingStatement {
				assistant: assistant.clone(),
				node: node.clone(),
				required_database_id: required.map(str::to_string),
				id,
				blocked_on: missing,
			});
		}
	}
	Ok(())
}

/// Binds the namespace to the mapper type of the same name, if one is known.
fn bind_namespace(config: &mut Configuration, namespace: &str) -> Result<()> {
	let Some(ty) = config.types().resolve(namespace) else {
		return Ok(());
	};
	if ty.kind() != TypeKind::Mapper || config.has_mapper(ty.name()) {
		return Ok(());
	}
	config.add_loaded_resource(&format!("namespace:{}", ty.name()));
	config.add_mapper(ty.name())
}
