//! The mapping registry.
//!
//! [`Configuration`] owns every artifact produced by a load: result maps,
//! parameter maps, caches and their namespace bindings, sql fragments and
//! statements, plus the three pending queues the deferred-resolution engine
//! retries. It is passed by `&mut` through the whole load and handed to the
//! caller only when nothing is left pending.

mod pending;

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use mapforge_cache::{CacheProviders, SharedCache};
use mapforge_node::Variables;

pub use self::pending::DrainSummary;
pub(crate) use self::pending::{PendingCacheRef, PendingQueues, PendingResultMap, PendingStatement};
use crate::environment::{Component, Environment};
use crate::error::{ConfigError, Result};
use crate::mapping::{ParameterMap, ResultMap, SqlFragment, Statement};
use crate::outcome::{ArtifactKind, Outcome};
use crate::settings::Settings;
use crate::types::{TypeAliasRegistry, TypeHandlerRegistry};

/// How a namespace obtains its cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBinding {
	/// The namespace declares its own cache.
	Declared,
	/// The namespace shares another namespace's cache.
	Ref {
		target: String,
		/// Set once the target's cache is registered.
		resolved: bool,
	},
}

/// Resolved configuration and mapping registry.
pub struct Configuration {
	variables: Variables,
	settings: Settings,
	types: TypeAliasRegistry,
	type_handlers: TypeHandlerRegistry,
	cache_providers: CacheProviders,
	plugins: Vec<Component>,
	object_factory: Option<Component>,
	object_wrapper_factory: Option<Component>,
	reflector_factory: Option<Component>,
	environment: Option<Environment>,
	database_id: Option<String>,

	result_maps: IndexMap<String, Arc<ResultMap>>,
	parameter_maps: IndexMap<String, Arc<ParameterMap>>,
	caches: IndexMap<String, SharedCache>,
	cache_bindings: IndexMap<String, CacheBinding>,
	sql_fragments: IndexMap<String, SqlFragment>,
	statements: IndexMap<String, Arc<Statement>>,
	loaded_resources: IndexSet<String>,
	mappers: IndexSet<String>,

	pub(crate) pending: PendingQueues,
}

impl Default for Configuration {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Configuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Configuration")
			.field("environment", &self.environment.as_ref().map(|e| &e.id))
			.field("database_id", &self.database_id)
			.field("result_maps", &self.result_maps.keys().collect::<Vec<_>>())
			.field("caches", &self.caches.keys().collect::<Vec<_>>())
			.field("statements", &self.statements.keys().collect::<Vec<_>>())
			.field("pending", &self.pending.len())
			.finish_non_exhaustive()
	}
}

impl Configuration {
	/// Creates an empty registry with default settings and built-in types.
	pub fn new() -> Self {
		Self {
			variables: Variables::new(),
			settings: Settings::default(),
			types: TypeAliasRegistry::new(),
			type_handlers: TypeHandlerRegistry::new(),
			cache_providers: CacheProviders::new(),
			plugins: Vec::new(),
			object_factory: None,
			object_wrapper_factory: None,
			reflector_factory: None,
			environment: None,
			database_id: None,
			result_maps: IndexMap::new(),
			parameter_maps: IndexMap::new(),
			caches: IndexMap::new(),
			cache_bindings: IndexMap::new(),
			sql_fragments: IndexMap::new(),
			statements: IndexMap::new(),
			loaded_resources: IndexSet::new(),
			mappers: IndexSet::new(),
			pending: PendingQueues::default(),
		}
	}

	/// Creates an empty registry that resolves types through `types`.
	pub fn with_types(types: TypeAliasRegistry) -> Self {
		Self {
			types,
			..Self::new()
		}
	}

	pub fn variables(&self) -> &Variables {
		&self.variables
	}

	pub fn variables_mut(&mut self) -> &mut Variables {
		&mut self.variables
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn settings_mut(&mut self) -> &mut Settings {
		&mut self.settings
	}

	pub fn types(&self) -> &TypeAliasRegistry {
		&self.types
	}

	pub fn types_mut(&mut self) -> &mut TypeAliasRegistry {
		&mut self.types
	}

	pub fn type_handlers(&self) -> &TypeHandlerRegistry {
		&self.type_handlers
	}

	pub fn type_handlers_mut(&mut self) -> &mut TypeHandlerRegistry {
		&mut self.type_handlers
	}

	/// Base and eviction implementations available to `cache` declarations.
	pub fn cache_providers(&self) -> &CacheProviders {
		&self.cache_providers
	}

	pub fn cache_providers_mut(&mut self) -> &mut CacheProviders {
		&mut self.cache_providers
	}

	/// Declared interceptors, in declaration order.
	pub fn plugins(&self) -> &[Component] {
		&self.plugins
	}

	pub(crate) fn add_plugin(&mut self, plugin: Component) {
		self.plugins.push(plugin);
	}

	pub fn object_factory(&self) -> Option<&Component> {
		self.object_factory.as_ref()
	}

	pub(crate) fn set_object_factory(&mut self, factory: Component) {
		self.object_factory = Some(factory);
	}

	pub fn object_wrapper_factory(&self) -> Option<&Component> {
		self.object_wrapper_factory.as_ref()
	}

	pub(crate) fn set_object_wrapper_factory(&mut self, factory: Component) {
		self.object_wrapper_factory = Some(factory);
	}

	pub fn reflector_factory(&self) -> Option<&Component> {
		self.reflector_factory.as_ref()
	}

	pub(crate) fn set_reflector_factory(&mut self, factory: Component) {
		self.reflector_factory = Some(factory);
	}

	pub fn environment(&self) -> Option<&Environment> {
		self.environment.as_ref()
	}

	pub(crate) fn set_environment(&mut self, environment: Environment) {
		self.environment = Some(environment);
	}

	/// Database variant statements and fragments are selected for.
	pub fn database_id(&self) -> Option<&str> {
		self.database_id.as_deref()
	}

	pub fn set_database_id(&mut self, database_id: Option<String>) {
		self.database_id = database_id;
	}

	pub fn result_map(&self, id: &str) -> Option<&Arc<ResultMap>> {
		self.result_maps.get(id)
	}

	pub fn has_result_map(&self, id: &str) -> bool {
		self.result_maps.contains_key(id)
	}

	/// Result maps in registration order.
	pub fn result_maps(&self) -> impl Iterator<Item = &Arc<ResultMap>> {
		self.result_maps.values()
	}

	pub(crate) fn add_result_map(&mut self, map: Arc<ResultMap>) -> Result<()> {
		if self.result_maps.contains_key(map.id()) {
			return Err(duplicate(ArtifactKind::ResultMap, map.id()));
		}
		tracing::trace!(id = map.id(), "registered result map");
		self.result_maps.insert(map.id().to_string(), map);
		Ok(())
	}

	pub fn parameter_map(&self, id: &str) -> Option<&Arc<ParameterMap>> {
		self.parameter_maps.get(id)
	}

	pub fn parameter_maps(&self) -> impl Iterator<Item = &Arc<ParameterMap>> {
		self.parameter_maps.values()
	}

	pub(crate) fn add_parameter_map(&mut self, map: Arc<ParameterMap>) -> Result<()> {
		if self.parameter_maps.contains_key(&map.id) {
			return Err(duplicate(ArtifactKind::ParameterMap, &map.id));
		}
		self.parameter_maps.insert(map.id.clone(), map);
		Ok(())
	}

	/// Cache declared by `namespace` itself.
	pub fn cache(&self, namespace: &str) -> Option<&SharedCache> {
		self.caches.get(namespace)
	}

	pub fn has_cache(&self, namespace: &str) -> bool {
		self.caches.contains_key(namespace)
	}

	/// Declared caches in registration order.
	pub fn caches(&self) -> impl Iterator<Item = &SharedCache> {
		self.caches.values()
	}

	pub(crate) fn add_cache(&mut self, cache: SharedCache) -> Result<()> {
		if self.caches.contains_key(cache.id()) {
			return Err(duplicate(ArtifactKind::Cache, cache.id()));
		}
		self.caches.insert(cache.id().to_string(), cache);
		Ok(())
	}

	pub fn cache_binding(&self, namespace: &str) -> Option<&CacheBinding> {
		self.cache_bindings.get(namespace)
	}

	pub(crate) fn bind_cache(&mut self, namespace: &str, binding: CacheBinding) {
		self.cache_bindings.insert(namespace.to_string(), binding);
	}

	/// Cache statements of `namespace` use, following a cache reference.
	///
	/// Incomplete while the namespace references a cache that is not
	/// registered yet.
	pub fn namespace_cache(&self, namespace: &str) -> Outcome<Option<SharedCache>> {
		match self.cache_bindings.get(namespace) {
			None => Outcome::Resolved(None),
			Some(CacheBinding::Declared) => Outcome::Resolved(self.caches.get(namespace).cloned()),
			Some(CacheBinding::Ref { target, resolved }) => {
				if *resolved {
					Outcome::Resolved(self.caches.get(target).cloned())
				} else {
					Outcome::waiting_on(ArtifactKind::Cache, target.clone())
				}
			}
		}
	}

	pub fn sql_fragment(&self, id: &str) -> Option<&SqlFragment> {
		self.sql_fragments.get(id)
	}

	pub fn sql_fragments(&self) -> impl Iterator<Item = &SqlFragment> {
		self.sql_fragments.values()
	}

	pub(crate) fn add_sql_fragment(&mut self, fragment: SqlFragment) -> Result<()> {
		if self.sql_fragments.contains_key(&fragment.id) {
			return Err(duplicate(ArtifactKind::SqlFragment, &fragment.id));
		}
		self.sql_fragments.insert(fragment.id.clone(), fragment);
		Ok(())
	}

	pub fn statement(&self, id: &str) -> Option<&Arc<Statement>> {
		self.statements.get(id)
	}

	pub fn has_statement(&self, id: &str) -> bool {
		self.statements.contains_key(id)
	}

	/// Statements in registration order.
	pub fn statements(&self) -> impl Iterator<Item = &Arc<Statement>> {
		self.statements.values()
	}

	/// Registers a statement.
	///
	/// A statement qualified with the current database id replaces an
	/// unqualified one registered earlier under the same id; any other clash
	/// is a duplicate.
	pub(crate) fn add_statement(&mut self, statement: Arc<Statement>) -> Result<()> {
		if let Some(existing) = self.statements.get(&statement.id) {
			let replaces_generic = existing.database_id.is_none()
				&& statement.database_id.is_some()
				&& statement.database_id == self.database_id;
			if !replaces_generic {
				return Err(duplicate(ArtifactKind::Statement, &statement.id));
			}
			tracing::debug!(
				id = %statement.id,
				database_id = ?statement.database_id,
				"replacing unqualified statement with database-specific one"
			);
		}
		tracing::trace!(id = %statement.id, "registered statement");
		self.statements.insert(statement.id.clone(), statement);
		Ok(())
	}

	/// Returns true if the document at `resource` has been parsed.
	pub fn is_resource_loaded(&self, resource: &str) -> bool {
		self.loaded_resources.contains(resource)
	}

	pub(crate) fn add_loaded_resource(&mut self, resource: &str) {
		self.loaded_resources.insert(resource.to_string());
	}

	/// Mapper types bound to a namespace.
	pub fn mappers(&self) -> impl Iterator<Item = &str> {
		self.mappers.iter().map(String::as_str)
	}

	pub fn has_mapper(&self, type_name: &str) -> bool {
		self.mappers.contains(type_name)
	}

	pub(crate) fn add_mapper(&mut self, type_name: &str) -> Result<()> {
		if !self.mappers.insert(type_name.to_string()) {
			return Err(duplicate(ArtifactKind::Mapper, type_name));
		}
		Ok(())
	}

	/// Number of entries waiting in the pending queues.
	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}
}

fn duplicate(kind: ArtifactKind, id: &str) -> ConfigError {
	ConfigError::Duplicate {
		kind,
		id: id.to_string(),
	}
}
