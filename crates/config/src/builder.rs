//! Top-level configuration documents.
//!
//! [`ConfigBuilder`] reads a `configuration` document, applies its sections
//! in dependency order and loads every mapper document it lists into one
//! [`Configuration`]:
//!
//! ```kdl
//! configuration {
//!     properties resource="db.kdl" { schema "blog" }
//!     settings { cacheEnabled #true }
//!     type-aliases { package name="blog" }
//!     environments default="dev" {
//!         environment id="dev" {
//!             transaction-manager type="JDBC"
//!             data-source type="POOLED" { url "jdbc:h2:mem:${schema}" }
//!         }
//!     }
//!     database-id-provider type="DB_VENDOR" { H2 "h2"; Oracle "oracle" }
//!     mappers { mapper resource="blog/AuthorMapper.kdl" }
//! }
//! ```
//!
//! The document is read twice: once to collect variables from `properties`,
//! then again with those variables substituted everywhere.

use std::sync::Arc;

use indexmap::IndexMap;
use mapforge_cache::CacheProviders;
use mapforge_node::{
	FileLoader, Node, ResourceLoader, Variables, load_url, read_properties, read_root,
};
use rustc_hash::FxHashMap as HashMap;

use crate::environment::{Component, DB_VENDOR, DatabaseIdProvider, Environment, VendorDatabaseIdProvider};
use crate::error::{ConfigError, Result};
use crate::mapper::MapperBuilder;
use crate::registry::Configuration;
use crate::settings::validate_names;
use crate::types::{TypeAliasRegistry, TypeKind, parse_jdbc_type};

/// Sections accepted in a configuration document, in processing order.
const SECTIONS: &[&str] = &[
	"properties",
	"settings",
	"type-aliases",
	"plugins",
	"object-factory",
	"object-wrapper-factory",
	"reflector-factory",
	"environments",
	"database-id-provider",
	"type-handlers",
	"mappers",
];

/// Settings applied before type aliases are registered.
const EARLY_SETTINGS: &[&str] = &["vfsImpl", "logImpl"];

/// Builds a [`Configuration`] from one configuration document.
///
/// A builder parses once; a second [`parse`](Self::parse) fails with
/// [`ConfigError::AlreadyParsed`].
pub struct ConfigBuilder {
	text: String,
	config: Option<Configuration>,
	environment: Option<String>,
	variables: Variables,
	loader: Box<dyn ResourceLoader>,
	providers: HashMap<String, Arc<dyn DatabaseIdProvider>>,
}

impl ConfigBuilder {
	/// Creates a builder for the document `text`.
	///
	/// Resources are loaded relative to the working directory until
	/// [`loader`](Self::loader) replaces the loader.
	pub fn new(text: impl Into<String>) -> Self {
		let mut providers: HashMap<String, Arc<dyn DatabaseIdProvider>> = HashMap::default();
		providers.insert(DB_VENDOR.to_string(), Arc::new(VendorDatabaseIdProvider));
		Self {
			text: text.into(),
			config: Some(Configuration::new()),
			environment: None,
			variables: Variables::new(),
			loader: Box::new(FileLoader::new(".")),
			providers,
		}
	}

	/// Selects the environment, overriding the document's `default`.
	pub fn environment(mut self, id: impl Into<String>) -> Self {
		self.environment = Some(id.into());
		self
	}

	/// Variables that take precedence over the document's `properties`.
	pub fn variables(mut self, variables: Variables) -> Self {
		self.variables = variables;
		self
	}

	pub fn loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
		self.loader = Box::new(loader);
		self
	}

	/// Types the documents may reference.
	pub fn types(mut self, types: TypeAliasRegistry) -> Self {
		if let Some(config) = &mut self.config {
			*config.types_mut() = types;
		}
		self
	}

	/// Base and eviction implementations available to `cache` declarations.
	pub fn cache_providers(mut self, providers: CacheProviders) -> Self {
		if let Some(config) = &mut self.config {
			*config.cache_providers_mut() = providers;
		}
		self
	}

	/// Registers a database id provider under a case-insensitive alias.
	pub fn database_id_provider(mut self, alias: &str, provider: impl DatabaseIdProvider + 'static) -> Self {
		self.providers
			.insert(alias.to_ascii_uppercase(), Arc::new(provider));
		self
	}

	/// Parses the document and every mapper it lists.
	///
	/// Fails if anything is still pending after the final drain; no partial
	/// configuration is returned.
	pub fn parse(&mut self) -> Result<Configuration> {
		let mut config = self.config.take().ok_or(ConfigError::AlreadyParsed)?;

		let root = read_root(&self.text, "configuration", &self.variables)?;
		let variables = self.properties_element(root.child("properties"))?;
		*config.variables_mut() = variables;

		let root = read_root(&self.text, "configuration", config.variables())?;
		self.configure(&mut config, &root)?;

		let summary = config.drain_pending()?;
		config.ensure_resolved()?;
		tracing::debug!(
			environment = ?config.environment().map(|e| &e.id),
			database_id = ?config.database_id(),
			statements = config.statements().count(),
			resolved_late = summary.resolved,
			"configuration loaded"
		);
		Ok(config)
	}

	fn configure(&self, config: &mut Configuration, root: &Node) -> Result<()> {
		if let Some(child) = root
			.children()
			.iter()
			.find(|c| !SECTIONS.contains(&c.name()))
		{
			return Err(ConfigError::UnexpectedElement {
				parent: root.name().to_string(),
				element: child.name().to_string(),
			});
		}

		let settings = root
			.child("settings")
			.map(Node::children_as_properties)
			.unwrap_or_default();
		validate_names(&settings)?;
		for (name, value) in settings.iter().filter(|(n, _)| EARLY_SETTINGS.contains(&n.as_str())) {
			config.settings_mut().set(name, value)?;
		}

		if let Some(node) = root.child("type-aliases") {
			type_aliases_element(config, node)?;
		}
		if let Some(node) = root.child("plugins") {
			for plugin in node.children() {
				let interceptor = plugin.required_attr("interceptor")?;
				config.add_plugin(Component::new(interceptor, plugin.children_as_properties()));
			}
		}
		if let Some(node) = root.child("object-factory") {
			config.set_object_factory(component(node)?);
		}
		if let Some(node) = root.child("object-wrapper-factory") {
			config.set_object_wrapper_factory(component(node)?);
		}
		if let Some(node) = root.child("reflector-factory") {
			config.set_reflector_factory(component(node)?);
		}
		config.settings_mut().apply(&settings)?;

		if let Some(node) = root.child("environments") {
			self.environments_element(config, node)?;
		}
		if let Some(node) = root.child("database-id-provider") {
			self.database_id_element(config, node)?;
		}
		if let Some(node) = root.child("type-handlers") {
			type_handlers_element(config, node)?;
		}
		if let Some(node) = root.child("mappers") {
			self.mappers_element(config, node)?;
		}
		Ok(())
	}

	/// Collects variables: child entries, then the referenced file, then the
	/// caller's variables.
	fn properties_element(&self, node: Option<&Node>) -> Result<Variables> {
		let mut variables = Variables::new();
		if let Some(node) = node {
			variables.extend(node.children_as_properties());
			let text = match (node.attr("resource"), node.attr("url")) {
				(Some(_), Some(_)) => {
					return Err(ConfigError::ExclusiveAttributes {
						element: "properties",
						attributes: "'resource' and 'url'",
					});
				}
				(Some(resource), None) => Some(self.loader.load(resource)?),
				(None, Some(url)) => Some(load_url(url)?),
				(None, None) => None,
			};
			if let Some(text) = text {
				let file = read_properties(&text, &variables)?;
				variables.extend(file);
			}
		}
		variables.extend(self.variables.clone());
		Ok(variables)
	}

	fn environments_element(&self, config: &mut Configuration, node: &Node) -> Result<()> {
		let selected = self
			.environment
			.as_deref()
			.or(node.attr("default"))
			.ok_or(ConfigError::NoEnvironment)?;

		let mut found = None;
		for env in node.children_named("environment") {
			let id = env.attr("id").ok_or(ConfigError::EnvironmentWithoutId)?;
			if id == selected {
				found = Some(env);
				break;
			}
		}
		let env = found.ok_or_else(|| ConfigError::UnknownEnvironment(selected.to_string()))?;

		let part = |element: &'static str| {
			env.child(element).ok_or_else(|| ConfigError::IncompleteEnvironment {
				id: selected.to_string(),
				element,
			})
		};
		let environment = Environment {
			id: selected.to_string(),
			transaction_manager: component(part("transaction-manager")?)?,
			data_source: component(part("data-source")?)?,
		};
		tracing::debug!(environment = %environment.id, "selected environment");
		config.set_environment(environment);
		Ok(())
	}

	fn database_id_element(&self, config: &mut Configuration, node: &Node) -> Result<()> {
		let alias = node.attr_or("type", DB_VENDOR);
		let key = match alias.to_ascii_uppercase() {
			vendor if vendor == "VENDOR" => DB_VENDOR.to_string(),
			other => other,
		};
		let provider = self
			.providers
			.get(&key)
			.ok_or_else(|| ConfigError::UnknownDatabaseIdProvider(alias.to_string()))?;

		let Some(environment) = config.environment() else {
			return Ok(());
		};
		let database_id = provider.database_id(environment, &node.children_as_properties());
		tracing::debug!(?database_id, provider = %key, "detected database id");
		config.set_database_id(database_id);
		Ok(())
	}

	fn mappers_element(&self, config: &mut Configuration, node: &Node) -> Result<()> {
		for child in node.children() {
			match child.name() {
				"package" => {
					let package = child.required_attr("name")?;
					let mappers: Vec<String> = config
						.types()
						.types_in_package(package)
						.iter()
						.filter(|t| t.kind() == TypeKind::Mapper)
						.map(|t| t.name().to_string())
						.collect();
					for name in &mappers {
						self.add_mapper_type(config, name)?;
					}
				}
				"mapper" => match (child.attr("resource"), child.attr("url"), child.attr("class")) {
					(Some(resource), None, None) => {
						let text = self
							.loader
							.load(resource)
							.map_err(|e| ConfigError::from(e).in_mapper(resource))?;
						MapperBuilder::new(config, resource, &text)?.parse()?;
					}
					(None, Some(url), None) => {
						let text = load_url(url).map_err(|e| ConfigError::from(e).in_mapper(url))?;
						MapperBuilder::new(config, url, &text)?.parse()?;
					}
					(None, None, Some(class)) => self.add_mapper_type(config, class)?,
					_ => {
						return Err(ConfigError::ExclusiveAttributes {
							element: "mapper",
							attributes: "'resource', 'url' or 'class'",
						});
					}
				},
				other => {
					return Err(ConfigError::UnexpectedElement {
						parent: node.name().to_string(),
						element: other.to_string(),
					});
				}
			}
		}
		Ok(())
	}

	/// Binds a mapper type and loads its companion document when one exists.
	///
	/// The companion of `blog.AuthorMapper` is `blog/AuthorMapper.kdl`.
	fn add_mapper_type(&self, config: &mut Configuration, name: &str) -> Result<()> {
		let ty = config.types().resolve_required(name)?;
		if ty.kind() != TypeKind::Mapper {
			tracing::debug!(name, "skipping type that is not a mapper");
			return Ok(());
		}
		config.add_mapper(ty.name())?;

		let resource = format!("{}.kdl", ty.name().replace('.', "/"));
		if config.is_resource_loaded(&format!("namespace:{}", ty.name())) || !self.loader.exists(&resource) {
			return Ok(());
		}
		let text = self
			.loader
			.load(&resource)
			.map_err(|e| ConfigError::from(e).in_mapper(&resource))?;
		MapperBuilder::new(config, &resource, &text)?.parse()
	}
}

fn type_aliases_element(config: &mut Configuration, node: &Node) -> Result<()> {
	for child in node.children() {
		match child.name() {
			"package" => {
				let package = child.required_attr("name")?;
				let count = config.types_mut().register_package(package)?;
				tracing::trace!(package, count, "registered package aliases");
			}
			"alias" => {
				let target = child.required_attr("type")?;
				match child.attr("name") {
					Some(alias) => config.types_mut().register_alias(alias, target)?,
					None => config.types_mut().register_simple_alias(target)?,
				}
			}
			other => {
				return Err(ConfigError::UnexpectedElement {
					parent: node.name().to_string(),
					element: other.to_string(),
				});
			}
		}
	}
	Ok(())
}

fn type_handlers_element(config: &mut Configuration, node: &Node) -> Result<()> {
	for child in node.children() {
		match child.name() {
			"package" => {
				let handlers = config.types().types_in_package(child.required_attr("name")?);
				for handler in handlers.iter().filter(|t| t.kind() == TypeKind::Handler) {
					config
						.type_handlers_mut()
						.register(handler.element(), None, handler.name());
				}
			}
			"handler" => {
				let handler = config.types().resolve_required(child.required_attr("handler")?)?;
				let java_type = match child.attr("java-type") {
					Some(name) => Some(config.types().resolve_required(name)?.name().to_string()),
					None => handler.element().map(str::to_string),
				};
				let jdbc_type = parse_jdbc_type(child.attr("jdbc-type"))?;
				config
					.type_handlers_mut()
					.register(java_type.as_deref(), jdbc_type, handler.name());
			}
			other => {
				return Err(ConfigError::UnexpectedElement {
					parent: node.name().to_string(),
					element: other.to_string(),
				});
			}
		}
	}
	Ok(())
}

/// A `type` attribute plus child properties.
fn component(node: &Node) -> Result<Component> {
	let type_name = node.required_attr("type")?;
	let properties: IndexMap<String, String> = node.children_as_properties();
	Ok(Component::new(type_name, properties))
}

#[cfg(test)]
mod tests;
