//! Namespace-scoped construction of mapping artifacts.
//!
//! [`BuilderAssistant`] turns already-parsed attributes into registered
//! artifacts. It qualifies ids with the current namespace, validates and
//! types result mappings, applies the `extends` merge, and reports
//! [`Outcome::Incomplete`] whenever something it needs is not registered yet.
//! It holds no state beyond the namespace, so pending entries keep a copy and
//! retry with it later.

use std::sync::Arc;

use indexmap::IndexMap;
use mapforge_cache::{CacheBuilder, SharedCache};

use crate::error::{ConfigError, Result};
use crate::mapping::{
	AutoMapping, Discriminator, ParameterMap, ParameterMapping, ParameterMode, ResultMap,
	ResultMapping, ResultMappingSpec, ResultSetType, Statement, StatementKind, StatementType,
};
use crate::outcome::{ArtifactKind, Outcome, Unresolved, resolved};
use crate::registry::{CacheBinding, Configuration, PendingCacheRef, PendingResultMap};
use crate::types::{JdbcType, OBJECT, TypeDescriptor, TypeKind, parse_jdbc_type};

/// Suffix of the result and parameter maps generated for `result-type` and
/// `parameter-type`.
pub const INLINE_SUFFIX: &str = "-Inline";

/// Everything needed to build and register one result map.
#[derive(Debug, Clone)]
pub struct ResultMapRequest {
	/// Qualified id.
	pub id: String,
	/// `None` when no type could be determined.
	pub result_type: Option<Arc<TypeDescriptor>>,
	/// Description of the undetermined type, for diagnostics.
	pub type_hint: String,
	/// Qualified parent id.
	pub extends: Option<String>,
	pub mappings: Vec<ResultMapping>,
	pub discriminator: Option<Discriminator>,
	pub auto_mapping: AutoMapping,
}

/// Unresolved attributes of a parameter mapping.
#[derive(Debug, Clone, Default)]
pub struct ParameterMappingSpec {
	pub property: String,
	pub java_type: Option<String>,
	pub jdbc_type: Option<String>,
	pub result_map: Option<String>,
	pub mode: ParameterMode,
	pub type_handler: Option<String>,
	pub numeric_scale: Option<i32>,
}

/// Parsed attributes of one statement, references not yet resolved.
#[derive(Debug, Clone)]
pub struct StatementRequest {
	/// Unqualified id.
	pub id: String,
	pub database_id: Option<String>,
	pub kind: StatementKind,
	pub statement_type: StatementType,
	pub sql: String,
	pub parameter_map: Option<String>,
	pub parameter_type: Option<Arc<TypeDescriptor>>,
	/// Comma-separated result map references.
	pub result_map: Option<String>,
	pub result_type: Option<Arc<TypeDescriptor>>,
	pub fetch_size: Option<i64>,
	pub timeout: Option<i64>,
	pub flush_cache: bool,
	pub use_cache: bool,
	pub result_ordered: bool,
	pub result_set_type: Option<ResultSetType>,
	pub key_properties: Vec<String>,
	pub key_columns: Vec<String>,
	pub use_generated_keys: bool,
	pub result_sets: Vec<String>,
}

/// Builds artifacts for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderAssistant {
	namespace: String,
	resource: String,
}

impl BuilderAssistant {
	pub fn new(namespace: &str, resource: &str) -> Result<Self> {
		if namespace.trim().is_empty() {
			return Err(ConfigError::EmptyNamespace);
		}
		Ok(Self {
			namespace: namespace.to_string(),
			resource: resource.to_string(),
		})
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Document this namespace was read from.
	pub fn resource(&self) -> &str {
		&self.resource
	}

	/// Qualifies a declared id with the namespace.
	///
	/// Ids already carrying the namespace prefix are kept; any other dotted id
	/// is rejected.
	pub fn qualify_id(&self, id: &str) -> Result<String> {
		if let Some(local) = id.strip_prefix(&self.namespace)
			&& local.starts_with('.')
		{
			return Ok(id.to_string());
		}
		if id.contains('.') {
			return Err(ConfigError::DottedId(id.to_string()));
		}
		Ok(format!("{}.{id}", self.namespace))
	}

	/// Qualifies a reference. Dotted references are taken as already qualified.
	pub fn qualify_ref(&self, reference: &str) -> String {
		qualify_reference(&self.namespace, reference)
	}

	/// Types and validates one result mapping.
	///
	/// Without `java-type` the type is the setter type of the property on
	/// `result_type`, else `object`. Composite columns (`{prop=col,...}`) are
	/// only recognized with a nested select or a foreign column.
	pub fn build_result_mapping(
		&self,
		config: &Configuration,
		result_type: Option<&TypeDescriptor>,
		spec: ResultMappingSpec,
	) -> Result<ResultMapping> {
		let java_type = self.result_java_type(config, result_type, &spec)?;
		let jdbc_type = parse_jdbc_type(spec.jdbc_type.as_deref())?;
		let type_handler = self.resolve_type_handler(config, spec.type_handler.as_deref())?;
		let nested_select = spec.nested_select.as_deref().map(|s| self.qualify_ref(s));
		let nested_result_map = spec.nested_result_map.as_deref().map(|s| self.qualify_ref(s));
		let lazy = match spec.fetch_type.as_deref() {
			Some(fetch) => fetch.eq_ignore_ascii_case("lazy"),
			None => config.settings().lazy_loading_enabled,
		};

		let name = spec
			.property
			.clone()
			.or_else(|| spec.column.clone())
			.unwrap_or_default();
		let composites = if nested_select.is_some() || spec.foreign_column.is_some() {
			parse_composite_columns(&name, spec.column.as_deref())?
		} else {
			Vec::new()
		};
		let column_count = count_columns(spec.column.as_deref());
		let column = if composites.is_empty() { spec.column } else { None };

		let mapping = ResultMapping {
			property: spec.property,
			column,
			java_type,
			jdbc_type,
			type_handler,
			nested_select,
			nested_result_map,
			not_null_columns: parse_column_list(spec.not_null_columns.as_deref()),
			column_prefix: spec.column_prefix,
			flags: spec.flags,
			composites,
			result_set: spec.result_set,
			foreign_column: spec.foreign_column,
			lazy,
		};
		validate_mapping(&mapping, &name, column_count)?;
		Ok(mapping)
	}

	fn result_java_type(
		&self,
		config: &Configuration,
		result_type: Option<&TypeDescriptor>,
		spec: &ResultMappingSpec,
	) -> Result<String> {
		if let Some(java_type) = spec.java_type.as_deref() {
			return Ok(config.types().resolve_required(java_type)?.name().to_string());
		}
		let inferred = match (result_type, spec.property.as_deref()) {
			(Some(ty), Some(property)) => config.types().setter_type(ty, property),
			_ => None,
		};
		Ok(match inferred {
			Some(name) => config
				.types()
				.resolve(&name)
				.map_or(name, |t| t.name().to_string()),
			None => OBJECT.to_string(),
		})
	}

	fn resolve_type_handler(&self, config: &Configuration, handler: Option<&str>) -> Result<Option<String>> {
		let Some(handler) = handler else {
			return Ok(None);
		};
		let desc = config.types().resolve_required(handler)?;
		if desc.kind() != TypeKind::Handler {
			return Err(ConfigError::InvalidMapping {
				property: handler.to_string(),
				reason: "type handler does not name a handler type",
			});
		}
		Ok(Some(desc.name().to_string()))
	}

	/// Builds a discriminator over `spec`'s column. Case targets are qualified.
	pub fn build_discriminator(
		&self,
		config: &Configuration,
		result_type: Option<&TypeDescriptor>,
		spec: ResultMappingSpec,
		cases: IndexMap<String, String>,
	) -> Result<Discriminator> {
		let mapping = self.build_result_mapping(config, result_type, spec)?;
		let cases = cases
			.into_iter()
			.map(|(value, map)| (value, self.qualify_ref(&map)))
			.collect();
		Ok(Discriminator { mapping, cases })
	}

	/// Registers a result map, or parks it until its dependencies exist.
	pub fn add_result_map(
		&self,
		config: &mut Configuration,
		request: ResultMapRequest,
	) -> Result<Outcome<Arc<ResultMap>>> {
		let outcome = resolve_result_map(config, &request)?;
		if let Outcome::Incomplete(missing) = &outcome {
			tracing::debug!(id = %request.id, waiting_on = %missing, "deferring result map");
			config.pending.result_maps.push(PendingResultMap {
				request,
				resource: self.resource.clone(),
				blocked_on: missing.clone(),
			});
		}
		Ok(outcome)
	}

	/// Builds the namespace's cache chain and binds it.
	///
	/// The built cache must report the namespace as its id; caches are looked
	/// up by namespace.
	pub fn use_new_cache(&self, config: &mut Configuration, builder: CacheBuilder) -> Result<SharedCache> {
		let cache = builder.build(config.cache_providers())?;
		if cache.id() != self.namespace {
			return Err(ConfigError::CacheIdMismatch {
				namespace: self.namespace.clone(),
				id: cache.id().to_string(),
			});
		}
		config.add_cache(cache.clone())?;
		config.bind_cache(&self.namespace, CacheBinding::Declared);
		Ok(cache)
	}

	/// Binds the namespace to `target`'s cache, parking the binding when that
	/// cache is not registered yet.
	pub fn use_cache_ref(&self, config: &mut Configuration, target: &str) -> Outcome<()> {
		config.bind_cache(
			&self.namespace,
			CacheBinding::Ref {
				target: target.to_string(),
				resolved: false,
			},
		);
		let outcome = resolve_cache_ref(config, &self.namespace, target);
		if let Outcome::Incomplete(missing) = &outcome {
			tracing::debug!(namespace = %self.namespace, target, "deferring cache reference");
			config.pending.cache_refs.push(PendingCacheRef {
				namespace: self.namespace.clone(),
				target: target.to_string(),
				blocked_on: missing.clone(),
			});
		}
		outcome
	}

	/// Types one legacy parameter mapping.
	pub fn build_parameter_mapping(
		&self,
		config: &Configuration,
		parameter_type: Option<&TypeDescriptor>,
		spec: ParameterMappingSpec,
	) -> Result<ParameterMapping> {
		let jdbc_type = parse_jdbc_type(spec.jdbc_type.as_deref())?;
		let java_type = match spec.java_type.as_deref() {
			Some(name) => config.types().resolve_required(name)?.name().to_string(),
			None if jdbc_type == Some(JdbcType::Cursor) => "cursor".to_string(),
			None => parameter_type
				.and_then(|ty| config.types().setter_type(ty, &spec.property))
				.unwrap_or_else(|| OBJECT.to_string()),
		};
		Ok(ParameterMapping {
			java_type,
			jdbc_type,
			mode: spec.mode,
			result_map: spec.result_map.as_deref().map(|r| self.qualify_ref(r)),
			type_handler: self.resolve_type_handler(config, spec.type_handler.as_deref())?,
			numeric_scale: spec.numeric_scale,
			property: spec.property,
		})
	}

	pub fn add_parameter_map(
		&self,
		config: &mut Configuration,
		id: &str,
		parameter_type: Option<Arc<TypeDescriptor>>,
		mappings: Vec<ParameterMapping>,
	) -> Result<Arc<ParameterMap>> {
		let map = Arc::new(ParameterMap {
			id: self.qualify_id(id)?,
			parameter_type,
			mappings,
		});
		config.add_parameter_map(map.clone())?;
		Ok(map)
	}

	/// Resolves a statement's references and registers it.
	///
	/// Incomplete while the namespace's cache reference, the parameter map or
	/// any result map is missing.
	pub fn add_statement(
		&self,
		config: &mut Configuration,
		request: StatementRequest,
	) -> Result<Outcome<Arc<Statement>>> {
		let cache = resolved!(config.namespace_cache(&self.namespace));
		let id = self.qualify_id(&request.id)?;

		let parameter_map = match (&request.parameter_map, &request.parameter_type) {
			(Some(reference), _) => {
				let qualified = self.qualify_ref(reference);
				match config.parameter_map(&qualified) {
					Some(map) => Some(map.clone()),
					None => return Ok(Outcome::waiting_on(ArtifactKind::ParameterMap, qualified)),
				}
			}
			(None, Some(ty)) => Some(Arc::new(ParameterMap {
				id: format!("{id}{INLINE_SUFFIX}"),
				parameter_type: Some(ty.clone()),
				mappings: Vec::new(),
			})),
			(None, None) => None,
		};

		let mut result_maps = Vec::new();
		if let Some(references) = &request.result_map {
			for reference in references.split(',').map(str::trim).filter(|r| !r.is_empty()) {
				let qualified = self.qualify_ref(reference);
				match config.result_map(&qualified) {
					Some(map) => result_maps.push(map.clone()),
					None => return Ok(Outcome::waiting_on(ArtifactKind::ResultMap, qualified)),
				}
			}
		} else if let Some(ty) = &request.result_type {
			result_maps.push(Arc::new(ResultMap::new(
				format!("{id}{INLINE_SUFFIX}"),
				ty.clone(),
				Vec::new(),
				None,
				None,
				AutoMapping::Inherit,
			)));
		}

		let statement = Arc::new(Statement {
			id,
			database_id: request.database_id,
			kind: request.kind,
			statement_type: request.statement_type,
			sql: request.sql,
			result_maps,
			parameter_map,
			cache,
			fetch_size: request.fetch_size,
			timeout: request.timeout.or(config.settings().default_statement_timeout),
			flush_cache: request.flush_cache,
			use_cache: request.use_cache,
			result_ordered: request.result_ordered,
			result_set_type: request
				.result_set_type
				.or(config.settings().default_result_set_type),
			key_properties: request.key_properties,
			key_columns: request.key_columns,
			use_generated_keys: request.use_generated_keys,
			result_sets: request.result_sets,
			resource: self.resource.clone(),
		});
		config.add_statement(statement.clone())?;
		Ok(Outcome::Resolved(statement))
	}
}

/// Qualifies `reference` within `namespace` unless it is already dotted.
pub(crate) fn qualify_reference(namespace: &str, reference: &str) -> String {
	if reference.contains('.') {
		reference.to_string()
	} else {
		format!("{namespace}.{reference}")
	}
}

/// Attempts to build and register a result map without parking it.
///
/// With `extends`, the parent must be registered. Parent mappings are appended
/// after the local ones, except those with the same target as a local mapping
/// and, when the map declares a constructor, the parent's constructor
/// mappings. The parent's discriminator is inherited when none is declared.
pub(crate) fn resolve_result_map(
	config: &mut Configuration,
	request: &ResultMapRequest,
) -> Result<Outcome<Arc<ResultMap>>> {
	let Some(result_type) = request.result_type.clone() else {
		return Ok(Outcome::waiting_on(ArtifactKind::Type, request.type_hint.clone()));
	};

	let mut mappings = request.mappings.clone();
	let mut discriminator = request.discriminator.clone();
	if let Some(parent_id) = &request.extends {
		let Some(parent) = config.result_map(parent_id) else {
			return Ok(Outcome::waiting_on(ArtifactKind::ResultMap, parent_id.clone()));
		};
		let declares_constructor = mappings.iter().any(|m| m.flags.constructor);
		let inherited: Vec<ResultMapping> = parent
			.mappings()
			.iter()
			.filter(|p| !mappings.iter().any(|local| local.same_target(p)))
			.filter(|p| !(declares_constructor && p.flags.constructor))
			.cloned()
			.collect();
		mappings.extend(inherited);
		if discriminator.is_none() {
			discriminator = parent.discriminator().cloned();
		}
	}

	let map = Arc::new(ResultMap::new(
		request.id.clone(),
		result_type,
		mappings,
		discriminator,
		request.extends.clone(),
		request.auto_mapping,
	));
	config.add_result_map(map.clone())?;
	Ok(Outcome::Resolved(map))
}

/// Marks `namespace`'s cache reference resolved once `target` has a cache.
pub(crate) fn resolve_cache_ref(config: &mut Configuration, namespace: &str, target: &str) -> Outcome<()> {
	if !config.has_cache(target) {
		return Outcome::Incomplete(Unresolved::new(ArtifactKind::Cache, target));
	}
	config.bind_cache(
		namespace,
		CacheBinding::Ref {
			target: target.to_string(),
			resolved: true,
		},
	);
	Outcome::Resolved(())
}

/// `columns` counts the comma-separated entries of the raw `column`
/// attribute, before any composite parsing.
fn validate_mapping(mapping: &ResultMapping, name: &str, columns: usize) -> Result<()> {
	let invalid = |reason| ConfigError::InvalidMapping {
		property: name.to_string(),
		reason,
	};
	if mapping.nested_select.is_some() && mapping.nested_result_map.is_some() {
		return Err(invalid("cannot define both a nested select and a nested result map"));
	}
	if mapping.nested_result_map.is_none() && mapping.column.is_none() && mapping.composites.is_empty() {
		return Err(invalid("mapping is missing a column"));
	}
	if mapping.result_set.is_some() && columns != count_columns(mapping.foreign_column.as_deref()) {
		return Err(invalid("columns and foreign columns must have the same length"));
	}
	Ok(())
}

fn count_columns(list: Option<&str>) -> usize {
	list.map_or(0, |l| l.split(',').filter(|c| !c.trim().is_empty()).count())
}

/// Parses `{prop=col, prop2=col2}` into composite mappings.
///
/// A column without `=` or `,` is a single column and yields nothing.
fn parse_composite_columns(name: &str, column: Option<&str>) -> Result<Vec<ResultMapping>> {
	let Some(column) = column.filter(|c| c.contains('=') || c.contains(',')) else {
		return Ok(Vec::new());
	};
	let tokens: Vec<&str> = column
		.split(['{', '}', '=', ',', ' '])
		.filter(|t| !t.is_empty())
		.collect();
	if tokens.len() % 2 != 0 {
		return Err(ConfigError::InvalidMapping {
			property: name.to_string(),
			reason: "composite column must list property=column pairs",
		});
	}
	Ok(tokens
		.chunks(2)
		.map(|pair| ResultMapping::simple(Some(pair[0]), Some(pair[1]), OBJECT))
		.collect())
}

/// Parses `a,b` or `{a,b}` into column names.
fn parse_column_list(list: Option<&str>) -> Vec<String> {
	list.map(|l| {
		l.split(['{', '}', ','])
			.map(str::trim)
			.filter(|c| !c.is_empty())
			.map(str::to_string)
			.collect()
	})
	.unwrap_or_default()
}
