//! Type descriptors and alias resolution.
//!
//! Mapping documents name types by alias (`Author`, `int`, `map`) or by full
//! name (`blog.Author`). The [`TypeAliasRegistry`] resolves either form to a
//! [`TypeDescriptor`], which records the writable properties builders use to
//! infer mapping types.

mod handlers;
mod jdbc;

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;

pub use self::handlers::TypeHandlerRegistry;
pub use self::jdbc::{JdbcType, parse_jdbc_type};
use crate::error::{ConfigError, Result};

/// Broad shape of a type, which decides how its properties are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
	/// Single-column value (`int`, `string`, ...).
	Scalar,
	/// Record with named, typed properties.
	Bean,
	/// Ordered collection; `element` names the element type when known.
	Collection,
	/// String-keyed map; every property is writable as `object`.
	Map,
	/// Mapper interface, bound to a namespace.
	Mapper,
	/// Type handler; `element` names the handled type.
	Handler,
	/// Anything else.
	Other,
}

/// Name of the type used when nothing more specific is known.
pub const OBJECT: &str = "object";

/// Describes one type known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
	name: String,
	kind: TypeKind,
	properties: IndexMap<String, String>,
	element: Option<String>,
}

impl TypeDescriptor {
	pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			properties: IndexMap::new(),
			element: None,
		}
	}

	/// Record type with named properties, added through [`Self::with_property`].
	pub fn bean(name: impl Into<String>) -> Self {
		Self::new(name, TypeKind::Bean)
	}

	pub fn mapper(name: impl Into<String>) -> Self {
		Self::new(name, TypeKind::Mapper)
	}

	/// Type handler for values of `handled`.
	pub fn handler(name: impl Into<String>, handled: Option<&str>) -> Self {
		let mut desc = Self::new(name, TypeKind::Handler);
		desc.element = handled.map(str::to_string);
		desc
	}

	pub fn collection(name: impl Into<String>, element: Option<&str>) -> Self {
		let mut desc = Self::new(name, TypeKind::Collection);
		desc.element = element.map(str::to_string);
		desc
	}

	/// Adds a writable property of type `ty`.
	pub fn with_property(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
		self.properties.insert(name.into(), ty.into());
		self
	}

	/// Full type name, e.g. `blog.Author`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Last dotted segment of the name.
	pub fn simple_name(&self) -> &str {
		self.name.rsplit('.').next().unwrap_or(&self.name)
	}

	/// Everything before the last dot, empty for undotted names.
	pub fn package(&self) -> &str {
		self.name.rsplit_once('.').map_or("", |(pkg, _)| pkg)
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	/// Element type for collections, handled type for handlers.
	pub fn element(&self) -> Option<&str> {
		self.element.as_deref()
	}

	/// Declared properties and their type names, in declaration order.
	pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
		self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Type name of the directly writable property `name`.
	pub fn property_type(&self, name: &str) -> Option<&str> {
		match self.kind {
			TypeKind::Map => Some(OBJECT),
			_ => self.properties.get(name).map(String::as_str),
		}
	}
}

/// Alias table and known types.
///
/// Aliases are case-insensitive; full type names are matched exactly.
#[derive(Debug, Clone)]
pub struct TypeAliasRegistry {
	types: HashMap<String, Arc<TypeDescriptor>>,
	aliases: HashMap<String, String>,
}

const SCALARS: &[&str] = &[
	"string",
	"byte",
	"short",
	"int",
	"long",
	"float",
	"double",
	"boolean",
	"char",
	"decimal",
	"biginteger",
	"date",
	"time",
	"timestamp",
	"bytes",
];

const BUILTIN_ALIASES: &[(&str, &str)] = &[
	("integer", "int"),
	("_int", "int"),
	("_integer", "int"),
	("_byte", "byte"),
	("_short", "short"),
	("_long", "long"),
	("_float", "float"),
	("_double", "double"),
	("_boolean", "boolean"),
	("_char", "char"),
	("character", "char"),
	("bigdecimal", "decimal"),
	("hashmap", "map"),
	("arraylist", "list"),
	("resultset", "cursor"),
];

impl Default for TypeAliasRegistry {
	fn default() -> Self {
		let mut registry = Self {
			types: HashMap::default(),
			aliases: HashMap::default(),
		};
		for name in SCALARS {
			registry.register_type(TypeDescriptor::new(*name, TypeKind::Scalar));
		}
		registry.register_type(TypeDescriptor::new(OBJECT, TypeKind::Other));
		registry.register_type(TypeDescriptor::new("cursor", TypeKind::Other));
		registry.register_type(TypeDescriptor::new("map", TypeKind::Map));
		for name in ["list", "collection", "iterator"] {
			registry.register_type(TypeDescriptor::collection(name, None));
		}
		for (alias, target) in BUILTIN_ALIASES {
			registry.aliases.insert((*alias).to_string(), (*target).to_string());
		}
		registry
	}
}

impl TypeAliasRegistry {
	/// Creates a registry holding the built-in scalar and container types.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers or replaces a type under its full name.
	///
	/// Undotted names are also reachable case-insensitively, like aliases.
	pub fn register_type(&mut self, desc: TypeDescriptor) -> Arc<TypeDescriptor> {
		let desc = Arc::new(desc);
		if !desc.name.contains('.') {
			self.aliases
				.insert(desc.name.to_ascii_lowercase(), desc.name.clone());
		}
		self.types.insert(desc.name.clone(), desc.clone());
		desc
	}

	/// Binds `alias` to the type `target` resolves to.
	pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<()> {
		let desc = self.resolve_required(target)?;
		let key = alias.to_ascii_lowercase();
		if let Some(existing) = self.aliases.get(&key)
			&& existing != desc.name()
		{
			return Err(ConfigError::AliasConflict {
				alias: alias.to_string(),
				existing: existing.clone(),
				requested: desc.name().to_string(),
			});
		}
		tracing::trace!(alias, target = desc.name(), "registered type alias");
		self.aliases.insert(key, desc.name().to_string());
		Ok(())
	}

	/// Binds the type's simple name as an alias.
	pub fn register_simple_alias(&mut self, target: &str) -> Result<()> {
		let desc = self.resolve_required(target)?;
		self.register_alias(desc.simple_name(), desc.name())
	}

	/// Binds simple-name aliases for every non-mapper type under `package`.
	///
	/// Returns the number of aliases registered.
	pub fn register_package(&mut self, package: &str) -> Result<usize> {
		let names: Vec<String> = self
			.types_in_package(package)
			.into_iter()
			.filter(|t| t.kind() != TypeKind::Mapper)
			.map(|t| t.name().to_string())
			.collect();
		for name in &names {
			self.register_simple_alias(name)?;
		}
		Ok(names.len())
	}

	/// Looks a type up by alias or full name.
	pub fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
		self.aliases
			.get(&name.to_ascii_lowercase())
			.and_then(|canonical| self.types.get(canonical))
			.or_else(|| self.types.get(name))
			.cloned()
	}

	/// Like [`Self::resolve`], failing for unknown names.
	pub fn resolve_required(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
		self.resolve(name)
			.ok_or_else(|| ConfigError::UnknownType(name.to_string()))
	}

	/// Resolves an optional name.
	pub fn resolve_optional(&self, name: Option<&str>) -> Result<Option<Arc<TypeDescriptor>>> {
		name.map(|n| self.resolve_required(n)).transpose()
	}

	/// Type name of the writable property at the dotted `path` below `ty`.
	pub fn setter_type(&self, ty: &TypeDescriptor, path: &str) -> Option<String> {
		let mut segments = path.split('.');
		let first = segments.next()?;
		let mut current = ty.property_type(first)?.to_string();
		for segment in segments {
			let next = self.resolve(&current)?;
			current = next.property_type(segment)?.to_string();
		}
		Some(current)
	}

	/// Returns true if the dotted `path` is writable on `ty`.
	pub fn has_setter(&self, ty: &TypeDescriptor, path: &str) -> bool {
		self.setter_type(ty, path).is_some()
	}

	/// Every type whose package is `package` or nested below it, sorted by name.
	pub fn types_in_package(&self, package: &str) -> Vec<Arc<TypeDescriptor>> {
		let prefix = format!("{package}.");
		let mut found: Vec<_> = self
			.types
			.values()
			.filter(|t| t.name().starts_with(&prefix))
			.cloned()
			.collect();
		found.sort_by(|a, b| a.name().cmp(b.name()));
		found
	}
}
