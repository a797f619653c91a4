use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::types::{JdbcType, TypeDescriptor};

/// Role flags of a result mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MappingFlags {
	/// Part of the row identity.
	pub id: bool,
	/// Constructor argument rather than property.
	pub constructor: bool,
}

impl MappingFlags {
	pub const ID: Self = Self {
		id: true,
		constructor: false,
	};
	pub const CONSTRUCTOR: Self = Self {
		id: false,
		constructor: true,
	};
	pub const CONSTRUCTOR_ID: Self = Self {
		id: true,
		constructor: true,
	};
}

/// One column to property binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMapping {
	/// Property name, or argument name for constructor mappings.
	pub property: Option<String>,
	/// Source column. `None` for composite and purely nested mappings.
	pub column: Option<String>,
	/// Resolved value type name.
	pub java_type: String,
	pub jdbc_type: Option<JdbcType>,
	pub type_handler: Option<String>,
	/// Qualified id of the statement loading this property.
	pub nested_select: Option<String>,
	/// Qualified id of the result map building this property.
	pub nested_result_map: Option<String>,
	/// Columns that must be non-null for the nested object to be created.
	pub not_null_columns: Vec<String>,
	pub column_prefix: Option<String>,
	pub flags: MappingFlags,
	/// `property=column` pairs passed to a nested select.
	pub composites: Vec<ResultMapping>,
	pub result_set: Option<String>,
	pub foreign_column: Option<String>,
	pub lazy: bool,
}

impl ResultMapping {
	/// Plain mapping of `column` to `property` with the given type.
	pub fn simple(property: Option<&str>, column: Option<&str>, java_type: &str) -> Self {
		Self {
			property: property.map(str::to_string),
			column: column.map(str::to_string),
			java_type: java_type.to_string(),
			jdbc_type: None,
			type_handler: None,
			nested_select: None,
			nested_result_map: None,
			not_null_columns: Vec::new(),
			column_prefix: None,
			flags: MappingFlags::default(),
			composites: Vec::new(),
			result_set: None,
			foreign_column: None,
			lazy: false,
		}
	}

	pub fn is_composite(&self) -> bool {
		!self.composites.is_empty()
	}

	/// Returns true if both mappings bind the same property from the same column.
	///
	/// A local mapping replaces an inherited one with the same target.
	pub fn same_target(&self, other: &ResultMapping) -> bool {
		self.property == other.property && self.column == other.column
	}

	/// Name used in diagnostics: the property, else the column.
	pub fn display_name(&self) -> &str {
		self.property
			.as_deref()
			.or(self.column.as_deref())
			.unwrap_or("<anonymous>")
	}
}

/// Unvalidated mapping attributes as written in a document.
///
/// References are not yet namespace-qualified and types are not yet resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMappingSpec {
	pub property: Option<String>,
	pub column: Option<String>,
	pub java_type: Option<String>,
	pub jdbc_type: Option<String>,
	pub nested_select: Option<String>,
	pub nested_result_map: Option<String>,
	pub not_null_columns: Option<String>,
	pub column_prefix: Option<String>,
	pub type_handler: Option<String>,
	pub flags: MappingFlags,
	pub result_set: Option<String>,
	pub foreign_column: Option<String>,
	/// `lazy` or `eager`; falls back to the global lazy-loading setting.
	pub fetch_type: Option<String>,
}

/// Per-map override of the global auto-mapping behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoMapping {
	#[default]
	Inherit,
	On,
	Off,
}

impl From<Option<bool>> for AutoMapping {
	fn from(flag: Option<bool>) -> Self {
		match flag {
			None => Self::Inherit,
			Some(true) => Self::On,
			Some(false) => Self::Off,
		}
	}
}

/// Chooses a result map by the value of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
	/// Column read to pick a case.
	pub mapping: ResultMapping,
	/// Column value to qualified result map id, in declaration order.
	pub cases: IndexMap<String, String>,
}

impl Discriminator {
	/// Result map id for a discriminator value.
	pub fn map_id_for(&self, value: &str) -> Option<&str> {
		self.cases.get(value).map(String::as_str)
	}
}

/// A registered result map with its derived views.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMap {
	id: String,
	result_type: Arc<TypeDescriptor>,
	mappings: Vec<ResultMapping>,
	id_mappings: Vec<ResultMapping>,
	constructor_mappings: Vec<ResultMapping>,
	property_mappings: Vec<ResultMapping>,
	mapped_columns: IndexSet<String>,
	mapped_properties: IndexSet<String>,
	discriminator: Option<Discriminator>,
	extends: Option<String>,
	auto_mapping: AutoMapping,
	has_nested_result_maps: bool,
	has_nested_queries: bool,
}

impl ResultMap {
	/// Builds a map and computes its views from `mappings`.
	pub fn new(
		id: String,
		result_type: Arc<TypeDescriptor>,
		mappings: Vec<ResultMapping>,
		discriminator: Option<Discriminator>,
		extends: Option<String>,
		auto_mapping: AutoMapping,
	) -> Self {
		let mut id_mappings = Vec::new();
		let mut constructor_mappings = Vec::new();
		let mut property_mappings = Vec::new();
		let mut mapped_columns = IndexSet::new();
		let mut mapped_properties = IndexSet::new();
		let mut has_nested_result_maps = false;
		let mut has_nested_queries = false;

		for mapping in &mappings {
			has_nested_queries |= mapping.nested_select.is_some();
			has_nested_result_maps |=
				mapping.nested_result_map.is_some() && mapping.result_set.is_none();

			if let Some(column) = &mapping.column {
				mapped_columns.insert(column.to_uppercase());
			} else {
				mapped_columns.extend(
					mapping
						.composites
						.iter()
						.filter_map(|c| c.column.as_ref())
						.map(|c| c.to_uppercase()),
				);
			}
			if let Some(property) = &mapping.property {
				mapped_properties.insert(property.clone());
			}

			if mapping.flags.constructor {
				constructor_mappings.push(mapping.clone());
			} else {
				property_mappings.push(mapping.clone());
			}
			if mapping.flags.id {
				id_mappings.push(mapping.clone());
			}
		}
		if id_mappings.is_empty() {
			id_mappings = mappings.clone();
		}

		Self {
			id,
			result_type,
			mappings,
			id_mappings,
			constructor_mappings,
			property_mappings,
			mapped_columns,
			mapped_properties,
			discriminator,
			extends,
			auto_mapping,
			has_nested_result_maps,
			has_nested_queries,
		}
	}

	/// Qualified id.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn result_type(&self) -> &Arc<TypeDescriptor> {
		&self.result_type
	}

	/// All mappings: local ones first, inherited ones after.
	pub fn mappings(&self) -> &[ResultMapping] {
		&self.mappings
	}

	/// Id-flagged mappings, or every mapping when none is flagged.
	pub fn id_mappings(&self) -> &[ResultMapping] {
		&self.id_mappings
	}

	pub fn constructor_mappings(&self) -> &[ResultMapping] {
		&self.constructor_mappings
	}

	/// Mappings that are not constructor arguments.
	pub fn property_mappings(&self) -> &[ResultMapping] {
		&self.property_mappings
	}

	/// Upper-cased columns this map reads.
	pub fn mapped_columns(&self) -> &IndexSet<String> {
		&self.mapped_columns
	}

	pub fn mapped_properties(&self) -> &IndexSet<String> {
		&self.mapped_properties
	}

	pub fn discriminator(&self) -> Option<&Discriminator> {
		self.discriminator.as_ref()
	}

	/// Qualified id of the parent map.
	pub fn extends(&self) -> Option<&str> {
		self.extends.as_deref()
	}

	pub fn auto_mapping(&self) -> AutoMapping {
		self.auto_mapping
	}

	pub fn has_nested_result_maps(&self) -> bool {
		self.has_nested_result_maps
	}

	pub fn has_nested_queries(&self) -> bool {
		self.has_nested_queries
	}

	/// Finds the mapping for a property.
	pub fn mapping_for(&self, property: &str) -> Option<&ResultMapping> {
		self.mappings
			.iter()
			.find(|m| m.property.as_deref() == Some(property))
	}
}
