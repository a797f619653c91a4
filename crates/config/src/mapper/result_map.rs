//! `result-map` elements and their nested anonymous maps.

use std::sync::Arc;

use indexmap::IndexMap;
use mapforge_node::Node;

use crate::assistant::{BuilderAssistant, ResultMapRequest};
use crate::error::{ConfigError, Result};
use crate::mapping::{AutoMapping, Discriminator, MappingFlags, ResultMapping, ResultMappingSpec};
use crate::registry::Configuration;
use crate::types::{TypeDescriptor, TypeKind};

/// Attributes naming a result map's type, in lookup order.
const TYPE_ATTRIBUTES: &[&str] = &["type", "of-type", "result-type", "java-type"];

/// Parses a result map and hands it to the assistant, returning its qualified id.
///
/// `enclosing` is the type of the map this one is nested in; `inherited` holds
/// mappings a discriminator case receives from its enclosing map. Nested
/// association, collection and case elements without `select` or `result-map`
/// are parsed recursively into maps of their own.
pub(super) fn parse_result_map(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	node: &Node,
	enclosing: Option<&Arc<TypeDescriptor>>,
	inherited: Vec<ResultMapping>,
) -> Result<String> {
	let result_type = match TYPE_ATTRIBUTES.iter().find_map(|a| node.attr(a)) {
		Some(name) => Some(config.types().resolve_required(name)?),
		None => inherit_enclosing_type(config, node, enclosing),
	};

	let mut mappings = inherited;
	let mut discriminator = None;
	for child in node.children() {
		match child.name() {
			"constructor" => {
				for arg in child.children() {
					let flags = match arg.name() {
						"arg" => MappingFlags::CONSTRUCTOR,
						"id-arg" => MappingFlags::CONSTRUCTOR_ID,
						other => return Err(unexpected(child, other)),
					};
					mappings.push(build_mapping(config, assistant, arg, result_type.as_ref(), flags)?);
				}
			}
			"discriminator" => {
				discriminator = Some(parse_discriminator(
					config,
					assistant,
					child,
					result_type.as_ref(),
					&mappings,
				)?);
			}
			"id" => mappings.push(build_mapping(
				config,
				assistant,
				child,
				result_type.as_ref(),
				MappingFlags::ID,
			)?),
			"result" | "association" | "collection" => mappings.push(build_mapping(
				config,
				assistant,
				child,
				result_type.as_ref(),
				MappingFlags::default(),
			)?),
			other => return Err(unexpected(node, other)),
		}
	}

	let id = assistant.qualify_id(node.attr("id").unwrap_or(node.value_based_identifier()))?;
	let request = ResultMapRequest {
		id: id.clone(),
		result_type,
		type_hint: node.value_based_identifier().to_string(),
		extends: node.attr("extends").map(|p| assistant.qualify_ref(p)),
		mappings,
		discriminator,
		auto_mapping: AutoMapping::from(node.bool_attr("auto-mapping")?),
	};
	let _ = assistant.add_result_map(config, request)?;
	Ok(id)
}

/// Type of a nested map that declares none.
///
/// An association takes its property's type and a collection its property's
/// element type; a case takes the type of its enclosing map.
fn inherit_enclosing_type(
	config: &Configuration,
	node: &Node,
	enclosing: Option<&Arc<TypeDescriptor>>,
) -> Option<Arc<TypeDescriptor>> {
	let enclosing = enclosing?;
	match node.name() {
		"case" => Some(enclosing.clone()),
		"association" => {
			let property = node.attr("property")?;
			let name = config.types().setter_type(enclosing, property)?;
			config.types().resolve(&name)
		}
		"collection" => {
			let property = node.attr("property")?;
			let name = config.types().setter_type(enclosing, property)?;
			let collection = config.types().resolve(&name)?;
			match (collection.kind(), collection.element()) {
				(TypeKind::Collection, Some(element)) => config.types().resolve(element),
				_ => None,
			}
		}
		_ => None,
	}
}

fn build_mapping(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	node: &Node,
	result_type: Option<&Arc<TypeDescriptor>>,
	flags: MappingFlags,
) -> Result<ResultMapping> {
	let nested_result_map = match node.attr("result-map") {
		Some(reference) => Some(reference.to_string()),
		None => nested_result_map(config, assistant, node, result_type)?,
	};
	let property = if flags.constructor {
		node.attr("name")
	} else {
		node.attr("property")
	};
	let text = |name: &str| node.attr(name).map(str::to_string);
	let spec = ResultMappingSpec {
		property: property.map(str::to_string),
		column: text("column"),
		java_type: text("java-type"),
		jdbc_type: text("jdbc-type"),
		nested_select: text("select"),
		nested_result_map,
		not_null_columns: text("not-null-column"),
		column_prefix: text("column-prefix"),
		type_handler: text("type-handler"),
		flags,
		result_set: text("result-set"),
		foreign_column: text("foreign-column"),
		fetch_type: text("fetch-type"),
	};
	assistant.build_result_mapping(config, result_type.map(Arc::as_ref), spec)
}

/// Parses an anonymous nested map for association, collection and case
/// elements that neither load through a `select` nor reference a map.
fn nested_result_map(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	node: &Node,
	enclosing: Option<&Arc<TypeDescriptor>>,
) -> Result<Option<String>> {
	if !matches!(node.name(), "association" | "collection" | "case") || node.has_attr("select") {
		return Ok(None);
	}
	validate_collection(config, node, enclosing)?;
	parse_result_map(config, assistant, node, enclosing, Vec::new()).map(Some)
}

/// A collection without a declared type must name a settable property.
fn validate_collection(
	config: &Configuration,
	node: &Node,
	enclosing: Option<&Arc<TypeDescriptor>>,
) -> Result<()> {
	if node.name() != "collection" || node.has_attr("java-type") || node.has_attr("of-type") {
		return Ok(());
	}
	let Some(enclosing) = enclosing else {
		return Ok(());
	};
	let property = node.attr("property").unwrap_or_default();
	if !config.types().has_setter(enclosing, property) {
		return Err(ConfigError::AmbiguousCollection(property.to_string()));
	}
	Ok(())
}

fn parse_discriminator(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	node: &Node,
	result_type: Option<&Arc<TypeDescriptor>>,
	accumulated: &[ResultMapping],
) -> Result<Discriminator> {
	let mut cases = IndexMap::new();
	for case in node.children() {
		if case.name() != "case" {
			return Err(unexpected(node, case.name()));
		}
		let value = case.required_attr("value")?;
		let target = match case.attr("result-map") {
			Some(reference) => reference.to_string(),
			None => parse_result_map(config, assistant, case, result_type, accumulated.to_vec())?,
		};
		cases.insert(value.to_string(), target);
	}

	let text = |name: &str| node.attr(name).map(str::to_string);
	let spec = ResultMappingSpec {
		column: text("column"),
		java_type: text("java-type"),
		jdbc_type: text("jdbc-type"),
		type_handler: text("type-handler"),
		..ResultMappingSpec::default()
	};
	assistant.build_discriminator(config, result_type.map(Arc::as_ref), spec, cases)
}

fn unexpected(parent: &Node, element: &str) -> ConfigError {
	ConfigError::UnexpectedElement {
		parent: parent.name().to_string(),
		element: element.to_string(),
	}
}
