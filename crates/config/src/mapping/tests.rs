use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use super::*;
use crate::types::TypeDescriptor;

fn author() -> Arc<TypeDescriptor> {
	Arc::new(TypeDescriptor::bean("blog.Author"))
}

#[test]
fn views_split_constructor_and_property_mappings() {
	let mut ctor_id = ResultMapping::simple(Some("id"), Some("id"), "int");
	ctor_id.flags = MappingFlags::CONSTRUCTOR_ID;
	let name = ResultMapping::simple(Some("name"), Some("author_name"), "string");
	let mut posts = ResultMapping::simple(Some("posts"), None, "list");
	posts.nested_result_map = Some("blog.posts".into());

	let map = ResultMap::new(
		"blog.author".into(),
		author(),
		vec![ctor_id, name, posts],
		None,
		None,
		AutoMapping::Inherit,
	);

	assert_eq!(map.constructor_mappings().len(), 1);
	assert_eq!(map.property_mappings().len(), 2);
	assert_eq!(map.id_mappings().len(), 1);
	assert_eq!(
		map.mapped_columns().iter().cloned().collect::<Vec<_>>(),
		vec!["ID", "AUTHOR_NAME"]
	);
	assert!(map.mapped_properties().contains("posts"));
	assert!(map.has_nested_result_maps());
	assert!(!map.has_nested_queries());
	assert_eq!(map.mapping_for("name").unwrap().column.as_deref(), Some("author_name"));
}

#[test]
fn all_mappings_are_ids_when_none_is_flagged() {
	let map = ResultMap::new(
		"blog.plain".into(),
		author(),
		vec![
			ResultMapping::simple(Some("a"), Some("a"), "string"),
			ResultMapping::simple(Some("b"), Some("b"), "string"),
		],
		None,
		None,
		AutoMapping::Off,
	);
	assert_eq!(map.id_mappings().len(), 2);
	assert_eq!(map.auto_mapping(), AutoMapping::Off);
}

#[test]
fn composite_columns_count_as_mapped() {
	let mut lazy = ResultMapping::simple(Some("posts"), None, "list");
	lazy.nested_select = Some("blog.selectPosts".into());
	lazy.composites = vec![
		ResultMapping::simple(Some("authorId"), Some("id"), "object"),
		ResultMapping::simple(Some("lang"), Some("lang"), "object"),
	];
	let map = ResultMap::new("blog.a".into(), author(), vec![lazy], None, None, AutoMapping::Inherit);

	assert!(map.has_nested_queries());
	assert!(map.mapped_columns().contains("LANG"));
	assert!(map.mappings()[0].is_composite());
}

#[test]
fn discriminator_cases() {
	let mut cases = IndexMap::new();
	cases.insert("A".to_string(), "blog.admin".to_string());
	let discriminator = Discriminator {
		mapping: ResultMapping::simple(None, Some("kind"), "string"),
		cases,
	};
	assert_eq!(discriminator.map_id_for("A"), Some("blog.admin"));
	assert_eq!(discriminator.map_id_for("B"), None);
}

#[test]
fn mapping_identity_uses_property_and_column() {
	let a = ResultMapping::simple(Some("name"), Some("name"), "string");
	let mut b = a.clone();
	b.java_type = "object".into();
	assert!(a.same_target(&b));
	b.column = Some("full_name".into());
	assert!(!a.same_target(&b));
}

#[test]
fn enums_parse_document_spellings() {
	assert_eq!("select".parse::<StatementKind>().unwrap(), StatementKind::Select);
	assert_eq!("CALLABLE".parse::<StatementType>().unwrap(), StatementType::Callable);
	assert_eq!(
		"FORWARD_ONLY".parse::<ResultSetType>().unwrap(),
		ResultSetType::ForwardOnly
	);
	assert_eq!("INOUT".parse::<ParameterMode>().unwrap(), ParameterMode::Inout);
	assert_eq!(AutoMapping::from(Some(true)), AutoMapping::On);
}
