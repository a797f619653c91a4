//! End-to-end loads through [`ConfigBuilder`], with mapper documents that
//! reference each other regardless of the order they are listed in.

use std::fs;
use std::sync::Arc;

use mapforge_config::types::{TypeAliasRegistry, TypeDescriptor};
use mapforge_config::{ArtifactKind, ConfigBuilder, ConfigError, Configuration};
use mapforge_node::{FileLoader, MemoryLoader};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn types() -> TypeAliasRegistry {
	let mut types = TypeAliasRegistry::new();
	types.register_type(
		TypeDescriptor::bean("blog.Author")
			.with_property("id", "int")
			.with_property("name", "string")
			.with_property("bio", "string"),
	);
	types.register_type(
		TypeDescriptor::bean("blog.Post")
			.with_property("id", "int")
			.with_property("author", "blog.Author"),
	);
	types.register_type(TypeDescriptor::mapper("blog.AuthorMapper"));
	types.register_type(TypeDescriptor::mapper("blog.PostMapper"));
	types
}

const POSTS: &str = r#"
mapper namespace="blog.PostMapper" {
    cache-ref namespace="blog.AuthorMapper"
    result-map id="post" type="blog.Post" {
        id property="id" column="post_id"
        association property="author" result-map="blog.AuthorMapper.detailed"
    }
    select id="recent" result-map="post" "select * from post p join author a on a.id = p.author_id" {
        include refid="blog.AuthorMapper.order"
    }
}
"#;

const AUTHORS: &str = r#"
mapper namespace="blog.AuthorMapper" {
    cache size=64
    sql id="order" "order by a.name"
    result-map id="detailed" type="blog.Author" extends="base" {
        result property="bio" column="bio"
    }
    result-map id="base" type="blog.Author" {
        id property="id" column="id"
        result property="name" column="name"
    }
    select id="find" result-map="detailed" "select * from author a where a.id = #{id}"
    select id="find" database-id="oracle" result-map="detailed" "select * from author a where a.id = #{id} and rownum = 1"
}
"#;

fn configuration(order: &[&str], environment: &str) -> String {
	let mappers: String = order
		.iter()
		.map(|resource| format!("        mapper resource=\"{resource}\"\n"))
		.collect();
	format!(
		r#"
configuration {{
    {environment}
    mappers {{
{mappers}    }}
}}
"#
	)
}

const ORACLE: &str = r#"environments default="prod" {
        environment id="prod" {
            transaction-manager type="JDBC"
            data-source type="POOLED" { url "jdbc:oracle:thin:@db" }
        }
    }
    database-id-provider type="DB_VENDOR" { Oracle "oracle" }"#;

fn load(order: &[&str], environment: &str) -> mapforge_config::Result<Configuration> {
	let loader = MemoryLoader::new()
		.with("posts.kdl", POSTS)
		.with("authors.kdl", AUTHORS);
	ConfigBuilder::new(configuration(order, environment))
		.loader(loader)
		.types(types())
		.parse()
}

#[rstest]
#[case::dependents_first(&["posts.kdl", "authors.kdl"])]
#[case::dependencies_first(&["authors.kdl", "posts.kdl"])]
fn forward_references_resolve_in_any_order(#[case] order: &[&str]) {
	let config = load(order, "").unwrap();
	assert_eq!(config.pending_len(), 0);

	let recent = config.statement("blog.PostMapper.recent").unwrap();
	assert_eq!(
		recent.sql,
		"select * from post p join author a on a.id = p.author_id order by a.name"
	);
	let post = &recent.result_maps[0];
	assert_eq!(
		post.mapping_for("author").unwrap().nested_result_map.as_deref(),
		Some("blog.AuthorMapper.detailed")
	);

	let detailed = config.result_map("blog.AuthorMapper.detailed").unwrap();
	let properties: Vec<_> = detailed.mappings().iter().map(|m| m.display_name()).collect();
	assert_eq!(properties, vec!["bio", "id", "name"]);

	let authors_cache = config.cache("blog.AuthorMapper").unwrap();
	assert!(Arc::ptr_eq(recent.cache.as_ref().unwrap(), authors_cache));
	let find = config.statement("blog.AuthorMapper.find").unwrap();
	assert!(Arc::ptr_eq(find.cache.as_ref().unwrap(), authors_cache));
	assert_eq!(config.caches().count(), 1);
}

#[rstest]
#[case::dependents_first(&["posts.kdl", "authors.kdl"])]
#[case::dependencies_first(&["authors.kdl", "posts.kdl"])]
fn database_variant_is_selected_in_any_order(#[case] order: &[&str]) {
	let config = load(order, ORACLE).unwrap();
	assert_eq!(config.database_id(), Some("oracle"));

	let find = config.statement("blog.AuthorMapper.find").unwrap();
	assert_eq!(find.database_id.as_deref(), Some("oracle"));
	assert!(find.sql.ends_with("and rownum = 1"));
	assert_eq!(config.statements().filter(|s| s.id == "blog.AuthorMapper.find").count(), 1);
}

#[test]
fn without_database_id_only_unqualified_statements_load() {
	let config = load(&["authors.kdl"], "").unwrap();
	assert_eq!(config.database_id(), None);
	let find = config.statement("blog.AuthorMapper.find").unwrap();
	assert_eq!(find.database_id, None);
	assert!(find.sql.ends_with("where a.id = #{id}"));
}

#[test]
fn every_unresolved_reference_is_reported() {
	let err = load(&["posts.kdl"], "").unwrap_err();
	let ConfigError::Unresolved(reports) = err else {
		panic!("expected unresolved definitions");
	};

	let blocked: Vec<_> = reports
		.iter()
		.map(|r| (r.kind, r.id.as_str(), r.blocked_on.id.as_str()))
		.collect();
	assert_eq!(
		blocked,
		vec![
			(ArtifactKind::CacheRef, "blog.PostMapper", "blog.AuthorMapper"),
			(ArtifactKind::Statement, "blog.PostMapper.recent", "blog.AuthorMapper.order"),
		]
	);
}

#[test]
fn documents_load_from_disk() {
	let dir = tempfile::tempdir().unwrap();
	fs::create_dir_all(dir.path().join("blog")).unwrap();
	fs::write(dir.path().join("blog/AuthorMapper.kdl"), AUTHORS).unwrap();
	fs::write(dir.path().join("blog/posts.kdl"), POSTS).unwrap();
	fs::write(dir.path().join("db.kdl"), "schema \"blog\"\n").unwrap();

	let mut builder = ConfigBuilder::new(
		r#"
configuration {
    properties resource="db.kdl"
    mappers {
        mapper resource="blog/posts.kdl"
        mapper class="blog.AuthorMapper"
    }
}
"#,
	)
	.loader(FileLoader::new(dir.path()))
	.types(types());
	let config = builder.parse().unwrap();

	assert_eq!(config.variables().get("schema").map(String::as_str), Some("blog"));
	assert!(config.has_mapper("blog.AuthorMapper"));
	assert!(config.has_mapper("blog.PostMapper"));
	assert!(config.is_resource_loaded("blog/AuthorMapper.kdl"));
	assert!(config.has_statement("blog.PostMapper.recent"));
	assert!(config.has_statement("blog.AuthorMapper.find"));
}

#[test]
fn missing_mapper_resource_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let err = ConfigBuilder::new(r#"configuration { mappers { mapper resource="nope.kdl" } }"#)
		.loader(FileLoader::new(dir.path()))
		.parse()
		.unwrap_err();
	assert!(err.to_string().contains("nope.kdl"));
}
