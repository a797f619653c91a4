use mapforge_node::MemoryLoader;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::settings::AutoMappingBehavior;
use crate::types::{JdbcType, TypeDescriptor};

fn types() -> TypeAliasRegistry {
	let mut types = TypeAliasRegistry::new();
	types.register_type(
		TypeDescriptor::bean("blog.Author")
			.with_property("id", "int")
			.with_property("name", "string"),
	);
	types.register_type(TypeDescriptor::mapper("blog.AuthorMapper"));
	types.register_type(TypeDescriptor::mapper("blog.mappers.PostMapper"));
	types.register_type(TypeDescriptor::mapper("blog.mappers.TagMapper"));
	types.register_type(TypeDescriptor::handler("app.handlers.MoneyHandler", Some("decimal")));
	types.register_type(TypeDescriptor::handler("app.NameHandler", Some("string")));
	types
}

const AUTHOR_MAPPER: &str = r#"
mapper namespace="blog.AuthorMapper" {
    cache
    result-map id="author" type="Author" {
        id property="id" column="id"
        result property="name" column="name"
    }
    select id="find" result-map="author" "select * from ${schema}.author where id = #{id}"
    select id="find" database-id="h2" result-map="author" "select * from ${schema}.author where id = #{id} limit 1"
}
"#;

const POST_MAPPER: &str = r#"
mapper namespace="blog.mappers.PostMapper" {
    cache-ref namespace="blog.AuthorMapper"
    select id="recent" result-map="blog.AuthorMapper.author" "select * from post"
}
"#;

const CONFIG: &str = r#"
configuration {
    properties resource="db.kdl" {
        schema "blog"
        user "ignored"
    }
    settings {
        autoMappingBehavior "FULL"
        defaultStatementTimeout 30
        logImpl "SLF4J"
    }
    type-aliases {
        alias type="blog.Author"
        alias name="Money" type="app.handlers.MoneyHandler"
    }
    plugins {
        plugin interceptor="audit.Plugin" {
            level "info"
        }
    }
    object-factory type="app.Factory" {
        flag "x"
    }
    environments default="dev" {
        environment id="dev" {
            transaction-manager type="JDBC"
            data-source type="POOLED" {
                url "jdbc:h2:mem:${schema}"
                user "${user}"
            }
        }
    }
    database-id-provider type="VENDOR" {
        H2 "h2"
        Oracle "oracle"
    }
    type-handlers {
        handler handler="app.NameHandler" jdbc-type="VARCHAR"
        package name="app.handlers"
    }
    mappers {
        mapper resource="blog/AuthorMapper.kdl"
        package name="blog.mappers"
    }
}
"#;

fn loader() -> MemoryLoader {
	MemoryLoader::new()
		.with("db.kdl", "user \"app\"\n")
		.with("blog/AuthorMapper.kdl", AUTHOR_MAPPER)
		.with("blog/mappers/PostMapper.kdl", POST_MAPPER)
}

fn builder(text: &str) -> ConfigBuilder {
	ConfigBuilder::new(text).loader(loader()).types(types())
}

#[test]
fn loads_every_section() {
	let config = builder(CONFIG).parse().unwrap();

	assert_eq!(config.variables().get("user").map(String::as_str), Some("app"));
	assert_eq!(config.settings().auto_mapping_behavior, AutoMappingBehavior::Full);
	assert_eq!(config.settings().default_statement_timeout, Some(30));
	assert_eq!(config.settings().log_impl.as_deref(), Some("SLF4J"));
	assert_eq!(config.types().resolve("money").unwrap().name(), "app.handlers.MoneyHandler");
	assert_eq!(config.plugins()[0].type_name, "audit.Plugin");
	assert_eq!(config.object_factory().unwrap().properties.get("flag").map(String::as_str), Some("x"));

	let env = config.environment().unwrap();
	assert_eq!(env.data_source.properties.get("url").map(String::as_str), Some("jdbc:h2:mem:blog"));
	assert_eq!(env.data_source.properties.get("user").map(String::as_str), Some("app"));
	assert_eq!(config.database_id(), Some("h2"));

	assert_eq!(
		config.type_handlers().handler_for("string", Some(JdbcType::Varchar)),
		Some("app.NameHandler")
	);
	assert_eq!(
		config.type_handlers().handler_for("decimal", None),
		Some("app.handlers.MoneyHandler")
	);

	let find = config.statement("blog.AuthorMapper.find").unwrap();
	assert_eq!(find.database_id.as_deref(), Some("h2"));
	assert!(find.sql.starts_with("select * from blog.author"));
	assert_eq!(find.timeout, Some(30));

	assert!(config.has_mapper("blog.AuthorMapper"));
	assert!(config.has_mapper("blog.mappers.PostMapper"));
	assert!(config.has_mapper("blog.mappers.TagMapper"));
	let recent = config.statement("blog.mappers.PostMapper.recent").unwrap();
	assert!(std::sync::Arc::ptr_eq(
		recent.cache.as_ref().unwrap(),
		find.cache.as_ref().unwrap()
	));
	assert_eq!(config.pending_len(), 0);
}

#[test]
fn builders_parse_once() {
	let mut builder = builder("configuration");
	builder.parse().unwrap();
	assert!(matches!(builder.parse(), Err(ConfigError::AlreadyParsed)));
}

#[test]
fn caller_variables_take_precedence() {
	let mut vars = Variables::new();
	vars.insert("schema".into(), "archive".into());
	let config = builder(CONFIG)
		.variables(vars)
		.environment("dev")
		.parse()
		.unwrap();
	let find = config.statement("blog.AuthorMapper.find").unwrap();
	assert!(find.sql.starts_with("select * from archive.author"));
}

#[test]
fn unknown_setting_is_named() {
	let err = builder(r#"configuration { settings { fooBarBehavior "x" } }"#)
		.parse()
		.unwrap_err();
	assert_eq!(err.to_string(), "unknown setting 'fooBarBehavior'");
}

#[test]
fn custom_database_id_provider() {
	struct Fixed;
	impl DatabaseIdProvider for Fixed {
		fn database_id(&self, _: &Environment, props: &IndexMap<String, String>) -> Option<String> {
			props.get("id").cloned()
		}
	}

	let config = ConfigBuilder::new(
		r#"
configuration {
    environments default="test" {
        environment id="test" {
            transaction-manager type="MANAGED"
            data-source type="UNPOOLED"
        }
    }
    database-id-provider type="fixed" { id "pg" }
}
"#,
	)
	.database_id_provider("Fixed", Fixed)
	.parse()
	.unwrap();
	assert_eq!(config.database_id(), Some("pg"));
}

#[test]
fn unresolved_references_fail_the_load() {
	let loader = MemoryLoader::new().with(
		"orphan.kdl",
		r#"mapper namespace="blog.Orphan" { select id="find" result-map="blog.Missing.map" "select 1" }"#,
	);
	let err = ConfigBuilder::new(r#"configuration { mappers { mapper resource="orphan.kdl" } }"#)
		.loader(loader)
		.parse()
		.unwrap_err();
	let reports = match err {
		ConfigError::Unresolved(reports) => reports,
		other => panic!("expected unresolved error, got {other}"),
	};
	assert_eq!(reports.len(), 1);
	assert_eq!(
		reports[0].to_string(),
		"statement 'blog.Orphan.find' is waiting for result map 'blog.Missing.map'"
	);
}

#[rstest]
#[case::no_default(
	r#"configuration { environments { environment id="a" } }"#,
	"no environment specified"
)]
#[case::unknown_default(
	r#"configuration { environments default="prod" { environment id="dev" } }"#,
	"environment 'prod' is not declared"
)]
#[case::missing_id(
	r#"configuration { environments default="dev" { environment } }"#,
	"environment requires an id attribute"
)]
#[case::missing_data_source(
	r#"configuration { environments default="dev" { environment id="dev" { transaction-manager type="JDBC" } } }"#,
	"environment 'dev' requires a <data-source> element"
)]
#[case::unknown_provider(
	r#"configuration { database-id-provider type="magic" }"#,
	"unknown database id provider 'magic'"
)]
#[case::properties_resource_and_url(
	r#"configuration { properties resource="db.kdl" url="file:///db.kdl" }"#,
	"<properties> may only specify one of 'resource' and 'url'"
)]
#[case::mapper_resource_and_class(
	r#"configuration { mappers { mapper resource="blog/AuthorMapper.kdl" class="blog.AuthorMapper" } }"#,
	"<mapper> may only specify one of 'resource', 'url' or 'class'"
)]
#[case::unknown_section(r#"configuration { dialect "x" }"#, "unexpected <dialect> inside <configuration>")]
fn malformed_configurations(#[case] text: &str, #[case] message: &str) {
	let err = builder(text).parse().unwrap_err();
	assert_eq!(err.to_string(), message);
}
