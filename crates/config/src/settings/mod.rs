//! Global settings.
//!
//! The `settings` section of a configuration document is a closed set of
//! camelCase names. Names are validated before any other section is read;
//! values are converted into [`Settings`] later, after type aliases and
//! factories are known.
//!
//! ```kdl
//! settings {
//!     cacheEnabled #true
//!     defaultStatementTimeout 25
//!     autoMappingBehavior "FULL"
//! }
//! ```

mod parse;

use indexmap::IndexMap;
use strum::{Display, EnumString};

pub use self::parse::suggest_setting;
use self::parse::{count, switch, variant};
use crate::error::{ConfigError, Result};
use crate::mapping::ResultSetType;
use crate::types::JdbcType;

/// Every setting name the `settings` section accepts.
pub const KNOWN_SETTINGS: &[&str] = &[
	"autoMappingBehavior",
	"autoMappingUnknownColumnBehavior",
	"cacheEnabled",
	"proxyFactory",
	"lazyLoadingEnabled",
	"aggressiveLazyLoading",
	"multipleResultSetsEnabled",
	"useColumnLabel",
	"useGeneratedKeys",
	"defaultExecutorType",
	"defaultStatementTimeout",
	"defaultFetchSize",
	"defaultResultSetType",
	"mapUnderscoreToCamelCase",
	"safeRowBoundsEnabled",
	"localCacheScope",
	"jdbcTypeForNull",
	"lazyLoadTriggerMethods",
	"safeResultHandlerEnabled",
	"defaultScriptingLanguage",
	"defaultEnumTypeHandler",
	"callSettersOnNulls",
	"useActualParamName",
	"returnInstanceForEmptyRow",
	"logPrefix",
	"configurationFactory",
	"shrinkWhitespacesInSql",
	"defaultSqlProviderType",
	"nullableOnForEach",
	"argNameBasedConstructorAutoMapping",
	"vfsImpl",
	"logImpl",
];

/// How columns without an explicit mapping are mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AutoMappingBehavior {
	None,
	#[default]
	Partial,
	Full,
}

/// What happens when auto-mapping meets an unknown column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AutoMappingUnknownColumnBehavior {
	#[default]
	None,
	Warning,
	Failing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExecutorType {
	#[default]
	Simple,
	Reuse,
	Batch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LocalCacheScope {
	#[default]
	Session,
	Statement,
}

/// Typed settings with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	pub auto_mapping_behavior: AutoMappingBehavior,
	pub auto_mapping_unknown_column_behavior: AutoMappingUnknownColumnBehavior,
	pub cache_enabled: bool,
	pub proxy_factory: Option<String>,
	pub lazy_loading_enabled: bool,
	pub aggressive_lazy_loading: bool,
	pub multiple_result_sets_enabled: bool,
	pub use_column_label: bool,
	pub use_generated_keys: bool,
	pub default_executor_type: ExecutorType,
	pub default_statement_timeout: Option<i64>,
	pub default_fetch_size: Option<i64>,
	pub default_result_set_type: Option<ResultSetType>,
	pub map_underscore_to_camel_case: bool,
	pub safe_row_bounds_enabled: bool,
	pub local_cache_scope: LocalCacheScope,
	pub jdbc_type_for_null: JdbcType,
	pub lazy_load_trigger_methods: Vec<String>,
	pub safe_result_handler_enabled: bool,
	pub default_scripting_language: Option<String>,
	pub default_enum_type_handler: Option<String>,
	pub call_setters_on_nulls: bool,
	pub use_actual_param_name: bool,
	pub return_instance_for_empty_row: bool,
	pub log_prefix: Option<String>,
	pub configuration_factory: Option<String>,
	pub shrink_whitespaces_in_sql: bool,
	pub default_sql_provider_type: Option<String>,
	pub nullable_on_for_each: bool,
	pub arg_name_based_constructor_auto_mapping: bool,
	/// Virtual file system implementations, in declaration order.
	pub vfs_impl: Vec<String>,
	pub log_impl: Option<String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			auto_mapping_behavior: AutoMappingBehavior::Partial,
			auto_mapping_unknown_column_behavior: AutoMappingUnknownColumnBehavior::None,
			cache_enabled: true,
			proxy_factory: None,
			lazy_loading_enabled: false,
			aggressive_lazy_loading: false,
			multiple_result_sets_enabled: true,
			use_column_label: true,
			use_generated_keys: false,
			default_executor_type: ExecutorType::Simple,
			default_statement_timeout: None,
			default_fetch_size: None,
			default_result_set_type: None,
			map_underscore_to_camel_case: false,
			safe_row_bounds_enabled: false,
			local_cache_scope: LocalCacheScope::Session,
			jdbc_type_for_null: JdbcType::Other,
			lazy_load_trigger_methods: ["equals", "clone", "hashCode", "toString"]
				.map(str::to_string)
				.to_vec(),
			safe_result_handler_enabled: true,
			default_scripting_language: None,
			default_enum_type_handler: None,
			call_setters_on_nulls: false,
			use_actual_param_name: true,
			return_instance_for_empty_row: false,
			log_prefix: None,
			configuration_factory: None,
			shrink_whitespaces_in_sql: false,
			default_sql_provider_type: None,
			nullable_on_for_each: false,
			arg_name_based_constructor_auto_mapping: false,
			vfs_impl: Vec::new(),
			log_impl: None,
		}
	}
}

/// Fails on the first name not in [`KNOWN_SETTINGS`].
pub fn validate_names(props: &IndexMap<String, String>) -> Result<()> {
	match props.keys().find(|name| !KNOWN_SETTINGS.contains(&name.as_str())) {
		Some(name) => Err(ConfigError::UnknownSetting {
			name: name.clone(),
			suggestion: suggest_setting(name),
		}),
		None => Ok(()),
	}
}

impl Settings {
	/// Applies every entry in order.
	pub fn apply(&mut self, props: &IndexMap<String, String>) -> Result<()> {
		for (name, value) in props {
			self.set(name, value)?;
		}
		Ok(())
	}

	/// Converts and stores one setting.
	pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
		let invalid = |reason: &'static str| ConfigError::InvalidSetting {
			name: name.to_string(),
			value: value.to_string(),
			reason,
		};
		let flag = || switch(value).map_err(invalid);
		let number = || count(value).map(Some).map_err(invalid);
		let text = || Some(value.to_string());

		match name {
			"autoMappingBehavior" => self.auto_mapping_behavior = variant(value).map_err(invalid)?,
			"autoMappingUnknownColumnBehavior" => {
				self.auto_mapping_unknown_column_behavior = variant(value).map_err(invalid)?;
			}
			"cacheEnabled" => self.cache_enabled = flag()?,
			"proxyFactory" => self.proxy_factory = text(),
			"lazyLoadingEnabled" => self.lazy_loading_enabled = flag()?,
			"aggressiveLazyLoading" => self.aggressive_lazy_loading = flag()?,
			"multipleResultSetsEnabled" => self.multiple_result_sets_enabled = flag()?,
			"useColumnLabel" => self.use_column_label = flag()?,
			"useGeneratedKeys" => self.use_generated_keys = flag()?,
			"defaultExecutorType" => self.default_executor_type = variant(value).map_err(invalid)?,
			"defaultStatementTimeout" => self.default_statement_timeout = number()?,
			"defaultFetchSize" => self.default_fetch_size = number()?,
			"defaultResultSetType" => {
				self.default_result_set_type = Some(variant(value).map_err(invalid)?);
			}
			"mapUnderscoreToCamelCase" => self.map_underscore_to_camel_case = flag()?,
			"safeRowBoundsEnabled" => self.safe_row_bounds_enabled = flag()?,
			"localCacheScope" => self.local_cache_scope = variant(value).map_err(invalid)?,
			"jdbcTypeForNull" => self.jdbc_type_for_null = variant(value).map_err(invalid)?,
			"lazyLoadTriggerMethods" => self.lazy_load_trigger_methods = split_list(value),
			"safeResultHandlerEnabled" => self.safe_result_handler_enabled = flag()?,
			"defaultScriptingLanguage" => self.default_scripting_language = text(),
			"defaultEnumTypeHandler" => self.default_enum_type_handler = text(),
			"callSettersOnNulls" => self.call_setters_on_nulls = flag()?,
			"useActualParamName" => self.use_actual_param_name = flag()?,
			"returnInstanceForEmptyRow" => self.return_instance_for_empty_row = flag()?,
			"logPrefix" => self.log_prefix = text(),
			"configurationFactory" => self.configuration_factory = text(),
			"shrinkWhitespacesInSql" => self.shrink_whitespaces_in_sql = flag()?,
			"defaultSqlProviderType" => self.default_sql_provider_type = text(),
			"nullableOnForEach" => self.nullable_on_for_each = flag()?,
			"argNameBasedConstructorAutoMapping" => {
				self.arg_name_based_constructor_auto_mapping = flag()?;
			}
			"vfsImpl" => self.vfs_impl = split_list(value),
			"logImpl" => self.log_impl = text(),
			_ => {
				return Err(ConfigError::UnknownSetting {
					name: name.to_string(),
					suggestion: suggest_setting(name),
				});
			}
		}
		Ok(())
	}
}

fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}
