use std::fmt;
use std::sync::Arc;

use mapforge_cache::SharedCache;
use mapforge_node::Node;
use strum::{Display, EnumString};

use super::{ParameterMap, ResultMap};

/// Operation kind, taken from the element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StatementKind {
	Select,
	Insert,
	Update,
	Delete,
}

/// How the statement is sent to the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StatementType {
	Statement,
	#[default]
	Prepared,
	Callable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultSetType {
	ForwardOnly,
	ScrollInsensitive,
	ScrollSensitive,
	/// Driver default.
	Default,
}

/// Reusable `sql` fragment, kept unexpanded until a statement includes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
	pub id: String,
	pub database_id: Option<String>,
	pub body: Node,
}

/// A registered statement.
#[derive(Clone)]
pub struct Statement {
	/// Qualified id.
	pub id: String,
	pub database_id: Option<String>,
	pub kind: StatementKind,
	pub statement_type: StatementType,
	/// Body text with includes expanded.
	pub sql: String,
	/// Explicit result maps, or the single `<id>-Inline` map for `result-type`.
	pub result_maps: Vec<Arc<ResultMap>>,
	pub parameter_map: Option<Arc<ParameterMap>>,
	/// Cache of the owning namespace, shared with every other statement bound to it.
	pub cache: Option<SharedCache>,
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
	/// Document the statement was declared in.
	pub resource: String,
}

impl Statement {
	/// Namespace part of the id.
	pub fn namespace(&self) -> &str {
		self.id.rsplit_once('.').map_or("", |(ns, _)| ns)
	}
}

impl fmt::Debug for Statement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Statement")
			.field("id", &self.id)
			.field("database_id", &self.database_id)
			.field("kind", &self.kind)
			.field("statement_type", &self.statement_type)
			.field("sql", &self.sql)
			.field(
				"result_maps",
				&self.result_maps.iter().map(|m| m.id()).collect::<Vec<_>>(),
			)
			.field("parameter_map", &self.parameter_map.as_ref().map(|p| &p.id))
			.field("cache", &self.cache.as_ref().map(|c| c.id().to_string()))
			.field("flush_cache", &self.flush_cache)
			.field("use_cache", &self.use_cache)
			.field("resource", &self.resource)
			.finish_non_exhaustive()
	}
}
