//! Statement elements.

use mapforge_node::Node;

use super::{database_id_matches, include};
use crate::assistant::{BuilderAssistant, StatementRequest};
use crate::error::{ConfigError, Result};
use crate::mapping::StatementKind;
use crate::outcome::{Outcome, resolved};
use crate::registry::Configuration;

/// Parses one `select`, `insert`, `update` or `delete` element.
///
/// Elements outside the current database-id pass resolve to nothing. The
/// outcome is incomplete while the body includes an unregistered fragment or
/// the statement references an unregistered cache, parameter map or result
/// map; the element is then parsed again from scratch on the next drain.
pub(crate) fn parse_statement(
	config: &mut Configuration,
	assistant: &BuilderAssistant,
	node: &Node,
	required_database_id: Option<&str>,
) -> Result<Outcome<()>> {
	let id = node.required_attr("id")?;
	let database_id = node.attr("database-id");
	let qualified = assistant.qualify_id(id)?;
	let existing = config.statement(&qualified).map(|s| s.database_id.as_deref());
	if !database_id_matches(database_id, required_database_id, existing) {
		return Ok(Outcome::Resolved(()));
	}

	let kind: StatementKind = node.name().parse().map_err(|_| ConfigError::UnexpectedElement {
		parent: "mapper".to_string(),
		element: node.name().to_string(),
	})?;
	let is_select = kind == StatementKind::Select;
	let sql = resolved!(include::statement_text(config, assistant.namespace(), node)?);

	let request = StatementRequest {
		id: id.to_string(),
		database_id: database_id.map(str::to_string),
		kind,
		statement_type: node
			.parse_attr("statement-type", "STATEMENT, PREPARED or CALLABLE")?
			.unwrap_or_default(),
		sql,
		parameter_map: node.attr("parameter-map").map(str::to_string),
		parameter_type: config.types().resolve_optional(node.attr("parameter-type"))?,
		result_map: node.attr("result-map").map(str::to_string),
		result_type: config.types().resolve_optional(node.attr("result-type"))?,
		fetch_size: node.long_attr("fetch-size")?,
		timeout: node.long_attr("timeout")?,
		flush_cache: node.bool_attr_or("flush-cache", !is_select)?,
		use_cache: node.bool_attr_or("use-cache", is_select)?,
		result_ordered: node.bool_attr_or("result-ordered", false)?,
		result_set_type: node.parse_attr(
			"result-set-type",
			"FORWARD_ONLY, SCROLL_INSENSITIVE, SCROLL_SENSITIVE or DEFAULT",
		)?,
		key_properties: split_names(node.attr("key-property")),
		key_columns: split_names(node.attr("key-column")),
		use_generated_keys: node
			.bool_attr("use-generated-keys")?
			.unwrap_or(config.settings().use_generated_keys && kind == StatementKind::Insert),
		result_sets: split_names(node.attr("result-sets")),
	};
	Ok(assistant.add_statement(config, request)?.map(drop))
}

fn split_names(list: Option<&str>) -> Vec<String> {
	list.map(|l| {
		l.split(',')
			.map(str::trim)
			.filter(|n| !n.is_empty())
			.map(str::to_string)
			.collect()
	})
	.unwrap_or_default()
}
