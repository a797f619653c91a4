//! KDL document reader.
//!
//! Converts a KDL (v2) document into a [`Node`] tree. Properties become
//! attributes, positional arguments become body text, and child blocks become
//! children. Scalar values are normalized to strings so builders coerce them
//! through the typed accessors on [`Node`]; `#null` values are dropped.
//!
//! ```kdl
//! mapper namespace="blog.AuthorMapper" {
//!     select id="find" result-type="Author" "select * from author where id = #{id}"
//! }
//! ```

use indexmap::IndexMap;
use kdl::{KdlDocument, KdlNode, KdlValue};

use crate::error::{NodeError, Result};
use crate::node::Node;
use crate::vars::{Variables, substitute};

/// Parses `input` and returns its single root node, which must be named `root`.
///
/// Every attribute value and argument has `${name}` placeholders replaced from
/// `vars` before it is stored.
pub fn read_root(input: &str, root: &str, vars: &Variables) -> Result<Node> {
	let doc: KdlDocument = input.parse()?;
	let nodes = doc.nodes();
	match nodes {
		[node] if node.name().value() == root => Ok(convert(node, None, vars)),
		[node] => Err(NodeError::UnexpectedRoot {
			expected: root.to_string(),
			found: format!("<{}>", node.name().value()),
		}),
		_ => Err(NodeError::UnexpectedRoot {
			expected: root.to_string(),
			found: format!("{} top-level nodes", nodes.len()),
		}),
	}
}

/// Parses a flat document of `key "value"` nodes into properties.
///
/// Used for external variable files referenced from a configuration document.
pub fn read_properties(input: &str, vars: &Variables) -> Result<IndexMap<String, String>> {
	let doc: KdlDocument = input.parse()?;
	let mut props = IndexMap::new();
	for node in doc.nodes() {
		if let Some(value) = node
			.entries()
			.iter()
			.find(|e| e.name().is_none())
			.and_then(|e| scalar_to_string(e.value()))
		{
			props.insert(
				node.name().value().to_string(),
				substitute(&value, vars).into_owned(),
			);
		}
	}
	Ok(props)
}

fn convert(node: &KdlNode, parent: Option<&str>, vars: &Variables) -> Node {
	let mut attributes = IndexMap::new();
	let mut arguments = Vec::new();

	for entry in node.entries() {
		let Some(value) = scalar_to_string(entry.value()) else {
			continue;
		};
		let value = substitute(&value, vars).into_owned();
		match entry.name() {
			Some(name) => {
				attributes.insert(name.value().to_string(), value);
			}
			None => arguments.push(value),
		}
	}

	let mut out = Node::new(
		node.name().value().to_string(),
		attributes,
		arguments,
		parent,
	);
	if let Some(children) = node.children() {
		let ident = out.value_based_identifier().to_string();
		for child in children.nodes() {
			out.push_child(convert(child, Some(&ident), vars));
		}
	}
	out
}

fn scalar_to_string(value: &KdlValue) -> Option<String> {
	if let Some(s) = value.as_string() {
		return Some(s.to_string());
	}
	if let Some(b) = value.as_bool() {
		return Some(b.to_string());
	}
	if let Some(i) = value.as_integer() {
		return Some(i.to_string());
	}
	if let Some(f) = value.as_float() {
		return Some(f.to_string());
	}
	None
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn converts_entries_and_children() {
		let input = r#"
mapper namespace="blog.Author" {
    result-map id="author" type="Author" auto-mapping=#true {
        id property="id" column="author_id"
        collection property="posts" of-type="Post" {
            result property="title" column="title"
        }
    }
    sql id="cols" "id, name"
}
"#;
		let root = read_root(input, "mapper", &Variables::new()).unwrap();
		assert_eq!(root.attr("namespace"), Some("blog.Author"));
		assert_eq!(root.value_based_identifier(), "mapper");

		let rm = root.child("result-map").unwrap();
		assert_eq!(rm.attr("auto-mapping"), Some("true"));
		assert_eq!(rm.value_based_identifier(), "mapper_result-map[author]");

		let coll = rm.child("collection").unwrap();
		assert_eq!(
			coll.value_based_identifier(),
			"mapper_result-map[author]_collection[posts]"
		);
		assert_eq!(coll.children().len(), 1);

		let sql = root.child("sql").unwrap();
		assert_eq!(sql.text(), Some("id, name"));
	}

	#[test]
	fn numbers_are_normalized() {
		let root = read_root(
			"mapper { cache flush-interval=60000 size=512 }",
			"mapper",
			&Variables::new(),
		)
		.unwrap();
		let cache = root.child("cache").unwrap();
		assert_eq!(cache.long_attr("flush-interval").unwrap(), Some(60000));
		assert_eq!(cache.int_attr("size").unwrap(), Some(512));
	}

	#[test]
	fn substitutes_variables() {
		let mut vars = Variables::new();
		vars.insert("schema".into(), "blog".into());
		let root = read_root(
			r#"mapper namespace="${schema}.Author" { sql id="t" "${schema}.author" }"#,
			"mapper",
			&vars,
		)
		.unwrap();
		assert_eq!(root.attr("namespace"), Some("blog.Author"));
		assert_eq!(root.child("sql").and_then(Node::text), Some("blog.author"));
	}

	#[test]
	fn rejects_wrong_root() {
		let err = read_root("configuration", "mapper", &Variables::new()).unwrap_err();
		assert!(matches!(err, NodeError::UnexpectedRoot { .. }));

		let err = read_root("mapper\nmapper", "mapper", &Variables::new()).unwrap_err();
		assert!(err.to_string().contains("2 top-level nodes"));
	}

	#[test]
	fn reads_flat_properties() {
		let props = read_properties(
			"username \"app\"\npool-size 8\n",
			&Variables::new(),
		)
		.unwrap();
		assert_eq!(props.get("username").map(String::as_str), Some("app"));
		assert_eq!(props.get("pool-size").map(String::as_str), Some("8"));
	}
}
