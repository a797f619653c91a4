//! Read-only element tree.
//!
//! A [`Node`] is the unit every builder consumes: a name, ordered attributes,
//! positional arguments (body text) and ordered children. Nodes are produced by
//! the [reader](crate::reader) and are never mutated afterwards.

use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::{NodeError, Result};

/// One element of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	name: String,
	attributes: IndexMap<String, String>,
	arguments: Vec<String>,
	children: Vec<Node>,
	identifier: String,
}

impl Node {
	/// Creates a node below `parent_identifier`, computing its value-based identifier.
	pub(crate) fn new(
		name: String,
		attributes: IndexMap<String, String>,
		arguments: Vec<String>,
		parent_identifier: Option<&str>,
	) -> Self {
		let identifier = value_based_identifier(&name, &attributes, parent_identifier);
		Self {
			name,
			attributes,
			arguments,
			children: Vec::new(),
			identifier,
		}
	}

	pub(crate) fn push_child(&mut self, child: Node) {
		self.children.push(child);
	}

	/// Element name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Identifier derived from the element path and its `id`, `value` or
	/// `property` attributes, e.g. `mapper_result-map[author]_collection[posts]`.
	///
	/// Used to name anonymous artifacts that must still be addressable.
	pub fn value_based_identifier(&self) -> &str {
		&self.identifier
	}

	/// Returns the raw attribute value.
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Returns the attribute value or `default` when absent.
	pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
		self.attr(name).unwrap_or(default)
	}

	/// Returns the attribute value, failing when it is absent.
	pub fn required_attr(&self, name: &str) -> Result<&str> {
		self.attr(name).ok_or_else(|| NodeError::MissingAttribute {
			element: self.name.clone(),
			attribute: name.to_string(),
		})
	}

	/// Returns true if the attribute is present.
	pub fn has_attr(&self, name: &str) -> bool {
		self.attributes.contains_key(name)
	}

	/// Iterates attributes in declaration order.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Parses an attribute through [`FromStr`].
	///
	/// `expected` names the target type in the error message.
	pub fn parse_attr<T: FromStr>(&self, name: &str, expected: &'static str) -> Result<Option<T>> {
		let Some(raw) = self.attr(name) else {
			return Ok(None);
		};
		raw.trim()
			.parse::<T>()
			.map(Some)
			.map_err(|_| NodeError::InvalidAttribute {
				element: self.name.clone(),
				attribute: name.to_string(),
				value: raw.to_string(),
				expected,
			})
	}

	/// Reads a boolean attribute. Only `true` and `false` are accepted.
	pub fn bool_attr(&self, name: &str) -> Result<Option<bool>> {
		self.parse_attr(name, "a boolean")
	}

	/// Reads a boolean attribute with a default.
	pub fn bool_attr_or(&self, name: &str, default: bool) -> Result<bool> {
		Ok(self.bool_attr(name)?.unwrap_or(default))
	}

	/// Reads a signed 32-bit integer attribute.
	pub fn int_attr(&self, name: &str) -> Result<Option<i32>> {
		self.parse_attr(name, "an integer")
	}

	/// Reads a signed 64-bit integer attribute.
	pub fn long_attr(&self, name: &str) -> Result<Option<i64>> {
		self.parse_attr(name, "an integer")
	}

	/// Positional arguments in declaration order.
	pub fn arguments(&self) -> &[String] {
		&self.arguments
	}

	/// First positional argument, used as element body text.
	pub fn text(&self) -> Option<&str> {
		self.arguments.first().map(String::as_str)
	}

	/// Child elements in declaration order.
	pub fn children(&self) -> &[Node] {
		&self.children
	}

	/// First child with the given name.
	pub fn child(&self, name: &str) -> Option<&Node> {
		self.children.iter().find(|c| c.name == name)
	}

	/// All children with the given name.
	pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
		self.children.iter().filter(move |c| c.name == name)
	}

	/// Collects children as key/value properties.
	///
	/// Two spellings are accepted: `key "value"` (node name is the key, first
	/// argument the value) and `property name="key" value="value"`.
	pub fn children_as_properties(&self) -> IndexMap<String, String> {
		let mut props = IndexMap::new();
		for child in &self.children {
			if child.name == "property"
				&& let Some(key) = child.attr("name")
			{
				props.insert(key.to_string(), child.attr_or("value", "").to_string());
			} else if let Some(value) = child.text().or_else(|| child.attr("value")) {
				props.insert(child.name.clone(), value.to_string());
			}
		}
		props
	}
}

fn value_based_identifier(
	name: &str,
	attributes: &IndexMap<String, String>,
	parent: Option<&str>,
) -> String {
	let mut ident = String::new();
	if let Some(parent) = parent {
		ident.push_str(parent);
		ident.push('_');
	}
	ident.push_str(name);
	let value = ["id", "value", "property"]
		.iter()
		.find_map(|key| attributes.get(*key));
	if let Some(value) = value {
		ident.push('[');
		ident.push_str(&value.replace('.', "_"));
		ident.push(']');
	}
	ident
}

#[cfg(test)]
mod tests;
