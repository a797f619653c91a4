//! Statement body assembly and `include` expansion.
//!
//! A body is the element's positional arguments followed by its `text` and
//! `include` children, joined with single spaces. An include inlines a
//! registered `sql` fragment; `property` children of the include bind `${name}`
//! placeholders inside that fragment, layered over the configuration's
//! variables and any bindings of enclosing includes.

use mapforge_node::{Node, Variables, substitute};

use crate::assistant::qualify_reference;
use crate::error::{ConfigError, Result};
use crate::outcome::{ArtifactKind, Outcome, resolved};
use crate::registry::Configuration;

/// Builds the statement body, expanding includes.
///
/// Incomplete while an included fragment is not registered.
pub(super) fn statement_text(config: &Configuration, namespace: &str, node: &Node) -> Result<Outcome<String>> {
	let mut parts = Vec::new();
	let mut expansion = Expansion {
		config,
		stack: Vec::new(),
		parts: &mut parts,
	};
	resolved!(expansion.expand(namespace, node, config.variables(), false)?);
	Ok(Outcome::Resolved(parts.join(" ")))
}

struct Expansion<'a> {
	config: &'a Configuration,
	/// Fragments currently being expanded, outermost first.
	stack: Vec<String>,
	parts: &'a mut Vec<String>,
}

impl Expansion<'_> {
	fn expand(
		&mut self,
		namespace: &str,
		node: &Node,
		context: &Variables,
		included: bool,
	) -> Result<Outcome<()>> {
		let config = self.config;
		for text in node.arguments() {
			self.push(text, context, included);
		}
		for child in node.children() {
			match child.name() {
				"text" => {
					for text in child.arguments() {
						self.push(text, context, included);
					}
				}
				"include" => {
					let refid = substitute(child.required_attr("refid")?, context);
					let id = qualify_reference(namespace, &refid);
					let Some(fragment) = config.sql_fragment(&id) else {
						return Ok(Outcome::waiting_on(ArtifactKind::SqlFragment, id));
					};
					if self.stack.contains(&id) {
						return Err(ConfigError::IncludeCycle(id));
					}
					let scoped = include_context(child, context)?;
					let fragment_namespace = id.rsplit_once('.').map_or(namespace, |(ns, _)| ns);

					self.stack.push(id.clone());
					resolved!(self.expand(fragment_namespace, &fragment.body, &scoped, true)?);
					self.stack.pop();
				}
				other => {
					return Err(ConfigError::UnexpectedElement {
						parent: node.name().to_string(),
						element: other.to_string(),
					});
				}
			}
		}
		Ok(Outcome::Resolved(()))
	}

	fn push(&mut self, text: &str, context: &Variables, included: bool) {
		let text = if included {
			substitute(text, context).into_owned()
		} else {
			text.to_string()
		};
		if !text.trim().is_empty() {
			self.parts.push(text.trim().to_string());
		}
	}
}

/// Variables visible inside an included fragment.
///
/// Property values are substituted with the enclosing context before they
/// shadow it.
fn include_context(include: &Node, context: &Variables) -> Result<Variables> {
	let mut declared = Variables::new();
	for property in include.children() {
		if property.name() != "property" {
			return Err(ConfigError::UnexpectedElement {
				parent: include.name().to_string(),
				element: property.name().to_string(),
			});
		}
		let name = property.required_attr("name")?;
		let value = substitute(property.attr_or("value", ""), context).into_owned();
		if declared.insert(name.to_string(), value).is_some() {
			return Err(ConfigError::DuplicateIncludeProperty(name.to_string()));
		}
	}
	if declared.is_empty() {
		return Ok(context.clone());
	}
	let mut scoped = context.clone();
	scoped.extend(declared);
	Ok(scoped)
}
