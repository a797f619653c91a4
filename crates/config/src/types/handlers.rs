use indexmap::IndexMap;

use super::JdbcType;

/// Registered type handlers, keyed by handled type and JDBC type.
///
/// Handlers are recorded by name only; nothing here converts values.
#[derive(Debug, Clone, Default)]
pub struct TypeHandlerRegistry {
	handlers: IndexMap<(Option<String>, Option<JdbcType>), String>,
}

impl TypeHandlerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for the pair, replacing any previous handler.
	pub fn register(&mut self, java_type: Option<&str>, jdbc_type: Option<JdbcType>, handler: &str) {
		tracing::trace!(?java_type, ?jdbc_type, handler, "registered type handler");
		self.handlers
			.insert((java_type.map(str::to_string), jdbc_type), handler.to_string());
	}

	/// Handler for `java_type`, preferring an exact JDBC type match.
	pub fn handler_for(&self, java_type: &str, jdbc_type: Option<JdbcType>) -> Option<&str> {
		let java = Some(java_type.to_string());
		self.handlers
			.get(&(java.clone(), jdbc_type))
			.or_else(|| self.handlers.get(&(java, None)))
			.map(String::as_str)
	}

	/// Returns true if `handler` is registered for any pair.
	pub fn contains_handler(&self, handler: &str) -> bool {
		self.handlers.values().any(|h| h == handler)
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}
