//! Environments and database-variant detection.
//!
//! The selected environment's data source decides which database id (if any)
//! qualifies statements and fragments. Detection goes through a
//! [`DatabaseIdProvider`]; the built-in `DB_VENDOR` provider derives a product
//! name from the data source and maps it through the provider's properties.

use indexmap::IndexMap;

/// A declared component: a type name plus its properties.
///
/// Plugins, factories, transaction managers and data sources are recorded
/// this way and never instantiated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
	pub type_name: String,
	pub properties: IndexMap<String, String>,
}

impl Component {
	pub fn new(type_name: impl Into<String>, properties: IndexMap<String, String>) -> Self {
		Self {
			type_name: type_name.into(),
			properties,
		}
	}
}

/// The selected environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
	pub id: String,
	pub transaction_manager: Component,
	pub data_source: Component,
}

/// Derives the database id for an environment.
pub trait DatabaseIdProvider: Send + Sync {
	/// Returns the database id, or `None` when statements should not be
	/// qualified.
	fn database_id(
		&self,
		environment: &Environment,
		properties: &IndexMap<String, String>,
	) -> Option<String>;
}

/// Alias of the built-in vendor provider.
pub const DB_VENDOR: &str = "DB_VENDOR";

/// Product names by JDBC sub-protocol.
const PRODUCTS: &[(&str, &str)] = &[
	("db2", "DB2"),
	("derby", "Apache Derby"),
	("h2", "H2"),
	("hsqldb", "HSQL Database Engine"),
	("mariadb", "MariaDB"),
	("mysql", "MySQL"),
	("oracle", "Oracle"),
	("postgresql", "PostgreSQL"),
	("sqlite", "SQLite"),
	("sqlserver", "Microsoft SQL Server"),
];

/// Maps the data source's product name through the provider properties.
///
/// The product name is the data source's `product-name` property, else the
/// product registered for the sub-protocol of its `url` (`jdbc:h2:mem:` is
/// `H2`). With properties, the first key contained in the product name gives
/// the id; with none, the product name itself is the id.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorDatabaseIdProvider;

impl VendorDatabaseIdProvider {
	/// Product name reported by a data source.
	pub fn product_name(data_source: &Component) -> Option<String> {
		if let Some(name) = data_source.properties.get("product-name") {
			return Some(name.clone());
		}
		let url = data_source.properties.get("url")?;
		let protocol = url.strip_prefix("jdbc:")?.split(':').next()?;
		PRODUCTS
			.iter()
			.find(|(p, _)| p.eq_ignore_ascii_case(protocol))
			.map(|(_, product)| (*product).to_string())
	}
}

impl DatabaseIdProvider for VendorDatabaseIdProvider {
	fn database_id(
		&self,
		environment: &Environment,
		properties: &IndexMap<String, String>,
	) -> Option<String> {
		let Some(product) = Self::product_name(&environment.data_source) else {
			tracing::warn!(
				environment = %environment.id,
				"could not determine database product name"
			);
			return None;
		};
		if properties.is_empty() {
			return Some(product);
		}
		properties
			.iter()
			.find(|(key, _)| product.contains(key.as_str()))
			.map(|(_, id)| id.clone())
	}
}
