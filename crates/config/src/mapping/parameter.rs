use std::sync::Arc;

use strum::{Display, EnumString};

use crate::types::{JdbcType, TypeDescriptor};

/// Direction of a stored-procedure parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ParameterMode {
	#[default]
	In,
	Out,
	Inout,
}

/// One parameter binding of a legacy parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
	pub property: String,
	pub java_type: String,
	pub jdbc_type: Option<JdbcType>,
	pub mode: ParameterMode,
	/// Qualified result map for `CURSOR` out parameters.
	pub result_map: Option<String>,
	pub type_handler: Option<String>,
	pub numeric_scale: Option<i32>,
}

/// Legacy parameter map (`parameter-map`), or the inline map generated for a
/// statement's `parameter-type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMap {
	pub id: String,
	pub parameter_type: Option<Arc<TypeDescriptor>>,
	pub mappings: Vec<ParameterMapping>,
}
