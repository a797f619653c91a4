//! Resolved mapping artifacts.
//!
//! Everything in this module is immutable once registered and shared through
//! `Arc`. Construction (validation, type inference, namespace qualification)
//! lives in the [builder assistant](crate::assistant).

mod parameter;
mod result;
mod statement;

pub use self::parameter::{ParameterMap, ParameterMapping, ParameterMode};
pub use self::result::{
	AutoMapping, Discriminator, MappingFlags, ResultMap, ResultMapping, ResultMappingSpec,
};
pub use self::statement::{
	ResultSetType, SqlFragment, Statement, StatementKind, StatementType,
};

#[cfg(test)]
mod tests;
