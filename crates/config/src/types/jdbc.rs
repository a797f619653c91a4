use strum::{Display, EnumString};

use crate::error::{ConfigError, Result};

/// SQL column types, spelled as in `java.sql.Types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum JdbcType {
	Array,
	Bit,
	Tinyint,
	Smallint,
	Integer,
	Bigint,
	Float,
	Real,
	Double,
	Numeric,
	Decimal,
	Char,
	Varchar,
	Longvarchar,
	Date,
	Time,
	Timestamp,
	Binary,
	Varbinary,
	Longvarbinary,
	Null,
	Other,
	Blob,
	Clob,
	Boolean,
	Cursor,
	Undefined,
	Nvarchar,
	Nchar,
	Nclob,
	Struct,
	#[strum(serialize = "JAVA_OBJECT")]
	JavaObject,
	Distinct,
	Ref,
	Datalink,
	Rowid,
	Longnvarchar,
	Sqlxml,
	Datetimeoffset,
	#[strum(serialize = "TIME_WITH_TIMEZONE")]
	TimeWithTimezone,
	#[strum(serialize = "TIMESTAMP_WITH_TIMEZONE")]
	TimestampWithTimezone,
}

/// Parses an optional JDBC type name.
pub fn parse_jdbc_type(raw: Option<&str>) -> Result<Option<JdbcType>> {
	raw.map(|name| {
		name.trim()
			.parse::<JdbcType>()
			.map_err(|_| ConfigError::UnknownJdbcType(name.to_string()))
	})
	.transpose()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case::plain("VARCHAR", JdbcType::Varchar)]
	#[case::joined("LONGVARCHAR", JdbcType::Longvarchar)]
	#[case::underscored("JAVA_OBJECT", JdbcType::JavaObject)]
	#[case::timezone("TIMESTAMP_WITH_TIMEZONE", JdbcType::TimestampWithTimezone)]
	fn parses_names(#[case] raw: &str, #[case] expected: JdbcType) {
		assert_eq!(parse_jdbc_type(Some(raw)).unwrap(), Some(expected));
		assert_eq!(expected.to_string(), raw);
	}

	#[test]
	fn rejects_unknown_names() {
		assert!(matches!(
			parse_jdbc_type(Some("VARCHAR2")),
			Err(ConfigError::UnknownJdbcType(ref n)) if n == "VARCHAR2"
		));
		assert_eq!(parse_jdbc_type(None).unwrap(), None);
	}
}
