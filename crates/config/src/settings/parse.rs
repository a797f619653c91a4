//! Setting value conversion and name suggestions.
//!
//! Values arrive as text: KDL booleans and numbers are rendered before they
//! reach [`Settings::set`](super::Settings::set). Each converter returns the
//! reason carried by [`ConfigError::InvalidSetting`](crate::ConfigError) on
//! failure.

use std::str::FromStr;

use super::KNOWN_SETTINGS;

/// Converts a switch such as `cacheEnabled`. Only `true` and `false` are
/// accepted, in any case.
pub(super) fn switch(value: &str) -> Result<bool, &'static str> {
	let value = value.trim();
	if value.eq_ignore_ascii_case("true") {
		Ok(true)
	} else if value.eq_ignore_ascii_case("false") {
		Ok(false)
	} else {
		Err("expected true or false")
	}
}

/// Converts a count or duration such as `defaultFetchSize`.
pub(super) fn count(value: &str) -> Result<i64, &'static str> {
	value.trim().parse().map_err(|_| "expected an integer")
}

/// Converts an enumerated setting by its upper-case name.
pub(super) fn variant<T: FromStr>(value: &str) -> Result<T, &'static str> {
	value.trim().parse().map_err(|_| "not a recognized name for this setting")
}

/// Suggests the closest known setting name.
pub fn suggest_setting(name: &str) -> Option<String> {
	KNOWN_SETTINGS
		.iter()
		.min_by_key(|k| strsim::levenshtein(name, k))
		.filter(|k| strsim::levenshtein(name, k) <= 3)
		.map(|k| (*k).to_string())
}
