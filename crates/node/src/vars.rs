//! `${name}` variable substitution.

use std::borrow::Cow;

use indexmap::IndexMap;

/// Named values substituted into attribute and body text while reading.
pub type Variables = IndexMap<String, String>;

/// Replaces every `${name}` whose name is present in `vars`.
///
/// Unknown placeholders and unterminated `${` sequences are kept verbatim, so
/// runtime parameter markers such as `#{id}` or `${column}` pass through.
pub fn substitute<'a>(text: &'a str, vars: &Variables) -> Cow<'a, str> {
	if vars.is_empty() || !text.contains("${") {
		return Cow::Borrowed(text);
	}

	let mut out = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		let Some(end) = after.find('}') else {
			out.push_str(&rest[start..]);
			return Cow::Owned(out);
		};
		let key = &after[..end];
		match vars.get(key) {
			Some(value) => out.push_str(value),
			None => out.push_str(&rest[start..start + 2 + end + 1]),
		}
		rest = &after[end + 1..];
	}
	out.push_str(rest);
	Cow::Owned(out)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn vars(pairs: &[(&str, &str)]) -> Variables {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn replaces_known_variables() {
		let vars = vars(&[("schema", "blog"), ("table", "author")]);
		assert_eq!(
			substitute("select * from ${schema}.${table}", &vars),
			"select * from blog.author"
		);
	}

	#[test]
	fn keeps_unknown_and_parameter_markers() {
		let vars = vars(&[("schema", "blog")]);
		assert_eq!(
			substitute("where id = #{id} order by ${column}", &vars),
			"where id = #{id} order by ${column}"
		);
	}

	#[test]
	fn keeps_unterminated_placeholder() {
		let vars = vars(&[("a", "1")]);
		assert_eq!(substitute("x ${a} ${b", &vars), "x 1 ${b");
	}

	#[test]
	fn borrows_when_nothing_to_do() {
		let vars = Variables::new();
		assert!(matches!(substitute("${a}", &vars), Cow::Borrowed(_)));
	}
}
