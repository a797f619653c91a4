use pretty_assertions::assert_eq;

use crate::error::NodeError;
use crate::reader::read_root;
use crate::vars::Variables;

fn parse(input: &str) -> crate::Node {
	read_root(input, "root", &Variables::new()).unwrap()
}

#[test]
fn typed_accessors() {
	let node = parse(r#"root flag=#true count="12" big=9000000000 ratio="x""#);
	assert_eq!(node.bool_attr("flag").unwrap(), Some(true));
	assert_eq!(node.bool_attr_or("missing", false).unwrap(), false);
	assert_eq!(node.int_attr("count").unwrap(), Some(12));
	assert_eq!(node.long_attr("big").unwrap(), Some(9_000_000_000));

	let err = node.int_attr("ratio").unwrap_err();
	assert!(matches!(
		err,
		NodeError::InvalidAttribute { ref attribute, .. } if attribute == "ratio"
	));
}

#[test]
fn required_attribute_names_element() {
	let node = parse("root");
	let err = node.required_attr("namespace").unwrap_err();
	assert_eq!(err.to_string(), "<root> requires attribute 'namespace'");
}

#[test]
fn properties_accept_both_spellings() {
	let node = parse(
		r#"root {
    driver "org.h2.Driver"
    property name="url" value="jdbc:h2:mem:"
    empty
}"#,
	);
	let props = node.children_as_properties();
	assert_eq!(
		props.into_iter().collect::<Vec<_>>(),
		vec![
			("driver".to_string(), "org.h2.Driver".to_string()),
			("url".to_string(), "jdbc:h2:mem:".to_string()),
		]
	);
}

#[test]
fn identifier_uses_value_then_property() {
	let node = parse(
		r#"root {
    discriminator column="kind" {
        case value="a.b" {
            association property="owner"
        }
    }
}"#,
	);
	let case = node.child("discriminator").unwrap().child("case").unwrap();
	assert_eq!(case.value_based_identifier(), "root_discriminator_case[a_b]");
	assert_eq!(
		case.child("association").unwrap().value_based_identifier(),
		"root_discriminator_case[a_b]_association[owner]"
	);
}

#[test]
fn attributes_keep_declaration_order() {
	let node = parse(r#"root b="2" a="1" c="3""#);
	let names: Vec<_> = node.attributes().map(|(k, _)| k).collect();
	assert_eq!(names, vec!["b", "a", "c"]);
	assert_eq!(node.children_named("none").count(), 0);
}
