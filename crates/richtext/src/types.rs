/// Attribute list as tokenized: declaration order preserved, names lowercase,
/// `None` for valueless attributes.
pub type AttrList = Vec<(String, Option<String>)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: AttrList,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

/// First value declared for `name`, if any. A valueless attribute reads as
/// absent here.
pub fn attr_value<'a>(attributes: &'a [(String, Option<String>)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(attr, _)| attr == name)
        .and_then(|(_, value)| value.as_deref())
}

/// Whether `name` is declared at all, with or without a value.
pub fn has_attr(attributes: &[(String, Option<String>)], name: &str) -> bool {
    attributes.iter().any(|(attr, _)| attr == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, Option<&str>)]) -> AttrList {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn attr_value_returns_first_declaration() {
        let a = attrs(&[("href", Some("one")), ("href", Some("two"))]);
        assert_eq!(attr_value(&a, "href"), Some("one"));
    }

    #[test]
    fn valueless_attr_is_present_but_has_no_value() {
        let a = attrs(&[("disabled", None)]);
        assert!(has_attr(&a, "disabled"));
        assert_eq!(attr_value(&a, "disabled"), None);
    }

    #[test]
    fn missing_attr() {
        let a = attrs(&[("type", Some("hidden"))]);
        assert!(!has_attr(&a, "name"));
        assert_eq!(attr_value(&a, "name"), None);
    }
}
