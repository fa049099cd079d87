// streetimport-core/src/domain/configuration/settings.rs

use serde_json::{Map, Value};

use crate::domain::error::DomainError;

/// Address of a setting: a flat key or an ordered list of nested keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingPath(Vec<String>);

impl SettingPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Splits a dotted string (`contact.identifier_column`) into segments.
    pub fn dotted(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<&str> for SettingPath {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl From<String> for SettingPath {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<&[&str]> for SettingPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SettingPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for SettingPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Descends into nested mappings. `None` as soon as a segment is absent.
pub fn get_path<'a>(tree: &'a Value, path: &SettingPath) -> Option<&'a Value> {
    if path.0.is_empty() {
        return None;
    }
    path.0
        .iter()
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

/// Writes `value` at `path`, creating intermediate mappings.
/// A scalar found where a mapping is needed is replaced by an empty mapping.
pub fn set_path(tree: &mut Value, path: &SettingPath, value: Value) -> Result<(), DomainError> {
    if path.0.is_empty() {
        return Err(DomainError::EmptySettingPath);
    }
    insert_at(tree, &path.0, value);
    Ok(())
}

/// Scalar or missing intermediates become mappings on the way down.
fn insert_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_then_get_nested() {
        let mut tree = json!({});
        set_path(&mut tree, &["a", "b"].into(), json!(5)).unwrap();

        assert_eq!(get_path(&tree, &["a", "b"].into()), Some(&json!(5)));
        assert_eq!(get_path(&tree, &["a", "c"].into()), None);
    }

    #[test]
    fn test_flat_key() {
        let mut tree = json!({});
        set_path(&mut tree, &"delimiter".into(), json!(",")).unwrap();
        assert_eq!(tree, json!({"delimiter": ","}));
    }

    #[test]
    fn test_scalar_parent_is_replaced() {
        let mut tree = json!({"a": 1});
        set_path(&mut tree, &["a", "b"].into(), json!(true)).unwrap();
        assert_eq!(tree, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_scalar_root_and_siblings() {
        let mut tree = json!("legacy");
        set_path(&mut tree, &["a", "b"].into(), json!(1)).unwrap();
        set_path(&mut tree, &["a", "c"].into(), json!(2)).unwrap();
        assert_eq!(tree, json!({"a": {"b": 1, "c": 2}}));
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut tree = json!({});
        let path = SettingPath::from(Vec::<String>::new());
        assert!(matches!(
            set_path(&mut tree, &path, json!(1)),
            Err(DomainError::EmptySettingPath)
        ));
        assert_eq!(get_path(&tree, &path), None);
    }

    #[test]
    fn test_dotted_path() {
        let path = SettingPath::dotted("contact.identifier_column");
        assert_eq!(path.segments(), ["contact", "identifier_column"]);
    }
}
