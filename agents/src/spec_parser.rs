//! Line-oriented parsers for the declarative inputs: path listings, event
//! operation listings and the two-level run configuration.
//!
//! None of the parsers fail on malformed input. Lines they do not recognize are
//! skipped; only the file wrappers can return an error, and only for I/O.

use crate::error::AgentError;
use crate::error::AgentResult;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::Path;

const PATH_SEPARATOR: char = '/';
const COMMENT_MARKER: char = '#';
const TOPIC_MARKER: &str = "topic:";

/// Endpoint path to the method names declared under it, in first-seen path order.
pub type RouteTable = IndexMap<String, Vec<String>>;

/// Operation name to the topic it publishes on. Operations declared without a
/// `topic:` line are absent.
pub type OperationTable = IndexMap<String, String>;

/// Values allowed inside a nested configuration map.
pub type ConfigMap = IndexMap<String, ConfigScalar>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    Bool(bool),
    Text(String),
}

impl ConfigScalar {
    /// `true`/`false` in any letter case become booleans; everything else stays text.
    pub fn coerce(value: &str) -> Self {
        if value.eq_ignore_ascii_case("true") {
            Self::Bool(true)
        } else if value.eq_ignore_ascii_case("false") {
            Self::Bool(false)
        } else {
            Self::Text(value.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(ConfigScalar),
    Map(ConfigMap),
}

/// Two-level key/value tree produced by [`parse_config_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    entries: IndexMap<String, ConfigValue>,
}

impl ConfigTree {
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn scalar(&self, key: &str) -> Option<&ConfigScalar> {
        match self.entries.get(key)? {
            ConfigValue::Scalar(scalar) => Some(scalar),
            ConfigValue::Map(_) => None,
        }
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.scalar(key).and_then(ConfigScalar::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.scalar(key).and_then(ConfigScalar::as_bool)
    }

    pub fn map(&self, key: &str) -> Option<&ConfigMap> {
        match self.entries.get(key)? {
            ConfigValue::Map(map) => Some(map),
            ConfigValue::Scalar(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

fn is_indented(raw: &str) -> bool {
    raw.starts_with([' ', '\t'])
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT_MARKER)
}

/// Collects `/path:` blocks and the colon-terminated method lines under them.
pub fn parse_path_listing(text: &str) -> RouteTable {
    let mut routes = RouteTable::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if is_skippable(line) {
            continue;
        }
        let Some(head) = line.strip_suffix(':') else {
            continue;
        };
        if line.starts_with(PATH_SEPARATOR) {
            routes.insert(head.to_string(), Vec::new());
            current = Some(head.to_string());
        } else if let Some(methods) = current.as_deref().and_then(|path| routes.get_mut(path)) {
            // Methods form a set; a repeated line keeps its first position.
            if !methods.iter().any(|method| method == head) {
                methods.push(head.to_string());
            }
        }
    }

    routes
}

/// Collects operations and their topics. A later `topic:` line under the same
/// operation overwrites the earlier one.
pub fn parse_operation_listing(text: &str) -> OperationTable {
    let mut operations = OperationTable::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if is_skippable(line) {
            continue;
        }
        if !is_indented(raw) {
            if let Some(name) = line.strip_suffix(':') {
                current = Some(name.to_string());
            }
            continue;
        }
        let Some(operation) = current.as_deref() else {
            continue;
        };
        if !line.contains(TOPIC_MARKER) {
            continue;
        }
        if let Some((_, topic)) = line.split_once(':') {
            operations.insert(operation.to_string(), topic.trim().to_string());
        }
    }

    operations
}

/// Parses the run configuration. Only "indented" versus "not indented" is
/// distinguished, so any depth of indentation lands in the most recently opened
/// nested map.
pub fn parse_config_tree(text: &str) -> ConfigTree {
    let mut tree = ConfigTree::default();
    let mut active: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if is_skippable(line) {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if value.is_empty() {
            tree.entries
                .insert(key.to_string(), ConfigValue::Map(ConfigMap::new()));
            active = Some(key.to_string());
            continue;
        }

        let scalar = ConfigScalar::coerce(value);
        let target = active
            .as_deref()
            .filter(|_| is_indented(raw))
            .and_then(|name| match tree.entries.get_mut(name) {
                Some(ConfigValue::Map(map)) => Some(map),
                _ => None,
            });
        match target {
            Some(map) => {
                map.insert(key.to_string(), scalar);
            }
            None => {
                tree.entries
                    .insert(key.to_string(), ConfigValue::Scalar(scalar));
                active = None;
            }
        }
    }

    tree
}

fn read_source(path: &Path) -> AgentResult<String> {
    fs::read_to_string(path).map_err(|err| AgentError::io(path, err))
}

pub fn read_path_listing(path: &Path) -> AgentResult<RouteTable> {
    read_source(path).map(|text| parse_path_listing(&text))
}

pub fn read_operation_listing(path: &Path) -> AgentResult<OperationTable> {
    read_source(path).map(|text| parse_operation_listing(&text))
}

pub fn read_config_tree(path: &Path) -> AgentResult<ConfigTree> {
    read_source(path).map(|text| parse_config_tree(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_methods_under_their_path() {
        let routes = parse_path_listing("/items:\n  get:\n  post:\n");
        assert_eq!(routes.len(), 1);
        assert_eq!(routes["/items"], vec!["get", "post"]);
    }

    #[test]
    fn methods_attach_to_most_recent_path_only() {
        let text = "\
# listing
get:
/users:
  get:

/users/{id}:
  delete:
  patch:
  summary: not a method
";
        let routes = parse_path_listing(text);
        assert_eq!(
            routes.keys().collect::<Vec<_>>(),
            vec!["/users", "/users/{id}"]
        );
        assert_eq!(routes["/users"], vec!["get"]);
        assert_eq!(routes["/users/{id}"], vec!["delete", "patch"]);
    }

    #[test]
    fn repeated_method_is_listed_once() {
        let routes = parse_path_listing("/items:\n  get:\n  post:\n  get:\n");
        assert_eq!(routes["/items"], vec!["get".to_string(), "post".to_string()]);
    }

    #[test]
    fn reopened_path_starts_a_fresh_method_list() {
        let routes = parse_path_listing("/a:\n  get:\n/b:\n  put:\n/a:\n  post:\n");
        assert_eq!(routes["/a"], vec!["post"]);
        assert_eq!(routes["/b"], vec!["put"]);
    }

    #[test]
    fn operations_without_topic_are_absent() {
        let text = "\
userSignedUp:
  topic: users.signup
  summary: fired on signup
orderPlaced:
  summary: no topic here
";
        let operations = parse_operation_listing(text);
        assert_eq!(operations.len(), 1);
        assert_eq!(operations["userSignedUp"], "users.signup");
        assert!(!operations.contains_key("orderPlaced"));
    }

    #[test]
    fn last_topic_wins() {
        let text = "ping:\n  topic: first\n\ttopic: second\n";
        let operations = parse_operation_listing(text);
        assert_eq!(operations["ping"], "second");
    }

    #[test]
    fn topic_before_any_operation_is_dropped() {
        let operations = parse_operation_listing("  topic: orphan\nready:\n");
        assert!(operations.is_empty());
    }

    #[test]
    fn parses_run_configuration() {
        let tree = parse_config_tree(
            "openapi: a.spec\nasyncio: b.spec\nfeatures:\n  observability: true\noutput: out\n",
        );
        assert_eq!(tree.str("openapi"), Some("a.spec"));
        assert_eq!(tree.str("asyncio"), Some("b.spec"));
        assert_eq!(tree.str("output"), Some("out"));
        let features = tree.map("features").unwrap();
        assert_eq!(features.get("observability"), Some(&ConfigScalar::Bool(true)));
    }

    #[test]
    fn booleans_are_case_insensitive() {
        let tree = parse_config_tree("a: true\nb: TRUE\nc: True\nd: False\ne: yes\n");
        assert_eq!(tree.bool("a"), Some(true));
        assert_eq!(tree.bool("b"), Some(true));
        assert_eq!(tree.bool("c"), Some(true));
        assert_eq!(tree.bool("d"), Some(false));
        assert_eq!(tree.str("e"), Some("yes"));
    }

    #[test]
    fn comments_and_blank_lines_keep_nesting_open() {
        let text = "features:\n  a: 1\n\n# note\n  b: 2\nname: x\n  c: 3\n";
        let tree = parse_config_tree(text);
        let features = tree.map("features").unwrap();
        assert_eq!(features.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(tree.str("name"), Some("x"));
        // no nested target is active after `name`, so `c` lands at the top level
        assert_eq!(tree.str("c"), Some("3"));
    }

    #[test]
    fn deeper_indentation_collapses_into_active_map() {
        let text = "outer:\n  inner:\n      leaf: v\n";
        let tree = parse_config_tree(text);
        assert_eq!(tree.map("outer"), Some(&ConfigMap::new()));
        let inner = tree.map("inner").unwrap();
        assert_eq!(inner.get("leaf"), Some(&ConfigScalar::Text("v".to_string())));
    }

    #[test]
    fn splits_at_first_colon_only() {
        let tree = parse_config_tree("endpoint: http://localhost:8000\nnot a pair\n");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.str("endpoint"), Some("http://localhost:8000"));
    }

    #[test]
    fn serializes_as_plain_json() {
        let tree = parse_config_tree("output: out\nfeatures:\n  observability: false\n");
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"output": "out", "features": {"observability": false}})
        );
    }

    #[test]
    fn file_wrapper_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_config_tree(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, AgentError::Io { .. }));
    }
}
