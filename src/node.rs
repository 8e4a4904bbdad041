//! UBER tree nodes and the document envelope.
//!
//! Rendering follows UBER+JSON conventions: `false` flags, empty lists and
//! the default `read` action are omitted rather than written out.

use serde::{Serialize, Serializer};

use crate::error::BuildError;
use crate::link::Link;
use crate::types::{UberAction, UBER_VERSION};

/// Scalar payload of a leaf node.
///
/// `Null` is the explicit null-marker for a property or map entry whose
/// value was literally null; it renders as `"value": null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    Null,
    Text(String),
}

impl NodeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeValue::Null => None,
            NodeValue::Text(s) => Some(s),
        }
    }
}

impl From<String> for NodeValue {
    fn from(s: String) -> Self {
        NodeValue::Text(s)
    }
}

impl From<&str> for NodeValue {
    fn from(s: &str) -> Self {
        NodeValue::Text(s.to_string())
    }
}

/// One element of an UBER tree.
///
/// A node is either a link (non-empty `rels` and `url`), a leaf carrying a
/// `value`, or a container of further nodes in `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "rel", skip_serializing_if = "Vec::is_empty")]
    pub rels: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "is_false")]
    pub templated: bool,

    #[serde(skip_serializing_if = "UberAction::is_read")]
    pub action: UberAction,

    #[serde(skip_serializing_if = "is_false")]
    pub transclude: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sending: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accepting: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Node>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with a `name`, as created for map entries and record properties.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Link node targeting `url` under the given relation names.
    pub fn link<I, S>(url: impl Into<String>, rels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self {
            url: Some(url.into()),
            ..Self::default()
        };
        for rel in rels {
            node.add_rel(rel);
        }
        node
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<NodeValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_action(mut self, action: UberAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_templated(mut self, templated: bool) -> Self {
        self.templated = templated;
        self
    }

    pub fn with_transclude(mut self, transclude: bool) -> Self {
        self.transclude = transclude;
        self
    }

    pub fn with_sending(mut self, sending: Vec<String>) -> Self {
        self.sending = sending;
        self
    }

    pub fn with_accepting(mut self, accepting: Vec<String>) -> Self {
        self.accepting = accepting;
        self
    }

    /// Add a relation name, ignoring duplicates.
    pub fn add_rel(&mut self, rel: impl Into<String>) {
        let rel = rel.into();
        if !self.rels.contains(&rel) {
            self.rels.push(rel);
        }
    }

    /// Append `child` to `data` and return it for further filling.
    pub fn push_child(&mut self, child: Node) -> &mut Node {
        self.data.push(child);
        let last = self.data.len() - 1;
        &mut self.data[last]
    }

    /// True when this node represents a navigable relation.
    pub fn is_link(&self) -> bool {
        !self.rels.is_empty() && self.url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// One link per relation name of this node; empty for non-link nodes.
    pub fn links(&self) -> Vec<Link> {
        let Some(url) = self.url.as_deref() else {
            return Vec::new();
        };
        if !self.is_link() {
            return Vec::new();
        }
        self.rels.iter().map(|rel| Link::new(url, rel.as_str())).collect()
    }
}

/// Top-level UBER document.
///
/// Serializes as `{"uber": {"version": "1.0", "data": [...]}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct UberDocument {
    pub version: String,
    pub data: Vec<Node>,
    pub error: Option<Vec<Node>>,
}

impl UberDocument {
    pub fn new(data: Vec<Node>) -> Self {
        Self {
            version: UBER_VERSION.to_string(),
            data,
            error: None,
        }
    }

    /// Render as a JSON value.
    pub fn to_json_value(&self) -> Result<serde_json::Value, BuildError> {
        serde_json::to_value(self).map_err(|source| BuildError::Serialize { source })
    }

    /// Render as compact JSON text.
    pub fn to_json_string(&self) -> Result<String, BuildError> {
        serde_json::to_string(self).map_err(|source| BuildError::Serialize { source })
    }

    /// Render as indented JSON text.
    pub fn to_json_string_pretty(&self) -> Result<String, BuildError> {
        serde_json::to_string_pretty(self).map_err(|source| BuildError::Serialize { source })
    }

    /// All link nodes directly under the document root.
    pub fn link_nodes(&self) -> impl Iterator<Item = &Node> {
        self.data.iter().filter(|node| node.is_link())
    }
}

impl Default for UberDocument {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    uber: Body<'a>,
}

#[derive(Serialize)]
struct Body<'a> {
    version: &'a str,
    #[serde(skip_serializing_if = "no_nodes")]
    data: &'a [Node],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a [Node]>,
}

fn no_nodes(data: &&[Node]) -> bool {
    data.is_empty()
}

impl Serialize for UberDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Envelope {
            uber: Body {
                version: &self.version,
                data: &self.data,
                error: self.error.as_deref(),
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_node_renders_as_empty_object() {
        assert_eq!(serde_json::to_value(Node::new()).unwrap(), json!({}));
    }

    #[test]
    fn false_flags_are_omitted() {
        let node = Node::named("x").with_templated(false).with_transclude(false);
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"name": "x"}));

        let node = Node::named("x").with_templated(true).with_transclude(true);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"name": "x", "templated": true, "transclude": true})
        );
    }

    #[test]
    fn read_action_is_omitted() {
        let node = Node::link("/a", ["self"]).with_action(UberAction::Read);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"rel": ["self"], "url": "/a"})
        );

        let node = Node::link("/a", ["edit"]).with_action(UberAction::Replace);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"rel": ["edit"], "url": "/a", "action": "replace"})
        );
    }

    #[test]
    fn empty_lists_are_omitted() {
        let node = Node {
            rels: Vec::new(),
            data: Vec::new(),
            sending: Vec::new(),
            ..Node::named("n")
        };
        let rendered = serde_json::to_value(&node).unwrap();
        assert!(rendered.get("rel").is_none());
        assert!(rendered.get("data").is_none());
        assert!(rendered.get("sending").is_none());
    }

    #[test]
    fn null_marker_renders_explicit_null() {
        let node = Node::named("missing").with_value(NodeValue::Null);
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"name":"missing","value":null}"#
        );
    }

    #[test]
    fn fields_render_in_uber_order() {
        let mut node = Node::link("/orders{?q}", ["search"])
            .with_id("o")
            .with_label("Orders")
            .with_templated(true)
            .with_action(UberAction::Append)
            .with_model(Some("q={q}".into()))
            .with_sending(vec!["application/json".into()])
            .with_accepting(vec!["text/plain".into()])
            .with_value("v");
        node.name = Some("orders".into());
        node.push_child(Node::named("child"));

        let rendered = serde_json::to_string(&node).unwrap();
        let keys = [
            "\"id\"", "\"name\"", "\"label\"", "\"rel\"", "\"url\"", "\"templated\"",
            "\"action\"", "\"model\"", "\"sending\"", "\"accepting\"", "\"value\"", "\"data\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| rendered.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", rendered);
    }

    #[test]
    fn is_link_requires_rels_and_url() {
        assert!(Node::link("/a", ["self"]).is_link());
        assert!(!Node::link("/a", Vec::<String>::new()).is_link());
        assert!(!Node::link("", ["self"]).is_link());

        let mut node = Node::named("plain");
        node.url = Some("/a".into());
        assert!(!node.is_link());
        assert!(node.links().is_empty());
    }

    #[test]
    fn add_rel_keeps_set_semantics() {
        let mut node = Node::link("/a", ["self", "item", "self"]);
        node.add_rel("item");
        assert_eq!(node.rels, vec!["self", "item"]);

        let links = node.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].href(), "/a");
        assert_eq!(links[1].rels(), ["item"]);
    }

    #[test]
    fn value_text() {
        assert_eq!(NodeValue::from("bolt").as_str(), Some("bolt"));
        assert_eq!(NodeValue::from(String::from("5")).as_str(), Some("5"));
        assert_eq!(NodeValue::Null.as_str(), None);
    }

    #[test]
    fn document_link_nodes_skip_data_nodes() {
        let doc = UberDocument::new(vec![
            Node::link("/widgets", ["self"]),
            Node::named("count").with_value("2"),
            Node::link("/widgets?page=2", ["next"]),
            Node::link("", ["broken"]),
        ]);
        let urls: Vec<_> = doc
            .link_nodes()
            .map(|node| node.url.as_deref().unwrap())
            .collect();
        assert_eq!(urls, vec!["/widgets", "/widgets?page=2"]);

        assert_eq!(UberDocument::default().link_nodes().count(), 0);
    }

    #[test]
    fn document_envelope() {
        let doc = UberDocument::new(vec![Node::named("a").with_value("1")]);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"uber": {"version": "1.0", "data": [{"name": "a", "value": "1"}]}})
        );

        assert_eq!(
            doc.to_json_string().unwrap(),
            r#"{"uber":{"version":"1.0","data":[{"name":"a","value":"1"}]}}"#
        );
        assert!(doc.to_json_string_pretty().unwrap().contains("\n"));

        let empty = UberDocument::default();
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            json!({"uber": {"version": "1.0"}})
        );
    }
}
