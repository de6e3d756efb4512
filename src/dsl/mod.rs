pub mod builder;

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Backend API-format workflow: node id -> node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WorkflowGraph {
    pub nodes: BTreeMap<String, NodeSpec>,
}

/// One operation in the graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    #[serde(default)]
    pub inputs: BTreeMap<String, InputValue>,
    pub class_type: String,
}

/// Reference to output `1` of node `0`, serialized as `["4", 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Link(pub String, pub u32);

/// A node input: either a link to another node's output or a literal.
///
/// Any two-element `[string, integer]` array is read as a link, which is
/// how the backend itself interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InputValue {
    Link(Link),
    Literal(Value),
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        InputValue::Literal(value)
    }
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeSpec> {
        self.nodes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All `(node id, input name, link)` triples in the graph.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str, &Link)> {
        self.nodes.iter().flat_map(|(id, node)| {
            node.inputs.iter().filter_map(move |(name, value)| match value {
                InputValue::Link(link) => Some((id.as_str(), name.as_str(), link)),
                InputValue::Literal(_) => None,
            })
        })
    }
}

impl NodeSpec {
    pub fn new(class_type: &str) -> Self {
        Self {
            inputs: BTreeMap::new(),
            class_type: class_type.to_string(),
        }
    }

    pub fn literal(&self, input: &str) -> Option<&Value> {
        match self.inputs.get(input) {
            Some(InputValue::Literal(v)) => Some(v),
            _ => None,
        }
    }
}
