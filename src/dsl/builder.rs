use crate::dsl::{WorkflowGraph, NodeSpec, InputValue, Link};
use serde_json::Value;

pub struct GraphBuilder {
    pub graph: WorkflowGraph, // Public so tests can break invariants on purpose
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: WorkflowGraph::new(),
        }
    }

    pub fn node(self, id: &str, class_type: &str) -> NodeBuilder {
        NodeBuilder {
            graph_builder: self,
            id: id.to_string(),
            spec: NodeSpec::new(class_type),
        }
    }

    pub fn build(self) -> WorkflowGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct NodeBuilder {
    graph_builder: GraphBuilder,
    id: String,
    spec: NodeSpec,
}

impl NodeBuilder {
    pub fn input(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.spec.inputs.insert(name.to_string(), InputValue::Literal(value.into()));
        self
    }

    /// 连接到另一个节点的输出
    pub fn link(mut self, name: &str, source: &str, output: u32) -> Self {
        self.spec.inputs.insert(name.to_string(), InputValue::Link(Link(source.to_string(), output)));
        self
    }

    pub fn build(mut self) -> GraphBuilder {
        self.graph_builder.graph.nodes.insert(self.id, self.spec);
        self.graph_builder
    }
}
