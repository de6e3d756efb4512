use crate::dsl::WorkflowGraph;
use crate::error::GraphError;
use std::collections::{BTreeMap, VecDeque};

/// Checks that every link resolves and that the graph is acyclic.
pub fn validate(graph: &WorkflowGraph) -> Result<(), GraphError> {
    topological_order(graph).map(|_| ())
}

/// Node ids ordered so every node comes after the nodes it links to.
pub fn topological_order(graph: &WorkflowGraph) -> Result<Vec<&str>, GraphError> {
    if graph.is_empty() {
        return Err(GraphError::Empty);
    }

    // 1. Pass 1: Resolve links
    let mut in_degree: BTreeMap<&str, usize> = graph.nodes.keys().map(|id| (id.as_str(), 0)).collect();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (node, input, link) in graph.links() {
        let Some((target, _)) = graph.nodes.get_key_value(&link.0) else {
            return Err(GraphError::UnknownNode {
                node: node.to_string(),
                input: input.to_string(),
                target: link.0.clone(),
            });
        };
        dependents.entry(target.as_str()).or_default().push(node);
        *in_degree.entry(node).or_default() += 1;
    }

    // 2. Pass 2: Kahn
    let mut ready: VecDeque<&str> = in_degree.iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(id) = ready.pop_front() {
        order.push(id);
        for dependent in dependents.get(id).map(|v| v.as_slice()).unwrap_or(&[]) {
            let degree = in_degree.entry(*dependent).or_default();
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(*dependent);
            }
        }
    }

    if order.len() != graph.len() {
        let stuck = in_degree.iter()
            .find(|(_, degree)| **degree > 0)
            .map(|(id, _)| id.to_string())
            .unwrap_or_default();
        return Err(GraphError::Cycle(stuck));
    }

    Ok(order)
}
