use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use crate::compiler::template::{TemplateSlots, WorkflowTemplate};
use crate::dsl::WorkflowGraph;

pub fn load_graph_from_json(file_path: &Path) -> Result<WorkflowGraph> {
    let json_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read workflow file from {}", file_path.display()))?;

    let graph: WorkflowGraph = serde_json::from_str(&json_content)
        .with_context(|| format!("Failed to deserialize workflow JSON from {}", file_path.display()))?;

    Ok(graph)
}

/// Load an API-format workflow export and attach `slots` to it.
pub fn load_template_from_json(file_path: &Path, slots: TemplateSlots) -> Result<WorkflowTemplate> {
    let graph = load_graph_from_json(file_path)?;
    Ok(WorkflowTemplate::new(graph, slots))
}
