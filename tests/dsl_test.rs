use comfygen::compiler::core::{topological_order, validate};
use comfygen::compiler::template::WorkflowTemplate;
use comfygen::dsl::builder::GraphBuilder;
use comfygen::dsl::{InputValue, Link, WorkflowGraph};
use comfygen::error::GraphError;
use serde_json::json;

#[test]
fn test_build_linear_graph() {
    let graph = GraphBuilder::new()
        .node("1", "CheckpointLoaderSimple")
            .input("ckpt_name", "model.safetensors")
            .build()
        .node("2", "CLIPTextEncode")
            .input("text", "a cat")
            .link("clip", "1", 1)
            .build()
        .build();

    assert_eq!(graph.len(), 2);
    let encode = graph.node("2").expect("Node not found");
    assert_eq!(encode.class_type, "CLIPTextEncode");
    assert_eq!(encode.literal("text"), Some(&json!("a cat")));
    assert_eq!(encode.inputs.get("clip"), Some(&InputValue::Link(Link("1".to_string(), 1))));
    assert!(validate(&graph).is_ok());
}

#[test]
fn test_graph_serializes_to_api_format() {
    let graph = GraphBuilder::new()
        .node("4", "CheckpointLoaderSimple")
            .input("ckpt_name", "m.safetensors")
            .build()
        .node("8", "VAEDecode")
            .link("vae", "4", 2)
            .build()
        .build();

    let value = serde_json::to_value(&graph).unwrap();
    assert_eq!(value, json!({
        "4": { "inputs": { "ckpt_name": "m.safetensors" }, "class_type": "CheckpointLoaderSimple" },
        "8": { "inputs": { "vae": ["4", 2] }, "class_type": "VAEDecode" }
    }));
}

#[test]
fn test_graph_deserializes_links_and_literals() {
    let graph: WorkflowGraph = serde_json::from_value(json!({
        "3": {
            "inputs": { "seed": 5, "cfg": 7.5, "model": ["4", 0], "sampler_name": "euler" },
            "class_type": "KSampler"
        },
        "4": { "inputs": {}, "class_type": "CheckpointLoaderSimple" }
    })).unwrap();

    let sampler = graph.node("3").unwrap();
    assert_eq!(sampler.inputs["model"], InputValue::Link(Link("4".to_string(), 0)));
    assert_eq!(sampler.literal("seed"), Some(&json!(5)));
    assert_eq!(sampler.literal("cfg"), Some(&json!(7.5)));
    assert_eq!(sampler.literal("model"), None);
    assert!(validate(&graph).is_ok());
}

#[test]
fn test_unknown_link_target_is_rejected() {
    let graph = GraphBuilder::new()
        .node("8", "VAEDecode")
            .link("samples", "3", 0)
            .build()
        .build();

    assert_eq!(validate(&graph), Err(GraphError::UnknownNode {
        node: "8".to_string(),
        input: "samples".to_string(),
        target: "3".to_string(),
    }));
}

#[test]
fn test_cycle_is_rejected() {
    let graph = GraphBuilder::new()
        .node("a", "Loop")
            .link("x", "b", 0)
            .build()
        .node("b", "Loop")
            .link("x", "a", 0)
            .build()
        .node("c", "Standalone")
            .build()
        .build();

    assert!(matches!(validate(&graph), Err(GraphError::Cycle(_))));
}

#[test]
fn test_self_link_is_a_cycle() {
    let graph = GraphBuilder::new()
        .node("1", "Feedback")
            .link("input", "1", 0)
            .build()
        .build();

    assert_eq!(validate(&graph), Err(GraphError::Cycle("1".to_string())));
}

#[test]
fn test_empty_graph_is_rejected() {
    assert_eq!(validate(&WorkflowGraph::new()), Err(GraphError::Empty));
}

#[test]
fn test_builtin_template_links_are_closed_and_ordered() {
    let graph = WorkflowTemplate::text_to_image().graph;
    assert_eq!(graph.len(), 7);

    for (node, input, link) in graph.links() {
        assert!(graph.node(&link.0).is_some(), "{node}.{input} links to missing {}", link.0);
    }

    let order = topological_order(&graph).expect("Template must be a DAG");
    let position = |id: &str| order.iter().position(|n| *n == id).unwrap();
    for (node, _, link) in graph.links() {
        assert!(position(&link.0) < position(node));
    }
    assert_eq!(order.first(), Some(&"4"));
    assert_eq!(order.last(), Some(&"9"));
}
