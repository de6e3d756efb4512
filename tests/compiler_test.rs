use comfygen::compiler::seed::SeedStrategy;
use comfygen::compiler::template::{Slot, SlotValues, TemplateSlots, WorkflowTemplate};
use comfygen::dsl::builder::GraphBuilder;
use comfygen::error::TemplateError;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn test_instantiate_fills_text_to_image_slots() {
    let template = WorkflowTemplate::text_to_image();
    let graph = template.instantiate(&SlotValues {
        positive: Some("a lighthouse at dusk".to_string()),
        negative: Some("blurry".to_string()),
        seed: Some(1234),
        image: None,
    }).expect("Instantiation failed");

    assert_eq!(graph.node("6").unwrap().literal("text"), Some(&json!("a lighthouse at dusk")));
    assert_eq!(graph.node("7").unwrap().literal("text"), Some(&json!("blurry")));
    assert_eq!(graph.node("3").unwrap().literal("seed"), Some(&json!(1234)));
    assert_eq!(graph.node("4").unwrap().literal("ckpt_name"), Some(&json!("realvisxlV50_v50LightningBakedvae.safetensors")));
    assert_eq!(graph.node("5").unwrap().literal("width"), Some(&json!(1024)));

    // The template itself stays untouched
    assert_eq!(template.graph.node("6").unwrap().literal("text"), Some(&json!("")));
    assert_eq!(template.graph.node("3").unwrap().literal("seed"), Some(&json!(0)));
}

#[test]
fn test_empty_prompts_are_accepted() {
    let graph = WorkflowTemplate::text_to_image()
        .instantiate(&SlotValues {
            positive: Some(String::new()),
            negative: Some(String::new()),
            seed: Some(1),
            image: None,
        })
        .expect("Empty prompts are valid text");
    assert_eq!(graph.node("6").unwrap().literal("text"), Some(&json!("")));
}

#[test]
fn test_unset_values_keep_template_defaults() {
    let graph = WorkflowTemplate::text_to_image()
        .instantiate(&SlotValues::default())
        .unwrap();
    assert_eq!(graph, WorkflowTemplate::text_to_image().graph);
}

#[test]
fn test_image_slot_is_written() {
    let graph = GraphBuilder::new()
        .node("3", "KSampler")
            .input("seed", 1)
            .link("latent_image", "12", 0)
            .build()
        .node("10", "LoadImage")
            .input("image", "old.jpg")
            .build()
        .node("12", "VAEEncode")
            .link("pixels", "10", 0)
            .build()
        .build();
    let template = WorkflowTemplate::new(graph, TemplateSlots {
        image: Some(Slot::new("10", "image")),
        ..TemplateSlots::image_to_image()
    });

    let graph = template.instantiate(&SlotValues {
        seed: Some(99),
        image: Some("test_api.jpg".to_string()),
        ..SlotValues::default()
    }).unwrap();

    assert_eq!(graph.node("10").unwrap().literal("image"), Some(&json!("test_api.jpg")));
    assert_eq!(graph.node("3").unwrap().literal("seed"), Some(&json!(99)));
}

#[test]
fn test_slot_on_missing_node_fails() {
    let template = WorkflowTemplate::new(
        WorkflowTemplate::text_to_image().graph,
        TemplateSlots {
            seed: Some(Slot::new("42", "seed")),
            ..TemplateSlots::default()
        },
    );

    let err = template.instantiate(&SlotValues { seed: Some(1), ..SlotValues::default() }).unwrap_err();
    assert!(matches!(err, TemplateError::MissingSlot { slot: "seed", ref node } if node == "42"));
}

#[test]
fn test_slot_on_missing_input_fails() {
    let template = WorkflowTemplate::new(
        WorkflowTemplate::text_to_image().graph,
        TemplateSlots {
            positive: Some(Slot::new("6", "prompt")),
            ..TemplateSlots::default()
        },
    );

    let err = template.instantiate(&SlotValues {
        positive: Some("x".to_string()),
        ..SlotValues::default()
    }).unwrap_err();
    assert!(matches!(err, TemplateError::MissingInput { slot: "positive", .. }));
}

#[test]
fn test_broken_template_fails_validation() {
    let graph = GraphBuilder::new()
        .node("8", "VAEDecode")
            .link("samples", "3", 0)
            .build()
        .build();
    let template = WorkflowTemplate::new(graph, TemplateSlots::default());

    let err = template.instantiate(&SlotValues::default()).unwrap_err();
    assert!(matches!(err, TemplateError::Graph(_)));
}

#[test]
fn test_random_seeds_stay_in_range() {
    let strategy = SeedStrategy::default();
    for _ in 0..10_000 {
        let seed = strategy.next_seed();
        assert!((1..=1_500_000).contains(&seed), "seed {seed} out of range");
    }
}

#[test]
fn test_degenerate_random_range() {
    let strategy = SeedStrategy::Random { min: 7, max: 7 };
    assert_eq!(strategy.next_seed(), 7);

    let reversed = SeedStrategy::Random { min: 10, max: 5 };
    assert!((5..=10).contains(&reversed.next_seed()));
}

#[test]
fn test_clock_and_fixed_seeds() {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let seed = SeedStrategy::Clock.next_seed();
    assert!(seed >= now && seed <= now + 1);

    assert_eq!(SeedStrategy::Fixed(31337).next_seed(), 31337);
}
