use crate::compiler::core::validate;
use crate::dsl::builder::GraphBuilder;
use crate::dsl::{InputValue, WorkflowGraph};
use crate::error::TemplateError;
use serde::{Serialize, Deserialize};
use serde_json::{Value, json};

pub const DEFAULT_CHECKPOINT: &str = "realvisxlV50_v50LightningBakedvae.safetensors";

/// Location of a substitutable value inside a template graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub node: String,
    pub input: String,
}

impl Slot {
    pub fn new(node: &str, input: &str) -> Self {
        Self {
            node: node.to_string(),
            input: input.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSlots {
    pub positive: Option<Slot>,
    pub negative: Option<Slot>,
    pub seed: Option<Slot>,
    pub image: Option<Slot>,
}

impl TemplateSlots {
    /// Slots of an API-format image-to-image export: only the sampler seed.
    pub fn image_to_image() -> Self {
        Self {
            seed: Some(Slot::new("3", "seed")),
            ..Self::default()
        }
    }
}

/// Per-request values. `None` leaves the template's own value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotValues {
    pub positive: Option<String>,
    pub negative: Option<String>,
    pub seed: Option<u64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    pub graph: WorkflowGraph,
    pub slots: TemplateSlots,
}

impl WorkflowTemplate {
    pub fn new(graph: WorkflowGraph, slots: TemplateSlots) -> Self {
        Self { graph, slots }
    }

    /// Checkpoint -> two text encodes -> sampler -> decode -> save, 1024x1024.
    pub fn text_to_image() -> Self {
        let graph = GraphBuilder::new()
            .node("3", "KSampler")
                .input("seed", 0)
                .input("steps", 20)
                .input("cfg", 8)
                .input("sampler_name", "euler")
                .input("scheduler", "normal")
                .input("denoise", 1)
                .link("model", "4", 0)
                .link("positive", "6", 0)
                .link("negative", "7", 0)
                .link("latent_image", "5", 0)
                .build()
            .node("4", "CheckpointLoaderSimple")
                .input("ckpt_name", DEFAULT_CHECKPOINT)
                .build()
            .node("5", "EmptyLatentImage")
                .input("width", 1024)
                .input("height", 1024)
                .input("batch_size", 1)
                .build()
            .node("6", "CLIPTextEncode")
                .input("text", "")
                .link("clip", "4", 1)
                .build()
            .node("7", "CLIPTextEncode")
                .input("text", "")
                .link("clip", "4", 1)
                .build()
            .node("8", "VAEDecode")
                .link("samples", "3", 0)
                .link("vae", "4", 2)
                .build()
            .node("9", "SaveImage")
                .input("filename_prefix", "ComfyUI")
                .link("images", "8", 0)
                .build()
            .build();

        Self {
            graph,
            slots: TemplateSlots {
                positive: Some(Slot::new("6", "text")),
                negative: Some(Slot::new("7", "text")),
                seed: Some(Slot::new("3", "seed")),
                image: None,
            },
        }
    }

    /// Produce a fresh graph with `values` written into their slots.
    ///
    /// The template itself is never touched. The result is validated, so a
    /// returned graph always has closed links and no cycles.
    pub fn instantiate(&self, values: &SlotValues) -> Result<WorkflowGraph, TemplateError> {
        let mut graph = self.graph.clone();

        let assignments = [
            ("positive", &self.slots.positive, values.positive.clone().map(Value::from)),
            ("negative", &self.slots.negative, values.negative.clone().map(Value::from)),
            ("seed", &self.slots.seed, values.seed.map(|s| json!(s))),
            ("image", &self.slots.image, values.image.clone().map(Value::from)),
        ];

        for (name, slot, value) in assignments {
            let (Some(slot), Some(value)) = (slot, value) else {
                continue;
            };
            let node = graph.node_mut(&slot.node).ok_or_else(|| TemplateError::MissingSlot {
                slot: name,
                node: slot.node.clone(),
            })?;
            let input = node.inputs.get_mut(&slot.input).ok_or_else(|| TemplateError::MissingInput {
                slot: name,
                node: slot.node.clone(),
                input: slot.input.clone(),
            })?;
            *input = InputValue::Literal(value);
        }

        validate(&graph)?;
        Ok(graph)
    }
}
