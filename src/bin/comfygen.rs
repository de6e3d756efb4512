use clap::{Parser, Subcommand};
use comfygen::compiler::loader::load_template_from_json;
use comfygen::compiler::seed::SeedStrategy;
use comfygen::compiler::template::{Slot, TemplateSlots, WorkflowTemplate};
use comfygen::config::{GeneratorConfig, load_config_from_yaml, timeout_from_secs};
use comfygen::runtime::engine::{Engine, GenerationRequest};
use comfygen::runtime::staging;
use std::path::PathBuf;
use std::process;
use anyhow::{Result, Context as AnyhowContext};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_POSITIVE_PROMPT: &str = "A futuristic cyberpunk AI, ultra-detailed, glowing neon circuits, holographic interfaces, \
hyperrealistic lighting, 8K resolution, cinematic composition, vibrant colors, intricate details, \
cybernetic enhancements, dynamic energy flow, volumetric lighting, concept art, science fiction style, \
ultra-sharp focus, ethereal atmosphere, stunning visual impact.";

const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low resolution, distorted, artifacts, text, watermark, grainy, deformed faces, \
extra limbs, unrealistic proportions, oversaturated, noisy background, low contrast, bad anatomy, \
jpeg artifacts, bad lighting, low-quality rendering.";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Backend queue endpoint
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Backend input directory (staged images are written here)
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Backend output directory (watched for results)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Seconds to wait for a result; 0 waits forever
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Use this seed instead of a random one
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a positive and a negative prompt
    Text {
        #[arg(long, short, default_value = DEFAULT_POSITIVE_PROMPT)]
        positive: String,

        #[arg(long, short, default_value = DEFAULT_NEGATIVE_PROMPT)]
        negative: String,

        /// Seed from the current Unix time instead of at random
        #[arg(long)]
        clock_seed: bool,
    },

    /// Restyle an input image with an exported API-format workflow
    Image {
        /// Image to upload
        #[arg(long, short)]
        input: PathBuf,

        /// Workflow JSON exported from the backend
        #[arg(long, short, default_value = "workflow_api.json")]
        template: PathBuf,

        /// Sampler seed input (node:input)
        #[arg(long, default_value = "3:seed", value_parser = parse_slot)]
        seed_slot: Slot,

        /// Loader input that receives the staged file name (node:input)
        #[arg(long, value_parser = parse_slot)]
        image_slot: Option<Slot>,
    },

    /// Print the built-in text-to-image workflow
    Template,
}

fn parse_slot(s: &str) -> Result<Slot, String> {
    let (node, input) = s.split_once(':')
        .ok_or_else(|| format!("invalid NODE:input: no `:` found in `{}`", s))?;
    if node.is_empty() || input.is_empty() {
        return Err(format!("invalid NODE:input: `{}`", s));
    }
    Ok(Slot::new(node, input))
}

fn resolve_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_yaml(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(secs) = cli.timeout {
        config.poll_timeout = timeout_from_secs(secs).context("Invalid --timeout")?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let (engine, request) = match &cli.command {
        Commands::Template => {
            let graph = WorkflowTemplate::text_to_image().graph;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            return Ok(());
        }
        Commands::Text { positive, negative, clock_seed } => {
            let mut engine = Engine::new(&config);
            if *clock_seed {
                engine = engine.with_seed_strategy(SeedStrategy::Clock);
            }
            let request = GenerationRequest::Text {
                positive: positive.clone(),
                negative: negative.clone(),
            };
            (engine, request)
        }
        Commands::Image { input, template, seed_slot, image_slot } => {
            let slots = TemplateSlots {
                seed: Some(seed_slot.clone()),
                image: image_slot.clone(),
                ..TemplateSlots::default()
            };
            let template = load_template_from_json(template, slots)?;
            let bytes = tokio::fs::read(input).await
                .with_context(|| format!("Failed to read input image {}", input.display()))?;
            let image = staging::decode(&bytes)?;
            let engine = Engine::new(&config).with_image_template(template);
            (engine, GenerationRequest::Image { image })
        }
    };

    let engine = match cli.seed {
        Some(seed) => engine.with_seed_strategy(SeedStrategy::Fixed(seed)),
        None => engine,
    };

    info!(backend = %config.backend_url, output = %config.output_dir.display(), "Submitting to backend");

    let generation = tokio::select! {
        result = engine.generate(request) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; the backend may still finish the job");
            process::exit(130);
        }
    };

    println!("{}", generation.status);
    match generation.image {
        Some(image) => {
            println!("{}", image.path.display());
            Ok(())
        }
        None => process::exit(1),
    }
}
