use std::path::PathBuf;
use std::sync::Arc;
use image::DynamicImage;
use uuid::Uuid;
use tracing::{info, warn};
use crate::actions::Backend;
use crate::actions::http::HttpBackend;
use crate::compiler::seed::SeedStrategy;
use crate::compiler::template::{SlotValues, WorkflowTemplate};
use crate::config::GeneratorConfig;
use crate::dsl::WorkflowGraph;
use crate::error::{GenerateError, TemplateError};
use crate::runtime::listing::{DirectoryListing, OutputListing};
use crate::runtime::poller::{Baseline, PollOutcome, Poller};
use crate::runtime::staging::Stager;

pub const STATUS_SUCCESS: &str = "Image generated successfully!";
pub const STATUS_TIMEOUT: &str = "Image generation timed out. Check ComfyUI.";

#[derive(Debug)]
pub enum GenerationRequest {
    Text { positive: String, negative: String },
    Image { image: DynamicImage },
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

/// What the presentation layer shows: a status line and maybe a picture.
#[derive(Debug, Clone)]
pub struct Generation {
    pub status: String,
    pub image: Option<GeneratedImage>,
}

impl Generation {
    fn failed(status: String) -> Self {
        Self { status, image: None }
    }

    pub fn is_success(&self) -> bool {
        self.image.is_some()
    }
}

pub struct Engine {
    backend: Arc<dyn Backend>,
    listing: Arc<dyn OutputListing>,
    text_poller: Poller,
    image_poller: Poller,
    stager: Stager,
    seeds: SeedStrategy,
    text_template: WorkflowTemplate,
    image_template: Option<WorkflowTemplate>,
}

impl Engine {
    /// Engine talking HTTP to `config.backend_url` and watching `config.output_dir`.
    pub fn new(config: &GeneratorConfig) -> Self {
        let backend = Arc::new(HttpBackend::new(&config.backend_url));
        let listing = Arc::new(DirectoryListing::new(&config.output_dir, &config.image_extensions));
        Self::with_components(config, backend, listing)
    }

    pub fn with_components(
        config: &GeneratorConfig,
        backend: Arc<dyn Backend>,
        listing: Arc<dyn OutputListing>,
    ) -> Self {
        Self {
            text_poller: Poller::new(listing.clone(), config.poll_policy()),
            image_poller: Poller::new(listing.clone(), config.identity_poll_policy()),
            backend,
            listing,
            stager: Stager::new(config.staged_path(), config.short_side),
            seeds: config.seed_strategy(),
            text_template: WorkflowTemplate::text_to_image(),
            image_template: None,
        }
    }

    pub fn with_seed_strategy(mut self, seeds: SeedStrategy) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_text_template(mut self, template: WorkflowTemplate) -> Self {
        self.text_template = template;
        self
    }

    pub fn with_image_template(mut self, template: WorkflowTemplate) -> Self {
        self.image_template = Some(template);
        self
    }

    /// Build, dispatch and wait for one request.
    ///
    /// Backend rejections and timeouts come back as `Ok` with a status and
    /// no image. Bad input, bad templates and unreadable directories are errors.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerateError> {
        let request_id = Uuid::new_v4();
        let seed = self.seeds.next_seed();

        let (graph, baseline, poller) = match request {
            GenerationRequest::Text { positive, negative } => {
                info!(%request_id, seed, "Text-to-image request");
                let graph = self.text_template.instantiate(&SlotValues {
                    positive: Some(positive),
                    negative: Some(negative),
                    seed: Some(seed),
                    image: None,
                })?;
                // Baseline strictly before dispatch
                let snapshot = self.listing.list_recent().await.map_err(GenerateError::Listing)?;
                (graph, Baseline::timestamp(&snapshot), &self.text_poller)
            }
            GenerationRequest::Image { image } => {
                info!(%request_id, seed, "Image-to-image request");
                let template = self.image_template.as_ref()
                    .ok_or(TemplateError::NotConfigured("image-to-image"))?;
                let staged_name = self.stager.target()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                let graph = template.instantiate(&SlotValues {
                    seed: Some(seed),
                    image: staged_name,
                    ..SlotValues::default()
                })?;
                self.stager.stage(&image)?;
                let snapshot = self.listing.list_recent().await.map_err(GenerateError::Listing)?;
                (graph, Baseline::identity(&snapshot), &self.image_poller)
            }
        };

        self.dispatch_and_wait(request_id, &graph, &baseline, poller).await
    }

    async fn dispatch_and_wait(
        &self,
        request_id: Uuid,
        graph: &WorkflowGraph,
        baseline: &Baseline,
        poller: &Poller,
    ) -> Result<Generation, GenerateError> {
        if let Err(e) = self.backend.queue_prompt(graph).await {
            warn!(%request_id, error = %e, "Dispatch failed");
            return Ok(Generation::failed(format!("Error: {}", e.user_message())));
        }

        info!(%request_id, "Waiting for new image...");
        match poller.poll(baseline).await.map_err(GenerateError::Listing)? {
            PollOutcome::Found(path) => {
                let image = image::open(&path).map_err(|source| GenerateError::Output {
                    path: path.clone(),
                    source,
                })?;
                info!(%request_id, path = %path.display(), "Image ready");
                Ok(Generation {
                    status: STATUS_SUCCESS.to_string(),
                    image: Some(GeneratedImage { path, image }),
                })
            }
            PollOutcome::TimedOut { waited } => {
                warn!(%request_id, ?waited, "Timed out waiting for image");
                Ok(Generation::failed(STATUS_TIMEOUT.to_string()))
            }
        }
    }
}
