use std::path::PathBuf;
use thiserror::Error;

/// Structural problems in a workflow graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node `{node}` input `{input}` links to unknown node `{target}`")]
    UnknownNode {
        node: String,
        input: String,
        target: String,
    },
    #[error("workflow graph contains a cycle through node `{0}`")]
    Cycle(String),
    #[error("workflow graph has no nodes")]
    Empty,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no {0} workflow template configured")]
    NotConfigured(&'static str),
    #[error("slot `{slot}` points at missing node `{node}`")]
    MissingSlot { slot: &'static str, node: String },
    #[error("slot `{slot}` points at node `{node}` without input `{input}`")]
    MissingInput {
        slot: &'static str,
        node: String,
        input: String,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Failure to hand a workflow to the backend. Never retried.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("backend rejected prompt with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not reach backend: {0}")]
    Transport(#[from] reqwest::Error),
}

impl DispatchError {
    /// Text shown to the user: the backend's raw reply when there is one.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Status { body, .. } => body.clone(),
            DispatchError::Transport(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("input image could not be decoded: {0}")]
    Decode(#[source] image::ImageError),
    #[error("input image has zero width or height")]
    EmptyImage,
    #[error("failed to write staged image to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Everything `Engine::generate` can fail with as a hard error.
///
/// Backend rejections and timeouts are not in here: they come back as a
/// status message on an otherwise successful `Generation`.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error("failed to list output directory: {0}")]
    Listing(#[source] anyhow::Error),
    #[error("failed to load generated image {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
