use async_trait::async_trait;
use anyhow::{Result, Context as AnyhowContext};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Image files of the output directory, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSnapshot {
    entries: Vec<OutputEntry>,
}

impl OutputSnapshot {
    pub fn new(mut entries: Vec<OutputEntry>) -> Self {
        entries.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
        Self { entries }
    }

    pub fn entries(&self) -> &[OutputEntry] {
        &self.entries
    }

    /// Most recently modified file.
    pub fn latest(&self) -> Option<&OutputEntry> {
        self.entries.last()
    }

    /// Newest modification time, or the Unix epoch for an empty directory.
    pub fn latest_modified(&self) -> SystemTime {
        self.latest().map(|e| e.modified).unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Most recent file modified strictly after `after`.
    pub fn newest_after(&self, after: SystemTime) -> Option<&OutputEntry> {
        self.latest().filter(|e| e.modified > after)
    }
}

// --- Interfaces ---

/// Read access to the directory the backend writes results into.
#[async_trait]
pub trait OutputListing: Send + Sync {
    async fn list_recent(&self) -> Result<OutputSnapshot>;
}

// --- Filesystem Implementation ---

pub struct DirectoryListing {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryListing {
    pub fn new(dir: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            dir: dir.into(),
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl OutputListing for DirectoryListing {
    async fn list_recent(&self) -> Result<OutputSnapshot> {
        let mut read_dir = tokio::fs::read_dir(&self.dir).await
            .with_context(|| format!("Failed to read output directory {}", self.dir.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if !self.matches(&path) {
                continue;
            }
            // A file can vanish between listing and stat; skip it
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            entries.push(OutputEntry {
                path,
                modified: metadata.modified()?,
            });
        }

        Ok(OutputSnapshot::new(entries))
    }
}

// --- In-Memory Implementation ---

/// Listing backed by a plain vector, for tests and embedding.
#[derive(Default)]
pub struct InMemoryListing {
    entries: Mutex<Vec<OutputEntry>>,
}

impl InMemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, modified: SystemTime) {
        let path = path.into();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|e| e.path != path);
        entries.push(OutputEntry { path, modified });
    }
}

#[async_trait]
impl OutputListing for InMemoryListing {
    async fn list_recent(&self) -> Result<OutputSnapshot> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone();
        Ok(OutputSnapshot::new(entries))
    }
}
