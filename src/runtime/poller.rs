use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use anyhow::Result;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use crate::runtime::listing::{OutputListing, OutputSnapshot};

/// What counts as "new" in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// Accept a file modified strictly after this instant.
    After(SystemTime),
    /// Accept a latest file whose path differs from this one.
    /// `None` means the directory was empty, so any file qualifies.
    Replacing(Option<PathBuf>),
}

impl Baseline {
    pub fn timestamp(snapshot: &OutputSnapshot) -> Self {
        Baseline::After(snapshot.latest_modified())
    }

    pub fn identity(snapshot: &OutputSnapshot) -> Self {
        Baseline::Replacing(snapshot.latest().map(|e| e.path.clone()))
    }

    fn accept<'a>(&self, snapshot: &'a OutputSnapshot) -> Option<&'a PathBuf> {
        match self {
            Baseline::After(after) => snapshot.newest_after(*after).map(|e| &e.path),
            Baseline::Replacing(previous) => snapshot.latest()
                .filter(|e| previous.as_ref() != Some(&e.path))
                .map(|e| &e.path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// One-off wait before the first check so the backend can finish writing.
    pub settle_delay: Duration,
    pub interval: Duration,
    /// `None` never gives up.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            interval: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Found(PathBuf),
    TimedOut { waited: Duration },
}

pub struct Poller {
    listing: Arc<dyn OutputListing>,
    policy: PollPolicy,
}

impl Poller {
    pub fn new(listing: Arc<dyn OutputListing>, policy: PollPolicy) -> Self {
        Self { listing, policy }
    }

    /// Wait for a file that satisfies `baseline`.
    ///
    /// Time is measured on tokio's clock, so a paused runtime drives this
    /// without real waiting. Dropping the future stops polling; it does not
    /// stop the backend.
    pub async fn poll(&self, baseline: &Baseline) -> Result<PollOutcome> {
        let start = Instant::now();
        sleep(self.policy.settle_delay).await;

        loop {
            let snapshot = self.listing.list_recent().await?;
            if let Some(path) = baseline.accept(&snapshot) {
                info!(path = %path.display(), elapsed = ?start.elapsed(), "New output detected");
                return Ok(PollOutcome::Found(path.clone()));
            }

            let waited = start.elapsed();
            if let Some(timeout) = self.policy.timeout {
                if waited >= timeout {
                    info!(?waited, "Gave up waiting for output");
                    return Ok(PollOutcome::TimedOut { waited });
                }
            }

            debug!(files = snapshot.entries().len(), ?waited, "No new output yet");
            sleep(self.policy.interval).await;
        }
    }
}
