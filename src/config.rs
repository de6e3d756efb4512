use anyhow::{Result, Context as AnyhowContext};
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::compiler::seed::{SeedStrategy, DEFAULT_SEED_MIN, DEFAULT_SEED_MAX};
use crate::runtime::poller::PollPolicy;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8188/prompt";
pub const DEFAULT_STAGED_FILE_NAME: &str = "test_api.jpg";
pub const DEFAULT_SHORT_SIDE: u32 = 512;

/// Runtime configuration for one `Engine`.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
/// Durations are written as seconds (`poll_interval: 5`, `settle_delay: 0.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub backend_url: String,
    /// Where staged input images are written. Must already exist.
    pub input_dir: PathBuf,
    /// Where the backend saves results. Read only.
    pub output_dir: PathBuf,
    #[serde(with = "secs")]
    pub poll_interval: Duration,
    /// `null` polls until a file shows up, however long that takes.
    #[serde(with = "opt_secs")]
    pub poll_timeout: Option<Duration>,
    #[serde(with = "secs")]
    pub settle_delay: Duration,
    /// Check interval of the image-to-image flow, which watches for a new latest file.
    #[serde(with = "secs")]
    pub identity_poll_interval: Duration,
    #[serde(with = "secs")]
    pub identity_settle_delay: Duration,
    pub staged_file_name: String,
    pub short_side: u32,
    pub image_extensions: Vec<String>,
    pub seed_range: (u64, u64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            input_dir: PathBuf::from("ComfyUI/input"),
            output_dir: PathBuf::from("ComfyUI/output"),
            poll_interval: Duration::from_secs(5),
            poll_timeout: Some(Duration::from_secs(120)),
            settle_delay: Duration::from_secs(2),
            identity_poll_interval: Duration::from_secs(1),
            identity_settle_delay: Duration::ZERO,
            staged_file_name: DEFAULT_STAGED_FILE_NAME.to_string(),
            short_side: DEFAULT_SHORT_SIDE,
            image_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            seed_range: (DEFAULT_SEED_MIN, DEFAULT_SEED_MAX),
        }
    }
}

impl GeneratorConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            settle_delay: self.settle_delay,
            interval: self.poll_interval,
            timeout: self.poll_timeout,
        }
    }

    /// Same deadline as `poll_policy`, faster cadence and no settle delay.
    pub fn identity_poll_policy(&self) -> PollPolicy {
        PollPolicy {
            settle_delay: self.identity_settle_delay,
            interval: self.identity_poll_interval,
            timeout: self.poll_timeout,
        }
    }

    pub fn seed_strategy(&self) -> SeedStrategy {
        SeedStrategy::Random {
            min: self.seed_range.0,
            max: self.seed_range.1,
        }
    }

    pub fn staged_path(&self) -> PathBuf {
        self.input_dir.join(&self.staged_file_name)
    }
}

/// Parse a timeout given in seconds; `0` means no timeout.
pub fn timeout_from_secs(secs: f64) -> Result<Option<Duration>> {
    if secs == 0.0 {
        return Ok(None);
    }
    let timeout = Duration::try_from_secs_f64(secs)
        .with_context(|| format!("Invalid timeout `{}`: expected a non-negative number of seconds", secs))?;
    Ok(Some(timeout))
}

pub fn load_config_from_yaml(file_path: &Path) -> Result<GeneratorConfig> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read config file from {}", file_path.display()))?;

    let config: GeneratorConfig = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize YAML config from {}", file_path.display()))?;

    Ok(config)
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

mod opt_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
            .transpose()
    }
}
