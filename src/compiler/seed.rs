use rand::Rng;
use serde::{Serialize, Deserialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_SEED_MIN: u64 = 1;
pub const DEFAULT_SEED_MAX: u64 = 1_500_000;

/// How a request picks its sampler seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// Current Unix time in seconds. Two requests in the same second share a seed.
    Clock,
    /// Uniform in `min..=max`.
    Random { min: u64, max: u64 },
    Fixed(u64),
}

impl Default for SeedStrategy {
    fn default() -> Self {
        SeedStrategy::Random {
            min: DEFAULT_SEED_MIN,
            max: DEFAULT_SEED_MAX,
        }
    }
}

impl SeedStrategy {
    pub fn next_seed(&self) -> u64 {
        match *self {
            SeedStrategy::Clock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            SeedStrategy::Random { min, max } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                rand::rng().random_range(lo..=hi)
            }
            SeedStrategy::Fixed(seed) => seed,
        }
    }
}
