//! Platform configuration.
//!
//! Defaults can be overridden from JSON ([`PlatformConfig::from_json`]) and
//! then from the environment ([`PlatformConfig::with_env_overrides`]):
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SAMPLE_RESULT_DEFAULT_SHOTS` | `default_shots` |
//! | `SAMPLE_RESULT_MAX_SHOTS` | `max_shots` |
//! | `SAMPLE_RESULT_WORKER_THREADS` | `worker_threads` |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeasureError, MeasureResult};
use crate::kernel::Shots;

/// Environment variable overriding [`PlatformConfig::default_shots`].
pub const DEFAULT_SHOTS_ENV: &str = "SAMPLE_RESULT_DEFAULT_SHOTS";
/// Environment variable overriding [`PlatformConfig::max_shots`].
pub const MAX_SHOTS_ENV: &str = "SAMPLE_RESULT_MAX_SHOTS";
/// Environment variable overriding [`PlatformConfig::worker_threads`].
pub const WORKER_THREADS_ENV: &str = "SAMPLE_RESULT_WORKER_THREADS";

/// Settings shared by every target of a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Shots used when a call does not name a count.
    pub default_shots: u32,
    /// Largest accepted shot count per run.
    pub max_shots: u32,
    /// Worker threads per target.
    pub worker_threads: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            default_shots: 1000,
            max_shots: 100_000,
            worker_threads: 1,
        }
    }
}

impl PlatformConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> MeasureResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MeasureError::Configuration(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> MeasureResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> MeasureResult<Self> {
        if let Some(value) = lookup(DEFAULT_SHOTS_ENV) {
            self.default_shots = parse_var(DEFAULT_SHOTS_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_SHOTS_ENV) {
            self.max_shots = parse_var(MAX_SHOTS_ENV, &value)?;
        }
        if let Some(value) = lookup(WORKER_THREADS_ENV) {
            self.worker_threads = parse_var(WORKER_THREADS_ENV, &value)?;
        }
        self.validate()?;
        debug!(config = ?self, "Applied configuration overrides");
        Ok(self)
    }

    /// Set the default shot count.
    pub fn with_default_shots(mut self, shots: u32) -> Self {
        self.default_shots = shots;
        self
    }

    /// Set the shot limit.
    pub fn with_max_shots(mut self, shots: u32) -> Self {
        self.max_shots = shots;
        self
    }

    /// Set the worker threads per target.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> MeasureResult<()> {
        if self.worker_threads == 0 {
            return Err(MeasureError::Configuration(
                "worker_threads must be at least 1".into(),
            ));
        }
        if self.default_shots == 0 || self.default_shots > self.max_shots {
            return Err(MeasureError::Configuration(format!(
                "default_shots must be in 1..={}, got {}",
                self.max_shots, self.default_shots
            )));
        }
        Ok(())
    }

    /// Resolve a call's shot setting: `None` means `default_shots`, `-1` means
    /// analytic mode.
    pub fn resolve_shots(&self, shots: Option<i64>) -> MeasureResult<Shots> {
        let shots = match shots {
            None => Shots::Finite(self.default_shots),
            Some(count) => Shots::from_count(count)?,
        };
        if let Shots::Finite(n) = shots {
            if n > self.max_shots {
                return Err(MeasureError::InvalidShots(format!(
                    "shots must be 1..={}, got {n}",
                    self.max_shots
                )));
            }
        }
        Ok(shots)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> MeasureResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MeasureError::Configuration(format!("{key}: cannot parse {value:?}")))
}
