//! Memory bank configuration.
//!
//! Values can be supplied directly, deserialized, or read from the
//! environment with [`MemoryBankConfig::from_env`]:
//!
//! | Variable | Field |
//! |---|---|
//! | `ECOGUARDIAN_MAX_MEMORY_SIZE` | `max_memory_size` |
//! | `ECOGUARDIAN_COMPACTION_THRESHOLD` | `compaction_threshold` |
//! | `ECOGUARDIAN_COMPACTION_TARGET` | `compaction_target_reduction` |
//! | `ECOGUARDIAN_COMPACTION_HISTORY_LIMIT` | `compaction_history_limit` (`0` = unbounded) |

use serde::{Deserialize, Serialize};

use crate::memory::error::{MemoryError, MemoryResult};
use crate::memory::retention::DEFAULT_TARGET_REDUCTION;

pub const DEFAULT_MAX_MEMORY_SIZE: usize = 10_000;
pub const DEFAULT_COMPACTION_THRESHOLD: f64 = 0.8;
pub const DEFAULT_COMPACTION_HISTORY_LIMIT: usize = 256;

/// Capacity and compaction settings for a [`MemoryBank`](crate::memory::MemoryBank).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryBankConfig {
    /// Hard ceiling on the number of entries.
    pub max_memory_size: usize,
    /// Fraction of `max_memory_size` at which `store` compacts first. Must be in `(0, 1]`.
    pub compaction_threshold: f64,
    /// Fraction of entries removed by an automatic compaction. Must be in `(0, 1]`.
    pub compaction_target_reduction: f64,
    /// Number of compaction events retained; `None` keeps all of them.
    pub compaction_history_limit: Option<usize>,
}

impl Default for MemoryBankConfig {
    fn default() -> Self {
        Self {
            max_memory_size: DEFAULT_MAX_MEMORY_SIZE,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
            compaction_target_reduction: DEFAULT_TARGET_REDUCTION,
            compaction_history_limit: Some(DEFAULT_COMPACTION_HISTORY_LIMIT),
        }
    }
}

impl MemoryBankConfig {
    pub fn new(max_memory_size: usize, compaction_threshold: f64) -> Self {
        Self {
            max_memory_size,
            compaction_threshold,
            ..Self::default()
        }
    }

    pub fn with_target_reduction(mut self, target: f64) -> Self {
        self.compaction_target_reduction = target;
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.compaction_history_limit = limit;
        self
    }

    /// Occupancy at which `store` compacts before inserting.
    pub fn trigger_size(&self) -> usize {
        (self.max_memory_size as f64 * self.compaction_threshold) as usize
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.max_memory_size == 0 {
            return Err(MemoryError::InvalidConfig(
                "max_memory_size must be greater than zero".into(),
            ));
        }
        if !(self.compaction_threshold > 0.0 && self.compaction_threshold <= 1.0) {
            return Err(MemoryError::InvalidConfig(format!(
                "compaction_threshold must be in (0, 1], got {}",
                self.compaction_threshold
            )));
        }
        if !(self.compaction_target_reduction > 0.0 && self.compaction_target_reduction <= 1.0) {
            return Err(MemoryError::InvalidConfig(format!(
                "compaction_target_reduction must be in (0, 1], got {}",
                self.compaction_target_reduction
            )));
        }
        Ok(())
    }

    /// Defaults overridden by any `ECOGUARDIAN_*` variables that are set.
    pub fn from_env() -> MemoryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> MemoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("ECOGUARDIAN_MAX_MEMORY_SIZE") {
            config.max_memory_size = parse_var("ECOGUARDIAN_MAX_MEMORY_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("ECOGUARDIAN_COMPACTION_THRESHOLD") {
            config.compaction_threshold = parse_var("ECOGUARDIAN_COMPACTION_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("ECOGUARDIAN_COMPACTION_TARGET") {
            config.compaction_target_reduction = parse_var("ECOGUARDIAN_COMPACTION_TARGET", &raw)?;
        }
        if let Some(raw) = lookup("ECOGUARDIAN_COMPACTION_HISTORY_LIMIT") {
            let limit: usize = parse_var("ECOGUARDIAN_COMPACTION_HISTORY_LIMIT", &raw)?;
            config.compaction_history_limit = (limit > 0).then_some(limit);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> MemoryResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| MemoryError::InvalidConfig(format!("{name}={raw:?}: {e}")))
}
