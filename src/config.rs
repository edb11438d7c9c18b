use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::types::MAX_BUFFER_SIZE;

/// Configuration for [`Builder::with_config`](crate::Builder::with_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Bytes allocated up front. The arena doubles when it runs out.
    ///
    /// Default: 1 KiB.
    pub initial_capacity: usize,

    /// Hard cap on the arena. Growth past it fails with `CapacityExceeded`.
    /// Values above `i32::MAX` are clamped, since offsets are 32-bit.
    ///
    /// Default: `i32::MAX` bytes.
    pub max_capacity: usize,

    /// Number of distinct vtable shapes remembered for deduplication.
    ///
    /// `None` remembers every shape of the build session. A bound trades
    /// buffer size for memory on very large buffers: evicted shapes are
    /// simply written again.
    pub vtable_cache_capacity: Option<NonZeroUsize>,

    /// Write inline scalars even when they equal the schema default.
    pub force_defaults: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_capacity: MAX_BUFFER_SIZE,
            vtable_cache_capacity: None,
            force_defaults: false,
        }
    }
}

impl BuilderConfig {
    /// Parse a JSON config. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TableError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_capacity > self.max_capacity {
            return Err(TableError::Config(format!(
                "initial_capacity {} exceeds max_capacity {}",
                self.initial_capacity, self.max_capacity
            )));
        }
        Ok(())
    }

    /// Effective arena cap.
    #[inline]
    pub(crate) fn arena_limit(&self) -> usize {
        self.max_capacity.min(MAX_BUFFER_SIZE)
    }
}
