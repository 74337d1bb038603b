//! Robot timing configuration.
//!
//! All fields have defaults, so a RON file only needs the values it changes:
//!
//! ```ron
//! (query_retry_timeout_ms: 2000, motion_pixels_per_second: 1500.0)
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timing knobs for polling, waiting and pointer motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotConfig {
    /// Pause between polls in `query_with_retry`.
    pub query_retry_interval_ms: u64,
    /// Overall deadline for `query_with_retry`.
    pub query_retry_timeout_ms: u64,
    /// Pause before each check in `wait_until`.
    pub wait_until_interval_ms: u64,
    /// Extra checks after the first in `wait_until`.
    pub wait_until_retries: u32,
    /// Pointer speed for straight-line motion.
    pub motion_pixels_per_second: f64,
    /// Interpolation frames per second of motion.
    pub motion_steps_per_second: u32,
    /// Bound on waiting for a straight-line motion to complete.
    pub motion_timeout_ms: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            query_retry_interval_ms: 100,
            query_retry_timeout_ms: 5_000,
            wait_until_interval_ms: 100,
            wait_until_retries: 80,
            motion_pixels_per_second: 500.0,
            motion_steps_per_second: 32,
            motion_timeout_ms: 5_000,
        }
    }
}

impl RobotConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Config {
            path: None,
            message: e.to_string(),
        })
    }

    /// Load a configuration from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        ron::from_str(&text).map_err(|e| Error::Config {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Pause between retry polls.
    pub fn query_retry_interval(&self) -> Duration {
        Duration::from_millis(self.query_retry_interval_ms)
    }

    /// Deadline for retried queries.
    pub fn query_retry_timeout(&self) -> Duration {
        Duration::from_millis(self.query_retry_timeout_ms)
    }

    /// Pause before each `wait_until` check.
    pub fn wait_until_interval(&self) -> Duration {
        Duration::from_millis(self.wait_until_interval_ms)
    }

    /// Bound on a straight-line glide.
    pub fn motion_timeout(&self) -> Duration {
        Duration::from_millis(self.motion_timeout_ms)
    }

    /// Duration of one interpolation frame.
    pub fn motion_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.motion_steps_per_second.max(1)))
    }
}
