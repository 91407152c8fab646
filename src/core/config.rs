/*!
 * Runtime Configuration
 * Defaults, environment overrides and JSON loading for the process subsystem
 *
 * Environment variables:
 * - SCRIPT_PROC_FAULT_FRAMES: stack frames logged per contained fault (default: 7)
 * - SCRIPT_PROC_LOG: default log filter when RUST_LOG is unset (default: info)
 * - SCRIPT_PROC_TRACE_JSON: enable JSON log output (default: false)
 */

use super::errors::{ScriptError, ScriptResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stack frames captured for each contained fault
pub const DEFAULT_FAULT_FRAMES: usize = 7;

pub const ENV_FAULT_FRAMES: &str = "SCRIPT_PROC_FAULT_FRAMES";
pub const ENV_LOG_FILTER: &str = "SCRIPT_PROC_LOG";
pub const ENV_TRACE_JSON: &str = "SCRIPT_PROC_TRACE_JSON";

/// Configuration shared by every primitive invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of stack frames logged when a spawned callback faults
    pub fault_frames: usize,
    /// Log filter used when RUST_LOG is not set
    pub log_filter: String,
    /// Emit JSON formatted logs
    pub trace_json: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fault_frames: DEFAULT_FAULT_FRAMES,
            log_filter: "info".to_string(),
            trace_json: false,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault_frames(mut self, frames: usize) -> Self {
        self.fault_frames = frames;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn with_trace_json(mut self, enabled: bool) -> Self {
        self.trace_json = enabled;
        self
    }

    /// Load defaults overridden by the process environment
    pub fn from_env() -> ScriptResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load defaults overridden by an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ScriptResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FAULT_FRAMES) {
            config.fault_frames = raw.trim().parse().map_err(|_| {
                ScriptError::Config(format!("{} must be a positive integer, got '{}'", ENV_FAULT_FRAMES, raw))
            })?;
        }

        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            config.log_filter = filter;
        }

        if let Some(raw) = lookup(ENV_TRACE_JSON) {
            config.trace_json = match raw.trim() {
                "1" | "true" => true,
                "0" | "false" | "" => false,
                other => {
                    return Err(ScriptError::Config(format!(
                        "{} must be true/false, got '{}'",
                        ENV_TRACE_JSON, other
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ScriptResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> ScriptResult<()> {
        if self.fault_frames == 0 {
            return Err(ScriptError::Config(
                "fault_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
