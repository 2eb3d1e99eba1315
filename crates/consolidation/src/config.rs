//! Engine configuration.
//!
//! Hosts either ship a JSON document (the usual plugin config file) or set
//! environment variables:
//!
//! - `RESTACK_STACK_SIZES`: comma-separated allow-list, e.g. `2000,5000`
//! - `RESTACK_DROP_HEIGHT`: vertical offset for overflow drops

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{DEFAULT_STACK_SIZES, StackSizePolicy};

pub const DEFAULT_DROP_HEIGHT: f32 = 1.0;

pub const STACK_SIZES_ENV: &str = "RESTACK_STACK_SIZES";
pub const DROP_HEIGHT_ENV: &str = "RESTACK_DROP_HEIGHT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Stack sizes an actor may pick from.
    pub available_stack_sizes: Vec<u64>,
    /// How far above the container overflow is placed.
    pub overflow_drop_height: f32,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            available_stack_sizes: DEFAULT_STACK_SIZES.to_vec(),
            overflow_drop_height: DEFAULT_DROP_HEIGHT,
        }
    }
}

impl ConsolidationConfig {
    /// Parse a JSON config document. Missing fields and an empty size list
    /// take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: ConsolidationConfig = serde_json::from_str(json)?;
        if config.available_stack_sizes.is_empty() {
            config.available_stack_sizes = DEFAULT_STACK_SIZES.to_vec();
        }
        config.validate()?;
        Ok(config)
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparsable values are logged and
    /// replaced by defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(STACK_SIZES_ENV) {
            match parse_sizes(&raw) {
                Some(sizes) => config.available_stack_sizes = sizes,
                None => tracing::warn!(
                    value = %raw,
                    "{STACK_SIZES_ENV} is not a list of positive integers; using defaults"
                ),
            }
        }

        if let Some(raw) = lookup(DROP_HEIGHT_ENV) {
            match raw.trim().parse::<f32>() {
                Ok(height) if height.is_finite() => config.overflow_drop_height = height,
                _ => tracing::warn!(
                    value = %raw,
                    "{DROP_HEIGHT_ENV} is not a finite number; using {DEFAULT_DROP_HEIGHT}"
                ),
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.available_stack_sizes.contains(&0) {
            return Err(ConfigError::Invalid(
                "available_stack_sizes must not contain 0".to_string(),
            ));
        }
        if !self.overflow_drop_height.is_finite() {
            return Err(ConfigError::Invalid(
                "overflow_drop_height must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> StackSizePolicy {
        StackSizePolicy::new(self.available_stack_sizes.iter().copied())
    }
}

fn parse_sizes(raw: &str) -> Option<Vec<u64>> {
    let sizes = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().ok().filter(|size| *size > 0))
        .collect::<Option<Vec<u64>>>()?;
    (!sizes.is_empty()).then_some(sizes)
}
