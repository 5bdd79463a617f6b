//! Judge configuration: aggregator mode and per-role importance seeds.
//!
//! Loaded from TOML (or constructed programmatically) once per process and
//! treated as immutable. The `[aggregator.role_importance]` table seeds the
//! role-weighted aggregator before any in-stream declarations apply.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AlmutenResult, ConfigError};
use crate::role::Role;

/// Top-level configuration for [`Judge`](crate::engine::Judge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JudgeConfig {
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregatorConfig {
    /// Use the role-weighted aggregator (default). When false, primitives
    /// are still dispatched but importance declarations are inert.
    #[serde(default = "default_use_role_weighting")]
    pub use_role_weighting: bool,
    /// Role label -> importance multiplier, applied before any in-stream
    /// declarations (which win on conflict).
    #[serde(default)]
    pub role_importance: BTreeMap<String, f64>,
}

fn default_use_role_weighting() -> bool {
    true
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            use_role_weighting: default_use_role_weighting(),
            role_importance: BTreeMap::new(),
        }
    }
}

impl JudgeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> AlmutenResult<Self> {
        let config: JudgeConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> AlmutenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the configured importance table to typed roles.
    ///
    /// Unknown role labels and non-finite or negative factors are
    /// configuration defects and fail loudly.
    pub fn importance_map(&self) -> AlmutenResult<BTreeMap<Role, f64>> {
        let mut map = BTreeMap::new();
        for (label, &factor) in &self.aggregator.role_importance {
            let role = Role::from_label(label).ok_or_else(|| ConfigError::UnknownRole {
                label: label.clone(),
            })?;
            if !factor.is_finite() || factor < 0.0 {
                return Err(ConfigError::BadImportance {
                    label: label.clone(),
                    value: factor,
                }
                .into());
            }
            map.insert(role, factor);
        }
        Ok(map)
    }
}
