// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tuning parameters of the cut and glue heuristics.

use serde::{Deserialize, Serialize};
use vac_lite_geometry::WindingRule;

use crate::error::{Error, Result};

/// Complex configuration.
///
/// Every field has a default, so a partial JSON document is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacConfig {
    /// Fill rule used to decide which regions a face covers.
    pub winding_rule: WindingRule,
    /// Samples per cycle when measuring how much of a cycle lies inside
    /// another.
    pub interior_ratio_samples: usize,
    /// A cycle goes with a new cycle when more than this fraction of its
    /// samples lies inside it.
    pub interior_ratio_threshold: f64,
    /// Attempts (first one unperturbed) before the one-cycle cut policy
    /// heuristic gives up on degenerate geometry.
    pub cut_policy_max_attempts: usize,
    /// Seed of the perturbation generator.
    pub cut_policy_seed: u64,
    /// Samples per edge when inferring directions of open edges to glue.
    pub glue_open_samples: usize,
    /// Samples per edge when inferring direction and phase of closed edges
    /// to glue.
    pub glue_closed_samples: usize,
    /// Subset of `glue_closed_samples` evaluated per candidate phase shift.
    pub glue_closed_cost_samples: usize,
}

impl Default for VacConfig {
    fn default() -> Self {
        Self {
            winding_rule: WindingRule::Odd,
            interior_ratio_samples: 20,
            interior_ratio_threshold: 0.5,
            cut_policy_max_attempts: 10,
            cut_policy_seed: 0x5eed_cafe,
            glue_open_samples: 10,
            glue_closed_samples: 64,
            glue_closed_cost_samples: 16,
        }
    }
}

/// Parses a raw setting, warning and falling back to `default` when it is
/// present but unusable.
fn parse_or<T>(name: &str, raw: Option<&str>, default: T, parse: impl FnOnce(&str) -> Option<T>) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            tracing::warn!(variable = name, value = raw, "unparsable configuration value, using default");
            default
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = std::env::var(name).ok();
    parse_or(name, raw.as_deref(), default, |v| v.parse().ok())
}

impl VacConfig {
    /// Load configuration from `VAC_*` environment variables, falling back
    /// to the defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            winding_rule: parse_or(
                "VAC_WINDING_RULE",
                std::env::var("VAC_WINDING_RULE").ok().as_deref(),
                d.winding_rule,
                WindingRule::from_name,
            ),
            interior_ratio_samples: env_or("VAC_INTERIOR_RATIO_SAMPLES", d.interior_ratio_samples),
            interior_ratio_threshold: env_or(
                "VAC_INTERIOR_RATIO_THRESHOLD",
                d.interior_ratio_threshold,
            ),
            cut_policy_max_attempts: env_or("VAC_CUT_POLICY_MAX_ATTEMPTS", d.cut_policy_max_attempts),
            cut_policy_seed: env_or("VAC_CUT_POLICY_SEED", d.cut_policy_seed),
            glue_open_samples: env_or("VAC_GLUE_OPEN_SAMPLES", d.glue_open_samples),
            glue_closed_samples: env_or("VAC_GLUE_CLOSED_SAMPLES", d.glue_closed_samples),
            glue_closed_cost_samples: env_or(
                "VAC_GLUE_CLOSED_COST_SAMPLES",
                d.glue_closed_cost_samples,
            ),
        }
        .sanitized()
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Checks that sample counts and thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        if self.interior_ratio_samples == 0 {
            return Err(Error::Config("interior_ratio_samples must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.interior_ratio_threshold) {
            return Err(Error::Config(
                "interior_ratio_threshold must be in [0, 1)".into(),
            ));
        }
        if self.cut_policy_max_attempts == 0 {
            return Err(Error::Config("cut_policy_max_attempts must be positive".into()));
        }
        if self.glue_open_samples < 2 {
            return Err(Error::Config("glue_open_samples must be at least 2".into()));
        }
        if self.glue_closed_samples < 3 {
            return Err(Error::Config("glue_closed_samples must be at least 3".into()));
        }
        if self.glue_closed_cost_samples == 0 || self.glue_closed_cost_samples > self.glue_closed_samples {
            return Err(Error::Config(
                "glue_closed_cost_samples must be in [1, glue_closed_samples]".into(),
            ));
        }
        Ok(())
    }

    fn sanitized(self) -> Self {
        if self.validate().is_ok() {
            self
        } else {
            tracing::warn!("invalid VAC_* environment configuration, using defaults");
            Self::default()
        }
    }
}
