//! Election parameters with TOML file support.

use crate::error::ElectionError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use valelect_types::Fraction;

/// Parameters governing voting limits and seat apportionment.
///
/// Can be loaded from a TOML file via [`ElectionConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Fewest validators an election may produce.
    #[serde(default = "default_min_electable")]
    pub min_electable_validators: usize,

    /// Most validators an election may produce. Also caps the number of groups considered.
    #[serde(default = "default_max_electable")]
    pub max_electable_validators: usize,

    /// Distinct groups an account may vote for without the override flag.
    #[serde(default = "default_max_groups")]
    pub max_num_groups_voted_for: usize,

    /// Minimum share of all votes a group needs to take part in an election.
    #[serde(default = "default_threshold")]
    pub electability_threshold: Fraction,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_min_electable() -> usize {
    1
}

fn default_max_electable() -> usize {
    100
}

fn default_max_groups() -> usize {
    10
}

fn default_threshold() -> Fraction {
    // 1%
    Fraction::from_raw(valelect_types::FIXED1 / 100)
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ElectionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ElectionError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ElectionError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ElectionError> {
        let config: Self = toml::from_str(s).map_err(|e| ElectionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ElectionError> {
        toml::to_string_pretty(self).map_err(|e| ElectionError::Config(e.to_string()))
    }

    /// Check the bounds every setter enforces.
    pub fn validate(&self) -> Result<(), ElectionError> {
        check_electable_bounds(self.min_electable_validators, self.max_electable_validators)?;
        check_threshold(&self.electability_threshold)
    }
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            min_electable_validators: default_min_electable(),
            max_electable_validators: default_max_electable(),
            max_num_groups_voted_for: default_max_groups(),
            electability_threshold: default_threshold(),
        }
    }
}

pub(crate) fn check_electable_bounds(min: usize, max: usize) -> Result<(), ElectionError> {
    if min == 0 {
        return Err(ElectionError::InvalidInput(
            "minimum electable validators cannot be zero".into(),
        ));
    }
    if max < min {
        return Err(ElectionError::InvalidInput(
            "maximum electable validators cannot be smaller than minimum".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_threshold(threshold: &Fraction) -> Result<(), ElectionError> {
    if !threshold.is_below_one() {
        return Err(ElectionError::InvalidInput(
            "electability threshold must be lower than 100%".into(),
        ));
    }
    Ok(())
}
