//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI: small teams and grids, call deduplication, low thread cap
    Fast,

    /// Development: the defaults
    #[default]
    Balanced,

    /// Audit: larger teams and grids, every call expanded
    Thorough,
}

impl Preset {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
