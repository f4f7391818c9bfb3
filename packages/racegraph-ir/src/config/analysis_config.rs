//! Analysis configuration
//!
//! One flat config per run. Built from a preset, adjusted with builder
//! setters, or loaded from a versioned YAML file where every key except
//! `version` and `preset` overrides the preset's value.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

const SUPPORTED_VERSIONS: &[u64] = &[1];

/// Concurrency runtime model to activate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeSelection {
    /// Pick from the module's callees (kernel launch → cuda, team fork → openmp, else pthread)
    #[default]
    Auto,
    Pthread,
    OpenMp,
    Cuda,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenMpConfig {
    /// Threads forked per parallel region
    pub team_size: u32,
}

impl Default for OpenMpConfig {
    fn default() -> Self {
        Self { team_size: 2 }
    }
}

/// Modeled kernel grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CudaConfig {
    pub blocks: u32,
    pub threads_per_block: u32,
}

impl Default for CudaConfig {
    fn default() -> Self {
        Self {
            blocks: 2,
            threads_per_block: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Function the main thread starts in
    pub entry: String,
    pub runtime: RuntimeSelection,
    /// Skip calls already expanded under the same sync and lock context
    pub dedup_calls: bool,
    /// Upper bound on traced threads (main included)
    pub max_threads: usize,
    /// Check shared objects on the rayon pool
    pub parallel: bool,
    pub openmp: OpenMpConfig,
    pub cuda: CudaConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl AnalysisConfig {
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            entry: "main".to_string(),
            runtime: RuntimeSelection::Auto,
            dedup_calls: true,
            max_threads: 1024,
            parallel: cfg!(feature = "parallel"),
            openmp: OpenMpConfig::default(),
            cuda: CudaConfig::default(),
        };
        match preset {
            Preset::Fast => Self {
                max_threads: 256,
                cuda: CudaConfig {
                    blocks: 1,
                    threads_per_block: 2,
                },
                ..base
            },
            Preset::Balanced => base,
            Preset::Thorough => Self {
                dedup_calls: false,
                max_threads: 100_000,
                openmp: OpenMpConfig { team_size: 4 },
                cuda: CudaConfig {
                    blocks: 2,
                    threads_per_block: 4,
                },
                ..base
            },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Builder setters
    // ═══════════════════════════════════════════════════════════════════════

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeSelection) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_dedup_calls(mut self, dedup_calls: bool) -> Self {
        self.dedup_calls = dedup_calls;
        self
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_team_size(mut self, team_size: u32) -> Self {
        self.openmp.team_size = team_size;
        self
    }

    pub fn with_cuda_grid(mut self, blocks: u32, threads_per_block: u32) -> Self {
        self.cuda = CudaConfig {
            blocks,
            threads_per_block,
        };
        self
    }

    /// Validate ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_threads == 0 || self.max_threads > 100_000 {
            return Err(ConfigError::range_with_hint(
                "max_threads",
                self.max_threads,
                1,
                100_000,
                "The main thread alone needs one slot",
            ));
        }

        if !(2..=64).contains(&self.openmp.team_size) {
            return Err(ConfigError::range_with_hint(
                "openmp.team_size",
                self.openmp.team_size,
                2,
                64,
                "A team needs at least two threads to race",
            ));
        }

        if !(1..=64).contains(&self.cuda.blocks) {
            return Err(ConfigError::range_with_hint(
                "cuda.blocks",
                self.cuda.blocks,
                1,
                64,
                "Grids are modeled, not enumerated",
            ));
        }

        if !(1..=64).contains(&self.cuda.threads_per_block) {
            return Err(ConfigError::range_with_hint(
                "cuda.threads_per_block",
                self.cuda.threads_per_block,
                1,
                64,
                "Blocks are modeled, not enumerated",
            ));
        }

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // YAML (v1 schema)
    // ═══════════════════════════════════════════════════════════════════════

    /// Load from a YAML string
    ///
    /// ```yaml
    /// version: 1
    /// preset: fast
    /// entry: main
    /// openmp:
    ///   team_size: 4
    /// ```
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let mut document: Mapping = serde_yaml::from_str(yaml)?;

        let version = document
            .remove("version")
            .ok_or(ConfigError::MissingVersion)?;
        let version: u64 = serde_yaml::from_value(version)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = match document.remove("preset") {
            Some(name) => serde_yaml::from_value::<String>(name)?.parse()?,
            None => Preset::default(),
        };

        let mut merged = serde_yaml::to_value(Self::preset(preset))?;
        overlay(&mut merged, Value::Mapping(document));
        let config: Self = serde_yaml::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let mut document = Mapping::new();
        document.insert("version".into(), Value::from(SUPPORTED_VERSIONS[0]));
        if let Value::Mapping(fields) = serde_yaml::to_value(self)? {
            document.extend(fields);
        }
        Ok(serde_yaml::to_string(&document)?)
    }
}

/// Recursively replace values in `base` with those present in `patch`
fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Mapping(base), Value::Mapping(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
