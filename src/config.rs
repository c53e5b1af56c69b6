//! Engine and tool configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "engine": { "baselineCycleCeiling": 50000 }, "generator": { "count": 200 } }
//! ```

use crate::machine::{FINISH_LOCATION, RESULT_LOCATION};
use crate::unit::ProtocolAddresses;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default cycle ceiling for the golden run.
pub const DEFAULT_BASELINE_CYCLE_CEILING: u64 = 1_000_000;

/// Default hang budget multiplier over the golden cycle count.
pub const DEFAULT_HANG_FACTOR: u64 = 2;

/// Parameters of the campaign engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Cycles the golden run may take before it is declared non-terminating.
    pub baseline_cycle_ceiling: u64,
    /// An injection run is hung after `hang_factor x expected_instructions` cycles.
    pub hang_factor: u64,
    /// Memory cell the program clears to signal completion.
    pub finish_location: u32,
    /// Memory cell holding the program's answer.
    pub result_location: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_cycle_ceiling: DEFAULT_BASELINE_CYCLE_CEILING,
            hang_factor: DEFAULT_HANG_FACTOR,
            finish_location: FINISH_LOCATION as u32,
            result_location: RESULT_LOCATION as u32,
        }
    }
}

impl EngineConfig {
    pub fn addresses(&self) -> ProtocolAddresses {
        ProtocolAddresses {
            finish: self.finish_location,
            result: self.result_location,
        }
    }
}

/// Parameters of the random campaign generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Injections per generated campaign.
    pub count: usize,
    /// Directory generated campaigns are written to.
    pub campaign_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: crate::campaign::store::DEFAULT_GENERATED_INJECTIONS,
            campaign_dir: PathBuf::from("."),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    /// Read a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.hang_factor == 0 {
            return Err(ConfigError::Invalid("hangFactor must be at least 1".into()));
        }
        if self.engine.baseline_cycle_ceiling == 0 {
            return Err(ConfigError::Invalid("baselineCycleCeiling must be at least 1".into()));
        }
        if self.engine.finish_location == self.engine.result_location {
            return Err(ConfigError::Invalid(
                "finishLocation and resultLocation must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("cannot read config {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
