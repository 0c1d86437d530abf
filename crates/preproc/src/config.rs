//! Converter configuration.
//!
//! ```yaml
//! provider: TMSRAD
//! input files:
//!   - /data/tms/TMS_RAD_20250101.nc
//! output file: /data/ioda/tms_obs.json
//! channel: "1,2,5"
//! thinning:
//!   threshold: 0.25
//!   seed: 42
//! ```
//!
//! `channel` may also be written as a single integer or a YAML list.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::channels::ChannelSelection;
use crate::decoder::DecodeSettings;
use crate::error::{PreprocError, Result};
use crate::provider::Provider;
use crate::thinning::{Thinner, DEFAULT_SEED};

// ============================================================================
// Raw configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    pub provider: String,

    #[serde(rename = "input files", default)]
    pub input_files: Vec<PathBuf>,

    #[serde(rename = "output file", default)]
    pub output_file: Option<PathBuf>,

    pub channel: ChannelSpec,

    pub thinning: ThinningConfig,
}

/// Channel list as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpec {
    Single(i64),
    List(Vec<i64>),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinningConfig {
    pub threshold: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

// ============================================================================
// Validated configuration
// ============================================================================

/// Configuration after validation, ready to drive a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPlan {
    pub provider: Provider,
    pub settings: DecodeSettings,
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
}

impl ConverterConfig {
    /// Parse YAML text. Environment expansion is the caller's job.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| PreprocError::Config(format!("failed to parse configuration: {}", e)))
    }

    /// Check every field and build the plan.
    pub fn validate(&self) -> Result<ConversionPlan> {
        let provider: Provider = self.provider.parse()?;
        let channels = self.channel.to_selection()?;
        let thinning = Thinner::new(self.thinning.threshold, self.thinning.seed)?;

        if self.input_files.is_empty() {
            return Err(PreprocError::Config("no input files configured".to_string()));
        }

        Ok(ConversionPlan {
            provider,
            settings: DecodeSettings { channels, thinning },
            inputs: self.input_files.clone(),
            output: self.output_file.clone(),
        })
    }
}

impl ChannelSpec {
    pub fn to_selection(&self) -> Result<ChannelSelection> {
        match self {
            ChannelSpec::Text(text) => ChannelSelection::parse(text),
            ChannelSpec::Single(c) => ChannelSelection::from_channels(vec![narrow(*c)?]),
            ChannelSpec::List(list) => {
                let channels = list.iter().map(|&c| narrow(c)).collect::<Result<Vec<_>>>()?;
                ChannelSelection::from_channels(channels)
            }
        }
    }
}

fn narrow(channel: i64) -> Result<i32> {
    i32::try_from(channel)
        .map_err(|_| PreprocError::Config(format!("channel {} is out of range", channel)))
}
