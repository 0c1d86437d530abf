//! Satellite observation preprocessing.
//!
//! Converts provider NetCDF files (TMS brightness temperature and radiance
//! products) into IODA observation tables: channel selection, reproducible
//! random thinning, calendar-to-epoch time conversion and quality flag
//! repacking.
//!
//! # Pipeline
//!
//! 1. [`ConverterConfig`] is parsed and validated into a [`ConversionPlan`].
//! 2. A [`Converter`] runs a fresh [`Decoder`] over each input file.
//! 3. The concatenated [`ioda_common::IodaVars`] table goes to an
//!    [`ObsWriter`] such as [`JsonWriter`].

pub mod channels;
pub mod config;
pub mod converter;
pub mod decoder;
pub mod error;
pub mod flags;
pub mod provider;
pub mod thinning;
pub mod writer;

// Re-exports
pub use channels::ChannelSelection;
pub use config::{ChannelSpec, ConversionPlan, ConverterConfig, ThinningConfig};
pub use converter::{expand_inputs, ConversionResult, Converter};
pub use decoder::{DecodeSettings, DecodeStage, Decoder, GridShape};
pub use error::{PreprocError, Result};
pub use flags::{FlagBit, FlagCodec, FlagMapping, TMS_RADIANCE_QC};
pub use provider::{Provider, ProviderSchema, QcPolicy};
pub use thinning::{InclusionMask, Thinner, DEFAULT_SEED};
pub use writer::{JsonWriter, ObsWriter};
