//! Provider catalogue.
//!
//! Each provider is a closed variant carrying its file contract as data: the
//! dimension names, a variable table (name, role, required or optional,
//! element type, shape) and the QC treatment. The decoder is generic over
//! this data.

use std::fmt;
use std::str::FromStr;

use netcdf_parser::VarType;

use crate::error::PreprocError;
use crate::flags::{FlagMapping, TMS_RADIANCE_QC};

/// Supported provider formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// TMS L1B brightness temperature files.
    TmsBrightnessTemperature,
    /// TMS radiance-derived brightness temperature files with geometry.
    TmsRadiance,
}

/// What a variable contributes to the observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Longitude,
    Latitude,
    Observation,
    QualityFlag,
    AuxiliaryFlag,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    /// Per-location float metadata, written under the given column name.
    FloatMetadata(&'static str),
}

/// Dimensions a variable spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scan,
    SpotScan,
    SpotScanChannel,
}

/// One row of a provider's file contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    pub name: &'static str,
    pub role: Role,
    pub required: bool,
    pub var_type: VarType,
    pub shape: Shape,
}

impl VariableSpec {
    const fn required(name: &'static str, role: Role, var_type: VarType, shape: Shape) -> Self {
        Self {
            name,
            role,
            required: true,
            var_type,
            shape,
        }
    }

    const fn optional(name: &'static str, role: Role, var_type: VarType, shape: Shape) -> Self {
        Self {
            name,
            role,
            required: false,
            var_type,
            shape,
        }
    }
}

/// Names of the grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionNames {
    pub spots: &'static str,
    pub scans: &'static str,
    pub channels: &'static str,
}

/// How the PreQC column is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcPolicy {
    /// Copy the provider's flag unchanged.
    Passthrough,
    /// Reduce the provider's flag to good/bad with a bit mapping.
    Repack(FlagMapping),
}

/// How the ObsError column is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObsErrorPolicy {
    Constant(f32),
    /// Left as the missing value for downstream assignment.
    Unset,
}

/// The file contract of one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSchema {
    pub dimensions: DimensionNames,
    pub variables: &'static [VariableSpec],
    pub qc: QcPolicy,
    pub obs_error: ObsErrorPolicy,
}

impl ProviderSchema {
    pub fn variable(&self, role: Role) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.role == role)
    }

    /// Output names of the float metadata columns, in table order.
    pub fn float_metadata_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .filter_map(|v| match v.role {
                Role::FloatMetadata(column) => Some(column.to_string()),
                _ => None,
            })
            .collect()
    }
}

const TMS_DIMENSIONS: DimensionNames = DimensionNames {
    spots: "spots",
    scans: "scans",
    channels: "channels",
};

const TMS_BRIGHTNESS_VARIABLES: &[VariableSpec] = &[
    VariableSpec::required("longitude", Role::Longitude, VarType::F32, Shape::SpotScan),
    VariableSpec::required("latitude", Role::Latitude, VarType::F32, Shape::SpotScan),
    VariableSpec::required("brightness_temperature", Role::Observation, VarType::F32, Shape::SpotScanChannel),
    VariableSpec::required("combinedQualityFlag", Role::QualityFlag, VarType::I32, Shape::SpotScanChannel),
    VariableSpec::required("Year", Role::Year, VarType::U16, Shape::Scan),
    VariableSpec::required("Month", Role::Month, VarType::U8, Shape::Scan),
    VariableSpec::required("Day", Role::Day, VarType::U8, Shape::Scan),
    VariableSpec::required("Hour", Role::Hour, VarType::U8, Shape::Scan),
    VariableSpec::required("Minute", Role::Minute, VarType::U8, Shape::Scan),
    VariableSpec::required("Second", Role::Second, VarType::U8, Shape::Scan),
];

const TMS_RADIANCE_VARIABLES: &[VariableSpec] = &[
    VariableSpec::required("longitude", Role::Longitude, VarType::F32, Shape::SpotScan),
    VariableSpec::required("latitude", Role::Latitude, VarType::F32, Shape::SpotScan),
    VariableSpec::required("brightness_temperature", Role::Observation, VarType::F32, Shape::SpotScanChannel),
    VariableSpec::required("combinedQualityFlag", Role::QualityFlag, VarType::U16, Shape::SpotScanChannel),
    VariableSpec::required("flagSDRTX", Role::AuxiliaryFlag, VarType::U8, Shape::SpotScanChannel),
    VariableSpec::required("Year", Role::Year, VarType::U16, Shape::Scan),
    VariableSpec::required("Month", Role::Month, VarType::U8, Shape::Scan),
    VariableSpec::required("Day", Role::Day, VarType::U8, Shape::Scan),
    VariableSpec::required("Hour", Role::Hour, VarType::U8, Shape::Scan),
    VariableSpec::required("Minute", Role::Minute, VarType::U8, Shape::Scan),
    VariableSpec::required("Second", Role::Second, VarType::U8, Shape::Scan),
    VariableSpec::optional("lunar_azimuth_angle", Role::FloatMetadata("lunarAzimuthAngle"), VarType::F32, Shape::SpotScan),
    VariableSpec::optional("lunar_zenith_angle", Role::FloatMetadata("lunarZenithAngle"), VarType::F32, Shape::SpotScan),
    VariableSpec::optional("sensor_azimuth_angle", Role::FloatMetadata("sensorAzimuthAngle"), VarType::F32, Shape::SpotScan),
    VariableSpec::optional("sensor_view_angle", Role::FloatMetadata("sensorViewAngle"), VarType::F32, Shape::SpotScan),
    VariableSpec::optional("sensor_zenith_angle", Role::FloatMetadata("sensorZenithAngle"), VarType::F32, Shape::SpotScan),
    VariableSpec::optional("solar_azimuth_angle", Role::FloatMetadata("solarAzimuthAngle"), VarType::F32, Shape::SpotScan),
    VariableSpec::optional("solar_zenith_angle", Role::FloatMetadata("solarZenithAngle"), VarType::F32, Shape::SpotScan),
];

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::TmsBrightnessTemperature, Provider::TmsRadiance];

    /// Configuration name of the provider.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::TmsBrightnessTemperature => "TMSBT",
            Provider::TmsRadiance => "TMSRAD",
        }
    }

    /// Observed variable name used for the ObsValue/ObsError/PreQC groups.
    pub fn variable_name(&self) -> &'static str {
        match self {
            Provider::TmsBrightnessTemperature | Provider::TmsRadiance => "brightnessTemperature",
        }
    }

    pub fn schema(&self) -> ProviderSchema {
        match self {
            Provider::TmsBrightnessTemperature => ProviderSchema {
                dimensions: TMS_DIMENSIONS,
                variables: TMS_BRIGHTNESS_VARIABLES,
                qc: QcPolicy::Passthrough,
                obs_error: ObsErrorPolicy::Constant(2.0),
            },
            Provider::TmsRadiance => ProviderSchema {
                dimensions: TMS_DIMENSIONS,
                variables: TMS_RADIANCE_VARIABLES,
                qc: QcPolicy::Repack(TMS_RADIANCE_QC),
                obs_error: ObsErrorPolicy::Unset,
            },
        }
    }
}

impl FromStr for Provider {
    type Err = PreprocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Provider::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PreprocError::Config(format!("unknown provider '{}'", s)))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
