//! Provider decoding.
//!
//! A [`Decoder`] turns one provider file into an [`IodaVars`] table. It walks
//! a fixed sequence of stages and records the last one reached:
//!
//! ```text
//! Unopened -> Opened -> DimensionsRead -> BuffersRead -> MaskComputed -> TableFilled -> Done
//! ```
//!
//! Any per-file failure (unreadable file, missing dimension or required
//! variable, extent mismatch) jumps straight to `Done` with an empty table and
//! a warning. Configuration errors, such as a selected channel the file does
//! not have, are returned to the caller.

use std::path::Path;

use ioda_common::missing::MISSING_DATETIME;
use ioda_common::{CalendarTime, IodaVars, MISSING_FLOAT};
use netcdf_parser::{GridSource, NetCdfError, SourceOpener, VarData};
use tracing::{debug, info, warn};

use crate::channels::ChannelSelection;
use crate::error::{PreprocError, Result};
use crate::flags::{FlagCodec, FlagMapping};
use crate::provider::{ObsErrorPolicy, Provider, ProviderSchema, QcPolicy, Role, Shape, VariableSpec};
use crate::thinning::{InclusionMask, Thinner};

/// Progress of one decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecodeStage {
    Unopened,
    Opened,
    DimensionsRead,
    BuffersRead,
    MaskComputed,
    TableFilled,
    Done,
}

/// Read-only settings shared by every decode of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeSettings {
    pub channels: ChannelSelection,
    pub thinning: Thinner,
}

/// Extents of the (spot, scan, channel) grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub spots: usize,
    pub scans: usize,
    pub channels: usize,
}

impl GridShape {
    fn extents(&self, shape: Shape) -> Vec<usize> {
        match shape {
            Shape::Scan => vec![self.scans],
            Shape::SpotScan => vec![self.spots, self.scans],
            Shape::SpotScanChannel => vec![self.spots, self.scans, self.channels],
        }
    }

    /// Flat index of a (spot, scan) cell.
    pub fn location_index(&self, spot: usize, scan: usize) -> usize {
        spot * self.scans + scan
    }

    /// Flat index of a (spot, scan, channel) cell.
    pub fn cell_index(&self, spot: usize, scan: usize, channel: usize) -> usize {
        self.location_index(spot, scan) * self.channels + channel
    }
}

/// Flat buffers read from one file.
#[derive(Debug, Default)]
struct RawBuffers {
    longitude: Vec<f32>,
    latitude: Vec<f32>,
    observation: Vec<f32>,
    quality: Vec<u32>,
    auxiliary: Vec<(&'static str, Vec<u8>)>,
    year: Vec<i32>,
    month: Vec<i32>,
    day: Vec<i32>,
    hour: Vec<i32>,
    minute: Vec<i32>,
    second: Vec<i32>,
    float_metadata: Vec<Vec<f32>>,
}

/// Decoder for one provider.
pub struct Decoder<'a> {
    provider: Provider,
    schema: ProviderSchema,
    settings: &'a DecodeSettings,
    stage: DecodeStage,
    skipped: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(provider: Provider, settings: &'a DecodeSettings) -> Self {
        Self {
            provider,
            schema: provider.schema(),
            settings,
            stage: DecodeStage::Unopened,
            skipped: false,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Last stage reached by the most recent decode.
    pub fn stage(&self) -> DecodeStage {
        self.stage
    }

    /// Whether the most recent decode gave up on its file.
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    /// Open and decode one file.
    ///
    /// Returns an empty table when the file cannot be used; returns an error
    /// only for configuration problems.
    pub fn decode_file(&mut self, opener: &dyn SourceOpener, path: &Path) -> Result<IodaVars> {
        self.stage = DecodeStage::Unopened;
        self.skipped = false;
        info!(provider = %self.provider, file = %path.display(), "Processing provider file");

        let source = match opener.open(path) {
            Ok(source) => source,
            Err(e) => return self.recover(path.display().to_string(), e.into()),
        };
        self.decode(source.as_ref())
    }

    /// Decode an already-open source.
    pub fn decode(&mut self, source: &dyn GridSource) -> Result<IodaVars> {
        self.stage = DecodeStage::Opened;
        self.skipped = false;
        let label = source.label().to_string();

        match self.run(source) {
            Ok(table) => {
                self.stage = DecodeStage::Done;
                info!(
                    provider = %self.provider,
                    file = %label,
                    locations = table.location_count(),
                    channels = table.channel_count(),
                    "Decoded provider file"
                );
                Ok(table)
            }
            Err(e) => self.recover(label, e),
        }
    }

    fn recover(&mut self, label: String, err: PreprocError) -> Result<IodaVars> {
        let failed_at = self.stage;
        self.stage = DecodeStage::Done;
        if !err.is_recoverable() {
            return Err(err);
        }
        self.skipped = true;
        warn!(
            provider = %self.provider,
            file = %label,
            stage = ?failed_at,
            error = %err,
            "Failed to decode file. Skipping."
        );
        self.empty_table()
    }

    /// Zero-location table with this run's channels and metadata columns.
    pub fn empty_table(&self) -> Result<IodaVars> {
        self.allocate(0)
    }

    fn allocate(&self, locations: usize) -> Result<IodaVars> {
        let channels = &self.settings.channels;
        let mut table = IodaVars::new(
            locations,
            channels.len(),
            self.provider.variable_name(),
            self.schema.float_metadata_names(),
            Vec::new(),
        );
        table.set_channel_values(channels.channels())?;
        Ok(table)
    }

    fn run(&mut self, source: &dyn GridSource) -> Result<IodaVars> {
        let shape = self.read_dimensions(source)?;
        self.stage = DecodeStage::DimensionsRead;
        info!(
            spots = shape.spots,
            scans = shape.scans,
            channels = shape.channels,
            "Read grid dimensions"
        );

        let buffers = self.read_buffers(source, &shape)?;
        self.stage = DecodeStage::BuffersRead;

        self.settings.channels.validate(shape.channels)?;
        let mask = self.settings.thinning.mask(shape.spots, shape.scans);
        self.stage = DecodeStage::MaskComputed;
        info!(
            channels = %self.settings.channels,
            threshold = self.settings.thinning.threshold(),
            kept = mask.location_count(),
            of = shape.spots * shape.scans,
            "Computed thinning mask"
        );

        let scan_times = self.scan_times(&buffers, source.label());
        let table = self.fill_table(&shape, &buffers, &scan_times, &mask)?;
        self.stage = DecodeStage::TableFilled;

        table.validate()?;
        Ok(table)
    }

    fn read_dimensions(&self, source: &dyn GridSource) -> Result<GridShape> {
        let dims = &self.schema.dimensions;
        let lookup = |name: &str| -> Result<usize> {
            source
                .dimension_len(name)
                .ok_or_else(|| NetCdfError::MissingDimension(name.to_string()).into())
        };
        Ok(GridShape {
            spots: lookup(dims.spots)?,
            scans: lookup(dims.scans)?,
            channels: lookup(dims.channels)?,
        })
    }

    fn read_buffers(&self, source: &dyn GridSource, shape: &GridShape) -> Result<RawBuffers> {
        let mut buffers = RawBuffers::default();

        for spec in self.schema.variables {
            let data = self.read_variable(source, spec, shape)?;
            match spec.role {
                Role::Longitude => buffers.longitude = data.into_f32(),
                Role::Latitude => buffers.latitude = data.into_f32(),
                Role::Observation => buffers.observation = data.into_f32(),
                Role::QualityFlag => buffers.quality = data.into_bits(),
                Role::AuxiliaryFlag => buffers
                    .auxiliary
                    .push((spec.name, data.into_bits().into_iter().map(|v| v as u8).collect())),
                Role::Year => buffers.year = data.into_i32(),
                Role::Month => buffers.month = data.into_i32(),
                Role::Day => buffers.day = data.into_i32(),
                Role::Hour => buffers.hour = data.into_i32(),
                Role::Minute => buffers.minute = data.into_i32(),
                Role::Second => buffers.second = data.into_i32(),
                Role::FloatMetadata(_) => buffers.float_metadata.push(data.into_f32()),
            }
        }

        Ok(buffers)
    }

    /// Read one variable, checking its extents against the grid.
    ///
    /// A missing optional variable yields a buffer of fill values.
    fn read_variable(
        &self,
        source: &dyn GridSource,
        spec: &VariableSpec,
        shape: &GridShape,
    ) -> Result<VarData> {
        let expected = shape.extents(spec.shape);

        let Some(actual) = source.variable_shape(spec.name) else {
            if spec.required {
                return Err(NetCdfError::MissingVariable(spec.name.to_string()).into());
            }
            warn!(variable = spec.name, "Optional variable absent, using fill value");
            let len = expected.iter().product();
            return Ok(VarData::F32(vec![MISSING_FLOAT; len]).convert(spec.var_type));
        };

        if actual != expected {
            return Err(PreprocError::Schema(format!(
                "variable '{}' has extents {:?}, expected {:?}",
                spec.name, actual, expected
            )));
        }

        let data = source.read(spec.name, spec.var_type)?;
        let len: usize = expected.iter().product();
        if data.len() != len {
            return Err(PreprocError::Schema(format!(
                "variable '{}' returned {} values, expected {}",
                spec.name,
                data.len(),
                len
            )));
        }

        debug!(variable = spec.name, values = len, "Read variable");
        Ok(data)
    }

    /// Epoch seconds per scan; out-of-range components become the fill value.
    fn scan_times(&self, buffers: &RawBuffers, label: &str) -> Vec<f64> {
        (0..buffers.year.len())
            .map(|scan| {
                let component = |values: &[i32]| values[scan].max(0) as u32;
                let time = CalendarTime::new(
                    buffers.year[scan],
                    component(&buffers.month),
                    component(&buffers.day),
                    component(&buffers.hour),
                    component(&buffers.minute),
                    component(&buffers.second),
                );
                match time.epoch_seconds() {
                    Ok(seconds) => seconds,
                    Err(e) => {
                        let err = PreprocError::Range(e.to_string());
                        warn!(file = %label, scan = scan, error = %err, "Invalid scan time, using fill value");
                        MISSING_DATETIME
                    }
                }
            })
            .collect()
    }

    fn fill_table(
        &self,
        shape: &GridShape,
        buffers: &RawBuffers,
        scan_times: &[f64],
        mask: &InclusionMask,
    ) -> Result<IodaVars> {
        let channels = &self.settings.channels;
        let mut table = self.allocate(mask.location_count())?;

        let (codec, auxiliary) = match self.schema.qc {
            QcPolicy::Repack(mapping) => (
                Some(FlagCodec::new(&mapping)),
                auxiliary_flags(&mapping, &buffers.auxiliary)?,
            ),
            QcPolicy::Passthrough => (None, Vec::new()),
        };
        let obs_error = match self.schema.obs_error {
            ObsErrorPolicy::Constant(value) => value,
            ObsErrorPolicy::Unset => MISSING_FLOAT,
        };
        let source_channels: Vec<usize> = channels.source_indices().collect();

        for (loc, (spot, scan)) in mask.included().enumerate() {
            let at = shape.location_index(spot, scan);
            table.set_location(loc, buffers.latitude[at], buffers.longitude[at], scan_times[scan])?;

            for (column, values) in buffers.float_metadata.iter().enumerate() {
                table.set_float_metadata(loc, column, values[at])?;
            }

            for (k, &ch) in source_channels.iter().enumerate() {
                let idx = shape.cell_index(spot, scan, ch);
                let raw = buffers.quality[idx];
                let pre_qc = match &codec {
                    Some(codec) => codec.repack(raw, auxiliary.iter().map(|aux| aux[idx])),
                    None => raw as i32,
                };
                table.set_cell(loc, k, buffers.observation[idx], obs_error, pre_qc)?;
            }
        }

        Ok(table)
    }
}

/// Auxiliary flag buffers named by a mapping, in mapping order.
fn auxiliary_flags<'b>(
    mapping: &FlagMapping,
    read: &'b [(&'static str, Vec<u8>)],
) -> Result<Vec<&'b [u8]>> {
    mapping
        .auxiliary
        .iter()
        .map(|&name| {
            read.iter()
                .find(|(read_name, _)| *read_name == name)
                .map(|(_, values)| values.as_slice())
                .ok_or_else(|| {
                    PreprocError::Schema(format!(
                        "flag mapping '{}' needs auxiliary variable '{}', which was not read",
                        mapping.name, name
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_parser::{MemoryCatalog, MemoryGrid};

    fn settings(channels: &str, threshold: f64) -> DecodeSettings {
        DecodeSettings {
            channels: ChannelSelection::parse(channels).unwrap(),
            thinning: Thinner::new(threshold, 42).unwrap(),
        }
    }

    fn tiny_grid() -> MemoryGrid {
        let (spots, scans, chans) = (1, 2, 2);
        MemoryGrid::new("tiny.nc")
            .with_dimension("spots", spots)
            .with_dimension("scans", scans)
            .with_dimension("channels", chans)
            .with_variable("longitude", &["spots", "scans"], VarData::F32(vec![10.0, 11.0]))
            .with_variable("latitude", &["spots", "scans"], VarData::F32(vec![20.0, 21.0]))
            .with_variable(
                "brightness_temperature",
                &["spots", "scans", "channels"],
                VarData::F32(vec![200.0, 201.0, 210.0, 211.0]),
            )
            .with_variable(
                "combinedQualityFlag",
                &["spots", "scans", "channels"],
                VarData::I32(vec![0, 5, 0, 7]),
            )
            .with_variable("Year", &["scans"], VarData::U16(vec![2025, 2025]))
            .with_variable("Month", &["scans"], VarData::U8(vec![1, 1]))
            .with_variable("Day", &["scans"], VarData::U8(vec![1, 1]))
            .with_variable("Hour", &["scans"], VarData::U8(vec![0, 0]))
            .with_variable("Minute", &["scans"], VarData::U8(vec![0, 0]))
            .with_variable("Second", &["scans"], VarData::U8(vec![0, 1]))
    }

    #[test]
    fn test_grid_shape_indexing() {
        let shape = GridShape {
            spots: 2,
            scans: 3,
            channels: 4,
        };
        assert_eq!(shape.location_index(1, 2), 5);
        assert_eq!(shape.cell_index(1, 2, 3), 23);
        assert_eq!(shape.extents(Shape::Scan), vec![3]);
    }

    #[test]
    fn test_stage_reaches_done() {
        let settings = settings("2", 0.0);
        let mut decoder = Decoder::new(Provider::TmsBrightnessTemperature, &settings);
        assert_eq!(decoder.stage(), DecodeStage::Unopened);

        let table = decoder.decode(&tiny_grid()).unwrap();
        assert_eq!(decoder.stage(), DecodeStage::Done);
        assert_eq!(table.location_count(), 2);
        assert_eq!(table.obs_value(), &[201.0, 211.0]);
        assert_eq!(table.pre_qc(), &[5, 7]);
        assert_eq!(table.obs_error(), &[2.0, 2.0]);
        assert_eq!(table.datetime()[1] - table.datetime()[0], 1.0);
    }

    #[test]
    fn test_open_failure_yields_empty_table() {
        let settings = settings("1", 0.0);
        let mut decoder = Decoder::new(Provider::TmsBrightnessTemperature, &settings);
        let table = decoder
            .decode_file(&MemoryCatalog::new(), Path::new("/missing.nc"))
            .unwrap();
        assert!(table.is_empty());
        assert!(decoder.skipped());
        assert_eq!(decoder.stage(), DecodeStage::Done);
    }

    #[test]
    fn test_skipped_file_keeps_output_layout() {
        let settings = settings("2,1", 0.0);
        let mut decoder = Decoder::new(Provider::TmsRadiance, &settings);
        let table = decoder
            .decode_file(&MemoryCatalog::new(), Path::new("/missing.nc"))
            .unwrap();
        assert!(decoder.skipped());
        assert_eq!(table.location_count(), 0);
        assert_eq!(table.channel_count(), 2);
        assert_eq!(table.channel_values(), &[2, 1]);
        assert_eq!(table.variable_name(), "brightnessTemperature");
        assert_eq!(
            table.float_metadata_names().to_vec(),
            Provider::TmsRadiance.schema().float_metadata_names()
        );
        table.validate().unwrap();
    }

    #[test]
    fn test_channel_outside_file_is_config_error() {
        let settings = settings("3", 0.0);
        let mut decoder = Decoder::new(Provider::TmsBrightnessTemperature, &settings);
        let result = decoder.decode(&tiny_grid());
        assert!(matches!(result, Err(PreprocError::Config(_))));
    }

    #[test]
    fn test_extent_mismatch_is_recoverable() {
        let mut grid = tiny_grid();
        grid.insert_variable("latitude", &["scans"], VarData::F32(vec![0.0, 0.0]));
        let settings = settings("1", 0.0);
        let mut decoder = Decoder::new(Provider::TmsBrightnessTemperature, &settings);
        let table = decoder.decode(&grid).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_auxiliary_flags_follow_mapping() {
        const MAPPING: FlagMapping = FlagMapping {
            name: "two-aux",
            bad_bits: &[],
            auxiliary: &["second", "first"],
        };
        let read = vec![("first", vec![1u8, 0]), ("unused", vec![9, 9]), ("second", vec![0, 1])];
        let selected = auxiliary_flags(&MAPPING, &read).unwrap();
        assert_eq!(selected, vec![&[0u8, 1][..], &[1u8, 0][..]]);

        let missing = auxiliary_flags(&MAPPING, &read[..2]);
        assert!(matches!(missing, Err(PreprocError::Schema(_))));
    }

    #[test]
    fn test_bad_scan_time_uses_fill_value() {
        let mut grid = tiny_grid();
        grid.insert_variable("Month", &["scans"], VarData::U8(vec![13, 1]));
        let settings = settings("1", 0.0);
        let mut decoder = Decoder::new(Provider::TmsBrightnessTemperature, &settings);
        let table = decoder.decode(&grid).unwrap();
        assert_eq!(table.datetime()[0], MISSING_DATETIME);
        assert_eq!(table.datetime()[1], 1_735_689_601.0);
    }
}
