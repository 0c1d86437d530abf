//! The IODA observation table.
//!
//! A table is sized once, from the number of retained locations and the
//! number of selected channels, and then filled row by row. Per-cell columns
//! (observation value, error, PreQC) are stored location-major: the value for
//! `(location, channel)` lives at `channel_count * location + channel`.

use crate::error::{TableError, TableResult};
use crate::missing::{MISSING_DATETIME, MISSING_FLOAT, MISSING_INT};

/// Units string written as the global reference-epoch attribute.
pub const REFERENCE_EPOCH: &str = "seconds since 1970-01-01T00:00:00Z";

/// Fixed-shape observation table produced by a provider decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct IodaVars {
    location_count: usize,
    channel_count: usize,
    variable_name: String,
    reference_epoch: String,

    latitude: Vec<f32>,
    longitude: Vec<f32>,
    datetime: Vec<f64>,

    float_metadata_names: Vec<String>,
    float_metadata: Vec<f32>,
    int_metadata_names: Vec<String>,
    int_metadata: Vec<i32>,

    obs_value: Vec<f32>,
    obs_error: Vec<f32>,
    pre_qc: Vec<i32>,
    channel_values: Vec<i32>,
}

impl IodaVars {
    /// Allocate a table with every cell set to the missing value.
    pub fn new(
        location_count: usize,
        channel_count: usize,
        variable_name: impl Into<String>,
        float_metadata_names: Vec<String>,
        int_metadata_names: Vec<String>,
    ) -> Self {
        let cells = location_count * channel_count;
        Self {
            location_count,
            channel_count,
            variable_name: variable_name.into(),
            reference_epoch: REFERENCE_EPOCH.to_string(),
            latitude: vec![MISSING_FLOAT; location_count],
            longitude: vec![MISSING_FLOAT; location_count],
            datetime: vec![MISSING_DATETIME; location_count],
            float_metadata: vec![MISSING_FLOAT; location_count * float_metadata_names.len()],
            float_metadata_names,
            int_metadata: vec![MISSING_INT; location_count * int_metadata_names.len()],
            int_metadata_names,
            obs_value: vec![MISSING_FLOAT; cells],
            obs_error: vec![MISSING_FLOAT; cells],
            pre_qc: vec![MISSING_INT; cells],
            channel_values: vec![MISSING_INT; channel_count],
        }
    }

    /// Zero-location table, returned when a file cannot be decoded.
    pub fn empty(variable_name: impl Into<String>) -> Self {
        Self::new(0, 0, variable_name, Vec::new(), Vec::new())
    }

    pub fn location_count(&self) -> usize {
        self.location_count
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn is_empty(&self) -> bool {
        self.location_count == 0
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    pub fn reference_epoch(&self) -> &str {
        &self.reference_epoch
    }

    pub fn latitude(&self) -> &[f32] {
        &self.latitude
    }

    pub fn longitude(&self) -> &[f32] {
        &self.longitude
    }

    pub fn datetime(&self) -> &[f64] {
        &self.datetime
    }

    pub fn obs_value(&self) -> &[f32] {
        &self.obs_value
    }

    pub fn obs_error(&self) -> &[f32] {
        &self.obs_error
    }

    pub fn pre_qc(&self) -> &[i32] {
        &self.pre_qc
    }

    pub fn channel_values(&self) -> &[i32] {
        &self.channel_values
    }

    pub fn float_metadata_names(&self) -> &[String] {
        &self.float_metadata_names
    }

    pub fn int_metadata_names(&self) -> &[String] {
        &self.int_metadata_names
    }

    /// Flat index of a per-cell value.
    pub fn cell_index(&self, location: usize, channel: usize) -> usize {
        self.channel_count * location + channel
    }

    /// Record the selected channel identifiers, in output column order.
    pub fn set_channel_values(&mut self, channels: &[i32]) -> TableResult<()> {
        if channels.len() != self.channel_count {
            return Err(TableError::ColumnLength {
                column: "channelValues".to_string(),
                expected: self.channel_count,
                actual: channels.len(),
            });
        }
        self.channel_values.copy_from_slice(channels);
        Ok(())
    }

    /// Write the coordinate and time columns of one location.
    pub fn set_location(
        &mut self,
        location: usize,
        latitude: f32,
        longitude: f32,
        datetime: f64,
    ) -> TableResult<()> {
        self.check_location(location)?;
        self.latitude[location] = latitude;
        self.longitude[location] = longitude;
        self.datetime[location] = datetime;
        Ok(())
    }

    /// Write one float metadata value, addressed by column position.
    pub fn set_float_metadata(&mut self, location: usize, column: usize, value: f32) -> TableResult<()> {
        self.check_location(location)?;
        let width = self.float_metadata_names.len();
        if column >= width {
            return Err(TableError::UnknownMetadata(format!("float column #{}", column)));
        }
        self.float_metadata[location * width + column] = value;
        Ok(())
    }

    /// Write one int metadata value, addressed by column position.
    pub fn set_int_metadata(&mut self, location: usize, column: usize, value: i32) -> TableResult<()> {
        self.check_location(location)?;
        let width = self.int_metadata_names.len();
        if column >= width {
            return Err(TableError::UnknownMetadata(format!("int column #{}", column)));
        }
        self.int_metadata[location * width + column] = value;
        Ok(())
    }

    /// Write value, error and PreQC for one (location, channel) cell.
    pub fn set_cell(
        &mut self,
        location: usize,
        channel: usize,
        value: f32,
        error: f32,
        pre_qc: i32,
    ) -> TableResult<()> {
        self.check_location(location)?;
        if channel >= self.channel_count {
            return Err(TableError::ChannelOutOfRange {
                channel,
                count: self.channel_count,
            });
        }
        let idx = self.cell_index(location, channel);
        self.obs_value[idx] = value;
        self.obs_error[idx] = error;
        self.pre_qc[idx] = pre_qc;
        Ok(())
    }

    /// Extract one float metadata column by name.
    pub fn float_metadata_column(&self, name: &str) -> TableResult<Vec<f32>> {
        let width = self.float_metadata_names.len();
        let column = self
            .float_metadata_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| TableError::UnknownMetadata(name.to_string()))?;
        Ok((0..self.location_count)
            .map(|loc| self.float_metadata[loc * width + column])
            .collect())
    }

    /// Extract one int metadata column by name.
    pub fn int_metadata_column(&self, name: &str) -> TableResult<Vec<i32>> {
        let width = self.int_metadata_names.len();
        let column = self
            .int_metadata_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| TableError::UnknownMetadata(name.to_string()))?;
        Ok((0..self.location_count)
            .map(|loc| self.int_metadata[loc * width + column])
            .collect())
    }

    /// Append the locations of several tables into one.
    ///
    /// Zero-location tables are skipped. The remaining tables must agree on
    /// variable name, channel values and metadata columns. If every table is
    /// empty the first one is returned.
    pub fn concat(parts: Vec<IodaVars>) -> TableResult<IodaVars> {
        let (filled, empty): (Vec<_>, Vec<_>) = parts.into_iter().partition(|p| !p.is_empty());
        let mut parts = filled.into_iter();
        let mut merged = match parts.next() {
            Some(first) => first,
            None => {
                return Ok(empty
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| IodaVars::empty(String::new())))
            }
        };

        for part in parts {
            if part.variable_name != merged.variable_name {
                return Err(TableError::Incompatible(format!(
                    "variable {} vs {}",
                    part.variable_name, merged.variable_name
                )));
            }
            if part.channel_values != merged.channel_values {
                return Err(TableError::Incompatible(format!(
                    "channels {:?} vs {:?}",
                    part.channel_values, merged.channel_values
                )));
            }
            if part.float_metadata_names != merged.float_metadata_names
                || part.int_metadata_names != merged.int_metadata_names
            {
                return Err(TableError::Incompatible("metadata columns differ".to_string()));
            }

            merged.location_count += part.location_count;
            merged.latitude.extend(part.latitude);
            merged.longitude.extend(part.longitude);
            merged.datetime.extend(part.datetime);
            merged.float_metadata.extend(part.float_metadata);
            merged.int_metadata.extend(part.int_metadata);
            merged.obs_value.extend(part.obs_value);
            merged.obs_error.extend(part.obs_error);
            merged.pre_qc.extend(part.pre_qc);
        }

        merged.validate()?;
        Ok(merged)
    }

    /// Re-check every column length against the table shape.
    pub fn validate(&self) -> TableResult<()> {
        let locs = self.location_count;
        let cells = locs * self.channel_count;
        check_len("latitude", locs, self.latitude.len())?;
        check_len("longitude", locs, self.longitude.len())?;
        check_len("dateTime", locs, self.datetime.len())?;
        check_len(
            "floatMetadata",
            locs * self.float_metadata_names.len(),
            self.float_metadata.len(),
        )?;
        check_len(
            "intMetadata",
            locs * self.int_metadata_names.len(),
            self.int_metadata.len(),
        )?;
        check_len("ObsValue", cells, self.obs_value.len())?;
        check_len("ObsError", cells, self.obs_error.len())?;
        check_len("PreQC", cells, self.pre_qc.len())?;
        check_len("channelValues", self.channel_count, self.channel_values.len())?;
        Ok(())
    }

    fn check_location(&self, location: usize) -> TableResult<()> {
        if location >= self.location_count {
            return Err(TableError::LocationOutOfRange {
                location,
                count: self.location_count,
            });
        }
        Ok(())
    }
}

fn check_len(column: &str, expected: usize, actual: usize) -> TableResult<()> {
    if expected != actual {
        return Err(TableError::ColumnLength {
            column: column.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
