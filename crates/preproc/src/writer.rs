//! Output writers.
//!
//! A writer receives a finished [`IodaVars`] table and persists it. The
//! [`JsonWriter`] lays the table out the way an IODA file is grouped:
//!
//! ```text
//! {
//!   "attributes": { "reference_epoch": ... },
//!   "dimensions": { "Location": n, "Channel": c },
//!   "MetaData":  { "latitude": [..], "longitude": [..], "dateTime": [..],
//!                  "sensorChannelNumber": [..], <metadata columns> },
//!   "ObsValue":  { "<variable>": [[..], ..] },
//!   "ObsError":  { "<variable>": [[..], ..] },
//!   "PreQC":     { "<variable>": [[..], ..] }
//! }
//! ```
//!
//! Per-cell groups are nested `[location][channel]`. `dateTime` is written
//! as int64 seconds, with IODA's int64 fill for unset scans.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ioda_common::{datetime_to_int64, IodaVars};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{PreprocError, Result};

/// Destination for converted tables.
pub trait ObsWriter {
    fn write(&self, table: &IodaVars, path: &Path) -> Result<()>;
}

/// Writes tables as IODA-grouped JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Build the JSON document for a table.
    pub fn to_value(&self, table: &IodaVars) -> Result<Value> {
        let nchan = table.channel_count();

        let mut metadata = Map::new();
        metadata.insert("latitude".into(), json!(table.latitude()));
        metadata.insert("longitude".into(), json!(table.longitude()));
        let datetime: Vec<i64> = table.datetime().iter().map(|&s| datetime_to_int64(s)).collect();
        metadata.insert("dateTime".into(), json!(datetime));
        metadata.insert("sensorChannelNumber".into(), json!(table.channel_values()));
        for name in table.float_metadata_names() {
            metadata.insert(name.clone(), json!(table.float_metadata_column(name)?));
        }
        for name in table.int_metadata_names() {
            metadata.insert(name.clone(), json!(table.int_metadata_column(name)?));
        }

        let variable = table.variable_name();
        Ok(json!({
            "attributes": { "reference_epoch": table.reference_epoch() },
            "dimensions": { "Location": table.location_count(), "Channel": nchan },
            "MetaData": metadata,
            "ObsValue": { variable: by_location(table.obs_value(), nchan) },
            "ObsError": { variable: by_location(table.obs_error(), nchan) },
            "PreQC": { variable: by_location(table.pre_qc(), nchan) },
        }))
    }
}

impl ObsWriter for JsonWriter {
    fn write(&self, table: &IodaVars, path: &Path) -> Result<()> {
        let document = self.to_value(table)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        let encoded = if self.pretty {
            serde_json::to_writer_pretty(&mut out, &document)
        } else {
            serde_json::to_writer(&mut out, &document)
        };
        encoded.map_err(|e| PreprocError::Write(format!("{}: {}", path.display(), e)))?;
        out.flush()?;

        info!(
            path = %path.display(),
            locations = table.location_count(),
            channels = table.channel_count(),
            "Wrote observation table"
        );
        Ok(())
    }
}

fn by_location<T: Serialize + Copy>(cells: &[T], channels: usize) -> Vec<Vec<T>> {
    if channels == 0 {
        return Vec::new();
    }
    cells.chunks(channels).map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ioda_common::{MISSING_FLOAT, MISSING_INT64};

    fn sample() -> IodaVars {
        let mut table = IodaVars::new(
            2,
            2,
            "brightnessTemperature",
            vec!["sensorZenithAngle".to_string()],
            Vec::new(),
        );
        table.set_channel_values(&[3, 1]).unwrap();
        table.set_location(0, 10.0, 20.0, 100.0).unwrap();
        table.set_location(1, 11.0, 21.0, 101.0).unwrap();
        table.set_float_metadata(0, 0, 45.0).unwrap();
        table.set_cell(0, 0, 250.0, 2.0, 0).unwrap();
        table.set_cell(0, 1, 251.0, 2.0, 1).unwrap();
        table.set_cell(1, 0, 252.0, 2.0, 0).unwrap();
        table
    }

    #[test]
    fn test_document_groups() {
        let doc = JsonWriter::new().to_value(&sample()).unwrap();

        assert_eq!(doc["dimensions"]["Location"], 2);
        assert_eq!(doc["dimensions"]["Channel"], 2);
        assert_eq!(
            doc["attributes"]["reference_epoch"],
            "seconds since 1970-01-01T00:00:00Z"
        );
        assert_eq!(doc["MetaData"]["sensorChannelNumber"], json!([3, 1]));
        assert_eq!(doc["MetaData"]["latitude"], json!([10.0, 11.0]));
        assert_eq!(doc["MetaData"]["sensorZenithAngle"][0], 45.0);
        assert_eq!(doc["ObsValue"]["brightnessTemperature"][0], json!([250.0, 251.0]));
        assert_eq!(doc["PreQC"]["brightnessTemperature"][0], json!([0, 1]));
    }

    #[test]
    fn test_unfilled_cells_carry_missing_value() {
        let doc = JsonWriter::new().to_value(&sample()).unwrap();
        let unset = doc["ObsValue"]["brightnessTemperature"][1][1].as_f64().unwrap();
        assert_eq!(unset as f32, MISSING_FLOAT);
    }

    #[test]
    fn test_datetime_is_int64_with_int64_fill() {
        let mut table = sample();
        table.set_location(1, 11.0, 21.0, ioda_common::missing::MISSING_DATETIME).unwrap();
        let doc = JsonWriter::new().to_value(&table).unwrap();
        assert_eq!(doc["MetaData"]["dateTime"], json!([100, MISSING_INT64]));
        assert!(doc["MetaData"]["dateTime"][0].is_i64());
    }

    #[test]
    fn test_empty_table() {
        let doc = JsonWriter::new()
            .to_value(&IodaVars::empty("brightnessTemperature"))
            .unwrap();
        assert_eq!(doc["dimensions"]["Location"], 0);
        assert_eq!(doc["ObsValue"]["brightnessTemperature"], json!([]));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("obs.json");
        JsonWriter::new().pretty(true).write(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["dimensions"]["Location"], 2);
    }
}
