//! Synthetic TMS provider files.
//!
//! The generators build in-memory grids whose every value can be recomputed
//! from its (spot, scan, channel) position, so tests can check exactly which
//! source cell landed in which table cell.

use netcdf_parser::{MemoryGrid, VarData};

const SPOT_SCAN: &[&str] = &["spots", "scans"];
const SPOT_SCAN_CHANNEL: &[&str] = &["spots", "scans", "channels"];

/// Angle variables carried by radiance files, in schema order.
pub const RADIANCE_ANGLE_VARIABLES: [&str; 7] = [
    "lunar_azimuth_angle",
    "lunar_zenith_angle",
    "sensor_azimuth_angle",
    "sensor_view_angle",
    "sensor_zenith_angle",
    "solar_azimuth_angle",
    "solar_zenith_angle",
];

/// Scan start time used by every generated file: 2024-02-29T18:45:12Z.
pub const SAMPLE_TIME: (u16, u8, u8, u8, u8, u8) = (2024, 2, 29, 18, 45, 12);

/// Epoch seconds of [`SAMPLE_TIME`].
pub const SAMPLE_EPOCH: f64 = 1_709_232_312.0;

/// Brightness temperature stored at a cell: `200 + 100*spot + 10*scan + channel`.
///
/// `channel` is the zero-based source index.
pub fn bt_value(spot: usize, scan: usize, channel: usize) -> f32 {
    (200 + 100 * spot + 10 * scan + channel) as f32
}

/// Longitude of a (spot, scan) location.
pub fn lon_value(spot: usize, scan: usize) -> f32 {
    -120.0 + spot as f32 + scan as f32 * 0.01
}

/// Latitude of a (spot, scan) location.
pub fn lat_value(spot: usize, scan: usize) -> f32 {
    30.0 + scan as f32 + spot as f32 * 0.01
}

/// Value of the `k`-th radiance angle variable at a location.
pub fn angle_value(k: usize, spot: usize, scan: usize) -> f32 {
    10.0 * (k + 1) as f32 + spot as f32 + scan as f32 * 0.1
}

/// Epoch seconds of a scan in a generated file. Scans are one second apart.
pub fn scan_epoch(scan: usize) -> f64 {
    SAMPLE_EPOCH + scan as f64
}

fn per_location<T>(spots: usize, scans: usize, f: impl Fn(usize, usize) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(spots * scans);
    for spot in 0..spots {
        for scan in 0..scans {
            out.push(f(spot, scan));
        }
    }
    out
}

fn per_cell<T>(spots: usize, scans: usize, channels: usize, f: impl Fn(usize, usize, usize) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(spots * scans * channels);
    for spot in 0..spots {
        for scan in 0..scans {
            for ch in 0..channels {
                out.push(f(spot, scan, ch));
            }
        }
    }
    out
}

fn base_grid(label: &str, spots: usize, scans: usize, channels: usize) -> MemoryGrid {
    let (year, month, day, hour, minute, second) = SAMPLE_TIME;
    assert!(scans + second as usize <= 60, "generated scans must stay within one minute");

    MemoryGrid::new(label)
        .with_dimension("spots", spots)
        .with_dimension("scans", scans)
        .with_dimension("channels", channels)
        .with_variable("longitude", SPOT_SCAN, VarData::F32(per_location(spots, scans, lon_value)))
        .with_variable("latitude", SPOT_SCAN, VarData::F32(per_location(spots, scans, lat_value)))
        .with_variable(
            "brightness_temperature",
            SPOT_SCAN_CHANNEL,
            VarData::F32(per_cell(spots, scans, channels, bt_value)),
        )
        .with_variable("Year", &["scans"], VarData::U16(vec![year; scans]))
        .with_variable("Month", &["scans"], VarData::U8(vec![month; scans]))
        .with_variable("Day", &["scans"], VarData::U8(vec![day; scans]))
        .with_variable("Hour", &["scans"], VarData::U8(vec![hour; scans]))
        .with_variable("Minute", &["scans"], VarData::U8(vec![minute; scans]))
        .with_variable(
            "Second",
            &["scans"],
            VarData::U8((0..scans).map(|s| second + s as u8).collect()),
        )
}

/// A TMSBT file with every quality flag clear.
pub fn tms_brightness_grid(spots: usize, scans: usize, channels: usize) -> MemoryGrid {
    base_grid("tms_bt.nc", spots, scans, channels).with_variable(
        "combinedQualityFlag",
        SPOT_SCAN_CHANNEL,
        VarData::I32(vec![0; spots * scans * channels]),
    )
}

/// A TMSRAD file with every flag clear and all angle variables present.
pub fn tms_radiance_grid(spots: usize, scans: usize, channels: usize) -> MemoryGrid {
    let cells = spots * scans * channels;
    let mut grid = base_grid("tms_rad.nc", spots, scans, channels)
        .with_variable("combinedQualityFlag", SPOT_SCAN_CHANNEL, VarData::U16(vec![0; cells]))
        .with_variable("flagSDRTX", SPOT_SCAN_CHANNEL, VarData::U8(vec![0; cells]));

    for (k, name) in RADIANCE_ANGLE_VARIABLES.iter().enumerate() {
        let values = per_location(spots, scans, |spot, scan| angle_value(k, spot, scan));
        grid.insert_variable(name, SPOT_SCAN, VarData::F32(values));
    }
    grid
}

/// Flag values where one cell carries `value` and every other cell is 0.
pub fn single_flag(
    spots: usize,
    scans: usize,
    channels: usize,
    at: (usize, usize, usize),
    value: u32,
) -> Vec<u32> {
    per_cell(spots, scans, channels, |spot, scan, ch| {
        if (spot, scan, ch) == at {
            value
        } else {
            0
        }
    })
}
