//! Native NetCDF reading using the netcdf library.
//!
//! Compiled with the `native` feature. Reads go straight through libnetcdf,
//! which performs the element type conversion requested by the caller.

use std::path::Path;
use std::sync::Once;

use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::source::{GridSource, SourceOpener, VarData, VarType};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when probing for optional
/// variables that don't exist).
///
/// **Important**: Call this early in `main()` before any HDF5/NetCDF
/// operations occur. It is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An opened NetCDF file.
pub struct NetCdfSource {
    label: String,
    file: netcdf::File,
}

impl NetCdfSource {
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|e| NetCdfError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            label: path.display().to_string(),
            file,
        })
    }

    fn variable(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingVariable(name.to_string()))
    }
}

impl GridSource for NetCdfSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.file.dimension(name).map(|d| d.len())
    }

    fn variable_shape(&self, name: &str) -> Option<Vec<usize>> {
        let var = self.file.variable(name)?;
        Some(var.dimensions().iter().map(|d| d.len()).collect())
    }

    fn read(&self, name: &str, as_type: VarType) -> NetCdfResult<VarData> {
        let var = self.variable(name)?;
        let read_err = |e: netcdf::Error| NetCdfError::Read {
            name: name.to_string(),
            reason: e.to_string(),
        };

        debug!(file = %self.label, variable = name, as_type = as_type.as_str(), "Reading NetCDF variable");

        // Read all extents with (..); libnetcdf converts to the requested type
        let data = match as_type {
            VarType::F32 => VarData::F32(var.get_values::<f32, _>(..).map_err(read_err)?),
            VarType::I32 => VarData::I32(var.get_values::<i32, _>(..).map_err(read_err)?),
            VarType::U16 => VarData::U16(var.get_values::<u16, _>(..).map_err(read_err)?),
            VarType::U8 => VarData::U8(var.get_values::<u8, _>(..).map_err(read_err)?),
        };
        Ok(data)
    }
}

/// Opens paths as native NetCDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeOpener;

impl SourceOpener for NativeOpener {
    fn open(&self, path: &Path) -> NetCdfResult<Box<dyn GridSource>> {
        Ok(Box::new(NetCdfSource::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_is_open_error() {
        let result = NetCdfSource::open("/nonexistent/path/to/file.nc");
        assert!(matches!(result, Err(NetCdfError::Open { .. })));
    }

    #[test]
    fn test_open_non_netcdf_file_is_open_error() {
        let dir = std::env::temp_dir().join(format!("nc_native_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_netcdf.nc");
        std::fs::write(&path, b"this is not a netcdf file").unwrap();

        let result = NetCdfSource::open(&path);
        assert!(matches!(result, Err(NetCdfError::Open { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
