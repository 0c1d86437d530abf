//! NetCDF access for satellite observation files.
//!
//! This crate exposes provider files as a [`GridSource`]: named dimensions,
//! variable extents, and flat typed reads. Decoders are written against the
//! trait and never see the underlying library.
//!
//! # Implementations
//!
//! - [`MemoryGrid`] / [`MemoryCatalog`]: in-memory grids for tests and
//!   synthetic data.
//! - `NetCdfSource` / `NativeOpener` (feature `native`): real NetCDF-4 files
//!   through libnetcdf. Requires libhdf5-dev and libnetcdf-dev.
//!
//! # Layout
//!
//! Values are returned in the file's row-major order. For a variable over
//! `(spots, scans, channels)` the value at `(spot, scan, channel)` is at
//! `(spot * scans + scan) * channels + channel`.

pub mod error;
pub mod memory;
#[cfg(feature = "native")]
pub mod native;
pub mod source;

pub use error::{NetCdfError, NetCdfResult};
pub use memory::{MemoryCatalog, MemoryGrid};
#[cfg(feature = "native")]
pub use native::{silence_hdf5_errors, NativeOpener, NetCdfSource};
pub use source::{GridSource, SourceOpener, VarData, VarType};
