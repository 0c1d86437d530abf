//! The grid source abstraction.
//!
//! Provider decoders only need three things from a file: named dimension
//! lengths, the extents of each variable, and a flat read of a variable as a
//! given element type. [`GridSource`] is that seam.

use std::path::Path;

use crate::error::NetCdfResult;

/// Element type requested from a variable read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    F32,
    I32,
    U16,
    U8,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::F32 => "float",
            VarType::I32 => "int",
            VarType::U16 => "ushort",
            VarType::U8 => "ubyte",
        }
    }
}

/// Flat values of one variable, in the file's row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum VarData {
    F32(Vec<f32>),
    I32(Vec<i32>),
    U16(Vec<u16>),
    U8(Vec<u8>),
}

impl VarData {
    pub fn var_type(&self) -> VarType {
        match self {
            VarData::F32(_) => VarType::F32,
            VarData::I32(_) => VarType::I32,
            VarData::U16(_) => VarType::U16,
            VarData::U8(_) => VarType::U8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VarData::F32(v) => v.len(),
            VarData::I32(v) => v.len(),
            VarData::U16(v) => v.len(),
            VarData::U8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to the requested element type, the way libnetcdf converts on read.
    pub fn convert(self, to: VarType) -> VarData {
        if self.var_type() == to {
            return self;
        }
        match to {
            VarType::F32 => VarData::F32(self.into_f32()),
            VarType::I32 => VarData::I32(self.into_i32()),
            VarType::U16 => VarData::U16(self.into_i32().into_iter().map(|v| v as u16).collect()),
            VarType::U8 => VarData::U8(self.into_i32().into_iter().map(|v| v as u8).collect()),
        }
    }

    pub fn into_f32(self) -> Vec<f32> {
        match self {
            VarData::F32(v) => v,
            VarData::I32(v) => v.into_iter().map(|x| x as f32).collect(),
            VarData::U16(v) => v.into_iter().map(f32::from).collect(),
            VarData::U8(v) => v.into_iter().map(f32::from).collect(),
        }
    }

    pub fn into_i32(self) -> Vec<i32> {
        match self {
            VarData::F32(v) => v.into_iter().map(|x| x as i32).collect(),
            VarData::I32(v) => v,
            VarData::U16(v) => v.into_iter().map(i32::from).collect(),
            VarData::U8(v) => v.into_iter().map(i32::from).collect(),
        }
    }

    /// Bit patterns of integer flag variables, widened without sign extension.
    pub fn into_bits(self) -> Vec<u32> {
        match self {
            VarData::F32(v) => v.into_iter().map(|x| x as u32).collect(),
            VarData::I32(v) => v.into_iter().map(|x| x as u32).collect(),
            VarData::U16(v) => v.into_iter().map(u32::from).collect(),
            VarData::U8(v) => v.into_iter().map(u32::from).collect(),
        }
    }
}

/// Read access to one opened file.
pub trait GridSource {
    /// Path or label used in log messages.
    fn label(&self) -> &str;

    /// Length of a named dimension.
    fn dimension_len(&self, name: &str) -> Option<usize>;

    /// Extents of a variable's dimensions, outermost first.
    fn variable_shape(&self, name: &str) -> Option<Vec<usize>>;

    /// Read every value of a variable as the requested type.
    fn read(&self, name: &str, as_type: VarType) -> NetCdfResult<VarData>;

    fn has_variable(&self, name: &str) -> bool {
        self.variable_shape(name).is_some()
    }
}

/// Opens files into grid sources.
pub trait SourceOpener {
    fn open(&self, path: &Path) -> NetCdfResult<Box<dyn GridSource>>;
}
