//! In-memory grid sources.
//!
//! [`MemoryGrid`] holds named dimensions and variables the same way a NetCDF
//! file does, which lets decoders run against synthetic data. A
//! [`MemoryCatalog`] maps paths to grids and behaves like a filesystem where
//! unknown paths fail to open.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::source::{GridSource, SourceOpener, VarData, VarType};

#[derive(Debug, Clone)]
struct MemoryVariable {
    dims: Vec<String>,
    data: VarData,
}

/// A named-dimension grid held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    label: String,
    dimensions: HashMap<String, usize>,
    variables: HashMap<String, MemoryVariable>,
}

impl MemoryGrid {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Add a dimension (builder style).
    pub fn with_dimension(mut self, name: &str, len: usize) -> Self {
        self.dimensions.insert(name.to_string(), len);
        self
    }

    /// Add a variable over named dimensions (builder style).
    pub fn with_variable(mut self, name: &str, dims: &[&str], data: VarData) -> Self {
        self.insert_variable(name, dims, data);
        self
    }

    pub fn insert_variable(&mut self, name: &str, dims: &[&str], data: VarData) {
        self.variables.insert(
            name.to_string(),
            MemoryVariable {
                dims: dims.iter().map(|d| d.to_string()).collect(),
                data,
            },
        );
    }

    pub fn remove_variable(&mut self, name: &str) -> bool {
        self.variables.remove(name).is_some()
    }

    pub fn remove_dimension(&mut self, name: &str) -> bool {
        self.dimensions.remove(name).is_some()
    }
}

impl GridSource for MemoryGrid {
    fn label(&self) -> &str {
        &self.label
    }

    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.dimensions.get(name).copied()
    }

    fn variable_shape(&self, name: &str) -> Option<Vec<usize>> {
        let var = self.variables.get(name)?;
        var.dims.iter().map(|d| self.dimension_len(d)).collect()
    }

    fn read(&self, name: &str, as_type: VarType) -> NetCdfResult<VarData> {
        let var = self
            .variables
            .get(name)
            .ok_or_else(|| NetCdfError::MissingVariable(name.to_string()))?;

        let shape = self.variable_shape(name).ok_or_else(|| NetCdfError::Read {
            name: name.to_string(),
            reason: format!("undefined dimension in {:?}", var.dims),
        })?;
        let expected: usize = shape.iter().product();
        if var.data.len() != expected {
            return Err(NetCdfError::Read {
                name: name.to_string(),
                reason: format!("{} values stored, shape {:?} needs {}", var.data.len(), shape, expected),
            });
        }

        debug!(variable = name, as_type = as_type.as_str(), "Reading in-memory variable");
        Ok(var.data.clone().convert(as_type))
    }
}

/// Path-addressed collection of in-memory grids.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    grids: HashMap<PathBuf, MemoryGrid>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, grid: MemoryGrid) {
        self.grids.insert(path.into(), grid);
    }

    pub fn with_grid(mut self, path: impl Into<PathBuf>, grid: MemoryGrid) -> Self {
        self.insert(path, grid);
        self
    }
}

impl SourceOpener for MemoryCatalog {
    fn open(&self, path: &Path) -> NetCdfResult<Box<dyn GridSource>> {
        self.grids
            .get(path)
            .map(|grid| Box::new(grid.clone()) as Box<dyn GridSource>)
            .ok_or_else(|| NetCdfError::Open {
                path: path.display().to_string(),
                reason: "no such file".to_string(),
            })
    }
}
