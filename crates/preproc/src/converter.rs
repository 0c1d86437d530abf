//! Batch conversion of provider files into one observation table.

use std::path::{Path, PathBuf};

use ioda_common::IodaVars;
use netcdf_parser::SourceOpener;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::ConversionPlan;
use crate::decoder::{DecodeSettings, Decoder};
use crate::error::Result;
use crate::provider::Provider;

/// File extensions picked up when an input is a directory.
const INPUT_EXTENSIONS: &[&str] = &["nc", "nc4"];

/// Outcome of a batch conversion.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Concatenation of every decoded file, in input order.
    pub table: IodaVars,
    /// Files that decoded successfully (possibly to zero locations).
    pub files_processed: usize,
    /// Files that could not be used.
    pub files_skipped: usize,
}

/// Runs one provider's decoder over a list of inputs.
pub struct Converter<'a> {
    opener: &'a dyn SourceOpener,
    provider: Provider,
    settings: DecodeSettings,
}

impl<'a> Converter<'a> {
    pub fn new(opener: &'a dyn SourceOpener, provider: Provider, settings: DecodeSettings) -> Self {
        Self {
            opener,
            provider,
            settings,
        }
    }

    pub fn from_plan(opener: &'a dyn SourceOpener, plan: &ConversionPlan) -> Self {
        Self::new(opener, plan.provider, plan.settings.clone())
    }

    /// Decode every file and concatenate the tables.
    ///
    /// Unusable files are skipped with a warning; configuration errors stop
    /// the run.
    pub fn convert(&self, files: &[PathBuf]) -> Result<ConversionResult> {
        let mut parts = Vec::with_capacity(files.len());
        let mut files_processed = 0;
        let mut files_skipped = 0;

        for path in files {
            let mut decoder = Decoder::new(self.provider, &self.settings);
            let table = decoder.decode_file(self.opener, path)?;
            if decoder.skipped() {
                files_skipped += 1;
            } else {
                files_processed += 1;
                parts.push(table);
            }
        }

        let table = if parts.is_empty() {
            Decoder::new(self.provider, &self.settings).empty_table()?
        } else {
            IodaVars::concat(parts)?
        };

        info!(
            provider = %self.provider,
            files_processed = files_processed,
            files_skipped = files_skipped,
            locations = table.location_count(),
            "Conversion complete"
        );

        Ok(ConversionResult {
            table,
            files_processed,
            files_skipped,
        })
    }
}

/// Expand directory inputs into the NetCDF files beneath them.
///
/// Plain paths are passed through unchanged (a missing file is reported by
/// the decoder). Directory contents are sorted by name.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let before = files.len();
        for entry in WalkDir::new(input).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && has_input_extension(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!(dir = %input.display(), error = %e, "Failed to read directory entry"),
            }
        }
        info!(
            dir = %input.display(),
            files = files.len() - before,
            "Expanded input directory"
        );
    }
    files
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| INPUT_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
