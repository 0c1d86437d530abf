//! TMS to IODA converter.
//!
//! Reads a YAML configuration naming the provider, input files, channels
//! and thinning threshold, decodes every input into one observation table
//! and writes it as IODA-grouped JSON.

mod config_loader;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use netcdf_parser::SourceOpener;
use preproc::{expand_inputs, Converter, JsonWriter, ObsWriter};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "nc2ioda")]
#[command(about = "Convert TMS provider NetCDF files into IODA observation tables")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "NC2IODA_CONFIG")]
    config: PathBuf,

    /// Output file (overrides `output file` in the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level, args.json_logs)?;

    info!(config = %args.config.display(), "Starting nc2ioda");

    let plan = config_loader::load_converter_config(&args.config)?;
    let output = resolve_output(args.output.clone(), plan.output.clone())?;

    info!(
        provider = %plan.provider,
        channels = %plan.settings.channels,
        threshold = plan.settings.thinning.threshold(),
        seed = plan.settings.thinning.seed(),
        "Loaded configuration"
    );

    let files = expand_inputs(&plan.inputs);
    if files.is_empty() {
        warn!("No input files found");
    }

    let opener = source_opener()?;
    let result = Converter::from_plan(opener.as_ref(), &plan).convert(&files)?;

    if result.files_processed == 0 && result.files_skipped > 0 {
        warn!(skipped = result.files_skipped, "Every input file was skipped");
    }

    JsonWriter::new()
        .pretty(args.pretty)
        .write(&result.table, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        output = %output.display(),
        files_processed = result.files_processed,
        files_skipped = result.files_skipped,
        locations = result.table.location_count(),
        "Conversion finished"
    );

    Ok(())
}

/// `--output` wins over the configured `output file`.
fn resolve_output(cli: Option<PathBuf>, configured: Option<PathBuf>) -> Result<PathBuf> {
    cli.or(configured)
        .context("No output file: set `output file` in the configuration or pass --output")
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[cfg(feature = "native")]
fn source_opener() -> Result<Box<dyn SourceOpener>> {
    netcdf_parser::silence_hdf5_errors();
    Ok(Box::new(netcdf_parser::NativeOpener))
}

#[cfg(not(feature = "native"))]
fn source_opener() -> Result<Box<dyn SourceOpener>> {
    anyhow::bail!("nc2ioda was built without NetCDF support; rebuild with `--features native`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_output_overrides_config() {
        let output = resolve_output(Some("cli.json".into()), Some("config.json".into())).unwrap();
        assert_eq!(output, PathBuf::from("cli.json"));
    }

    #[test]
    fn test_config_output_is_fallback() {
        let output = resolve_output(None, Some("config.json".into())).unwrap();
        assert_eq!(output, PathBuf::from("config.json"));
    }

    #[test]
    fn test_missing_output_is_error() {
        let err = resolve_output(None, None).unwrap_err();
        assert!(err.to_string().contains("No output file"));
    }
}
