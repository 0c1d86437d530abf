//! Configuration loader for nc2ioda.
//!
//! Reads the converter YAML, substitutes environment variables using
//! `${VAR}` and `${VAR:-default}` syntax, then validates it into a
//! [`ConversionPlan`].

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use preproc::{ConversionPlan, ConverterConfig};

// ============================================================================
// Loading
// ============================================================================

/// Load, expand and validate a converter configuration file.
pub fn load_converter_config<P: AsRef<Path>>(path: P) -> Result<ConversionPlan> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read converter config from {:?}", path.as_ref()))?;

    parse_converter_config(&content)
        .with_context(|| format!("Invalid converter config {:?}", path.as_ref()))
}

/// Expand and validate configuration text.
pub fn parse_converter_config(content: &str) -> Result<ConversionPlan> {
    let expanded = expand_env_vars(content)?;
    let config = ConverterConfig::from_yaml_str(&expanded)?;
    Ok(config.validate()?)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut var_expr = String::new();
        let mut depth = 1;
        while depth > 0 {
            match chars.next() {
                Some('{') => {
                    depth += 1;
                    var_expr.push('{');
                }
                Some('}') => {
                    depth -= 1;
                    if depth > 0 {
                        var_expr.push('}');
                    }
                }
                Some(c) => var_expr.push(c),
                None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
            }
        }

        result.push_str(&resolve_var_expr(&var_expr)?);
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preproc::Provider;
    use std::path::PathBuf;

    #[test]
    fn test_expand_plain_text_unchanged() {
        let text = "provider: TMSBT\ncost: $5\n";
        assert_eq!(expand_env_vars(text).unwrap(), text);
    }

    #[test]
    fn test_expand_set_variable() {
        std::env::set_var("NC2IODA_TEST_DATA_DIR", "/data/tms");
        let out = expand_env_vars("- ${NC2IODA_TEST_DATA_DIR}/a.nc").unwrap();
        assert_eq!(out, "- /data/tms/a.nc");
    }

    #[test]
    fn test_expand_default() {
        std::env::remove_var("NC2IODA_TEST_UNSET");
        let out = expand_env_vars("threshold: ${NC2IODA_TEST_UNSET:-0.25}").unwrap();
        assert_eq!(out, "threshold: 0.25");
    }

    #[test]
    fn test_expand_errors() {
        std::env::remove_var("NC2IODA_TEST_MISSING");
        assert!(expand_env_vars("${NC2IODA_TEST_MISSING}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tms.yaml");
        std::env::set_var("NC2IODA_TEST_CHANNELS", "1,3");
        fs::write(
            &path,
            "provider: TMSRAD\n\
             input files: [rad.nc]\n\
             output file: ${NC2IODA_TEST_OUT:-obs.json}\n\
             channel: \"${NC2IODA_TEST_CHANNELS}\"\n\
             thinning:\n  threshold: 0.1\n",
        )
        .unwrap();

        let plan = load_converter_config(&path).unwrap();
        assert_eq!(plan.provider, Provider::TmsRadiance);
        assert_eq!(plan.settings.channels.channels(), &[1, 3]);
        assert_eq!(plan.output, Some(PathBuf::from("obs.json")));
    }

    #[test]
    fn test_invalid_config_reports_cause() {
        let err = parse_converter_config(
            "provider: TMSBT\ninput files: [a.nc]\nchannel: '0'\nthinning:\n  threshold: 0.1\n",
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("channel 0"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_converter_config("/nonexistent/nc2ioda.yaml").is_err());
    }
}
