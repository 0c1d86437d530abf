//! Common fixtures for converter tests.

use std::path::Path;

/// TMS radiance quality flag bits (1-based) that mark a cell bad.
pub const TMS_MAPPED_BITS: [u8; 10] = [3, 4, 5, 6, 7, 8, 9, 13, 14, 15];

/// TMS radiance quality flag bits (1-based) that never mark a cell bad.
pub const TMS_UNMAPPED_BITS: [u8; 6] = [1, 2, 10, 11, 12, 16];

/// Builds a converter configuration document.
pub fn converter_yaml(
    provider: &str,
    inputs: &[&Path],
    output: Option<&Path>,
    channels: &str,
    threshold: f64,
) -> String {
    let mut yaml = format!("provider: {}\ninput files:\n", provider);
    for input in inputs {
        yaml.push_str(&format!("  - \"{}\"\n", input.display()));
    }
    if let Some(output) = output {
        yaml.push_str(&format!("output file: \"{}\"\n", output.display()));
    }
    yaml.push_str(&format!(
        "channel: \"{}\"\nthinning:\n  threshold: {:?}\n",
        channels, threshold
    ));
    yaml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_yaml_layout() {
        let yaml = converter_yaml("TMSBT", &[Path::new("a.nc")], None, "1,2", 0.0);
        assert!(yaml.contains("provider: TMSBT"));
        assert!(yaml.contains("  - \"a.nc\""));
        assert!(yaml.contains("threshold: 0.0"));
        assert!(!yaml.contains("output file"));
    }

    #[test]
    fn test_bit_tables_are_disjoint() {
        for bit in TMS_UNMAPPED_BITS {
            assert!(!TMS_MAPPED_BITS.contains(&bit));
        }
        assert_eq!(TMS_MAPPED_BITS.len() + TMS_UNMAPPED_BITS.len(), 16);
    }
}
