//! Quality flag repacking.
//!
//! Providers ship a native bitmask per cell whose layout differs from the
//! BUFR "overall quality" flag downstream QC expects. A [`FlagMapping`] names
//! every native bit that corresponds to a BUFR failure condition; the
//! [`FlagCodec`] built from it reduces a raw bitmask (plus any auxiliary
//! status bytes) to 0 = good or 1 = bad.
//!
//! Bits not listed in a mapping are reserved or informational and never make
//! a cell bad.

/// PreQC value of a good cell.
pub const GOOD: i32 = 0;

/// PreQC value of a bad cell.
pub const BAD: i32 = 1;

/// One native bit that marks a cell bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagBit {
    /// Semantic name of the condition.
    pub name: &'static str,
    /// 1-based bit position in the provider's flag variable.
    pub native_bit: u8,
    /// 1-based bit position(s) in the BUFR overall quality flag.
    pub bufr_bits: &'static [u8],
}

impl FlagBit {
    pub const fn new(name: &'static str, native_bit: u8, bufr_bits: &'static [u8]) -> Self {
        Self {
            name,
            native_bit,
            bufr_bits,
        }
    }

    pub const fn mask(&self) -> u32 {
        1 << (self.native_bit - 1)
    }
}

/// Named bit layout of one provider version's quality flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagMapping {
    pub name: &'static str,
    /// Bits that mark a cell bad.
    pub bad_bits: &'static [FlagBit],
    /// Auxiliary per-cell flag variables; any non-zero value marks a cell bad.
    pub auxiliary: &'static [&'static str],
}

impl FlagMapping {
    /// OR of every mapped bit.
    pub fn bad_mask(&self) -> u32 {
        self.bad_bits.iter().fold(0, |acc, bit| acc | bit.mask())
    }

    pub fn bit(&self, name: &str) -> Option<&FlagBit> {
        self.bad_bits.iter().find(|b| b.name == name)
    }
}

/// Stateless good/bad reducer for one flag mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagCodec {
    bad_mask: u32,
}

impl FlagCodec {
    pub fn new(mapping: &FlagMapping) -> Self {
        Self {
            bad_mask: mapping.bad_mask(),
        }
    }

    pub fn bad_mask(&self) -> u32 {
        self.bad_mask
    }

    /// Reduce one cell's raw bits and auxiliary flags to [`GOOD`] or [`BAD`].
    pub fn repack<I>(&self, raw: u32, auxiliary: I) -> i32
    where
        I: IntoIterator<Item = u8>,
    {
        repack(raw, self.bad_mask, auxiliary)
    }
}

/// Bad iff any masked bit is set or any auxiliary flag is non-zero.
pub fn repack<I>(raw: u32, bad_mask: u32, auxiliary: I) -> i32
where
    I: IntoIterator<Item = u8>,
{
    if raw & bad_mask != 0 || auxiliary.into_iter().any(|a| a != 0) {
        BAD
    } else {
        GOOD
    }
}

/// TMS radiance `combinedQualityFlag` to BUFR overall quality.
///
/// The NetCDF combined flag is not the BUFR flag; this table rebuilds the
/// BUFR decision from it. BUFR bits 19 (attitude quality) and 20 (star
/// tracker status) both come from cqf bit 6, which folds star tracker status
/// and attitude error into one bit. BUFR bit 21 (SDR transmit) comes from the
/// separate `flagSDRTX` variable. cqf bits 1, 2, 10, 11, 12 and 16 are not
/// mapped.
pub const TMS_RADIANCE_QC: FlagMapping = FlagMapping {
    name: "tms-radiance-overall-qc",
    bad_bits: &[
        FlagBit::new("outlier_timestamp", 3, &[22]),
        FlagBit::new("radio_frequency_interference", 4, &[16]),
        FlagBit::new("ict_noise_diode_consistency", 5, &[17]),
        FlagBit::new("attitude_quality", 6, &[19, 20]),
        FlagBit::new("ict_outlier", 7, &[7]),
        FlagBit::new("noise_diode_outlier", 8, &[8]),
        FlagBit::new("deep_space_outlier", 9, &[9]),
        FlagBit::new("spacecraft_maneuver", 13, &[13]),
        FlagBit::new("solar_intrusion", 14, &[14]),
        FlagBit::new("lunar_intrusion", 15, &[15]),
    ],
    auxiliary: &["flagSDRTX"],
};

#[cfg(test)]
mod tests {
    use super::*;

    const UNMAPPED_TMS_BITS: [u8; 6] = [1, 2, 10, 11, 12, 16];

    #[test]
    fn test_tms_radiance_mask_value() {
        // bits 3-9 and 13-15
        assert_eq!(TMS_RADIANCE_QC.bad_mask(), 0b0111_0001_1111_1100);
    }

    #[test]
    fn test_all_clear_is_good() {
        let codec = FlagCodec::new(&TMS_RADIANCE_QC);
        assert_eq!(codec.repack(0, [0u8]), GOOD);
        assert_eq!(codec.repack(0, [0u8; 0]), GOOD);
    }

    #[test]
    fn test_each_mapped_bit_is_bad() {
        let codec = FlagCodec::new(&TMS_RADIANCE_QC);
        for bit in TMS_RADIANCE_QC.bad_bits {
            assert_eq!(codec.repack(bit.mask(), [0u8]), BAD, "bit {} ({})", bit.native_bit, bit.name);
        }
    }

    #[test]
    fn test_unmapped_bits_are_ignored() {
        let codec = FlagCodec::new(&TMS_RADIANCE_QC);
        let mut all_unmapped = 0u32;
        for bit in UNMAPPED_TMS_BITS {
            let mask = 1u32 << (bit - 1);
            all_unmapped |= mask;
            assert_eq!(codec.repack(mask, [0u8]), GOOD, "bit {}", bit);
        }
        assert_eq!(codec.repack(all_unmapped, [0u8]), GOOD);
    }

    #[test]
    fn test_auxiliary_flag_is_bad() {
        let codec = FlagCodec::new(&TMS_RADIANCE_QC);
        assert_eq!(codec.repack(0, [1u8]), BAD);
        assert_eq!(codec.repack(0, [0u8, 0, 3]), BAD);
    }

    #[test]
    fn test_bit_lookup_by_name() {
        let rfi = TMS_RADIANCE_QC.bit("radio_frequency_interference").unwrap();
        assert_eq!(rfi.native_bit, 4);
        assert_eq!(rfi.bufr_bits, &[16]);
        assert!(TMS_RADIANCE_QC.bit("nonexistent").is_none());
    }

    #[test]
    fn test_free_function_matches_codec() {
        let codec = FlagCodec::new(&TMS_RADIANCE_QC);
        for raw in [0u32, 1, 4, 0x8000, 0x4000, 0xFFFF] {
            assert_eq!(codec.repack(raw, [0u8]), repack(raw, codec.bad_mask(), [0u8]));
        }
    }
}
