//! Reproducible random thinning.
//!
//! Every (spot, scan) cell draws one value `u` in `(0, 1]` from a stream
//! seeded per decode. A cell is kept when `u > threshold`, so a threshold of
//! 0 keeps everything and 1 drops everything. Cells are visited spot-major
//! (outer spot, inner scan) and the stream advances exactly once per cell.
//!
//! The mask is materialized once; counting and filling both read it.

use rand::distributions::OpenClosed01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PreprocError, Result};

/// Seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 42;

/// Threshold and seed for one decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thinner {
    threshold: f64,
    seed: u64,
}

impl Thinner {
    /// Rejects thresholds outside `[0, 1]` (including NaN).
    pub fn new(threshold: f64, seed: u64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PreprocError::Config(format!(
                "thinning threshold {} outside [0, 1]",
                threshold
            )));
        }
        Ok(Self { threshold, seed })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw the inclusion mask for a `spots x scans` grid.
    pub fn mask(&self, spots: usize, scans: usize) -> InclusionMask {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut cells = Vec::with_capacity(spots * scans);
        for _spot in 0..spots {
            for _scan in 0..scans {
                let u: f64 = rng.sample(OpenClosed01);
                cells.push(u > self.threshold);
            }
        }
        InclusionMask::from_cells(spots, scans, cells)
    }
}

/// Which (spot, scan) cells survive thinning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionMask {
    spots: usize,
    scans: usize,
    cells: Vec<bool>,
    count: usize,
}

impl InclusionMask {
    fn from_cells(spots: usize, scans: usize, cells: Vec<bool>) -> Self {
        let count = cells.iter().filter(|&&keep| keep).count();
        Self {
            spots,
            scans,
            cells,
            count,
        }
    }

    /// Mask that keeps every cell.
    pub fn all(spots: usize, scans: usize) -> Self {
        Self::from_cells(spots, scans, vec![true; spots * scans])
    }

    pub fn spots(&self) -> usize {
        self.spots
    }

    pub fn scans(&self) -> usize {
        self.scans
    }

    /// Number of retained cells.
    pub fn location_count(&self) -> usize {
        self.count
    }

    pub fn is_included(&self, spot: usize, scan: usize) -> bool {
        self.cells[spot * self.scans + scan]
    }

    /// Retained `(spot, scan)` pairs in traversal order.
    pub fn included(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let scans = self.scans;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(move |(i, _)| (i / scans, i % scans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_zero_keeps_all() {
        let mask = Thinner::new(0.0, DEFAULT_SEED).unwrap().mask(40, 25);
        assert_eq!(mask.location_count(), 1000);
    }

    #[test]
    fn test_threshold_one_keeps_none() {
        let mask = Thinner::new(1.0, DEFAULT_SEED).unwrap().mask(40, 25);
        assert_eq!(mask.location_count(), 0);
        assert_eq!(mask.included().count(), 0);
    }

    #[test]
    fn test_same_seed_same_mask() {
        let thinner = Thinner::new(0.5, 7).unwrap();
        assert_eq!(thinner.mask(30, 30), thinner.mask(30, 30));
    }

    #[test]
    fn test_different_seed_different_mask() {
        let a = Thinner::new(0.5, 1).unwrap().mask(30, 30);
        let b = Thinner::new(0.5, 2).unwrap().mask(30, 30);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fraction_converges() {
        for threshold in [0.1, 0.25, 0.5, 0.9] {
            let mask = Thinner::new(threshold, DEFAULT_SEED).unwrap().mask(200, 200);
            let fraction = mask.location_count() as f64 / 40_000.0;
            assert!(
                (fraction - (1.0 - threshold)).abs() < 0.02,
                "threshold {} kept {}",
                threshold,
                fraction
            );
        }
    }

    #[test]
    fn test_included_order_and_count_agree() {
        let mask = Thinner::new(0.4, DEFAULT_SEED).unwrap().mask(7, 5);
        let cells: Vec<_> = mask.included().collect();
        assert_eq!(cells.len(), mask.location_count());
        assert!(cells.windows(2).all(|w| w[0] < w[1]));
        for (spot, scan) in cells {
            assert!(mask.is_included(spot, scan));
        }
    }

    #[test]
    fn test_all_mask() {
        let mask = InclusionMask::all(2, 3);
        assert_eq!(
            mask.included().collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(Thinner::new(-0.1, 0).is_err());
        assert!(Thinner::new(1.5, 0).is_err());
        assert!(Thinner::new(f64::NAN, 0).is_err());
    }

    #[test]
    fn test_empty_grid() {
        let mask = Thinner::new(0.0, 0).unwrap().mask(0, 10);
        assert_eq!(mask.location_count(), 0);
    }
}
