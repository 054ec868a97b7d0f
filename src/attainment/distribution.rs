use super::band::Band;

/// How many students landed in each band, plus the mean band value.
///
/// Always derived from the current score collection; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreDistribution {
    pub band1_count: usize,
    pub band2_count: usize,
    pub band3_count: usize,
    pub average_band: f64,
}

impl ScoreDistribution {
    /// Total number of scores that went into this distribution.
    pub fn total(&self) -> usize {
        self.band1_count + self.band2_count + self.band3_count
    }
}

/// Reduce a sequence of bands into a distribution.
///
/// The same reduction serves both granularities (per assessment, and per
/// assessment x CO); callers pick the filter, not the algorithm. An empty
/// input yields all-zero counts and an average of exactly 0.0, never NaN,
/// so display code stays total.
pub fn aggregate_distribution<I>(bands: I) -> ScoreDistribution
where
    I: IntoIterator<Item = Band>,
{
    let mut dist = ScoreDistribution::default();
    let mut sum = 0u64;
    for band in bands {
        match band {
            Band::One => dist.band1_count += 1,
            Band::Two => dist.band2_count += 1,
            Band::Three => dist.band3_count += 1,
        }
        sum += u64::from(band.value());
    }
    let total = dist.total();
    if total > 0 {
        dist.average_band = sum as f64 / total as f64;
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_all_zeros() {
        let dist = aggregate_distribution(std::iter::empty());
        assert_eq!(
            dist,
            ScoreDistribution {
                band1_count: 0,
                band2_count: 0,
                band3_count: 0,
                average_band: 0.0,
            }
        );
        // Explicitly: defined as zero, not NaN
        assert!(!dist.average_band.is_nan());
    }

    #[test]
    fn test_counts_sum_to_input_length() {
        let bands = vec![Band::One, Band::Three, Band::Two, Band::Three, Band::One];
        let dist = aggregate_distribution(bands.iter().copied());
        assert_eq!(dist.total(), bands.len());
        assert_eq!(dist.band1_count, 2);
        assert_eq!(dist.band2_count, 1);
        assert_eq!(dist.band3_count, 2);
    }

    #[test]
    fn test_average_band() {
        let dist = aggregate_distribution(vec![Band::One, Band::Two, Band::Three]);
        assert!((dist.average_band - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_band() {
        let dist = aggregate_distribution(vec![Band::Three]);
        assert_eq!(dist.band3_count, 1);
        assert_eq!(dist.total(), 1);
        assert!((dist.average_band - 3.0).abs() < f64::EPSILON);
    }
}
