//! Chi-squared goodness-of-fit against the uniform distribution.

use crate::conditioning::{SampleError, UniformSampler};
use crate::extraction::EntropyBlob;
use rand_core::RngCore;

/// Confidence level of the goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    P95,
    P99,
    P999,
}

impl ConfidenceLevel {
    /// Upper-tail standard normal quantile.
    fn z(self) -> f64 {
        match self {
            Self::P95 => 1.644_854,
            Self::P99 => 2.326_348,
            Self::P999 => 3.090_232,
        }
    }
}

/// Chi-squared test results for a set of observed counts.
#[derive(Debug, Clone)]
pub struct UniformityTest {
    /// Observed count per residue.
    pub counts: Vec<u64>,
    /// Total number of observations.
    pub samples: u64,
    /// Pearson's chi-squared statistic.
    pub statistic: f64,
    /// Degrees of freedom (`bins - 1`).
    pub degrees_of_freedom: usize,
}

impl UniformityTest {
    /// Runs the test on per-bin counts.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        let samples: u64 = counts.iter().sum();
        let degrees_of_freedom = counts.len().saturating_sub(1);

        let statistic = if samples == 0 || counts.is_empty() {
            0.0
        } else {
            let expected = samples as f64 / counts.len() as f64;
            counts
                .iter()
                .map(|&c| (c as f64 - expected).powi(2) / expected)
                .sum()
        };

        Self {
            counts,
            samples,
            statistic,
            degrees_of_freedom,
        }
    }

    /// Tallies values in `[min, min + bins)` and runs the test.
    ///
    /// Values outside the range are ignored.
    pub fn from_samples(values: impl IntoIterator<Item = i64>, min: i64, bins: usize) -> Self {
        let mut counts = vec![0u64; bins];
        for value in values {
            let offset = value as i128 - min as i128;
            if offset >= 0 && (offset as u128) < bins as u128 {
                counts[offset as usize] += 1;
            }
        }
        Self::from_counts(counts)
    }

    /// Approximate critical value (Wilson–Hilferty) for this test.
    pub fn critical_value(&self, level: ConfidenceLevel) -> f64 {
        critical_value(self.degrees_of_freedom, level)
    }

    /// Returns true if uniformity is not rejected at `level`.
    pub fn passes(&self, level: ConfidenceLevel) -> bool {
        self.statistic <= self.critical_value(level)
    }
}

/// Wilson–Hilferty approximation of the chi-squared upper quantile.
pub(crate) fn critical_value(dof: usize, level: ConfidenceLevel) -> f64 {
    if dof == 0 {
        return 0.0;
    }
    let k = dof as f64;
    let a = 2.0 / (9.0 * k);
    k * (1.0 - a + level.z() * a.sqrt()).powi(3)
}

/// Samples `trials` pseudorandom blobs over `[0, range)` and tests the
/// result for uniformity.
///
/// Blobs hold 3 to 30 keypoint-like values drawn from `rng`, roughly the
/// shape of real collection output.
pub fn sampler_self_test(
    sampler: &UniformSampler,
    range: usize,
    trials: usize,
    rng: &mut impl RngCore,
) -> Result<UniformityTest, SampleError> {
    if range == 0 {
        return Err(SampleError::InvalidRange { min: 0, max: -1 });
    }
    let max = i64::try_from(range - 1).map_err(|_| SampleError::InvalidRange {
        min: 0,
        max: i64::MAX,
    })?;

    let mut values = Vec::with_capacity(trials);
    for _ in 0..trials {
        let len = 3 + (rng.next_u32() % 28) as usize;
        let blob = EntropyBlob::from_values(
            (0..len)
                .map(|_| (rng.next_u32() % 25_600) as f64 / 100.0)
                .collect(),
        );
        values.push(sampler.sample(&blob, 0, max)?);
    }

    let test = UniformityTest::from_samples(values, 0, range);
    tracing::debug!(
        range,
        trials,
        statistic = test.statistic,
        "Sampler self-test complete"
    );
    Ok(test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditioning::HashAlgorithm;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_perfectly_uniform_counts() {
        let test = UniformityTest::from_counts(vec![100; 10]);
        assert_eq!(test.statistic, 0.0);
        assert_eq!(test.degrees_of_freedom, 9);
        assert!(test.passes(ConfidenceLevel::P95));
    }

    #[test]
    fn test_biased_counts_fail() {
        let mut counts = vec![100; 10];
        counts[0] = 300;
        let test = UniformityTest::from_counts(counts);
        assert!(!test.passes(ConfidenceLevel::P999));
    }

    #[test]
    fn test_critical_value_approximation() {
        // Tabulated: 16.919 (95%) and 27.877 (99.9%) for 9 dof.
        assert!((critical_value(9, ConfidenceLevel::P95) - 16.919).abs() < 0.3);
        assert!((critical_value(9, ConfidenceLevel::P999) - 27.877).abs() < 0.5);
        assert_eq!(critical_value(0, ConfidenceLevel::P99), 0.0);
    }

    #[test]
    fn test_from_samples_ignores_out_of_range() {
        let test = UniformityTest::from_samples(vec![-1, 0, 1, 1, 5], 0, 2);
        assert_eq!(test.counts, vec![1, 2]);
        assert_eq!(test.samples, 3);
    }

    #[test]
    fn test_sampler_is_uniform_sha256() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x1a7a);
        let sampler = UniformSampler::new(HashAlgorithm::Sha256);
        let test = sampler_self_test(&sampler, 10, 10_000, &mut rng).unwrap();

        assert_eq!(test.samples, 10_000);
        assert!(
            test.passes(ConfidenceLevel::P999),
            "chi-squared {} exceeds {}",
            test.statistic,
            test.critical_value(ConfidenceLevel::P999)
        );
    }

    #[test]
    fn test_sampler_is_uniform_blake3_odd_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let sampler = UniformSampler::new(HashAlgorithm::Blake3);
        let test = sampler_self_test(&sampler, 37, 18_500, &mut rng).unwrap();
        assert!(test.passes(ConfidenceLevel::P999));
    }

    #[test]
    fn test_zero_range_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(sampler_self_test(&UniformSampler::default(), 0, 10, &mut rng).is_err());
    }
}
