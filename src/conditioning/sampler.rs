//! Uniform integer sampling from entropy blobs.
//!
//! A blob is serialized to its canonical text, hashed to a 256-bit
//! integer `H`, and reduced modulo the range size. To remove modulo
//! bias, `H` values in the final partial bucket `[2^256 - r, 2^256)`
//! (with `r = 2^256 mod range`) are rejected and replaced by the hash
//! of the previous digest's lowercase hex text.
//!
//! Sampling is deterministic: the same blob and range always give the
//! same value. Distinct samples come from distinct blobs.

use super::hash::{Conditioner, Digest, HashAlgorithm};
use crate::extraction::EntropyBlob;
use thiserror::Error;

/// Errors from invalid sampling requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("cannot sample from an empty blob")]
    EmptyBlob,
    #[error("invalid range: max {max} is below min {min}")]
    InvalidRange { min: i64, max: i64 },
}

/// The full result of one sampling operation.
#[derive(Debug, Clone, Copy)]
pub struct Draw {
    /// The sampled value in `[min, max]`.
    pub value: i64,
    /// The accepted digest.
    pub digest: Digest,
    /// How many times the digest was re-hashed before acceptance.
    pub rehashes: u32,
}

/// Maps entropy blobs onto uniformly distributed integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler {
    conditioner: Conditioner,
}

impl UniformSampler {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            conditioner: Conditioner::new(algorithm),
        }
    }

    /// Returns the hash algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.conditioner.algorithm()
    }

    /// Samples an integer in `[min, max]` from `blob`.
    pub fn sample(&self, blob: &EntropyBlob, min: i64, max: i64) -> Result<i64, SampleError> {
        self.draw(blob, min, max).map(|draw| draw.value)
    }

    /// Samples an integer in `[min, max]`, also returning the digest used.
    pub fn draw(&self, blob: &EntropyBlob, min: i64, max: i64) -> Result<Draw, SampleError> {
        if blob.is_empty() {
            return Err(SampleError::EmptyBlob);
        }
        if max < min {
            return Err(SampleError::InvalidRange { min, max });
        }

        // At most 2^64, which `Digest::rem` supports.
        let range = (max as i128 - min as i128 + 1) as u128;
        let tail = pow2_256_mod(range);

        let initial = self.conditioner.digest(blob.canonical_text().as_bytes());
        let (digest, rehashes) = self.settle(initial, tail);
        let candidate = digest.rem(range);

        Ok(Draw {
            value: (min as i128 + candidate as i128) as i64,
            digest,
            rehashes,
        })
    }

    /// Re-hashes `digest` until it falls outside the partial bucket.
    fn settle(&self, mut digest: Digest, tail: u128) -> (Digest, u32) {
        let mut rehashes = 0;
        while digest.exceeds_tail(tail) {
            rehashes += 1;
            tracing::debug!(rehashes, "Digest in partial bucket, re-hashing");
            digest = self.conditioner.digest(digest.to_hex().as_bytes());
        }
        (digest, rehashes)
    }
}

/// Computes `2^256 mod modulus` for `modulus <= 2^64`.
fn pow2_256_mod(modulus: u128) -> u128 {
    (0..256).fold(1 % modulus, |acc, _| (acc << 1) % modulus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn example_blob() -> EntropyBlob {
        EntropyBlob::from_values(vec![10.5, 20.25, 5.0])
    }

    #[test]
    fn test_reference_example() {
        let sampler = UniformSampler::new(HashAlgorithm::Sha256);
        assert_eq!(sampler.sample(&example_blob(), 0, 9), Ok(2));
        assert_eq!(sampler.sample(&example_blob(), 0, 99), Ok(62));
        assert_eq!(sampler.sample(&example_blob(), -5, 5), Ok(2));
    }

    #[test]
    fn test_reference_digest() {
        let draw = UniformSampler::default().draw(&example_blob(), 0, 9).unwrap();
        assert_eq!(
            draw.digest.to_hex(),
            "583fadc1503efa2fdacef5e4e94d7b35a9482da48d0a90628032aa969992fa4e"
        );
        assert_eq!(draw.rehashes, 0);
    }

    #[test]
    fn test_single_value_range() {
        let sampler = UniformSampler::default();
        assert_eq!(sampler.sample(&EntropyBlob::from_values(vec![1.0]), 7, 7), Ok(7));
    }

    #[test]
    fn test_full_i64_range() {
        let sampler = UniformSampler::default();
        assert!(sampler.sample(&example_blob(), i64::MIN, i64::MAX).is_ok());
    }

    #[test]
    fn test_empty_blob_rejected() {
        let sampler = UniformSampler::default();
        assert_eq!(
            sampler.sample(&EntropyBlob::new(0), 0, 9),
            Err(SampleError::EmptyBlob)
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let sampler = UniformSampler::default();
        assert_eq!(
            sampler.sample(&example_blob(), 5, 4),
            Err(SampleError::InvalidRange { min: 5, max: 4 })
        );
    }

    #[test]
    fn test_single_value_change_alters_digest() {
        let sampler = UniformSampler::default();
        let base = sampler.draw(&example_blob(), 0, 9).unwrap().digest;

        for i in 0..3 {
            let mut values = example_blob().values().to_vec();
            values[i] += 0.25;
            let changed = sampler
                .draw(&EntropyBlob::from_values(values), 0, 9)
                .unwrap()
                .digest;
            assert_ne!(base, changed);
        }
    }

    #[test]
    fn test_partial_bucket_triggers_rehash() {
        let sampler = UniformSampler::default();
        let top = Digest::from_bytes([0xff; 32]);

        let (digest, rehashes) = sampler.settle(top, pow2_256_mod(10));
        assert_eq!(rehashes, 1);
        assert_eq!(digest, Conditioner::default().digest("ff".repeat(32).as_bytes()));

        // Powers of two divide 2^256 evenly, so nothing is rejected.
        assert_eq!(sampler.settle(top, pow2_256_mod(16)).1, 0);
    }

    #[test]
    fn test_pow2_256_mod() {
        assert_eq!(pow2_256_mod(10), 6);
        assert_eq!(pow2_256_mod(1), 0);
        assert_eq!(pow2_256_mod(1u128 << 64), 0);
        assert_eq!(pow2_256_mod(3), 1);
    }

    proptest! {
        #[test]
        fn prop_sample_is_deterministic(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
            min in -1000i64..1000,
            span in 0i64..100_000,
        ) {
            let sampler = UniformSampler::default();
            let blob = EntropyBlob::from_values(values);
            prop_assert_eq!(
                sampler.sample(&blob, min, min + span),
                sampler.sample(&blob, min, min + span)
            );
        }

        #[test]
        fn prop_sample_within_range(
            values in prop::collection::vec(0.0f64..256.0, 1..64),
            min in any::<i32>(),
            span in any::<u32>(),
        ) {
            let sampler = UniformSampler::new(HashAlgorithm::Blake3);
            let blob = EntropyBlob::from_values(values);
            let (min, max) = (min as i64, min as i64 + span as i64);
            let value = sampler.sample(&blob, min, max).unwrap();
            prop_assert!(min <= value && value <= max);
        }
    }
}
