//! Cryptographic hash-based conditioning.
//!
//! Folds arbitrary-length input into a fixed 256-bit digest using a
//! standard hash function.

use blake3::Hasher as Blake3Hasher;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::str::FromStr;

/// Supported hash algorithms for conditioning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 - widely deployed, the reference choice for sampling.
    #[default]
    Sha256,
    /// BLAKE3 - fast, secure.
    Blake3,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(format!("unknown hash algorithm: {}", other)),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
            Self::Blake3 => f.write_str("blake3"),
        }
    }
}

/// A 256-bit digest, read as a big-endian unsigned integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns `self mod modulus`.
    ///
    /// `modulus` must be non-zero and at most 2^64.
    pub fn rem(&self, modulus: u128) -> u128 {
        debug_assert!(modulus > 0 && modulus <= 1u128 << 64);
        self.0
            .iter()
            .fold(0u128, |acc, &byte| ((acc << 8) | byte as u128) % modulus)
    }

    /// Returns true if `self >= 2^256 - tail`.
    ///
    /// Equivalently `!self < tail`, where `!self` is `2^256 - 1 - self`.
    /// `tail` is below 2^64, so only the low eight bytes of `!self` may be set.
    pub fn exceeds_tail(&self, tail: u128) -> bool {
        if tail == 0 {
            return false;
        }
        if self.0[..24].iter().any(|&b| b != 0xff) {
            return false;
        }
        let mut low = [0u8; 8];
        for (dst, src) in low.iter_mut().zip(&self.0[24..]) {
            *dst = !src;
        }
        (u64::from_be_bytes(low) as u128) < tail
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

/// Hash conditioner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conditioner {
    algorithm: HashAlgorithm,
}

impl Conditioner {
    /// Creates a new conditioner with the specified algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Returns the configured algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hashes `input` into a digest.
    pub fn digest(&self, input: &[u8]) -> Digest {
        let data = match self.algorithm {
            HashAlgorithm::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                hasher.update(input);
                *hasher.finalize().as_bytes()
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(input);
                let result = hasher.finalize();
                let mut data = [0u8; 32];
                data.copy_from_slice(&result);
                data
            }
        };
        Digest(data)
    }
}
