//! Entropy conditioning and uniform sampling.
//!
//! This module folds variable-length entropy blobs into fixed-size
//! digests with standard cryptographic hash functions, then maps those
//! digests onto integer ranges without modulo bias.

mod hash;
mod sampler;

pub use hash::{Conditioner, Digest, HashAlgorithm};
pub use sampler::{Draw, SampleError, UniformSampler};
