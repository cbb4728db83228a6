//! Statistical checks on sampler output.
//!
//! These are sanity checks to detect obvious bias, not proofs of
//! uniformity. Passing is necessary but not sufficient.

mod uniformity;

pub use uniformity::{sampler_self_test, ConfidenceLevel, UniformityTest};
