//! Optical Index Library
//!
//! Derives unbiased, distinct random indices from physical motion seen
//! by a camera (a lava lamp, typically) and uses them to pick entries
//! from an externally supplied ordered collection.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → detection → features → extraction → conditioning → selection
//!                                   (blob)       (digest, index)
//! ```
//!
//! # Design Principles
//!
//! - **Injected capabilities**: detector, feature extractor and frame
//!   source are traits; models and devices are never hard-coded
//! - **Empty is not an error**: attempts that see no entropy-bearing
//!   region are retried silently
//! - **Unbiased**: rejection sampling removes modulo bias
//! - **Scoped devices**: the camera is held for one build and always released
//!
//! # Example
//!
//! ```no_run
//! use optical_index::{
//!     capture::{CaptureConfig, SyntheticLampSource},
//!     conditioning::UniformSampler,
//!     detection::{DetectorConfig, ThresholdBlobDetector},
//!     extraction::EntropyCollector,
//!     features::FastKeypointExtractor,
//!     selection::UniqueIndexSetBuilder,
//! };
//!
//! let detection = DetectorConfig::default();
//! let collector = EntropyCollector::new(
//!     ThresholdBlobDetector::new(&detection),
//!     FastKeypointExtractor::default(),
//!     detection.entropy_class,
//! );
//! let source = SyntheticLampSource::new(CaptureConfig::default());
//! let mut builder = UniqueIndexSetBuilder::new(source, collector, UniformSampler::default());
//!
//! // Five distinct indices into a 40-track playlist.
//! if let Some(generated) = builder.generate_indices(5, 40).unwrap() {
//!     println!("{:?}", generated.indices);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod conditioning;
pub mod config;
pub mod detection;
pub mod extraction;
pub mod features;
pub mod metrics;
pub mod playlist;
pub mod selection;

// Re-export commonly used types at crate root
pub use capture::{CaptureConfig, CaptureError, Frame, FrameSource, SyntheticLampSource};
pub use conditioning::{HashAlgorithm, SampleError, UniformSampler};
pub use config::FileConfig;
pub use detection::{Region, RegionDetector};
pub use extraction::{EntropyBlob, EntropyCollector};
pub use features::{FeatureExtractor, KeypointDescriptor};
pub use playlist::Playlist;
pub use selection::{BuildOutcome, CancelToken, SelectionError, UniqueIndexSetBuilder};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
