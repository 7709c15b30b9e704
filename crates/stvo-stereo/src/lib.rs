#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pipeline configuration.
pub mod config;

/// Left/right detection orchestration.
pub mod detection;

/// Error types for the stereo pipeline.
pub mod error;

/// Validated stereo point and line features.
pub mod feature;

/// Stereo frame owning images, working buffers and validated features.
pub mod frame;

/// Robust median absolute deviation thresholds.
pub mod mad;

/// Left/right candidate matching.
pub mod matching;

/// Detector, matchers and configuration bundled for extraction.
pub mod pipeline;

/// Analytic endpoint covariance of stereo triangulation.
pub mod uncertainty;

/// Geometric verification of stereo candidates.
pub mod verify;

pub use config::{LineMatcherBackend, StereoConfig};
pub use error::StereoError;
pub use feature::{LineFeature, PointFeature};
pub use frame::StereoFrame;
pub use pipeline::{ExtractionSummary, StereoPipeline};
pub use verify::ExtractionMode;
