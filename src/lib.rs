//! Classify scanned document images as genuine or forged.
//!
//! The pipeline re-encodes an uploaded image at a fixed JPEG quality and
//! amplifies the per-pixel difference against the original (Error Level
//! Analysis). Regions edited after the image's last save stand out in this
//! map, and a trained CNN turns the map into a forgery probability, which
//! is resolved into a verdict and a confidence percentage.
//!
//! # Quick Start
//!
//! ```no_run
//! use forgelens::{AnalysisEngine, EngineConfig};
//!
//! let engine = AnalysisEngine::new(EngineConfig::default());
//! let bytes = std::fs::read("scan.jpg").unwrap();
//! let record = engine.analyze(&bytes, "image/jpeg", "scan.jpg").unwrap();
//! println!("{}: {} ({}%)", record.filename, record.verdict, record.confidence);
//! ```
//!
//! # Degraded mode
//!
//! When the trained model artifact is missing, the engine substitutes a
//! deterministic placeholder scorer instead of failing. Records produced
//! this way carry `ela_processed = false` so downstream consumers can tell
//! they are non-authoritative.

#![deny(missing_docs)]

pub mod classifier;
pub mod decode;
pub mod ela;
pub mod error;
pub mod features;
pub mod record;
pub mod verdict;

mod engine;

pub use classifier::{Classifier, OnnxScorer, PlaceholderScorer, Scorer};
pub use decode::{ImageKind, MAX_UPLOAD_BYTES};
pub use engine::{
    is_supported_upload, AnalysisEngine, EngineConfig, FileAnalysis, DEFAULT_MODEL_PATH,
};
pub use error::{Error, Result};
pub use features::{FeatureTensor, CLASSIFIER_INPUT_SIZE};
pub use record::{AnalysisRecord, JsonlSink, RecordSink};
pub use verdict::{Verdict, FORGERY_THRESHOLD};
