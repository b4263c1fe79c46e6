//! The analysis engine: pipeline orchestration and configuration.

use std::path::{Path, PathBuf};

use crate::classifier::Classifier;
use crate::decode::{self, ImageKind, MAX_UPLOAD_BYTES};
use crate::ela::{self, ELA_QUALITY, ELA_SCALE};
use crate::error::{Error, Result};
use crate::features;
use crate::record::AnalysisRecord;
use crate::verdict;

/// Default filesystem location of the trained model artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/ela_cnn.onnx";

/// Configuration for the analysis engine.
///
/// The ELA constants live here as well as in [`crate::ela`] so fixtures can
/// pin exact map bytes; the defaults are the documented production values.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// JPEG quality for the ELA re-encode pass.
    pub ela_quality: u8,
    /// Amplification applied to the raw recompression difference.
    pub ela_scale: f32,
    /// Where to look for the trained classifier artifact at startup.
    pub model_path: PathBuf,
    /// Upload size ceiling in bytes, enforced before decode.
    pub max_upload_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ela_quality: ELA_QUALITY,
            ela_scale: ELA_SCALE,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// Outcome of analyzing one file in a batch run.
#[derive(Debug)]
pub struct FileAnalysis {
    /// Path of the analyzed file.
    pub path: PathBuf,
    /// The record, or why this file was rejected.
    pub outcome: Result<AnalysisRecord>,
}

/// The forgery-detection engine.
///
/// Create once with [`AnalysisEngine::new`] and reuse across requests: each
/// [`analyze`](AnalysisEngine::analyze) call is an independent, stateless
/// pass over in-memory data, so `&self` methods may run concurrently from
/// any number of threads. The classifier weights are the only shared state
/// and are read-only after construction.
pub struct AnalysisEngine {
    classifier: Classifier,
    config: EngineConfig,
}

impl AnalysisEngine {
    /// Build an engine, loading the classifier from the configured path.
    ///
    /// A missing model artifact is not an error: the engine starts in
    /// placeholder mode and flags every record accordingly.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let classifier = Classifier::load(&config.model_path);
        Self { classifier, config }
    }

    /// Build an engine around an explicit classifier (the test seam).
    #[must_use]
    pub fn with_classifier(classifier: Classifier, config: EngineConfig) -> Self {
        Self { classifier, config }
    }

    /// Whether results are currently non-authoritative.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.classifier.is_placeholder()
    }

    /// Analyze an uploaded document image.
    ///
    /// Runs the full pipeline: decode, ELA transform, feature
    /// normalization, classification, verdict resolution, record assembly.
    /// Deterministic for identical bytes and identical model weights.
    ///
    /// # Errors
    ///
    /// Any decode, transform, or inference failure aborts this request
    /// only; see [`Error`] for the kinds surfaced.
    pub fn analyze(
        &self,
        bytes: &[u8],
        content_type: &str,
        filename: &str,
    ) -> Result<AnalysisRecord> {
        let pixels = decode::decode_upload(bytes, content_type, self.config.max_upload_bytes)?;
        let ela_map = ela::compute_ela(&pixels, self.config.ela_quality, self.config.ela_scale)?;
        let tensor = features::normalize(&ela_map)?;
        let score = self.classifier.score(&tensor)?;
        let (verdict, confidence) = verdict::resolve(score);

        log::debug!(
            "analyzed {filename}: score={score:.4} verdict={verdict} confidence={confidence}"
        );

        Ok(AnalysisRecord::new(
            filename,
            verdict,
            confidence,
            !self.classifier.is_placeholder(),
        ))
    }

    /// Analyze an image file on disk, inferring the content type from its
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unrecognized extensions,
    /// [`Error::Io`] if the file cannot be read, or any pipeline error from
    /// [`analyze`](AnalysisEngine::analyze).
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisRecord> {
        let kind = ImageKind::from_path(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |f| f.to_string_lossy().to_string());

        self.analyze(&bytes, kind.content_type(), &filename)
    }

    /// Analyze every supported image in a directory.
    ///
    /// Files with unsupported extensions are skipped silently. Uses
    /// parallel iteration when the `cli` feature is enabled (via rayon).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be read; per-file
    /// failures are reported inside each [`FileAnalysis`].
    pub fn analyze_directory(&self, dir: &Path) -> Result<Vec<FileAnalysis>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| is_supported_upload(p))
            .collect();
        paths.sort();

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            Ok(paths
                .par_iter()
                .map(|path| FileAnalysis {
                    path: path.clone(),
                    outcome: self.analyze_file(path),
                })
                .collect())
        }

        #[cfg(not(feature = "cli"))]
        {
            Ok(paths
                .iter()
                .map(|path| FileAnalysis {
                    path: path.clone(),
                    outcome: self.analyze_file(path),
                })
                .collect())
        }
    }
}

/// Check if a file has a supported upload extension (jpg, jpeg, png).
#[must_use]
pub fn is_supported_upload(path: &Path) -> bool {
    ImageKind::from_path(path).is_some()
}
