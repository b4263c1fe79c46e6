//! Classifier adapter: trained ONNX model with a deterministic fallback.
//!
//! The trained CNN is a black box from the pipeline's perspective: a
//! function from a feature tensor to a forgery probability. [`Scorer`] is
//! the seam shared by the real model, the placeholder, and test stubs.

use std::path::Path;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::features::FeatureTensor;

/// Gain applied to the mean feature value by the placeholder scorer.
///
/// Feature means for once-saved documents sit near zero while heavily
/// tampered maps climb past 0.5; the gain spreads that range over `[0, 1]`
/// without tipping clean inputs across the decision threshold.
const PLACEHOLDER_GAIN: f32 = 2.0;

/// A forgery probability scorer: feature tensor in, scalar in `[0, 1]` out.
///
/// Implementations must be pure per call and safe to share across threads;
/// any internal state is read-only after construction.
pub trait Scorer: Send + Sync {
    /// Score a feature tensor, returning the probability of forgery.
    fn score(&self, features: &FeatureTensor) -> Result<f32>;
}

/// Forward pass through a trained ONNX model.
pub struct OnnxScorer {
    // ort sessions take `&mut self` to run; the weights themselves are
    // read-only, so a mutex around the session is all the coordination
    // concurrent requests need.
    session: Mutex<Session>,
}

impl OnnxScorer {
    /// Load the model artifact from disk and build an inference session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelUnavailable`] if the file is missing or the
    /// session cannot be built from it.
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "model not found at {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| Error::ModelUnavailable(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::ModelUnavailable(format!("optimization level: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| Error::ModelUnavailable(format!("model load: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, features: &FeatureTensor) -> Result<f32> {
        let batched = features.clone().into_batched();

        let mut session = self.session.lock();

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| Error::ModelUnavailable("model declares no output".to_string()))?;

        let input = Value::from_array(batched)
            .map_err(|e| Error::ModelUnavailable(format!("input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| Error::ModelUnavailable(format!("inference: {e}")))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| Error::ModelUnavailable(format!("missing output {output_name}")))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::ModelUnavailable(format!("output tensor: {e}")))?;

        let raw = tensor
            .1
            .first()
            .copied()
            .ok_or_else(|| Error::ModelUnavailable("empty model output".to_string()))?;

        Ok(raw)
    }
}

/// Deterministic stand-in for the trained model.
///
/// Maps mean ELA energy through a fixed gain: strong recompression error
/// leans Forged, a quiet map leans Genuine. Results are well-formed but
/// non-authoritative; records scored this way carry `ela_processed = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderScorer;

impl Scorer for PlaceholderScorer {
    fn score(&self, features: &FeatureTensor) -> Result<f32> {
        Ok((features.mean() * PLACEHOLDER_GAIN).clamp(0.0, 1.0))
    }
}

/// The classifier adapter handed to the analysis engine.
///
/// Constructed once at startup and injected explicitly (not a process-wide
/// singleton) so real and placeholder scorers can coexist in tests. Whatever
/// scorer is behind it, the raw output is clamped to `[0, 1]`.
pub struct Classifier {
    scorer: Box<dyn Scorer>,
    placeholder: bool,
}

impl Classifier {
    /// Load the trained model, degrading to the placeholder if that fails.
    ///
    /// A missing or unreadable artifact is a documented degraded-mode
    /// trigger, not an error: the failure is logged and every record scored
    /// afterwards is flagged as non-authoritative.
    #[must_use]
    pub fn load(model_path: &Path) -> Self {
        match OnnxScorer::load(model_path) {
            Ok(scorer) => {
                log::info!("classifier model loaded from {}", model_path.display());
                Self {
                    scorer: Box::new(scorer),
                    placeholder: false,
                }
            }
            Err(e) => {
                log::warn!("{e}; falling back to placeholder scorer");
                Self::placeholder()
            }
        }
    }

    /// A classifier running the deterministic placeholder scorer.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            scorer: Box::new(PlaceholderScorer),
            placeholder: true,
        }
    }

    /// Wrap an arbitrary scorer, declaring whether it is authoritative.
    #[must_use]
    pub fn from_scorer(scorer: Box<dyn Scorer>, placeholder: bool) -> Self {
        Self {
            scorer,
            placeholder,
        }
    }

    /// Whether this classifier is running in placeholder mode.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Score a feature tensor, clamping the result into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelUnavailable`] if the underlying scorer fails at
    /// inference time.
    pub fn score(&self, features: &FeatureTensor) -> Result<f32> {
        Ok(self.scorer.score(features)?.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::normalize;
    use crate::testutil::gradient_image;

    struct FixedScorer(f32);

    impl Scorer for FixedScorer {
        fn score(&self, _features: &FeatureTensor) -> Result<f32> {
            Ok(self.0)
        }
    }

    #[test]
    fn load_falls_back_to_placeholder_when_model_missing() {
        let classifier = Classifier::load(Path::new("/nonexistent/model.onnx"));
        assert!(classifier.is_placeholder());
    }

    #[test]
    fn placeholder_scores_are_deterministic_and_bounded() {
        let classifier = Classifier::placeholder();
        let features = normalize(&gradient_image(64, 64)).unwrap();

        let a = classifier.score(&features).unwrap();
        let b = classifier.score(&features).unwrap();
        assert!((a - b).abs() < f32::EPSILON);
        assert!((0.0..=1.0).contains(&a));
    }

    #[test]
    fn placeholder_follows_feature_energy() {
        let quiet = FeatureTensor::from_array(ndarray::Array3::zeros((128, 128, 3))).unwrap();
        let loud =
            FeatureTensor::from_array(ndarray::Array3::from_elem((128, 128, 3), 0.2)).unwrap();

        let scorer = PlaceholderScorer;
        assert!(scorer.score(&quiet).unwrap() < scorer.score(&loud).unwrap());
    }

    #[test]
    fn adapter_clamps_out_of_range_scores() {
        let features = normalize(&gradient_image(32, 32)).unwrap();

        let high = Classifier::from_scorer(Box::new(FixedScorer(1.7)), false);
        assert!((high.score(&features).unwrap() - 1.0).abs() < f32::EPSILON);

        let low = Classifier::from_scorer(Box::new(FixedScorer(-0.3)), false);
        assert!(low.score(&features).unwrap().abs() < f32::EPSILON);
    }

    #[test]
    fn from_scorer_preserves_authority_flag() {
        let real = Classifier::from_scorer(Box::new(FixedScorer(0.5)), false);
        assert!(!real.is_placeholder());

        let stub = Classifier::from_scorer(Box::new(FixedScorer(0.5)), true);
        assert!(stub.is_placeholder());
    }
}
