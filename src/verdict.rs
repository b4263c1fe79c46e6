//! Verdict resolution: raw probability to verdict and confidence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores at or above this resolve to [`Verdict::Forged`].
pub const FORGERY_THRESHOLD: f32 = 0.5;

/// The discrete classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No tampering detected.
    Genuine,
    /// Tampering detected.
    Forged,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genuine => write!(f, "Genuine"),
            Self::Forged => write!(f, "Forged"),
        }
    }
}

/// Map a forgery probability to a verdict and confidence percentage.
///
/// Confidence expresses certainty in the *stated* verdict, not the raw
/// forgery probability: a score of 0.1 is Genuine at 90, not Genuine at 10.
/// Exactly 0.5 resolves to Forged at 50 (fixed tie-break). The score is
/// clamped to `[0, 1]` first, so confidence is always an integer in
/// `[0, 100]` even under floating-point overshoot.
#[must_use]
pub fn resolve(score: f32) -> (Verdict, u8) {
    let score = score.clamp(0.0, 1.0);
    let (verdict, certainty) = if score >= FORGERY_THRESHOLD {
        (Verdict::Forged, score)
    } else {
        (Verdict::Genuine, 1.0 - score)
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence = (certainty * 100.0).round().clamp(0.0, 100.0) as u8;
    (verdict, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_threshold_resolves_to_forged_at_fifty() {
        assert_eq!(resolve(0.5), (Verdict::Forged, 50));
    }

    #[test]
    fn high_scores_resolve_to_forged() {
        assert_eq!(resolve(1.0), (Verdict::Forged, 100));
        assert_eq!(resolve(0.73), (Verdict::Forged, 73));
    }

    #[test]
    fn low_scores_resolve_to_genuine_with_inverted_confidence() {
        assert_eq!(resolve(0.0), (Verdict::Genuine, 100));
        assert_eq!(resolve(0.1), (Verdict::Genuine, 90));
        assert_eq!(resolve(0.49), (Verdict::Genuine, 51));
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        assert_eq!(resolve(1.5), (Verdict::Forged, 100));
        assert_eq!(resolve(-0.2), (Verdict::Genuine, 100));
        assert!(resolve(f32::NAN).1 <= 100);
    }

    #[test]
    fn confidence_is_bounded_across_score_sweep() {
        for i in 0..=1000u16 {
            let score = f32::from(i) / 1000.0;
            let (verdict, confidence) = resolve(score);
            assert!(confidence <= 100, "score {score} gave confidence {confidence}");
            // Confidence in the stated verdict never drops below the tie point.
            assert!(confidence >= 50, "score {score} gave confidence {confidence}");
            assert!(matches!(verdict, Verdict::Genuine | Verdict::Forged));
        }
    }

    #[test]
    fn verdict_displays_as_plain_words() {
        assert_eq!(Verdict::Genuine.to_string(), "Genuine");
        assert_eq!(Verdict::Forged.to_string(), "Forged");
    }

    #[test]
    fn verdict_serializes_as_enum_name() {
        assert_eq!(serde_json::to_string(&Verdict::Forged).unwrap(), "\"Forged\"");
        assert_eq!(
            serde_json::from_str::<Verdict>("\"Genuine\"").unwrap(),
            Verdict::Genuine
        );
    }
}
