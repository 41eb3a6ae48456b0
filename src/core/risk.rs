use crate::models::{RiskAssessment, RiskTier};

/// Map a confidence value to a risk tier and recommendation
///
/// Bands are left-inclusive, right-exclusive. Confidence is expected in
/// [0, 100] but any float clamps into the four bands, so this is total over
/// all reals (NaN lands in Low via the comparisons below).
pub fn classify(confidence: f64) -> RiskAssessment {
    let (tier, recommendation) = if confidence >= 90.0 {
        (RiskTier::Critical, "Immediate consultation required.")
    } else if confidence >= 70.0 {
        (
            RiskTier::High,
            "Consult a doctor and schedule further checkups.",
        )
    } else if confidence >= 40.0 {
        (
            RiskTier::Moderate,
            "Monitor regularly and work on lifestyle improvement.",
        )
    } else {
        (
            RiskTier::Low,
            "Maintain a healthy lifestyle and routine checkups.",
        )
    };

    RiskAssessment {
        tier,
        recommendation: recommendation.to_string(),
    }
}
