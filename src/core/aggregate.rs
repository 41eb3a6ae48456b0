use crate::models::{AggregatedDecision, ModelOutcome};
use thiserror::Error;

/// Errors reconciling model outcomes into one decision
///
/// A malformed outcome is fatal for the whole request: silently defaulting a
/// missing confidence or prediction would corrupt the comparison and the
/// persisted decision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("scoring response contained no model outcomes")]
    Empty,

    #[error("model '{model}' returned a malformed outcome: {reason}")]
    Malformed { model: String, reason: String },
}

/// Reduce one-or-many named model outcomes to the single highest-confidence
/// decision
///
/// The running maximum uses strict `>`, so equal-confidence outcomes keep the
/// first-seen entry; outcome order follows the scoring response's entry
/// order, making the tie-break deterministic.
pub fn aggregate(outcomes: &[ModelOutcome]) -> Result<AggregatedDecision, AggregationError> {
    if outcomes.is_empty() {
        return Err(AggregationError::Empty);
    }

    let mut best: Option<AggregatedDecision> = None;

    for outcome in outcomes {
        let confidence = match outcome.confidence {
            Some(c) if c.is_finite() => c,
            _ => {
                return Err(AggregationError::Malformed {
                    model: outcome.model.clone(),
                    reason: "missing or non-numeric confidence".to_string(),
                })
            }
        };

        let prediction = outcome.prediction.ok_or_else(|| AggregationError::Malformed {
            model: outcome.model.clone(),
            reason: "missing boolean prediction".to_string(),
        })?;

        let is_new_max = match &best {
            None => true,
            Some(current) => confidence > current.confidence,
        };

        if is_new_max {
            best = Some(AggregatedDecision {
                decision: prediction,
                confidence,
                source_model: outcome.model.clone(),
            });
        }
    }

    // Non-empty input always yields a winner or an error above.
    Ok(best.expect("non-empty outcomes produce a maximum"))
}
