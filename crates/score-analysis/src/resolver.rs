//! Global key and prevailing meter.

use notation::{Element, Key, Score, TimeSignature};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::estimator::KeyEstimator;

/// First time signature found depth-first: parts, then measures, then
/// elements. Later meter changes do not affect the result.
pub fn first_time_signature(score: &Score) -> Option<TimeSignature> {
    score.elements().find_map(|element| match element {
        Element::TimeSignature(ts) => Some(*ts),
        _ => None,
    })
}

/// Estimate the global key over all parts.
pub fn estimate_key(score: &Score, estimator: &dyn KeyEstimator) -> Result<Key> {
    let key = estimator
        .estimate(score)
        .ok_or(AnalysisError::NoPitchedNotes)?;
    debug!(key = %key, confidence = key.confidence, "estimated key");
    Ok(key)
}

/// Resolve the global key and time signature.
///
/// The meter is checked first, so a score without one fails with
/// [`AnalysisError::MissingTimeSignature`] before any estimation runs.
pub fn resolve(score: &Score, estimator: &dyn KeyEstimator) -> Result<(Key, TimeSignature)> {
    let time_signature =
        first_time_signature(score).ok_or(AnalysisError::MissingTimeSignature)?;
    let key = estimate_key(score, estimator)?;
    Ok((key, time_signature))
}
