//! Measure-wise analysis of a symbolic score.
//!
//! The pipeline reads one immutable [`Score`] and produces an
//! [`AnalysisReport`]:
//!
//! 1. [`resolver`] finds the global key and the prevailing time signature.
//! 2. [`measures`] labels every measure of the primary part with a roman
//!    numeral, a mean note duration and a pitch range.
//! 3. [`contour`] names the melodic intervals of the primary part.
//! 4. [`report::assemble`] merges the three.
//!
//! Steps 1–3 only borrow the score, so [`ScoreAnalyzer`] can run them on
//! separate threads when asked to.

pub mod contour;
pub mod error;
pub mod estimator;
pub mod excerpt;
pub mod measures;
pub mod options;
pub mod report;
pub mod resolver;

pub use contour::extract_contour;
pub use error::{AnalysisError, Result};
pub use estimator::{KeyEstimator, ProfileKeyEstimator};
pub use excerpt::{ExcerptLimits, SummaryExcerpt};
pub use measures::{analyze_measures, MeasureAnalysis};
pub use options::{AnalysisOptions, FailurePolicy, UnknownFailurePolicy};
pub use report::{
    assemble, AnalysisReport, ContourEntry, HarmonicLabel, PitchRangeSummary, RhythmSummary,
};
pub use resolver::{first_time_signature, resolve};

use std::sync::Arc;

use notation::{Part, Score};
use tracing::info;

/// Score analysis engine.
///
/// Holds a key estimator and run options; analysis itself is a pure
/// function of the score, so one engine can serve any number of scores.
pub struct ScoreAnalyzer {
    estimator: Arc<dyn KeyEstimator>,
    options: AnalysisOptions,
}

impl ScoreAnalyzer {
    /// Create with the profile estimator named in `options`.
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            estimator: Arc::new(ProfileKeyEstimator::new(options.key_profile)),
            options,
        }
    }

    /// Create with a custom key estimator.
    pub fn with_estimator(estimator: Arc<dyn KeyEstimator>, options: AnalysisOptions) -> Self {
        Self { estimator, options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Run the full pipeline.
    ///
    /// Fails before any per-measure work when the primary part is missing,
    /// when the score declares no time signature, or when it has nothing to
    /// estimate a key from.
    pub fn analyze(&self, score: &Score) -> Result<AnalysisReport> {
        let part = self.primary_part(score)?;

        let report = if self.options.parallel {
            self.analyze_parallel(score, part)?
        } else {
            let (key, time_signature) = resolve(score, self.estimator.as_ref())?;
            let measures = analyze_measures(part, &key, self.options.failure_policy);
            let contour = extract_contour(part);
            assemble(
                key,
                time_signature,
                measures.harmony,
                measures.rhythm,
                measures.pitch_ranges,
                contour,
            )
        };

        info!(
            key = %report.key,
            time_signature = %report.time_signature,
            measures = part.measures.len(),
            chords = report.chords.len(),
            contour = report.melodic_contour.len(),
            parallel = self.options.parallel,
            "analyzed score"
        );

        Ok(report)
    }

    /// Key and measures on one thread, contour on another.
    ///
    /// The meter check stays up front so a score without one still fails
    /// before any work is spawned.
    fn analyze_parallel(&self, score: &Score, part: &Part) -> Result<AnalysisReport> {
        let time_signature =
            first_time_signature(score).ok_or(AnalysisError::MissingTimeSignature)?;

        let (keyed, contour) = rayon::join(
            || -> Result<_> {
                let key = resolver::estimate_key(score, self.estimator.as_ref())?;
                let measures = analyze_measures(part, &key, self.options.failure_policy);
                Ok((key, measures))
            },
            || extract_contour(part),
        );
        let (key, measures) = keyed?;

        Ok(assemble(
            key,
            time_signature,
            measures.harmony,
            measures.rhythm,
            measures.pitch_ranges,
            contour,
        ))
    }

    fn primary_part<'s>(&self, score: &'s Score) -> Result<&'s Part> {
        if score.parts.is_empty() {
            return Err(AnalysisError::NoParts);
        }
        score
            .parts
            .get(self.options.primary_part)
            .ok_or(AnalysisError::PrimaryPartOutOfRange {
                index: self.options.primary_part,
                parts: score.parts.len(),
            })
    }
}

impl Default for ScoreAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}
