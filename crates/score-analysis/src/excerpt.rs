//! Bounded excerpt of a report for downstream summarization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::{AnalysisReport, ContourEntry, HarmonicLabel, PitchRangeSummary, RhythmSummary};

/// How many entries of each sequence an excerpt keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcerptLimits {
    pub chords: usize,
    pub rhythm: usize,
    pub pitch_ranges: usize,
    pub contour: usize,
}

impl Default for ExcerptLimits {
    fn default() -> Self {
        Self {
            chords: 10,
            rhythm: 5,
            pitch_ranges: 5,
            contour: 5,
        }
    }
}

/// The head of each report sequence, with sentinel entries filtered out of
/// harmony and pitch range before truncation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryExcerpt {
    pub key: String,
    pub time_signature: String,
    pub chords: Vec<HarmonicLabel>,
    pub rhythm: Vec<RhythmSummary>,
    pub pitch_ranges: Vec<PitchRangeSummary>,
    pub contour: Vec<ContourEntry>,
}

impl SummaryExcerpt {
    pub fn new(report: &AnalysisReport, limits: &ExcerptLimits) -> Self {
        Self {
            key: report.key.to_string(),
            time_signature: report.time_signature.ratio_string(),
            chords: report
                .chords
                .iter()
                .filter(|label| !label.is_placeholder())
                .take(limits.chords)
                .cloned()
                .collect(),
            rhythm: report
                .rhythmic_complexity
                .iter()
                .take(limits.rhythm)
                .cloned()
                .collect(),
            pitch_ranges: report
                .pitch_ranges
                .iter()
                .filter(|range| range.has_pitch_data())
                .take(limits.pitch_ranges)
                .cloned()
                .collect(),
            contour: report
                .melodic_contour
                .iter()
                .take(limits.contour)
                .cloned()
                .collect(),
        }
    }
}

impl AnalysisReport {
    pub fn excerpt(&self, limits: &ExcerptLimits) -> SummaryExcerpt {
        SummaryExcerpt::new(self, limits)
    }
}

/// Plain-text sections, one label per line.
impl fmt::Display for SummaryExcerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key: {}", self.key)?;
        writeln!(f, "Time Signature: {}", self.time_signature)?;
        section(f, "Chords", &self.chords)?;
        section(f, "Rhythmic Highlights", &self.rhythm)?;
        section(f, "Pitch Range Insights", &self.pitch_ranges)?;
        section(f, "Melodic Contour", &self.contour)
    }
}

fn section<T: fmt::Display>(f: &mut fmt::Formatter<'_>, title: &str, entries: &[T]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}:", title)?;
    for entry in entries {
        writeln!(f, "{}", entry)?;
    }
    Ok(())
}
