//! Report entry types and the assembled analysis report.
//!
//! Every entry renders to the same one-line label it serializes as, so a
//! report reads identically as JSON or plain text.

use std::fmt;

use notation::{Interval, Key, QuarterLength, RomanNumeral, TimeSignature};
use serde::{Serialize, Serializer};

/// Sentinel figure for measures without a usable chord.
pub const NOT_ENOUGH_NOTES: &str = "not enough notes";

/// Sentinel for measures without single pitched notes.
pub const NO_PITCH_DATA: &str = "no pitch data";

macro_rules! serialize_as_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

/// Roman-numeral label of one measure, e.g. `m.3: V7`.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicLabel {
    pub measure: u32,
    /// `None` when the measure had fewer than two notes or its chord could
    /// not be labeled under the placeholder policy.
    pub numeral: Option<RomanNumeral>,
}

impl HarmonicLabel {
    pub fn figure(&self) -> &str {
        self.numeral
            .as_ref()
            .map_or(NOT_ENOUGH_NOTES, RomanNumeral::figure)
    }

    pub fn is_placeholder(&self) -> bool {
        self.numeral.is_none()
    }
}

impl fmt::Display for HarmonicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m.{}: {}", self.measure, self.figure())
    }
}

/// Mean note-type duration of one measure.
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmSummary {
    pub measure: u32,
    /// Exact mean in quarter notes; zero for a measure without notes.
    pub mean: QuarterLength,
}

impl RhythmSummary {
    /// The mean rounded to hundredths. Exact ties such as 5/8 go to the even
    /// hundredth, the way binary floats format with two decimals.
    pub fn rounded(&self) -> String {
        let scaled = self.mean * 100;
        let floor = scaled.floor();
        let hundredths = if scaled - floor == QuarterLength::new(1, 2) {
            let low = floor.to_integer();
            if low % 2 == 0 {
                low
            } else {
                low + 1
            }
        } else {
            scaled.round().to_integer()
        };
        let sign = if hundredths < 0 { "-" } else { "" };
        let abs = hundredths.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for RhythmSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m.{}: avg rhythm = {}", self.measure, self.rounded())
    }
}

/// Span in semitones between the highest and lowest single note.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchRangeSummary {
    pub measure: u32,
    pub range: Option<u8>,
}

impl PitchRangeSummary {
    pub fn has_pitch_data(&self) -> bool {
        self.range.is_some()
    }
}

impl fmt::Display for PitchRangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some(range) => write!(f, "m.{}: pitch range = {}", self.measure, range),
            None => write!(f, "m.{}: {}", self.measure, NO_PITCH_DATA),
        }
    }
}

/// Melodic step between two consecutive single notes.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourEntry {
    pub from_measure: u32,
    pub to_measure: u32,
    pub interval: Interval,
}

impl fmt::Display for ContourEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "From m.{} to m.{}: {}",
            self.from_measure,
            self.to_measure,
            self.interval.directed_name()
        )
    }
}

serialize_as_display!(HarmonicLabel, RhythmSummary, PitchRangeSummary, ContourEntry);

/// Everything one analysis run produces.
///
/// The four sequences keep source order and can be sliced independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(serialize_with = "display_string")]
    pub key: Key,
    #[serde(serialize_with = "display_string")]
    pub time_signature: TimeSignature,
    pub chords: Vec<HarmonicLabel>,
    pub rhythmic_complexity: Vec<RhythmSummary>,
    pub pitch_ranges: Vec<PitchRangeSummary>,
    pub melodic_contour: Vec<ContourEntry>,
}

fn display_string<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Merge the resolver, measure and contour results into one report.
pub fn assemble(
    key: Key,
    time_signature: TimeSignature,
    chords: Vec<HarmonicLabel>,
    rhythmic_complexity: Vec<RhythmSummary>,
    pitch_ranges: Vec<PitchRangeSummary>,
    melodic_contour: Vec<ContourEntry>,
) -> AnalysisReport {
    AnalysisReport {
        key,
        time_signature,
        chords,
        rhythmic_complexity,
        pitch_ranges,
        melodic_contour,
    }
}
