//! Per-measure harmony, rhythm and pitch-range statistics.

use notation::{Element, HarmonyError, Key, Measure, Part, Pitch, QuarterLength, RomanNumeral};
use tracing::debug;

use crate::options::FailurePolicy;
use crate::report::{HarmonicLabel, PitchRangeSummary, RhythmSummary};

/// The three per-measure sequences of one part, in measure order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureAnalysis {
    pub harmony: Vec<HarmonicLabel>,
    pub rhythm: Vec<RhythmSummary>,
    pub pitch_ranges: Vec<PitchRangeSummary>,
}

/// Analyze every measure of `part` against the global key.
///
/// A measure whose chord cannot be labeled is handled by `policy`; with no
/// such failures each sequence has one entry per measure.
pub fn analyze_measures(part: &Part, key: &Key, policy: FailurePolicy) -> MeasureAnalysis {
    let mut analysis = MeasureAnalysis::default();

    for measure in &part.measures {
        let notes: Vec<&Element> = measure.notes().collect();

        let numeral = match label_chord(&notes, key) {
            Ok(numeral) => numeral,
            Err(err) => match policy {
                FailurePolicy::Skip => {
                    debug!(measure = measure.number, error = %err, "skipping measure");
                    continue;
                }
                FailurePolicy::Placeholder => {
                    debug!(measure = measure.number, error = %err, "chord left unlabeled");
                    None
                }
            },
        };

        analysis.harmony.push(HarmonicLabel {
            measure: measure.number,
            numeral,
        });
        analysis.rhythm.push(RhythmSummary {
            measure: measure.number,
            mean: mean_duration(&notes),
        });
        analysis.pitch_ranges.push(PitchRangeSummary {
            measure: measure.number,
            range: pitch_range(measure),
        });
    }

    analysis
}

/// Roman numeral of all pitches sounding in a measure, or `None` when fewer
/// than two note-type elements are present.
fn label_chord(notes: &[&Element], key: &Key) -> Result<Option<RomanNumeral>, HarmonyError> {
    if notes.len() < 2 {
        return Ok(None);
    }
    let pitches: Vec<Pitch> = notes
        .iter()
        .flat_map(|element| element.pitches().iter().copied())
        .collect();
    RomanNumeral::from_pitches(pitches, key).map(Some)
}

fn mean_duration(notes: &[&Element]) -> QuarterLength {
    if notes.is_empty() {
        return QuarterLength::from_integer(0);
    }
    let total: QuarterLength = notes.iter().map(|element| element.duration()).sum();
    total / notes.len() as i64
}

/// Semitone span of the single notes; chords do not count.
fn pitch_range(measure: &Measure) -> Option<u8> {
    let mut midi = measure.single_notes().map(|note| note.pitch.midi());
    let first = midi.next()?;
    let (low, high) = midi.fold((first, first), |(low, high), m| (low.min(m), high.max(m)));
    Some(high - low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notation::{Chord, Mode, Note, Rest, TimeSignature};
    use pretty_assertions::assert_eq;

    fn ql(n: i64, d: i64) -> QuarterLength {
        QuarterLength::new(n, d)
    }

    fn note(midi: u8, at: QuarterLength, dur: QuarterLength) -> Note {
        Note::new(Pitch::new(midi), at, dur)
    }

    fn labels(analysis: &MeasureAnalysis) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            analysis.harmony.iter().map(|h| h.to_string()).collect(),
            analysis.rhythm.iter().map(|r| r.to_string()).collect(),
            analysis.pitch_ranges.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn triad_then_single_note() {
        let part = Part::new(None)
            .with_measure(
                Measure::new(1, ql(0, 1))
                    .with(TimeSignature::new(3, 4))
                    .with(note(55, ql(0, 1), ql(1, 1)))
                    .with(note(59, ql(1, 1), ql(1, 1)))
                    .with(note(62, ql(2, 1), ql(1, 1))),
            )
            .with_measure(Measure::new(2, ql(3, 1)).with(note(67, ql(0, 1), ql(3, 1))));

        let analysis = analyze_measures(&part, &Key::new(7, Mode::Major), FailurePolicy::Skip);
        let (harmony, rhythm, ranges) = labels(&analysis);

        assert_eq!(harmony, vec!["m.1: I", "m.2: not enough notes"]);
        assert_eq!(
            rhythm,
            vec!["m.1: avg rhythm = 1.00", "m.2: avg rhythm = 3.00"]
        );
        assert_eq!(ranges, vec!["m.1: pitch range = 7", "m.2: pitch range = 0"]);
    }

    #[test]
    fn empty_measure_uses_sentinels() {
        let part = Part::new(None).with_measure(Measure::new(5, ql(0, 1)).with(Rest {
            offset: ql(0, 1),
            duration: ql(4, 1),
        }));

        let analysis = analyze_measures(&part, &Key::new(0, Mode::Major), FailurePolicy::Skip);
        let (harmony, rhythm, ranges) = labels(&analysis);

        assert_eq!(harmony, vec!["m.5: not enough notes"]);
        assert_eq!(rhythm, vec!["m.5: avg rhythm = 0.00"]);
        assert_eq!(ranges, vec!["m.5: no pitch data"]);
    }

    #[test]
    fn chords_count_for_harmony_and_rhythm_but_not_range() {
        let part = Part::new(None).with_measure(
            Measure::new(1, ql(0, 1))
                .with(Chord::new(
                    vec![Pitch::new(48), Pitch::new(55), Pitch::new(64)],
                    ql(0, 1),
                    ql(2, 1),
                ))
                .with(Chord::new(
                    vec![Pitch::new(48), Pitch::new(55), Pitch::new(64)],
                    ql(2, 1),
                    ql(1, 1),
                )),
        );

        let analysis = analyze_measures(&part, &Key::new(0, Mode::Major), FailurePolicy::Skip);
        let (harmony, rhythm, ranges) = labels(&analysis);

        assert_eq!(harmony, vec!["m.1: I"]);
        assert_eq!(rhythm, vec!["m.1: avg rhythm = 1.50"]);
        assert_eq!(ranges, vec!["m.1: no pitch data"]);
    }

    #[test]
    fn triplet_durations_average_exactly() {
        let third = ql(1, 3);
        let part = Part::new(None).with_measure(
            Measure::new(1, ql(0, 1))
                .with(note(60, ql(0, 1), third))
                .with(note(62, third, third))
                .with(note(64, ql(2, 3), third))
                .with(note(65, ql(1, 1), ql(3, 1))),
        );

        let analysis = analyze_measures(&part, &Key::new(0, Mode::Major), FailurePolicy::Skip);
        assert_eq!(analysis.rhythm[0].mean, ql(1, 1));
    }

    #[test]
    fn repeated_and_octave_notes_are_labeled_under_both_policies() {
        let part = Part::new(None).with_measure(
            Measure::new(1, ql(0, 1))
                .with(note(60, ql(0, 1), ql(1, 4)))
                .with(note(60, ql(1, 4), ql(1, 1)))
                .with(note(72, ql(5, 4), ql(1, 4))),
        );

        for policy in [FailurePolicy::Placeholder, FailurePolicy::Skip] {
            let analysis = analyze_measures(&part, &Key::new(0, Mode::Major), policy);
            let (harmony, rhythm, ranges) = labels(&analysis);

            assert_eq!(harmony, vec!["m.1: I"]);
            assert_eq!(rhythm, vec!["m.1: avg rhythm = 0.50"]);
            assert_eq!(ranges, vec!["m.1: pitch range = 12"]);
        }
    }

    #[test]
    fn sixteenth_and_quarter_mean_rounds_to_even() {
        let part = Part::new(None).with_measure(
            Measure::new(1, ql(0, 1))
                .with(note(60, ql(0, 1), ql(1, 4)))
                .with(note(64, ql(1, 4), ql(1, 1))),
        );

        let analysis = analyze_measures(&part, &Key::new(0, Mode::Major), FailurePolicy::Skip);
        assert_eq!(analysis.rhythm[0].mean, ql(5, 8));
        assert_eq!(analysis.rhythm[0].to_string(), "m.1: avg rhythm = 0.62");
    }

    fn unlabelable_then_triad() -> Part {
        // A chromatic cluster matches no chord template.
        Part::new(None)
            .with_measure(
                Measure::new(1, ql(0, 1))
                    .with(note(60, ql(0, 1), ql(1, 1)))
                    .with(note(61, ql(1, 1), ql(1, 1)))
                    .with(note(62, ql(2, 1), ql(2, 1))),
            )
            .with_measure(
                Measure::new(2, ql(4, 1))
                    .with(note(60, ql(0, 1), ql(2, 1)))
                    .with(note(64, ql(2, 1), ql(1, 1)))
                    .with(note(67, ql(3, 1), ql(1, 1))),
            )
    }

    #[test]
    fn skip_policy_drops_the_whole_measure() {
        let analysis = analyze_measures(
            &unlabelable_then_triad(),
            &Key::new(0, Mode::Major),
            FailurePolicy::Skip,
        );
        let (harmony, rhythm, ranges) = labels(&analysis);

        assert_eq!(harmony, vec!["m.2: I"]);
        assert_eq!(rhythm.len(), 1);
        assert_eq!(ranges, vec!["m.2: pitch range = 7"]);
    }

    #[test]
    fn placeholder_policy_keeps_one_entry_per_measure() {
        let analysis = analyze_measures(
            &unlabelable_then_triad(),
            &Key::new(0, Mode::Major),
            FailurePolicy::Placeholder,
        );
        let (harmony, rhythm, ranges) = labels(&analysis);

        assert_eq!(harmony, vec!["m.1: not enough notes", "m.2: I"]);
        assert_eq!(
            rhythm,
            vec!["m.1: avg rhythm = 1.33", "m.2: avg rhythm = 1.33"]
        );
        assert_eq!(ranges, vec!["m.1: pitch range = 2", "m.2: pitch range = 7"]);
    }
}
