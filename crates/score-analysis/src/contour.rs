use notation::{Element, Interval, Part};
use tracing::debug;

use crate::report::ContourEntry;

/// Directed intervals between temporally adjacent single notes of a part.
///
/// Works on the part's note-type elements flattened across barlines. A
/// chord between two notes breaks the pair on either side of it, and a pair
/// whose interval has no name is left out.
pub fn extract_contour(part: &Part) -> Vec<ContourEntry> {
    let line = part.flat_notes();
    let mut contour = Vec::with_capacity(line.len().saturating_sub(1));

    for pair in line.windows(2) {
        let [(from_measure, from), (to_measure, to)] = pair else {
            continue;
        };
        let (Element::Note(a), Element::Note(b)) = (from, to) else {
            continue;
        };

        match Interval::between(a.pitch, b.pitch) {
            Ok(interval) => contour.push(ContourEntry {
                from_measure: *from_measure,
                to_measure: *to_measure,
                interval,
            }),
            Err(err) => {
                debug!(from = *from_measure, to = *to_measure, error = %err, "skipping pair");
            }
        }
    }

    contour
}

#[cfg(test)]
mod tests {
    use super::*;
    use notation::{Chord, Measure, Note, Pitch, QuarterLength, Rest};
    use pretty_assertions::assert_eq;

    fn ql(n: i64) -> QuarterLength {
        QuarterLength::from_integer(n)
    }

    fn note(midi: u8, at: i64) -> Note {
        Note::new(Pitch::new(midi), ql(at), ql(1))
    }

    fn rendered(part: &Part) -> Vec<String> {
        extract_contour(part).iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn ascending_fifth_across_barline() {
        let part = Part::new(None)
            .with_measure(Measure::new(1, ql(0)).with(note(60, 3)))
            .with_measure(Measure::new(2, ql(4)).with(note(67, 0)));

        let contour = extract_contour(&part);
        assert_eq!(contour.len(), 1);
        assert_eq!(contour[0].to_string(), "From m.1 to m.2: P5");
        assert_eq!(contour[0].interval.directed_nice_name(), "Ascending Perfect Fifth");
    }

    #[test]
    fn m_notes_give_m_minus_one_entries() {
        let mut measure = Measure::new(1, ql(0));
        for (i, midi) in [60u8, 64, 62, 67].into_iter().enumerate() {
            measure.push(note(midi, i as i64));
        }
        let part = Part::new(None).with_measure(measure);

        assert_eq!(
            rendered(&part),
            vec![
                "From m.1 to m.1: M3",
                "From m.1 to m.1: M-2",
                "From m.1 to m.1: P4",
            ]
        );
    }

    #[test]
    fn rests_are_transparent_and_chords_break_pairs() {
        let part = Part::new(None).with_measure(
            Measure::new(1, ql(0))
                .with(note(60, 0))
                .with(Rest {
                    offset: ql(1),
                    duration: ql(1),
                })
                .with(note(64, 2))
                .with(Chord::new(vec![Pitch::new(60), Pitch::new(67)], ql(3), ql(1))),
        );
        let part = part.with_measure(Measure::new(2, ql(4)).with(note(72, 0)));

        assert_eq!(rendered(&part), vec!["From m.1 to m.1: M3"]);
    }

    #[test]
    fn repeated_note_is_a_unison() {
        let part = Part::new(None).with_measure(
            Measure::new(1, ql(0)).with(note(62, 0)).with(note(62, 1)),
        );
        assert_eq!(rendered(&part), vec!["From m.1 to m.1: P1"]);
    }
}
