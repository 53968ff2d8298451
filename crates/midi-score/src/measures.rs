//! Barline layout and placement of note events into measures.

use notation::{
    Chord, Element, KeySignature, Measure, Note, Pitch, QuarterLength, Rest, Tie, TimeSignature,
};

/// One bar of the shared barline grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub number: u32,
    pub start: QuarterLength,
    pub length: QuarterLength,
    /// Time signature declared at this barline, if any.
    pub time_signature: Option<TimeSignature>,
    /// Key signature declared at this barline, if any.
    pub key_signature: Option<KeySignature>,
}

impl Bar {
    pub fn end(&self) -> QuarterLength {
        self.start + self.length
    }
}

/// Notes struck together, ready for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub onset: QuarterLength,
    pub duration: QuarterLength,
    /// Sorted, deduplicated.
    pub pitches: Vec<Pitch>,
}

/// Lay out barlines from the meter map until `end` is covered.
///
/// Meter and key changes take effect at the first barline at or after
/// their position. `fallback` is the meter used before any declared one;
/// it is declared in bar 1 only when `declare_fallback` is set and no
/// change sits at the very start.
pub fn lay_out_bars(
    meter_changes: &[(QuarterLength, TimeSignature)],
    key_changes: &[(QuarterLength, KeySignature)],
    fallback: TimeSignature,
    declare_fallback: bool,
    end: QuarterLength,
) -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut meter = fallback;
    let mut next_meter = 0;
    let mut next_key = 0;
    let mut start = QuarterLength::from_integer(0);
    let mut number = 1u32;

    loop {
        let mut time_signature = None;
        while next_meter < meter_changes.len() && meter_changes[next_meter].0 <= start {
            meter = meter_changes[next_meter].1;
            time_signature = Some(meter);
            next_meter += 1;
        }
        if number == 1 && time_signature.is_none() && declare_fallback {
            time_signature = Some(meter);
        }

        let mut key_signature = None;
        while next_key < key_changes.len() && key_changes[next_key].0 <= start {
            key_signature = Some(key_changes[next_key].1);
            next_key += 1;
        }

        let mut length = meter.bar_length();
        if length <= QuarterLength::from_integer(0) {
            length = TimeSignature::common().bar_length();
        }

        bars.push(Bar {
            number,
            start,
            length,
            time_signature,
            key_signature,
        });

        start += length;
        number += 1;
        if start >= end {
            break;
        }
    }

    bars
}

/// Fill bars with note events, splitting events that cross a barline into
/// tied segments and filling silent stretches with rests.
pub fn fill_measures(bars: &[Bar], events: &[NoteEvent]) -> Vec<Measure> {
    let mut measures: Vec<Measure> = bars
        .iter()
        .map(|bar| Measure::new(bar.number, bar.start))
        .collect();

    for event in events {
        let Some(mut index) = bar_index_at(bars, event.onset) else {
            continue;
        };

        let mut position = event.onset;
        let mut remaining = event.duration;
        let mut first = true;

        loop {
            let bar = &bars[index];
            let piece = remaining.min(bar.end() - position);
            let last = piece == remaining || index + 1 == bars.len();

            let tie = match (first, last) {
                (true, true) => None,
                (true, false) => Some(Tie::Start),
                (false, false) => Some(Tie::Continue),
                (false, true) => Some(Tie::Stop),
            };

            measures[index].push(note_element(&event.pitches, position - bar.start, piece, tie));

            remaining -= piece;
            if last {
                break;
            }
            position = bar.end();
            index += 1;
            first = false;
        }
    }

    for (measure, bar) in measures.iter_mut().zip(bars) {
        finish_measure(measure, bar);
    }

    measures
}

fn bar_index_at(bars: &[Bar], position: QuarterLength) -> Option<usize> {
    let after = bars.partition_point(|bar| bar.start <= position);
    after.checked_sub(1)
}

fn note_element(
    pitches: &[Pitch],
    offset: QuarterLength,
    duration: QuarterLength,
    tie: Option<Tie>,
) -> Element {
    if let [pitch] = pitches {
        Element::Note(Note {
            pitch: *pitch,
            offset,
            duration,
            tie,
        })
    } else {
        Element::Chord(Chord {
            pitches: pitches.to_vec(),
            offset,
            duration,
            tie,
        })
    }
}

/// Order notes by onset, insert rests into gaps, and put signatures first.
fn finish_measure(measure: &mut Measure, bar: &Bar) {
    let mut notes = std::mem::take(&mut measure.elements);
    notes.sort_by(|a, b| a.offset().cmp(&b.offset()));

    let mut body = Vec::with_capacity(notes.len() * 2);
    let mut cursor = QuarterLength::from_integer(0);
    for element in notes {
        let offset = element.offset();
        if offset > cursor {
            body.push(Element::Rest(Rest {
                offset: cursor,
                duration: offset - cursor,
            }));
        }
        cursor = cursor.max(offset + element.duration());
        body.push(element);
    }
    if cursor < bar.length {
        body.push(Element::Rest(Rest {
            offset: cursor,
            duration: bar.length - cursor,
        }));
    }

    if let Some(ts) = bar.time_signature {
        measure.push(ts);
    }
    if let Some(ks) = bar.key_signature {
        measure.push(ks);
    }
    measure.elements.extend(body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ql(n: i64, d: i64) -> QuarterLength {
        QuarterLength::new(n, d)
    }

    fn event(onset: QuarterLength, duration: QuarterLength, pitches: &[u8]) -> NoteEvent {
        NoteEvent {
            onset,
            duration,
            pitches: pitches.iter().map(|&p| Pitch::new(p)).collect(),
        }
    }

    #[test]
    fn bars_cover_the_end() {
        let bars = lay_out_bars(&[], &[], TimeSignature::common(), true, ql(9, 1));
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[2].start, ql(8, 1));
        assert_eq!(bars[0].time_signature, Some(TimeSignature::common()));
        assert_eq!(bars[1].time_signature, None);
    }

    #[test]
    fn empty_input_still_has_one_bar() {
        let bars = lay_out_bars(&[], &[], TimeSignature::common(), false, ql(0, 1));
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].time_signature, None);
    }

    #[test]
    fn meter_change_applies_at_next_barline() {
        let changes = [
            (ql(0, 1), TimeSignature::new(3, 4)),
            // Declared mid-bar; takes effect at the barline at 6.
            (ql(5, 1), TimeSignature::new(2, 4)),
        ];
        let bars = lay_out_bars(&changes, &[], TimeSignature::common(), true, ql(10, 1));
        let starts: Vec<_> = bars.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![ql(0, 1), ql(3, 1), ql(6, 1), ql(8, 1)]);
        assert_eq!(bars[2].time_signature, Some(TimeSignature::new(2, 4)));
    }

    #[test]
    fn note_across_barline_is_tied() {
        let bars = lay_out_bars(&[], &[], TimeSignature::new(2, 4), false, ql(4, 1));
        let measures = fill_measures(&bars, &[event(ql(1, 1), ql(2, 1), &[60])]);

        let first: Vec<_> = measures[0].single_notes().collect();
        let second: Vec<_> = measures[1].single_notes().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].offset, ql(1, 1));
        assert_eq!(first[0].duration, ql(1, 1));
        assert_eq!(first[0].tie, Some(Tie::Start));
        assert_eq!(second[0].offset, ql(0, 1));
        assert_eq!(second[0].tie, Some(Tie::Stop));
    }

    #[test]
    fn simultaneous_pitches_become_a_chord_and_gaps_rests() {
        let bars = lay_out_bars(&[], &[], TimeSignature::common(), true, ql(4, 1));
        let measures = fill_measures(&bars, &[event(ql(1, 1), ql(1, 1), &[60, 64, 67])]);

        let m = &measures[0];
        assert!(matches!(m.elements[0], Element::TimeSignature(_)));
        assert!(matches!(&m.elements[1], Element::Rest(Rest { duration, .. }) if *duration == ql(1, 1)));
        assert!(matches!(&m.elements[2], Element::Chord(c) if c.pitches.len() == 3));
        assert!(matches!(&m.elements[3], Element::Rest(Rest { duration, .. }) if *duration == ql(2, 1)));
    }
}
