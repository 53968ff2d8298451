//! Measure-structured symbolic score.
//!
//! A [`Score`] holds parts, a [`Part`] holds numbered measures, and a
//! [`Measure`] holds its elements in onset order. Offsets and durations are
//! exact rational quarter-lengths so that tuplets survive arithmetic.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pitch::Pitch;

/// Duration or offset measured in quarter notes.
pub type QuarterLength = Rational64;

/// A complete score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub title: Option<String>,
    pub parts: Vec<Part>,
}

impl Score {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { title: None, parts }
    }

    /// Every element, depth-first: parts, then measures, then elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.parts
            .iter()
            .flat_map(|part| part.measures.iter())
            .flat_map(|measure| measure.elements.iter())
    }

    pub fn note_count(&self) -> usize {
        self.elements().filter(|e| e.is_note_type()).count()
    }
}

/// One instrument or voice: an ordered run of measures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    pub name: Option<String>,
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            measures: Vec::new(),
        }
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    /// Note-type elements across all measures in time order, each paired
    /// with the number of the measure it sits in.
    ///
    /// Ordering is by absolute offset (measure offset plus element offset);
    /// elements sharing an onset keep their stored order.
    pub fn flat_notes(&self) -> Vec<(u32, &Element)> {
        let mut notes: Vec<(QuarterLength, u32, &Element)> = self
            .measures
            .iter()
            .flat_map(|measure| {
                measure
                    .notes()
                    .map(move |e| (measure.offset + e.offset(), measure.number, e))
            })
            .collect();
        notes.sort_by(|a, b| a.0.cmp(&b.0));
        notes.into_iter().map(|(_, number, e)| (number, e)).collect()
    }
}

/// A bar of music.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// 1-based measure number. Not guaranteed unique or contiguous.
    pub number: u32,
    /// Start of the measure from the beginning of the part.
    pub offset: QuarterLength,
    pub elements: Vec<Element>,
}

impl Measure {
    pub fn new(number: u32, offset: QuarterLength) -> Self {
        Self {
            number,
            offset,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn with(mut self, element: impl Into<Element>) -> Self {
        self.push(element);
        self
    }

    /// Notes and chords, in stored order.
    pub fn notes(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter().filter(|e| e.is_note_type())
    }

    /// Single pitched notes only.
    pub fn single_notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.elements.iter().filter_map(Element::as_note)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Note(Note),
    Chord(Chord),
    Rest(Rest),
    TimeSignature(TimeSignature),
    KeySignature(KeySignature),
}

impl Element {
    /// Notes and chords count as note-type; rests and signatures do not.
    pub fn is_note_type(&self) -> bool {
        matches!(self, Element::Note(_) | Element::Chord(_))
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Element::Note(note) => Some(note),
            _ => None,
        }
    }

    /// Offset within the measure. Signatures sit at the barline.
    pub fn offset(&self) -> QuarterLength {
        match self {
            Element::Note(n) => n.offset,
            Element::Chord(c) => c.offset,
            Element::Rest(r) => r.offset,
            Element::TimeSignature(_) | Element::KeySignature(_) => QuarterLength::from_integer(0),
        }
    }

    pub fn duration(&self) -> QuarterLength {
        match self {
            Element::Note(n) => n.duration,
            Element::Chord(c) => c.duration,
            Element::Rest(r) => r.duration,
            Element::TimeSignature(_) | Element::KeySignature(_) => QuarterLength::from_integer(0),
        }
    }

    /// Sounding pitches; empty for rests and signatures.
    pub fn pitches(&self) -> &[Pitch] {
        match self {
            Element::Note(n) => std::slice::from_ref(&n.pitch),
            Element::Chord(c) => &c.pitches,
            _ => &[],
        }
    }
}

impl From<Note> for Element {
    fn from(note: Note) -> Self {
        Element::Note(note)
    }
}

impl From<Chord> for Element {
    fn from(chord: Chord) -> Self {
        Element::Chord(chord)
    }
}

impl From<Rest> for Element {
    fn from(rest: Rest) -> Self {
        Element::Rest(rest)
    }
}

impl From<TimeSignature> for Element {
    fn from(ts: TimeSignature) -> Self {
        Element::TimeSignature(ts)
    }
}

impl From<KeySignature> for Element {
    fn from(ks: KeySignature) -> Self {
        Element::KeySignature(ks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tie {
    Start,
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub offset: QuarterLength,
    pub duration: QuarterLength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie: Option<Tie>,
}

impl Note {
    pub fn new(pitch: Pitch, offset: QuarterLength, duration: QuarterLength) -> Self {
        Self {
            pitch,
            offset,
            duration,
            tie: None,
        }
    }
}

/// Several pitches struck together with one duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub pitches: Vec<Pitch>,
    pub offset: QuarterLength,
    pub duration: QuarterLength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie: Option<Tie>,
}

impl Chord {
    pub fn new(pitches: Vec<Pitch>, offset: QuarterLength, duration: QuarterLength) -> Self {
        Self {
            pitches,
            offset,
            duration,
            tie: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub offset: QuarterLength,
    pub duration: QuarterLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// 4/4, assumed when a source declares no meter.
    pub fn common() -> Self {
        Self::new(4, 4)
    }

    /// Length of one bar in quarter notes (6/8 = 3, 7/8 = 7/2).
    pub fn bar_length(&self) -> QuarterLength {
        QuarterLength::new(self.numerator as i64 * 4, self.denominator.max(1) as i64)
    }

    /// `"3/4"` style ratio.
    pub fn ratio_string(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Declared key signature as carried by the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeySignature {
    /// Positive for sharps, negative for flats.
    pub sharps: i8,
    pub minor: bool,
}
