//! Pitches and their diatonic spelling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diatonic step (letter name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Position within the octave, C = 0 through B = 6.
    pub fn index(&self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    /// Semitone offset from C (0-11)
    pub fn to_semitone(&self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }
}

/// Default spelling for each pitch class when a pitch comes from a bare
/// MIDI note number: sharps for C#, F#, G#; flats for Eb, Bb.
const DEFAULT_SPELLINGS: [(Step, i8); 12] = [
    (Step::C, 0),
    (Step::C, 1),
    (Step::D, 0),
    (Step::E, -1),
    (Step::E, 0),
    (Step::F, 0),
    (Step::F, 1),
    (Step::G, 0),
    (Step::G, 1),
    (Step::A, 0),
    (Step::B, -1),
    (Step::B, 0),
];

/// A pitch at semitone resolution, stored as its MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pitch(u8);

impl Pitch {
    pub const fn new(midi: u8) -> Self {
        Pitch(midi)
    }

    pub fn midi(&self) -> u8 {
        self.0
    }

    /// Pitch class 0–11 (C=0, C#=1, ...)
    pub fn pitch_class(&self) -> u8 {
        self.0 % 12
    }

    /// Octave number where middle C (60) is C4.
    pub fn octave(&self) -> i32 {
        self.0 as i32 / 12 - 1
    }

    pub fn spelling(&self) -> Spelling {
        let (step, alter) = DEFAULT_SPELLINGS[self.pitch_class() as usize];
        Spelling {
            step,
            alter,
            octave: self.octave(),
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spelling())
    }
}

/// A spelled pitch: letter, chromatic alteration and octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spelling {
    pub step: Step,
    /// Semitones of alteration: -1 flat, +1 sharp, ±2 double.
    pub alter: i8,
    pub octave: i32,
}

impl Spelling {
    /// Count of diatonic steps above C0's letter position.
    pub fn diatonic_number(&self) -> i32 {
        self.octave * 7 + self.step.index()
    }

    /// Equivalent MIDI number; may fall outside 0–127 for odd spellings.
    pub fn semitones(&self) -> i32 {
        (self.octave + 1) * 12 + self.step.to_semitone() + self.alter as i32
    }

    pub fn accidental(&self) -> &'static str {
        match self.alter {
            2 => "##",
            1 => "#",
            -1 => "b",
            -2 => "bb",
            _ => "",
        }
    }
}

impl fmt::Display for Spelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.step.name(), self.accidental(), self.octave)
    }
}
