//! Directed intervals between spelled pitches.
//!
//! Names follow the conventional shorthand: quality letter, a `-` for
//! descending motion, then the generic size (`P5`, `M-3`, `m9`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::pitch::{Pitch, Spelling};

/// Semitones above the lower note for each simple generic interval
/// (unison through seventh) in its major or perfect form.
const REFERENCE_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("no interval quality spans {semitones} semitones over a generic {generic}")]
    UnnameableQuality { generic: u32, semitones: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalQuality {
    DoublyDiminished,
    Diminished,
    Minor,
    Perfect,
    Major,
    Augmented,
    DoublyAugmented,
}

impl IntervalQuality {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            IntervalQuality::DoublyDiminished => "dd",
            IntervalQuality::Diminished => "d",
            IntervalQuality::Minor => "m",
            IntervalQuality::Perfect => "P",
            IntervalQuality::Major => "M",
            IntervalQuality::Augmented => "A",
            IntervalQuality::DoublyAugmented => "AA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntervalQuality::DoublyDiminished => "Doubly-Diminished",
            IntervalQuality::Diminished => "Diminished",
            IntervalQuality::Minor => "Minor",
            IntervalQuality::Perfect => "Perfect",
            IntervalQuality::Major => "Major",
            IntervalQuality::Augmented => "Augmented",
            IntervalQuality::DoublyAugmented => "Doubly-Augmented",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
    Oblique,
}

/// A directed interval between two pitches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Undirected generic size, 1 = unison, 8 = octave.
    pub generic: u32,
    pub quality: IntervalQuality,
    pub direction: Direction,
    /// Signed chromatic distance, negative when descending.
    pub semitones: i32,
}

impl Interval {
    /// Interval from `from` to `to` using each pitch's default spelling.
    pub fn between(from: Pitch, to: Pitch) -> Result<Self, IntervalError> {
        Self::between_spellings(&from.spelling(), &to.spelling())
    }

    pub fn between_spellings(from: &Spelling, to: &Spelling) -> Result<Self, IntervalError> {
        let steps = to.diatonic_number() - from.diatonic_number();
        let semitones = to.semitones() - from.semitones();

        // Letter motion decides direction; chromatic motion breaks unison ties.
        let direction = match (steps.signum(), semitones.signum()) {
            (1, _) | (0, 1) => Direction::Ascending,
            (-1, _) | (0, -1) => Direction::Descending,
            _ => Direction::Oblique,
        };

        let (steps, span) = match direction {
            Direction::Descending => (-steps, -semitones),
            _ => (steps, semitones),
        };

        let simple = (steps % 7) as usize;
        let octaves = steps / 7;
        let deviation = span - (octaves * 12 + REFERENCE_SEMITONES[simple]);
        let generic = steps as u32 + 1;

        let quality = if matches!(simple, 0 | 3 | 4) {
            match deviation {
                -2 => IntervalQuality::DoublyDiminished,
                -1 => IntervalQuality::Diminished,
                0 => IntervalQuality::Perfect,
                1 => IntervalQuality::Augmented,
                2 => IntervalQuality::DoublyAugmented,
                _ => return Err(IntervalError::UnnameableQuality { generic, semitones }),
            }
        } else {
            match deviation {
                -3 => IntervalQuality::DoublyDiminished,
                -2 => IntervalQuality::Diminished,
                -1 => IntervalQuality::Minor,
                0 => IntervalQuality::Major,
                1 => IntervalQuality::Augmented,
                2 => IntervalQuality::DoublyAugmented,
                _ => return Err(IntervalError::UnnameableQuality { generic, semitones }),
            }
        };

        Ok(Interval {
            generic,
            quality,
            direction,
            semitones,
        })
    }

    /// Undirected shorthand, e.g. `P5`.
    pub fn name(&self) -> String {
        format!("{}{}", self.quality.abbreviation(), self.generic)
    }

    /// Shorthand with a `-` for descending motion, e.g. `M-3`.
    pub fn directed_name(&self) -> String {
        let sign = if self.direction == Direction::Descending {
            "-"
        } else {
            ""
        };
        format!("{}{}{}", self.quality.abbreviation(), sign, self.generic)
    }

    /// Spelled-out name, e.g. `Perfect Fifth`.
    pub fn nice_name(&self) -> String {
        format!("{} {}", self.quality.name(), generic_name(self.generic))
    }

    /// Spelled-out name with direction, e.g. `Descending Major Third`.
    pub fn directed_nice_name(&self) -> String {
        match self.direction {
            Direction::Ascending => format!("Ascending {}", self.nice_name()),
            Direction::Descending => format!("Descending {}", self.nice_name()),
            Direction::Oblique => self.nice_name(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.directed_name())
    }
}

fn generic_name(generic: u32) -> String {
    let name = match generic {
        1 => "Unison",
        2 => "Second",
        3 => "Third",
        4 => "Fourth",
        5 => "Fifth",
        6 => "Sixth",
        7 => "Seventh",
        8 => "Octave",
        9 => "Ninth",
        10 => "Tenth",
        11 => "Eleventh",
        12 => "Twelfth",
        13 => "Thirteenth",
        14 => "Fourteenth",
        15 => "Double-octave",
        n => return format!("{}th", n),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Step;
    use pretty_assertions::assert_eq;

    fn interval(from: u8, to: u8) -> Interval {
        Interval::between(Pitch::new(from), Pitch::new(to)).unwrap()
    }

    #[test]
    fn ascending_perfect_fifth() {
        let i = interval(60, 67);
        assert_eq!(i.directed_name(), "P5");
        assert_eq!(i.directed_nice_name(), "Ascending Perfect Fifth");
        assert_eq!(i.direction, Direction::Ascending);
        assert_eq!(i.semitones, 7);
    }

    #[test]
    fn descending_major_third() {
        let i = interval(64, 60);
        assert_eq!(i.directed_name(), "M-3");
        assert_eq!(i.directed_nice_name(), "Descending Major Third");
        assert_eq!(i.semitones, -4);
    }

    #[test]
    fn repeated_note_is_perfect_unison() {
        let i = interval(62, 62);
        assert_eq!(i.directed_name(), "P1");
        assert_eq!(i.direction, Direction::Oblique);
        assert_eq!(i.directed_nice_name(), "Perfect Unison");
    }

    #[test]
    fn spelling_drives_quality() {
        // C#4 -> Eb4 is a diminished third, not a major second.
        assert_eq!(interval(61, 63).directed_name(), "d3");
        // Eb4 -> C#5 is an augmented sixth.
        assert_eq!(interval(63, 73).directed_name(), "A6");
        // C4 -> F#4 is an augmented fourth.
        assert_eq!(interval(60, 66).directed_name(), "A4");
    }

    #[test]
    fn compound_intervals() {
        assert_eq!(interval(60, 72).directed_name(), "P8");
        assert_eq!(interval(60, 74).directed_name(), "M9");
        assert_eq!(interval(72, 55).directed_name(), "P-11");
        assert_eq!(interval(60, 84).nice_name(), "Perfect Double-octave");
    }

    #[test]
    fn minor_second_descending() {
        assert_eq!(interval(60, 59).directed_name(), "m-2");
    }

    #[test]
    fn chromatic_unison_uses_semitone_direction() {
        let c = Spelling {
            step: Step::C,
            alter: 0,
            octave: 4,
        };
        let c_sharp = Spelling {
            step: Step::C,
            alter: 1,
            octave: 4,
        };
        let up = Interval::between_spellings(&c, &c_sharp).unwrap();
        assert_eq!(up.directed_name(), "A1");
        let down = Interval::between_spellings(&c_sharp, &c).unwrap();
        assert_eq!(down.directed_name(), "A-1");
    }

    #[test]
    fn extreme_alterations_are_rejected() {
        let c = Spelling {
            step: Step::C,
            alter: 0,
            octave: 4,
        };
        let wild = Spelling {
            step: Step::D,
            alter: 5,
            octave: 4,
        };
        assert!(matches!(
            Interval::between_spellings(&c, &wild),
            Err(IntervalError::UnnameableQuality { generic: 2, .. })
        ));
    }
}
