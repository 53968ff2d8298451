//! Roman-numeral labels for chords relative to a key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::harmony::{ChordIdentity, ChordQuality, HarmonyError, Inversion, Sonority};
use crate::key::Key;
use crate::pitch::Pitch;

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// A chord's function in a key: scale degree, quality and inversion.
///
/// The figure uses upper case for chords with a major third, lower case
/// otherwise, `o`/`ø`/`+` for diminished, half-diminished and augmented
/// qualities, and figured-bass inversion suffixes (`6`, `64`, `7`, `65`,
/// `43`, `42`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RomanNumeral {
    /// Scale degree 1–7 of the root.
    pub degree: u8,
    /// Chromatic alteration of the root against the key: -1 flat, +1 sharp.
    pub accidental: i8,
    pub quality: ChordQuality,
    pub inversion: Inversion,
    figure: String,
}

impl RomanNumeral {
    /// Label a set of pitches (any order, duplicates allowed) in `key`.
    ///
    /// Pitches that all share one pitch class (repeated notes, octaves)
    /// read as the root-position triad the key builds on that degree.
    pub fn from_pitches<I>(pitches: I, key: &Key) -> Result<Self, HarmonyError>
    where
        I: IntoIterator<Item = Pitch>,
    {
        let identity = match Sonority::from_pitches(pitches)?.identify() {
            Ok(identity) => identity,
            Err(HarmonyError::SinglePitchClass { pitch_class }) => implied_triad(pitch_class, key),
            Err(err) => return Err(err),
        };
        Ok(Self::from_identity(&identity, key))
    }

    pub fn from_identity(identity: &ChordIdentity, key: &Key) -> Self {
        let (degree, accidental) = key.degree_of(identity.root_pitch_class);
        let figure = build_figure(degree, accidental, identity.quality, identity.inversion);
        Self {
            degree,
            accidental,
            quality: identity.quality,
            inversion: identity.inversion,
            figure,
        }
    }

    pub fn figure(&self) -> &str {
        &self.figure
    }
}

impl fmt::Display for RomanNumeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.figure)
    }
}

/// Triad stacked on `root` from the key's own scale tones. Chromatic roots,
/// and roots whose stacked thirds leave the scale, read as major.
fn implied_triad(root: u8, key: &Key) -> ChordIdentity {
    let in_key = |semitones: u8| key.contains((root + semitones) % 12);
    let quality = if !key.contains(root) {
        ChordQuality::Major
    } else {
        match (in_key(4), in_key(3), in_key(7), in_key(6), in_key(8)) {
            (true, _, true, _, _) => ChordQuality::Major,
            (_, true, true, _, _) => ChordQuality::Minor,
            (_, true, false, true, _) => ChordQuality::Diminished,
            (true, _, false, _, true) => ChordQuality::Augmented,
            _ => ChordQuality::Major,
        }
    };

    ChordIdentity {
        root_pitch_class: root % 12,
        quality,
        inversion: Inversion::Root,
        complete: false,
        score: 0.0,
    }
}

fn build_figure(degree: u8, accidental: i8, quality: ChordQuality, inversion: Inversion) -> String {
    let mut figure = String::new();

    match accidental {
        a if a < 0 => figure.push_str(&"b".repeat(a.unsigned_abs() as usize)),
        a if a > 0 => figure.push_str(&"#".repeat(a as usize)),
        _ => {}
    }

    let numeral = NUMERALS[(degree.clamp(1, 7) - 1) as usize];
    if quality.has_major_third() {
        figure.push_str(numeral);
    } else {
        figure.push_str(&numeral.to_lowercase());
    }

    figure.push_str(match quality {
        ChordQuality::Diminished | ChordQuality::Diminished7 => "o",
        ChordQuality::HalfDiminished7 => "ø",
        ChordQuality::Augmented => "+",
        _ => "",
    });

    let inversion_figure = if quality.seventh().is_some() {
        match inversion {
            Inversion::Root => "7",
            Inversion::First => "65",
            Inversion::Second => "43",
            Inversion::Third => "42",
        }
    } else {
        match inversion {
            Inversion::Root | Inversion::Third => "",
            Inversion::First => "6",
            Inversion::Second => "64",
        }
    };
    figure.push_str(inversion_figure);

    figure
}
