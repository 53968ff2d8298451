//! Chord identification by template matching over pitch classes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pitch::Pitch;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonyError {
    #[error("no pitches to build a chord from")]
    EmptySonority,

    #[error("pitch class {pitch_class} alone does not define a chord")]
    SinglePitchClass { pitch_class: u8 },

    #[error("pitch classes {pitch_classes:?} match no tertian chord template")]
    NoTemplateMatch { pitch_classes: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    HalfDiminished7,
    Diminished7,
}

impl ChordQuality {
    /// Semitones from root to third.
    pub fn third(&self) -> u8 {
        match self {
            ChordQuality::Major
            | ChordQuality::Augmented
            | ChordQuality::Dominant7
            | ChordQuality::Major7 => 4,
            _ => 3,
        }
    }

    /// Semitones from root to fifth.
    pub fn fifth(&self) -> u8 {
        match self {
            ChordQuality::Diminished
            | ChordQuality::HalfDiminished7
            | ChordQuality::Diminished7 => 6,
            ChordQuality::Augmented => 8,
            _ => 7,
        }
    }

    /// Semitones from root to seventh, for seventh chords.
    pub fn seventh(&self) -> Option<u8> {
        match self {
            ChordQuality::Dominant7 | ChordQuality::Minor7 | ChordQuality::HalfDiminished7 => {
                Some(10)
            }
            ChordQuality::Major7 | ChordQuality::MinorMajor7 => Some(11),
            ChordQuality::Diminished7 => Some(9),
            _ => None,
        }
    }

    /// Whether the underlying triad has a major third.
    pub fn has_major_third(&self) -> bool {
        self.third() == 4
    }
}

/// A chord template: quality + interval set from root (as bitmask over 12 pitch classes).
pub struct ChordTemplate {
    pub quality: ChordQuality,
    pub intervals: u16, // bitmask: bit i set means interval i is in the template
    pub size: usize,
}

impl ChordTemplate {
    const fn new(quality: ChordQuality, intervals: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << intervals[i];
            i += 1;
        }
        Self {
            quality,
            intervals: mask,
            size: intervals.len(),
        }
    }
}

/// Tertian templates; seventh chords first so complete sevenths win ties.
pub static TEMPLATES: &[ChordTemplate] = &[
    ChordTemplate::new(ChordQuality::Dominant7, &[0, 4, 7, 10]),
    ChordTemplate::new(ChordQuality::Major7, &[0, 4, 7, 11]),
    ChordTemplate::new(ChordQuality::Minor7, &[0, 3, 7, 10]),
    ChordTemplate::new(ChordQuality::MinorMajor7, &[0, 3, 7, 11]),
    ChordTemplate::new(ChordQuality::HalfDiminished7, &[0, 3, 6, 10]),
    ChordTemplate::new(ChordQuality::Diminished7, &[0, 3, 6, 9]),
    ChordTemplate::new(ChordQuality::Major, &[0, 4, 7]),
    ChordTemplate::new(ChordQuality::Minor, &[0, 3, 7]),
    ChordTemplate::new(ChordQuality::Diminished, &[0, 3, 6]),
    ChordTemplate::new(ChordQuality::Augmented, &[0, 4, 8]),
];

/// Score lost for each sounding pitch class outside the template.
const EXTRA_TONE_PENALTY: f64 = 0.2;

/// Minimum template score for a match to count.
const MATCH_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inversion {
    Root,
    First,
    Second,
    Third,
}

/// The result of identifying a sonority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordIdentity {
    pub root_pitch_class: u8,
    pub quality: ChordQuality,
    pub inversion: Inversion,
    /// All template tones are present.
    pub complete: bool,
    pub score: f64,
}

/// A set of simultaneously considered pitches, reduced to pitch classes
/// plus the lowest sounding pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sonority {
    pitch_classes: Vec<u8>,
    bass: Pitch,
}

impl Sonority {
    /// Build from pitches in any order; duplicates collapse.
    pub fn from_pitches<I>(pitches: I) -> Result<Self, HarmonyError>
    where
        I: IntoIterator<Item = Pitch>,
    {
        let mut bass: Option<Pitch> = None;
        let mut pitch_classes = Vec::new();

        for pitch in pitches {
            if bass.map_or(true, |b| pitch < b) {
                bass = Some(pitch);
            }
            pitch_classes.push(pitch.pitch_class());
        }

        let bass = bass.ok_or(HarmonyError::EmptySonority)?;
        pitch_classes.sort_unstable();
        pitch_classes.dedup();

        Ok(Self {
            pitch_classes,
            bass,
        })
    }

    pub fn pitch_classes(&self) -> &[u8] {
        &self.pitch_classes
    }

    pub fn bass(&self) -> Pitch {
        self.bass
    }

    /// Match against chord templates.
    ///
    /// Tries every member pitch class as root and every template, scoring by
    /// template coverage minus a penalty per extra tone, with bonuses for a
    /// root in the bass and a complete template.
    pub fn identify(&self) -> Result<ChordIdentity, HarmonyError> {
        if self.pitch_classes.len() < 2 {
            return Err(HarmonyError::SinglePitchClass {
                pitch_class: self.bass.pitch_class(),
            });
        }

        let bass_pc = self.bass.pitch_class();
        let mut best: Option<(u8, &ChordTemplate, f64, bool)> = None;

        for &root in &self.pitch_classes {
            let intervals = to_interval_mask(&self.pitch_classes, root);

            for template in TEMPLATES {
                // How many template tones are present?
                let matched = (intervals & template.intervals).count_ones() as usize;
                if matched < 2 {
                    continue;
                }

                let extra = (intervals & !template.intervals).count_ones();
                let mut score =
                    matched as f64 / template.size as f64 - extra as f64 * EXTRA_TONE_PENALTY;

                if bass_pc == root {
                    score += 0.15;
                }

                let complete = intervals & template.intervals == template.intervals;
                if complete {
                    score += 0.1;
                }

                if best.map_or(true, |(_, _, s, _)| score > s) {
                    best = Some((root, template, score, complete));
                }
            }
        }

        match best {
            Some((root, template, score, complete)) if score > MATCH_THRESHOLD => {
                Ok(ChordIdentity {
                    root_pitch_class: root,
                    quality: template.quality,
                    inversion: inversion_of(template.quality, root, bass_pc),
                    complete,
                    score: score.min(1.0),
                })
            }
            _ => Err(HarmonyError::NoTemplateMatch {
                pitch_classes: self.pitch_classes.clone(),
            }),
        }
    }
}

/// Convert a set of pitch classes to an interval bitmask relative to a root.
fn to_interval_mask(pitch_classes: &[u8], root: u8) -> u16 {
    let mut mask = 0u16;
    for &pc in pitch_classes {
        let interval = (pc + 12 - root) % 12;
        mask |= 1 << interval;
    }
    mask
}

/// Which chord member sits in the bass. A non-chord bass reads as root position.
fn inversion_of(quality: ChordQuality, root: u8, bass: u8) -> Inversion {
    let interval = (bass + 12 - root) % 12;
    if interval == quality.third() {
        Inversion::First
    } else if interval == quality.fifth() {
        Inversion::Second
    } else if Some(interval) == quality.seventh() {
        Inversion::Third
    } else {
        Inversion::Root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identify(midi: &[u8]) -> Result<ChordIdentity, HarmonyError> {
        Sonority::from_pitches(midi.iter().map(|&m| Pitch::new(m)))?.identify()
    }

    #[test]
    fn c_major_triad() {
        let id = identify(&[60, 64, 67]).unwrap();
        assert_eq!(id.root_pitch_class, 0);
        assert_eq!(id.quality, ChordQuality::Major);
        assert_eq!(id.inversion, Inversion::Root);
        assert!(id.complete);
    }

    #[test]
    fn order_and_duplicates_do_not_matter() {
        let a = identify(&[67, 60, 64, 72, 76]).unwrap();
        let b = identify(&[60, 64, 67]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn g_dominant_7th() {
        let id = identify(&[55, 59, 62, 65]).unwrap();
        assert_eq!(id.root_pitch_class, 7);
        assert_eq!(id.quality, ChordQuality::Dominant7);
    }

    #[test]
    fn first_inversion_from_bass() {
        // E G C
        let id = identify(&[64, 67, 72]).unwrap();
        assert_eq!(id.root_pitch_class, 0);
        assert_eq!(id.inversion, Inversion::First);
    }

    #[test]
    fn seventh_in_bass_is_third_inversion() {
        // F G B D
        let id = identify(&[53, 55, 59, 62]).unwrap();
        assert_eq!(id.root_pitch_class, 7);
        assert_eq!(id.inversion, Inversion::Third);
    }

    #[test]
    fn melodic_passing_tones_still_find_tonic() {
        // C D E F G as a stepwise line
        let id = identify(&[60, 62, 64, 65, 67]).unwrap();
        assert_eq!(id.root_pitch_class, 0);
        assert_eq!(id.quality, ChordQuality::Major);
        assert!(id.score <= 1.0);
    }

    #[test]
    fn dyad_of_root_and_third() {
        let id = identify(&[60, 64]).unwrap();
        assert_eq!(id.root_pitch_class, 0);
        assert_eq!(id.quality, ChordQuality::Major);
        assert!(!id.complete);
    }

    #[test]
    fn octave_doubling_is_a_single_pitch_class() {
        assert_eq!(
            identify(&[60, 72]),
            Err(HarmonyError::SinglePitchClass { pitch_class: 0 })
        );
    }

    #[test]
    fn chromatic_cluster_matches_nothing() {
        assert!(matches!(
            identify(&[60, 61, 62]),
            Err(HarmonyError::NoTemplateMatch { .. })
        ));
    }

    #[test]
    fn empty_sonority() {
        assert_eq!(
            Sonority::from_pitches(std::iter::empty()),
            Err(HarmonyError::EmptySonority)
        );
    }
}
