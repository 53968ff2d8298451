//! Tonal keys and profile-correlation key finding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const NOTE_NAMES_SHARP: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const NOTE_NAMES_FLAT: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Major tonics conventionally spelled with flats.
const FLAT_MAJOR_ROOTS: [u8; 6] = [1, 3, 5, 6, 8, 10]; // Db, Eb, F, Gb, Ab, Bb

/// Minor tonics conventionally spelled with flats.
const FLAT_MINOR_ROOTS: [u8; 5] = [0, 2, 3, 5, 10]; // c, d, eb, f, bb

const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const NATURAL_MINOR_SCALE: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// A global tonal center and mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Tonic name: "C", "Db", "F#", etc.
    pub tonic: String,
    /// Pitch class 0–11 (C=0, C#=1, ...)
    pub tonic_pitch_class: u8,
    pub mode: Mode,
    /// Correlation with the winning profile; 1.0 for keys built by hand.
    pub confidence: f64,
}

impl Key {
    pub fn new(tonic_pitch_class: u8, mode: Mode) -> Self {
        let pc = tonic_pitch_class % 12;
        Self {
            tonic: tonic_name(pc, mode).to_string(),
            tonic_pitch_class: pc,
            mode,
            confidence: 1.0,
        }
    }

    /// Scale degree (1–7) and chromatic alteration of a pitch class.
    ///
    /// Chromatic pitch classes resolve to the lowered upper neighbour
    /// (bII, bIII, bVI, bVII) except the tritone, which reads as #IV. In
    /// minor, both the natural and raised sixth and seventh count as
    /// diatonic, and the major third above the tonic reads as #III.
    pub fn degree_of(&self, pitch_class: u8) -> (u8, i8) {
        let offset = (pitch_class % 12 + 12 - self.tonic_pitch_class) % 12;
        let scale = match self.mode {
            Mode::Major => &MAJOR_SCALE,
            Mode::Minor => &NATURAL_MINOR_SCALE,
        };

        if let Some(idx) = scale.iter().position(|&s| s == offset) {
            return (idx as u8 + 1, 0);
        }

        match (self.mode, offset) {
            (Mode::Minor, 9) => (6, 0),
            (Mode::Minor, 11) => (7, 0),
            (Mode::Minor, 4) => (3, 1),
            (_, 6) => (4, 1),
            (_, 1) => (2, -1),
            (_, 3) => (3, -1),
            (_, 8) => (6, -1),
            (_, 10) => (7, -1),
            // Every other offset is diatonic in one of the two scales.
            _ => (1, 0),
        }
    }

    /// Whether a pitch class belongs to the key's major or natural minor scale.
    pub fn contains(&self, pitch_class: u8) -> bool {
        let offset = (pitch_class % 12 + 12 - self.tonic_pitch_class) % 12;
        match self.mode {
            Mode::Major => MAJOR_SCALE.contains(&offset),
            Mode::Minor => NATURAL_MINOR_SCALE.contains(&offset),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

fn tonic_name(pitch_class: u8, mode: Mode) -> &'static str {
    let use_flats = match mode {
        Mode::Major => FLAT_MAJOR_ROOTS.contains(&pitch_class),
        Mode::Minor => FLAT_MINOR_ROOTS.contains(&pitch_class),
    };
    if use_flats {
        NOTE_NAMES_FLAT[pitch_class as usize]
    } else {
        NOTE_NAMES_SHARP[pitch_class as usize]
    }
}

/// Published key-profile weight sets for correlation key finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyProfile {
    /// Krumhansl-Kessler probe-tone ratings.
    #[default]
    KrumhanslKessler,
    /// Aarden-Essen folk-song corpus frequencies.
    AardenEssen,
    /// Temperley-Kostka-Payne textbook corpus frequencies.
    TemperleyKostkaPayne,
}

impl KeyProfile {
    pub fn weights(&self, mode: Mode) -> &'static [f64; 12] {
        match (self, mode) {
            (KeyProfile::KrumhanslKessler, Mode::Major) => &[
                6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
            ],
            (KeyProfile::KrumhanslKessler, Mode::Minor) => &[
                6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
            ],
            (KeyProfile::AardenEssen, Mode::Major) => &[
                17.7661, 0.145624, 14.9265, 0.160186, 19.8049, 11.3587, 0.291248, 22.062,
                0.145624, 8.15494, 0.232998, 4.95122,
            ],
            (KeyProfile::AardenEssen, Mode::Minor) => &[
                18.2648, 0.737619, 14.0499, 16.8599, 0.702494, 14.4362, 0.702494, 18.6161,
                4.56621, 1.93186, 7.37619, 1.75623,
            ],
            (KeyProfile::TemperleyKostkaPayne, Mode::Major) => &[
                0.748, 0.060, 0.488, 0.082, 0.670, 0.460, 0.096, 0.715, 0.104, 0.366, 0.057, 0.400,
            ],
            (KeyProfile::TemperleyKostkaPayne, Mode::Minor) => &[
                0.712, 0.084, 0.474, 0.618, 0.049, 0.460, 0.105, 0.747, 0.404, 0.067, 0.133, 0.330,
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyProfile::KrumhanslKessler => "krumhansl-kessler",
            KeyProfile::AardenEssen => "aarden-essen",
            KeyProfile::TemperleyKostkaPayne => "temperley-kostka-payne",
        }
    }

    /// Correlate a pitch-class histogram against all 24 rotated profiles.
    ///
    /// Returns `None` when the histogram carries no weight. The best Pearson
    /// correlation decides the key; ties keep the lower tonic, major first.
    pub fn best_key(&self, histogram: &[f64; 12]) -> Option<Key> {
        let total: f64 = histogram.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let mut normalized = [0.0_f64; 12];
        for (n, h) in normalized.iter_mut().zip(histogram) {
            *n = h / total;
        }

        let mut best_root: u8 = 0;
        let mut best_mode = Mode::Major;
        let mut best_corr = f64::NEG_INFINITY;

        for root in 0..12u8 {
            // Rotate histogram so root = index 0
            let mut rotated = [0.0; 12];
            for (i, r) in rotated.iter_mut().enumerate() {
                *r = normalized[(i + root as usize) % 12];
            }

            for mode in [Mode::Major, Mode::Minor] {
                let corr = pearson(&rotated, self.weights(mode));
                if corr > best_corr {
                    best_corr = corr;
                    best_root = root;
                    best_mode = mode;
                }
            }
        }

        let mut key = Key::new(best_root, best_mode);
        key.confidence = (best_corr * 10000.0).round() / 10000.0;
        Some(key)
    }
}

impl fmt::Display for KeyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key profile `{0}` (expected krumhansl-kessler, aarden-essen or temperley-kostka-payne)")]
pub struct UnknownKeyProfile(pub String);

impl FromStr for KeyProfile {
    type Err = UnknownKeyProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "krumhansl-kessler" | "krumhansl" => Ok(KeyProfile::KrumhanslKessler),
            "aarden-essen" | "aarden" => Ok(KeyProfile::AardenEssen),
            "temperley-kostka-payne" | "temperley" => Ok(KeyProfile::TemperleyKostkaPayne),
            _ => Err(UnknownKeyProfile(s.to_string())),
        }
    }
}

/// Pearson correlation coefficient between two 12-element arrays.
fn pearson(x: &[f64; 12], y: &[f64; 12]) -> f64 {
    let x_mean: f64 = x.iter().sum::<f64>() / 12.0;
    let y_mean: f64 = y.iter().sum::<f64>() / 12.0;

    let mut num = 0.0;
    let mut x_sq = 0.0;
    let mut y_sq = 0.0;

    for i in 0..12 {
        let xd = x[i] - x_mean;
        let yd = y[i] - y_mean;
        num += xd * yd;
        x_sq += xd * xd;
        y_sq += yd * yd;
    }

    let denom = (x_sq * y_sq).sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    num / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(pitch_classes: &[u8]) -> [f64; 12] {
        let mut h = [0.0; 12];
        for &pc in pitch_classes {
            h[pc as usize] += 1.0;
        }
        h
    }

    #[test]
    fn empty_histogram_has_no_key() {
        assert!(KeyProfile::KrumhanslKessler.best_key(&[0.0; 12]).is_none());
    }

    #[test]
    fn c_major_scale_detected() {
        let key = KeyProfile::KrumhanslKessler
            .best_key(&histogram(&[0, 2, 4, 5, 7, 9, 11, 0, 4, 7]))
            .unwrap();
        assert_eq!(key.tonic, "C");
        assert_eq!(key.mode, Mode::Major);
        assert!(key.confidence > 0.7, "confidence {} should be > 0.7", key.confidence);
    }

    #[test]
    fn every_profile_finds_g_major() {
        // G major scale with tonic triad emphasis
        let pcs = [7, 9, 11, 0, 2, 4, 6, 7, 11, 2, 7];
        for profile in [
            KeyProfile::KrumhanslKessler,
            KeyProfile::AardenEssen,
            KeyProfile::TemperleyKostkaPayne,
        ] {
            let key = profile.best_key(&histogram(&pcs)).unwrap();
            assert_eq!(key.to_string(), "G major", "profile {}", profile);
        }
    }

    #[test]
    fn flat_key_spelling() {
        assert_eq!(Key::new(1, Mode::Major).tonic, "Db");
        assert_eq!(Key::new(10, Mode::Major).tonic, "Bb");
        assert_eq!(Key::new(1, Mode::Minor).tonic, "C#");
        assert_eq!(Key::new(3, Mode::Minor).tonic, "Eb");
        assert_eq!(Key::new(9, Mode::Minor).to_string(), "A minor");
    }

    #[test]
    fn scale_membership() {
        let d_minor = Key::new(2, Mode::Minor);
        assert!(d_minor.contains(5)); // F
        assert!(d_minor.contains(10)); // Bb
        assert!(!d_minor.contains(1)); // C#
        assert!(Key::new(0, Mode::Major).contains(71 % 12));
    }

    #[test]
    fn degrees_in_major() {
        let g = Key::new(7, Mode::Major);
        assert_eq!(g.degree_of(7), (1, 0));
        assert_eq!(g.degree_of(2), (5, 0));
        assert_eq!(g.degree_of(6), (7, 0));
        assert_eq!(g.degree_of(5), (7, -1));
        assert_eq!(g.degree_of(1), (4, 1));
    }

    #[test]
    fn degrees_in_minor_accept_raised_sixth_and_seventh() {
        let a = Key::new(9, Mode::Minor);
        assert_eq!(a.degree_of(5), (6, 0)); // F
        assert_eq!(a.degree_of(6), (6, 0)); // F#
        assert_eq!(a.degree_of(7), (7, 0)); // G
        assert_eq!(a.degree_of(8), (7, 0)); // G#
        assert_eq!(a.degree_of(1), (3, 1)); // C#
        assert_eq!(a.degree_of(10), (2, -1)); // Bb
    }

    #[test]
    fn profile_names_parse() {
        assert_eq!("aarden-essen".parse::<KeyProfile>().unwrap(), KeyProfile::AardenEssen);
        assert_eq!("Temperley".parse::<KeyProfile>().unwrap(), KeyProfile::TemperleyKostkaPayne);
        assert!("bogus".parse::<KeyProfile>().is_err());
    }

    #[test]
    fn pearson_identical_arrays() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let r = pearson(&a, &a);
        assert!((r - 1.0).abs() < 1e-10, "self-correlation should be 1.0, got {}", r);
    }
}
