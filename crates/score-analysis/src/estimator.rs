use notation::{Key, KeyProfile, QuarterLength, Score};

/// Pluggable global key finding.
///
/// Implementations must be deterministic: the same score always yields the
/// same key. `None` means the score offered nothing to estimate from.
pub trait KeyEstimator: Send + Sync {
    fn estimate(&self, score: &Score) -> Option<Key>;
}

/// Krumhansl-Schmuckler key finding: correlate a duration-weighted
/// pitch-class histogram against the 24 rotations of a key profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileKeyEstimator {
    profile: KeyProfile,
}

impl ProfileKeyEstimator {
    pub fn new(profile: KeyProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> KeyProfile {
        self.profile
    }
}

impl KeyEstimator for ProfileKeyEstimator {
    fn estimate(&self, score: &Score) -> Option<Key> {
        self.profile.best_key(&pitch_class_histogram(score))
    }
}

/// Sounding time per pitch class in quarter notes, over every part.
/// Each pitch of a chord contributes the chord's full duration.
pub fn pitch_class_histogram(score: &Score) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for element in score.elements() {
        let weight = to_f64(element.duration());
        for pitch in element.pitches() {
            histogram[pitch.pitch_class() as usize] += weight;
        }
    }
    histogram
}

fn to_f64(ql: QuarterLength) -> f64 {
    *ql.numer() as f64 / *ql.denom() as f64
}
