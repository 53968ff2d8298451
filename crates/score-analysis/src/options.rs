use std::fmt;
use std::str::FromStr;

use notation::KeyProfile;
use serde::{Deserialize, Serialize};

/// What happens to a measure whose chord cannot be labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Label the chord `not enough notes` and still report rhythm and range,
    /// so every measure keeps exactly one entry per sequence.
    #[default]
    Placeholder,
    /// Drop the measure from all three per-measure sequences.
    Skip,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Placeholder => "placeholder",
            FailurePolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown failure policy `{0}` (expected placeholder or skip)")]
pub struct UnknownFailurePolicy(pub String);

impl FromStr for FailurePolicy {
    type Err = UnknownFailurePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(FailurePolicy::Placeholder),
            "skip" => Ok(FailurePolicy::Skip),
            _ => Err(UnknownFailurePolicy(s.to_string())),
        }
    }
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Index of the part analyzed measure by measure and for contour.
    pub primary_part: usize,
    pub failure_policy: FailurePolicy,
    /// Profile family used by the default key estimator.
    pub key_profile: KeyProfile,
    /// Run key, measure and contour work on separate threads.
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            primary_part: 0,
            failure_policy: FailurePolicy::default(),
            key_profile: KeyProfile::default(),
            parallel: false,
        }
    }
}
