use thiserror::Error;

/// Conditions that abort an analysis before any report exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("score declares no time signature")]
    MissingTimeSignature,

    #[error("score has no pitched notes to estimate a key from")]
    NoPitchedNotes,

    #[error("score has no parts")]
    NoParts,

    #[error("primary part index {index} out of range, score has {parts} part(s)")]
    PrimaryPartOutOfRange { index: usize, parts: usize },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
