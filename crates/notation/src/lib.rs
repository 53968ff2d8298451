//! Symbolic score model and the tonal theory needed to analyze it.
//!
//! The score types mirror what a notation parser hands over after reading a
//! MIDI file: parts made of numbered measures, each measure an ordered list
//! of notes, chords, rests and signature events. The theory modules turn
//! those notes into spelled pitches, named intervals, chord identities and
//! roman numerals relative to a key.
//!
//! # Example
//!
//! ```
//! use notation::{Key, Mode, Pitch, RomanNumeral};
//!
//! let key = Key::new(7, Mode::Major); // G major
//! let pitches = [Pitch::new(55), Pitch::new(59), Pitch::new(62)]; // G B D
//! let rn = RomanNumeral::from_pitches(pitches, &key).unwrap();
//! assert_eq!(rn.figure(), "I");
//! ```

pub mod harmony;
pub mod interval;
pub mod key;
pub mod pitch;
pub mod roman;
pub mod score;

pub use harmony::{ChordIdentity, ChordQuality, HarmonyError, Inversion, Sonority};
pub use interval::{Direction, Interval, IntervalError, IntervalQuality};
pub use key::{Key, KeyProfile, Mode, UnknownKeyProfile};
pub use pitch::{Pitch, Spelling, Step};
pub use roman::RomanNumeral;
pub use score::{
    Chord, Element, KeySignature, Measure, Note, Part, QuarterLength, Rest, Score, Tie,
    TimeSignature,
};
