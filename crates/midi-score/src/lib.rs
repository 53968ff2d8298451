//! Standard MIDI File import into a measure-structured [`Score`].
//!
//! Byte-level decoding is `midly`'s job. This crate pairs note events,
//! snaps them onto a beat grid, splits the stream into parts and lays the
//! parts out against a shared barline grid built from the file's meter map.
//!
//! ```no_run
//! let bytes = std::fs::read("chorale.mid").unwrap();
//! let score = midi_score::import(&bytes, &midi_score::ImportOptions::default()).unwrap();
//! println!("{} parts", score.parts.len());
//! ```

pub mod events;
pub mod measures;
pub mod quantize;

use std::collections::BTreeMap;

use midly::Smf;
use notation::{KeySignature, Part, Pitch, QuarterLength, Score, TimeSignature};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use events::{extract_notes, MidiFileContext, TimedNote};
pub use measures::{fill_measures, lay_out_bars, Bar, NoteEvent};

/// Errors from MIDI import.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI parse error: {0}")]
    MidiParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Knobs for turning a MIDI file into a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Snap onsets and durations to the sixteenth / triplet-eighth grid.
    pub quantize: bool,
    /// Declare 4/4 in the first measure when the file carries no time
    /// signature. With this off such a score has no meter at all.
    pub assume_common_time: bool,
    /// Split single-track (format 0) files into one part per channel.
    pub split_channels: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            quantize: true,
            assume_common_time: true,
            split_channels: true,
        }
    }
}

/// Parse raw SMF bytes and build a score.
pub fn import(bytes: &[u8], options: &ImportOptions) -> Result<Score> {
    let smf = Smf::parse(bytes).map_err(|e| Error::MidiParse(e.to_string()))?;
    Ok(import_smf(&smf, options))
}

/// Build a score from an already parsed file.
pub fn import_smf(smf: &Smf, options: &ImportOptions) -> Score {
    let (notes, context) = extract_notes(smf);
    let ppq = context.ppq;

    let to_position = |tick: u64| {
        let raw = quantize::ticks_to_quarters(tick, ppq);
        if options.quantize {
            quantize::quantize(raw)
        } else {
            raw
        }
    };

    let groups = group_by_part(&notes, &context, options);

    let mut part_events: Vec<(Option<String>, Vec<NoteEvent>)> = Vec::with_capacity(groups.len());
    let mut end = QuarterLength::from_integer(0);
    for (name, members) in groups {
        let events = build_events(&members, ppq, options.quantize);
        for event in &events {
            end = end.max(event.onset + event.duration);
        }
        part_events.push((name, events));
    }

    let meter_changes: Vec<(QuarterLength, TimeSignature)> = context
        .time_signatures
        .iter()
        .map(|ts| {
            (
                to_position(ts.tick),
                TimeSignature::new(ts.numerator, ts.denominator),
            )
        })
        .collect();
    let key_changes: Vec<(QuarterLength, KeySignature)> = context
        .key_signatures
        .iter()
        .map(|ks| {
            (
                to_position(ks.tick),
                KeySignature {
                    sharps: ks.sharps,
                    minor: ks.minor,
                },
            )
        })
        .collect();

    if meter_changes.is_empty() {
        if options.assume_common_time {
            debug!("no time signature in file, assuming 4/4");
        } else {
            warn!("no time signature in file and common time not assumed");
        }
    }

    let bars = lay_out_bars(
        &meter_changes,
        &key_changes,
        TimeSignature::common(),
        options.assume_common_time,
        end,
    );

    let parts: Vec<Part> = part_events
        .into_iter()
        .map(|(name, events)| Part {
            name,
            measures: fill_measures(&bars, &events),
        })
        .collect();

    info!(
        format = context.format,
        ppq,
        tracks = context.track_count,
        notes = notes.len(),
        parts = parts.len(),
        measures = bars.len(),
        "imported MIDI file"
    );

    Score {
        title: score_title(&context, &notes),
        parts,
    }
}

/// Partition notes into parts: by track, or by channel for a single-track
/// file when splitting is on. Tracks without notes produce no part.
fn group_by_part<'a>(
    notes: &'a [TimedNote],
    context: &MidiFileContext,
    options: &ImportOptions,
) -> Vec<(Option<String>, Vec<&'a TimedNote>)> {
    let by_channel = context.format == 0 && options.split_channels;

    let mut groups: BTreeMap<(usize, u8), Vec<&TimedNote>> = BTreeMap::new();
    for note in notes {
        let channel = if by_channel { note.channel } else { 0 };
        groups
            .entry((note.track_index, channel))
            .or_default()
            .push(note);
    }

    let multiple = groups.len() > 1;
    groups
        .into_iter()
        .map(|((track, channel), members)| {
            let track_name = context.track_names.get(track).cloned().flatten();
            let name = if by_channel && multiple {
                Some(match track_name {
                    Some(n) => format!("{} (channel {})", n, channel + 1),
                    None => format!("Channel {}", channel + 1),
                })
            } else {
                track_name
            };
            (name, members)
        })
        .collect()
}

/// Merge notes sharing an onset into one event with the longest duration.
fn build_events(notes: &[&TimedNote], ppq: u16, quantize: bool) -> Vec<NoteEvent> {
    let mut by_onset: BTreeMap<QuarterLength, NoteEvent> = BTreeMap::new();

    for note in notes {
        let mut onset = quantize::ticks_to_quarters(note.onset_tick, ppq);
        let mut duration = quantize::ticks_to_quarters(note.duration_ticks(), ppq);
        if quantize {
            onset = quantize::quantize(onset);
            duration = quantize::quantize(duration);
        }
        if duration <= QuarterLength::from_integer(0) {
            duration = quantize::minimum_duration();
        }

        let event = by_onset.entry(onset).or_insert_with(|| NoteEvent {
            onset,
            duration,
            pitches: Vec::new(),
        });
        event.duration = event.duration.max(duration);
        event.pitches.push(Pitch::new(note.pitch));
    }

    by_onset
        .into_values()
        .map(|mut event| {
            event.pitches.sort_unstable();
            event.pitches.dedup();
            event
        })
        .collect()
}

/// A format 1 conductor track (first track, no notes) names the piece.
fn score_title(context: &MidiFileContext, notes: &[TimedNote]) -> Option<String> {
    if context.format != 1 || notes.iter().any(|n| n.track_index == 0) {
        return None;
    }
    context.track_names.first().cloned().flatten()
}
