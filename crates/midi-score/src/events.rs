use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A single MIDI note with absolute tick timing and source metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedNote {
    pub onset_tick: u64,
    pub offset_tick: u64,
    pub pitch: u8,
    pub velocity: u8,
    pub channel: u8,
    pub track_index: usize,
}

impl TimedNote {
    pub fn duration_ticks(&self) -> u64 {
        self.offset_tick.saturating_sub(self.onset_tick)
    }
}

/// Parsed MIDI file context: timing, format, meter and key map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiFileContext {
    pub ppq: u16,
    pub format: u8,
    pub track_count: usize,
    pub track_names: Vec<Option<String>>,
    pub time_signatures: Vec<TimeSignatureEvent>,
    pub key_signatures: Vec<KeySignatureEvent>,
    pub total_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSignatureEvent {
    pub tick: u64,
    pub numerator: u8,
    pub denominator: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySignatureEvent {
    pub tick: u64,
    pub sharps: i8,
    pub minor: bool,
}

/// Extract all notes from a parsed file, pairing note-on/note-off events.
///
/// Repeated note-ons for the same key stack; each note-off closes the most
/// recent one. Notes still open at the end of a track close at its last tick.
pub fn extract_notes(smf: &Smf) -> (Vec<TimedNote>, MidiFileContext) {
    let ppq = match smf.header.timing {
        midly::Timing::Metrical(ticks) => ticks.as_int(),
        midly::Timing::Timecode(fps, subframe) => {
            warn!(
                fps = fps.as_int(),
                subframe,
                "SMPTE timing has no beat grid, assuming 480 ticks per quarter"
            );
            480
        }
    };

    let format = match smf.header.format {
        midly::Format::SingleTrack => 0,
        midly::Format::Parallel => 1,
        midly::Format::Sequential => 2,
    };

    let mut all_notes = Vec::new();
    let mut track_names = Vec::with_capacity(smf.tracks.len());
    let mut time_signatures = Vec::new();
    let mut key_signatures = Vec::new();
    let mut total_ticks: u64 = 0;

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut current_tick: u64 = 0;
        let mut name = None;
        // Map (channel, pitch) → Vec<(onset_tick, velocity)> for stacking
        let mut pending: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();

        for event in track {
            current_tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(bytes)) => {
                    if name.is_none() {
                        name = String::from_utf8(bytes.to_vec())
                            .ok()
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty());
                    }
                }
                TrackEventKind::Meta(MetaMessage::TimeSignature(num, denom_pow, _, _)) => {
                    time_signatures.push(TimeSignatureEvent {
                        tick: current_tick,
                        numerator: num,
                        denominator: 1u8.checked_shl(denom_pow as u32).unwrap_or(4),
                    });
                }
                TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor)) => {
                    key_signatures.push(KeySignatureEvent {
                        tick: current_tick,
                        sharps,
                        minor,
                    });
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            pending
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push((current_tick, vel.as_int()));
                        }
                        MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                            // vel=0 NoteOn is NoteOff
                            let key = (ch, key.as_int());
                            if let Some(stack) = pending.get_mut(&key) {
                                if let Some((onset, velocity)) = stack.pop() {
                                    all_notes.push(TimedNote {
                                        onset_tick: onset,
                                        offset_tick: current_tick,
                                        pitch: key.1,
                                        velocity,
                                        channel: ch,
                                        track_index,
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }

            total_ticks = total_ticks.max(current_tick);
        }

        // Close any unclosed notes at the track's final tick
        for (&(channel, pitch), stack) in &pending {
            for &(onset, velocity) in stack {
                all_notes.push(TimedNote {
                    onset_tick: onset,
                    offset_tick: current_tick,
                    pitch,
                    velocity,
                    channel,
                    track_index,
                });
            }
        }

        track_names.push(name);
    }

    // Sort by onset, then pitch for determinism
    all_notes.sort_by(|a, b| {
        a.onset_tick
            .cmp(&b.onset_tick)
            .then(a.pitch.cmp(&b.pitch))
            .then(a.track_index.cmp(&b.track_index))
            .then(a.channel.cmp(&b.channel))
    });

    // Format 1 files may repeat meta events in several tracks; later wins per tick
    time_signatures.sort_by_key(|t| t.tick);
    time_signatures.dedup_by(|later, earlier| {
        if later.tick == earlier.tick {
            earlier.numerator = later.numerator;
            earlier.denominator = later.denominator;
            true
        } else {
            false
        }
    });

    key_signatures.sort_by_key(|k| k.tick);
    key_signatures.dedup_by(|later, earlier| {
        if later.tick == earlier.tick {
            earlier.sharps = later.sharps;
            earlier.minor = later.minor;
            true
        } else {
            false
        }
    });

    let context = MidiFileContext {
        ppq,
        format,
        track_count: smf.tracks.len(),
        track_names,
        time_signatures,
        key_signatures,
        total_ticks,
    };

    (all_notes, context)
}
