//! Tick-to-quarter-length conversion and grid snapping.

use notation::QuarterLength;

/// Grid divisions per quarter note: sixteenths and eighth-note triplets.
const GRID_DIVISIONS: [i64; 2] = [4, 3];

/// Smallest duration a quantized note may have.
pub fn minimum_duration() -> QuarterLength {
    QuarterLength::new(1, 4)
}

pub fn ticks_to_quarters(ticks: u64, ppq: u16) -> QuarterLength {
    QuarterLength::new(ticks as i64, ppq.max(1) as i64)
}

/// Snap to the nearest point on any grid; the sixteenth grid wins ties.
pub fn quantize(value: QuarterLength) -> QuarterLength {
    let mut best = snap(value, GRID_DIVISIONS[0]);
    for &divisions in &GRID_DIVISIONS[1..] {
        let candidate = snap(value, divisions);
        if distance(candidate, value) < distance(best, value) {
            best = candidate;
        }
    }
    best
}

fn snap(value: QuarterLength, divisions: i64) -> QuarterLength {
    (value * divisions).round() / divisions
}

fn distance(a: QuarterLength, b: QuarterLength) -> QuarterLength {
    if a > b {
        a - b
    } else {
        b - a
    }
}
