// Pulse width demodulator

use super::{DemodParams, RowSink};
use crate::bitbuffer::BitBuffer;
use crate::pulse::PulseCapture;

const MIN_ROW_BITS: usize = 8;

/// Pulse width modulation: a short pulse reads as 1, a long pulse as 0
/// (split at the short/long midpoint). Gaps carry no data; a gap past
/// `gap_us` breaks the row within the capture and a gap past `reset_us`
/// terminates it. Pulses outside tolerance truncate the row.
pub fn demod_pulse_width(capture: &PulseCapture, params: &DemodParams) -> BitBuffer {
    let mid = (params.short_us + params.long_us) / 2;
    let tol = params.tolerance_us.unwrap_or(params.short_us / 2);
    let lo = params.short_us.saturating_sub(tol);
    let hi = params.long_us + tol;

    let mut sink = RowSink::new();
    for &(pulse, gap) in capture.iter() {
        if pulse < lo || pulse > hi {
            tracing::debug!(pulse, lo, hi, "pulse outside tolerance, closing row");
            sink.close(MIN_ROW_BITS);
        } else {
            sink.push(pulse < mid);
        }
        let row_break = params.gap_us.map_or(false, |g| gap > g);
        if gap >= params.reset_us || row_break {
            sink.close(MIN_ROW_BITS);
        }
    }
    sink.finish(MIN_ROW_BITS)
}
