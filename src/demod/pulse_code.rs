// Fixed-slot pulse code demodulator

use super::{DemodParams, RowSink};
use crate::bitbuffer::BitBuffer;
use crate::pulse::PulseCapture;

/// Rows shorter than this are timing-abort debris, not messages.
const MIN_ROW_BITS: usize = 8;

/// Each pulse/gap pair carries exactly one bit: a pulse longer than the
/// short/long midpoint reads as 1, shorter as 0. A pulse outside the
/// configured tolerance window truncates the row (kept if it already
/// collected enough bits); a reset-length gap closes the row and a new
/// one starts at the next pulse.
pub fn demod_pulse_code(capture: &PulseCapture, params: &DemodParams) -> BitBuffer {
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
            sink.push(pulse > mid);
        }
        if gap >= params.reset_us {
            sink.close(MIN_ROW_BITS);
        }
    }
    sink.finish(MIN_ROW_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DemodParams {
        DemodParams {
            short_us: 200,
            long_us: 400,
            reset_us: 1000,
            gap_us: None,
            tolerance_us: Some(80),
        }
    }

    #[test]
    fn test_bits_from_pulse_widths() {
        let cap = PulseCapture::from_pairs(vec![
            (200, 200),
            (400, 200),
            (400, 200),
            (200, 200),
            (200, 200),
            (400, 200),
            (200, 200),
            (400, 2000),
        ]);
        let buf = demod_pulse_code(&cap, &params());
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(buf.bits_per_row(0), 8);
        // 0 1 1 0 0 1 0 1
        assert_eq!(buf.row(0).unwrap().bytes(), &[0b0110_0101]);
    }

    #[test]
    fn test_reset_gap_splits_rows() {
        let mut pairs = Vec::new();
        for _ in 0..8 {
            pairs.push((400u32, 200u32));
        }
        pairs.last_mut().unwrap().1 = 5000; // long quiet spell
        for _ in 0..8 {
            pairs.push((200, 200));
        }
        let cap = PulseCapture::from_pairs(pairs);
        let buf = demod_pulse_code(&cap, &params());
        assert_eq!(buf.num_rows(), 2);
        assert_eq!(buf.row(0).unwrap().bytes(), &[0xff]);
        assert_eq!(buf.row(1).unwrap().bytes(), &[0x00]);
    }

    #[test]
    fn test_out_of_tolerance_truncates() {
        let mut pairs = vec![(400u32, 200u32); 10];
        pairs.push((950, 200)); // glitch
        pairs.extend(vec![(200, 200); 3]); // too few bits to keep
        let cap = PulseCapture::from_pairs(pairs);
        let buf = demod_pulse_code(&cap, &params());
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(buf.bits_per_row(0), 10);
    }
}
