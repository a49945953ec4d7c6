// Manchester demodulator, zero-bit variant

use super::{DemodParams, RowSink};
use crate::bitbuffer::BitBuffer;
use crate::pulse::PulseCapture;

/// Lead bit plus at least one data bit.
const MIN_ROW_BITS: usize = 2;

/// Manchester with `short_us` as the half-bit period. The first rising
/// edge of a transmission establishes phase and is counted as a zero bit;
/// after that, an edge arriving a full bit period after the previous data
/// edge is a data edge (falling = 0, rising = 1) while an edge at a half
/// period is clock recovery. A span of more than a bit period with no
/// edge at all desynchronizes and ends the row, as does a reset-length
/// gap or a pulse outside tolerance.
pub fn demod_manchester_zerobit(capture: &PulseCapture, params: &DemodParams) -> BitBuffer {
    let half = params.short_us;
    let data_edge = half + half / 2;
    let desync = 2 * half + half / 2;

    let mut sink = RowSink::new();
    let mut since = 0u32; // time since the last data edge
    let mut pending_lead = true;

    for &(pulse, gap) in capture.iter() {
        if pending_lead {
            sink.push(false);
            pending_lead = false;
            since = 0;
        }

        let in_tolerance = params.tolerance_us.map_or(true, |tol| {
            pulse >= half.saturating_sub(tol) && pulse <= 2 * half + tol
        });

        // Falling edge at the end of the pulse
        if !in_tolerance || since + pulse > desync {
            tracing::debug!(pulse, since, "manchester desync, closing row");
            sink.close(MIN_ROW_BITS);
            pending_lead = true;
            since = 0;
            continue;
        } else if since + pulse > data_edge {
            sink.push(false);
            since = 0;
        } else {
            since += pulse;
        }

        // Rising edge at the end of the gap, unless this is the quiet
        // spell after the transmission
        if gap >= params.reset_us || since + gap > desync {
            sink.close(MIN_ROW_BITS);
            pending_lead = true;
            since = 0;
        } else if since + gap > data_edge {
            sink.push(true);
            since = 0;
        } else {
            since += gap;
        }
    }
    sink.finish(MIN_ROW_BITS)
}

/// Build the pulse train a transmitter would produce for `bits` under the
/// zero-bit convention (bits[0] must be the zero phase bit). `skew_us`
/// models envelope detector asymmetry: pulses measure long, gaps short.
#[cfg(test)]
pub(crate) fn encode_zerobit(
    bits: &[bool],
    half_us: u32,
    skew_us: u32,
    tail_gap_us: u32,
) -> PulseCapture {
    assert!(!bits.is_empty() && !bits[0], "stream must open with the zero bit");

    // One segment per level run; an edge every half or full bit period.
    // true = carrier on (pulse).
    let mut segs: Vec<(bool, u32)> = Vec::new();
    let mut prev_rising = true; // t=0, rising
    for &bit in &bits[1..] {
        let rising = bit;
        if rising == prev_rising {
            // same edge direction twice needs a mid-cell clock edge
            segs.push((prev_rising, half_us));
            segs.push((!prev_rising, half_us));
        } else {
            segs.push((prev_rising, 2 * half_us));
        }
        prev_rising = rising;
    }
    if prev_rising {
        segs.push((true, half_us)); // let the carrier drop before the tail
    }

    let mut cap = PulseCapture::new();
    for chunk in segs.chunks(2) {
        assert!(chunk[0].0, "segments must alternate starting with a pulse");
        let pulse = chunk[0].1 + skew_us;
        let gap = match chunk.get(1) {
            Some(&(is_pulse, dur)) => {
                assert!(!is_pulse);
                dur - skew_us
            }
            None => tail_gap_us,
        };
        cap.push(pulse, gap);
    }
    cap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DemodParams {
        DemodParams {
            short_us: 100,
            long_us: 0,
            reset_us: 500,
            gap_us: None,
            tolerance_us: None,
        }
    }

    fn bits_of(buf: &BitBuffer, row: usize) -> Vec<bool> {
        let r = buf.row(row).unwrap();
        (0..r.len_bits())
            .map(|i| r.bytes()[i >> 3] & (0x80 >> (i & 7)) != 0)
            .collect()
    }

    #[test]
    fn test_decodes_hand_built_train() {
        // 0 1 1 0 1: lead rise, rise@200, rise@400, fall@600, rise@800
        let cap = PulseCapture::from_pairs(vec![(100, 100), (100, 100), (200, 200), (100, 600)]);
        let buf = demod_manchester_zerobit(&cap, &params());
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(bits_of(&buf, 0), vec![false, true, true, false, true]);
    }

    #[test]
    fn test_encode_decode_agree() {
        let want = vec![false, true, false, false, true, true, false, true, false];
        let cap = encode_zerobit(&want, 100, 0, 800);
        let buf = demod_manchester_zerobit(&cap, &params());
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(bits_of(&buf, 0), want);
    }

    #[test]
    fn test_encode_decode_with_detector_skew() {
        let want = vec![false, false, true, true, false, true, false, false];
        let cap = encode_zerobit(&want, 156, 30, 5000);
        let p = DemodParams {
            short_us: 156,
            long_us: 0,
            reset_us: 292,
            gap_us: None,
            tolerance_us: None,
        };
        let buf = demod_manchester_zerobit(&cap, &p);
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(bits_of(&buf, 0), want);
    }

    #[test]
    fn test_missing_transition_ends_row() {
        // 0 1, then a pulse spanning well over a bit period with no edge
        let cap = PulseCapture::from_pairs(vec![(100, 100), (100, 100), (300, 100), (100, 600)]);
        let buf = demod_manchester_zerobit(&cap, &params());
        assert_eq!(buf.num_rows(), 1);
        assert_eq!(bits_of(&buf, 0), vec![false, true, true]);
    }

    #[test]
    fn test_repeat_transmissions_make_rows() {
        let want = vec![false, true, false, true, true, false];
        let mut pairs = encode_zerobit(&want, 100, 0, 800).pairs().to_vec();
        let n = pairs.len();
        pairs.extend_from_slice(&encode_zerobit(&want, 100, 0, 800).pairs().to_vec());
        assert_eq!(pairs.len(), 2 * n);
        let buf = demod_manchester_zerobit(&PulseCapture::from_pairs(pairs), &params());
        assert_eq!(buf.num_rows(), 2);
        assert_eq!(bits_of(&buf, 0), want);
        assert_eq!(bits_of(&buf, 1), want);
    }
}
