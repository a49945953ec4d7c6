// Demodulator set: pulse timing to bit rows
// One pure function per modulation kind

pub mod manchester;
pub mod pulse_code;
pub mod pwm;

use crate::bitbuffer::BitBuffer;
use crate::pulse::PulseCapture;
use serde::{Deserialize, Serialize};

pub use manchester::demod_manchester_zerobit;
pub use pulse_code::demod_pulse_code;
pub use pwm::demod_pulse_width;

/// Pulse-to-bit encoding scheme declared by a decoder descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modulation {
    /// Fixed-slot pulse code: one pulse/gap pair per bit, bit value from
    /// pulse width against the short/long midpoint.
    OokPulseCode,
    /// Pulse width: short pulse = 1, long pulse = 0, gaps carry no data.
    OokPulseWidth,
    /// Manchester with the first edge counted as a zero bit.
    OokManchesterZeroBit,
}

/// Timing parameters for a demodulator run, microseconds.
///
/// Hash/Eq so the dispatcher can demodulate once per distinct
/// (modulation, timing) class and reuse the buffer across decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DemodParams {
    /// Nominal short pulse width (Manchester: half-bit period).
    pub short_us: u32,
    /// Nominal long pulse width. Zero for modulations that ignore it.
    pub long_us: u32,
    /// A gap at least this long terminates the current row.
    pub reset_us: u32,
    /// Optional gap limit: a shorter row break within one capture.
    pub gap_us: Option<u32>,
    /// Optional pulse width tolerance; pulses outside it abort the row.
    pub tolerance_us: Option<u32>,
}

/// Run the demodulator for `modulation` over one capture.
pub fn demodulate(
    capture: &PulseCapture,
    modulation: Modulation,
    params: &DemodParams,
) -> BitBuffer {
    match modulation {
        Modulation::OokPulseCode => demod_pulse_code(capture, params),
        Modulation::OokPulseWidth => demod_pulse_width(capture, params),
        Modulation::OokManchesterZeroBit => demod_manchester_zerobit(capture, params),
    }
}

/// Accumulates bits for the row under construction and commits it to the
/// buffer only when it carries enough bits to be worth a decoder's time.
pub(crate) struct RowSink {
    buf: BitBuffer,
    current: Vec<bool>,
}

impl RowSink {
    pub(crate) fn new() -> Self {
        Self {
            buf: BitBuffer::new(),
            current: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, bit: bool) {
        self.current.push(bit);
    }

    /// Close the current row, keeping it only if it collected at least
    /// `min_bits`. Runt rows from timing aborts are dropped.
    pub(crate) fn close(&mut self, min_bits: usize) {
        if self.current.len() >= min_bits {
            for &bit in &self.current {
                self.buf.add_bit(bit);
            }
            self.buf.add_row();
        }
        self.current.clear();
    }

    pub(crate) fn finish(mut self, min_bits: usize) -> BitBuffer {
        self.close(min_bits);
        self.buf.trim_empty_tail();
        self.buf
    }
}
