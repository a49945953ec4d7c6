// Protocol decoder framework
// Descriptors, the decode contract, and outcome taxonomy

pub mod honeywell;
pub mod registry;

use crate::bitbuffer::{BitBuffer, BitBufferError};
use crate::demod::{DemodParams, Modulation};
use crate::output::RecordSink;
use serde::Serialize;
use thiserror::Error;

pub use honeywell::HoneywellSecurity;
pub use registry::{Dispatcher, Registry, RowDedup};

/// Logical bit convention of a protocol relative to the demodulator's raw
/// output. A decoder never flips a shared buffer; the dispatcher hands
/// `Inverted` decoders a private normalized view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Polarity {
    Normal,
    Inverted,
}

/// Static per-protocol configuration. Built once with the registry and
/// read-only while decoding is in flight.
#[derive(Debug, Clone, Serialize)]
pub struct DecoderDescriptor {
    /// Canonical model name, also the `model` field of emitted records.
    pub name: String,
    pub modulation: Modulation,
    /// Nominal short pulse width, microseconds.
    pub short_width: u32,
    /// Nominal long pulse width; zero when the modulation ignores it.
    pub long_width: u32,
    /// Gap length that terminates a row.
    pub reset_limit: u32,
    pub gap_limit: Option<u32>,
    pub tolerance: Option<u32>,
    pub polarity: Polarity,
    pub enabled: bool,
    /// Declared output schema, for sinks that want it up front.
    pub fields: Vec<&'static str>,
}

impl DecoderDescriptor {
    /// Timing parameters for the demodulator run this decoder needs.
    pub fn demod_params(&self) -> DemodParams {
        DemodParams {
            short_us: self.short_width,
            long_us: self.long_width,
            reset_us: self.reset_limit,
            gap_us: self.gap_limit,
            tolerance_us: self.tolerance,
        }
    }
}

/// Why a recognized frame was thrown away. Routine noise rejection, kept
/// only for debug visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Identifying fields and checksum simultaneously all zero.
    CollisionGuard,
    ChecksumMismatch,
}

/// Result of one decoder attempt against one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// N validated messages were emitted.
    Matched(usize),
    /// Nothing recognizable, including wrong row count or short rows.
    NoMatch,
    /// Framing recognized but validation failed on every candidate row.
    FailedValidation(ValidationFailure),
}

impl DecodeOutcome {
    pub fn matches(&self) -> usize {
        match self {
            DecodeOutcome::Matched(n) => *n,
            _ => 0,
        }
    }
}

/// A decoder asking for bits the buffer does not have is a programming
/// error, reported rather than silently misread.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("bit extraction out of bounds: {0}")]
    Extraction(#[from] BitBufferError),
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// The contract every protocol decoder implements.
///
/// `decode` must guard row count and minimum length before any other
/// work, never mutate the buffer, and emit exactly one record per
/// validated message through `sink`. Rejection is a normal return value,
/// not an error.
pub trait ProtocolDecoder: Send + Sync {
    fn descriptor(&self) -> &DecoderDescriptor;

    fn decode(&self, bits: &BitBuffer, sink: &mut dyn RecordSink) -> DecodeResult<DecodeOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_match_count() {
        assert_eq!(DecodeOutcome::Matched(3).matches(), 3);
        assert_eq!(DecodeOutcome::NoMatch.matches(), 0);
        assert_eq!(
            DecodeOutcome::FailedValidation(ValidationFailure::ChecksumMismatch).matches(),
            0
        );
    }

    #[test]
    fn test_descriptor_demod_params() {
        let d = DecoderDescriptor {
            name: "Test".to_string(),
            modulation: Modulation::OokPulseWidth,
            short_width: 250,
            long_width: 500,
            reset_limit: 2000,
            gap_limit: Some(900),
            tolerance: None,
            polarity: Polarity::Normal,
            enabled: true,
            fields: vec!["model"],
        };
        let p = d.demod_params();
        assert_eq!(p.short_us, 250);
        assert_eq!(p.long_us, 500);
        assert_eq!(p.reset_us, 2000);
        assert_eq!(p.gap_us, Some(900));
    }
}
