// RTL433-RS: ISM-band sensor message decoding
// Pulse timings in, validated structured records out

pub mod acquisition;
pub mod bitbuffer;
pub mod checksum;
pub mod decoders;
pub mod demod;
pub mod formats;
pub mod output;
pub mod pipeline;
pub mod pulse;

// Re-export commonly used types
pub use acquisition::{MockSdr, SdrDevice, SdrError};
pub use bitbuffer::{BitBuffer, BitBufferError};
pub use checksum::{crc16, crc16_lsb, crc8, crc8_lsb};
pub use decoders::{
    DecodeOutcome, DecoderDescriptor, Dispatcher, Polarity, ProtocolDecoder, Registry, RowDedup,
};
pub use demod::{demodulate, DemodParams, Modulation};
pub use formats::{load_ook, save_ook};
pub use output::{FnSink, Record, RecordSink, Value, VecSink};
pub use pipeline::Pipeline;
pub use pulse::PulseCapture;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
