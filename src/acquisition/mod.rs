// Receiver acquisition boundary
// The USB/tuner layer lives outside this crate; this is its contract

pub mod mock;

pub use mock::MockSdr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SdrError {
    #[error("{op} failed with device status {status}")]
    Status { op: &'static str, status: i32 },

    #[error("No device at index {0}")]
    NoDevice(u32),

    #[error("Device handle is closed")]
    Closed,
}

impl SdrError {
    /// The raw non-zero status the device layer reported, if any.
    pub fn status(&self) -> Option<i32> {
        match self {
            SdrError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type SdrResult<T> = std::result::Result<T, SdrError>;

/// Delivered once per sample buffer, on the device's capture context.
pub type SampleCallback = Box<dyn FnMut(&[u8]) + Send>;

/// Control surface of a receiver. All operations map to a device status
/// code where zero is success; any error means the caller must stop
/// issuing requests on this handle (the device layer does not retry).
pub trait SdrDevice: Send {
    /// Open the device at `index`.
    fn open(index: u32) -> SdrResult<Self>
    where
        Self: Sized;

    fn set_center_freq(&mut self, hz: u32) -> SdrResult<()>;

    fn set_sample_rate(&mut self, hz: u32) -> SdrResult<()>;

    /// Manual (true) or automatic tuner gain.
    fn set_tuner_gain_mode(&mut self, manual: bool) -> SdrResult<()>;

    /// Gain in tenths of a dB, only meaningful in manual mode.
    fn set_tuner_gain(&mut self, tenths_db: i32) -> SdrResult<()>;

    /// Stream sample buffers into `callback` until cancelled or the
    /// capture source is exhausted. Blocks the capture context.
    fn start_streaming(
        &mut self,
        callback: SampleCallback,
        buffer_count: u32,
        buffer_len: usize,
    ) -> SdrResult<()>;

    fn cancel_streaming(&mut self) -> SdrResult<()>;

    fn close(&mut self) -> SdrResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_code() {
        let err = SdrError::Status {
            op: "set_center_freq",
            status: -5,
        };
        assert_eq!(err.status(), Some(-5));
        assert_eq!(SdrError::Closed.status(), None);
    }
}
