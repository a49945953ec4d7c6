// Mock receiver for testing without hardware

use super::{SampleCallback, SdrDevice, SdrError, SdrResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded control operation, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    CenterFreq(u32),
    SampleRate(u32),
    GainMode(bool),
    Gain(i32),
    Close,
}

/// Scripted receiver: plays canned sample buffers into the streaming
/// callback and records every control call.
#[derive(Debug)]
pub struct MockSdr {
    buffers: Arc<Mutex<VecDeque<Vec<u8>>>>,
    calls: Arc<Mutex<Vec<ControlCall>>>,
    cancel: Arc<AtomicBool>,
    /// Non-zero makes every subsequent operation fail with this status.
    fail_status: i32,
    closed: bool,
}

impl MockSdr {
    pub fn new() -> Self {
        Self {
            buffers: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            cancel: Arc::new(AtomicBool::new(false)),
            fail_status: 0,
            closed: false,
        }
    }

    /// Queue a sample buffer for delivery during streaming.
    pub fn push_buffer(&mut self, data: Vec<u8>) {
        self.buffers.lock().unwrap().push_back(data);
    }

    /// Make every following operation report this device status.
    pub fn fail_with(&mut self, status: i32) {
        self.fail_status = status;
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Cancellation handle usable from another thread while
    /// `start_streaming` blocks.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn check(&self, op: &'static str) -> SdrResult<()> {
        if self.closed {
            return Err(SdrError::Closed);
        }
        if self.fail_status != 0 {
            return Err(SdrError::Status {
                op,
                status: self.fail_status,
            });
        }
        Ok(())
    }

    fn record(&self, call: ControlCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockSdr {
    fn default() -> Self {
        Self::new()
    }
}

impl SdrDevice for MockSdr {
    fn open(index: u32) -> SdrResult<Self> {
        if index != 0 {
            return Err(SdrError::NoDevice(index));
        }
        Ok(Self::new())
    }

    fn set_center_freq(&mut self, hz: u32) -> SdrResult<()> {
        self.check("set_center_freq")?;
        self.record(ControlCall::CenterFreq(hz));
        Ok(())
    }

    fn set_sample_rate(&mut self, hz: u32) -> SdrResult<()> {
        self.check("set_sample_rate")?;
        self.record(ControlCall::SampleRate(hz));
        Ok(())
    }

    fn set_tuner_gain_mode(&mut self, manual: bool) -> SdrResult<()> {
        self.check("set_tuner_gain_mode")?;
        self.record(ControlCall::GainMode(manual));
        Ok(())
    }

    fn set_tuner_gain(&mut self, tenths_db: i32) -> SdrResult<()> {
        self.check("set_tuner_gain")?;
        self.record(ControlCall::Gain(tenths_db));
        Ok(())
    }

    fn start_streaming(
        &mut self,
        mut callback: SampleCallback,
        _buffer_count: u32,
        _buffer_len: usize,
    ) -> SdrResult<()> {
        self.check("start_streaming")?;
        loop {
            if self.cancel.load(Ordering::SeqCst) {
                break;
            }
            let next = self.buffers.lock().unwrap().pop_front();
            match next {
                Some(buf) => callback(&buf),
                None => break,
            }
        }
        Ok(())
    }

    fn cancel_streaming(&mut self) -> SdrResult<()> {
        self.cancel.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> SdrResult<()> {
        self.record(ControlCall::Close);
        self.closed = true;
        Ok(())
    }
}
