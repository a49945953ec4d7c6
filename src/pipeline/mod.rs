// Capture-to-record pipeline
// One dispatch per delivered buffer, stop checked between buffers

use crate::decoders::Dispatcher;
use crate::output::RecordSink;
use crate::pulse::PulseCapture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the capture channel. One slot means the acquisition side
/// is only acknowledged after the previous capture finished decoding.
pub const CAPTURE_QUEUE_DEPTH: usize = 1;

/// Drives the dispatcher over a stream of pulse captures.
///
/// Each capture is decoded synchronously to completion; the stop flag is
/// only consulted between captures, so cancellation latency is bounded by
/// one capture's processing time. There is no state carried from one
/// capture to the next.
pub struct Pipeline {
    dispatcher: Dispatcher,
    stop: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Flag another thread can set to wind the pipeline down.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Bounded channel pair for feeding the pipeline from an acquisition
    /// callback.
    pub fn capture_channel() -> (mpsc::Sender<PulseCapture>, mpsc::Receiver<PulseCapture>) {
        mpsc::channel(CAPTURE_QUEUE_DEPTH)
    }

    /// Consume captures until the channel closes or the stop flag is set.
    /// Returns the total match count across all captures.
    pub async fn run(
        &self,
        mut captures: mpsc::Receiver<PulseCapture>,
        sink: &mut dyn RecordSink,
    ) -> usize {
        let mut total = 0;
        while let Some(capture) = captures.recv().await {
            if self.stop.load(Ordering::SeqCst) {
                tracing::debug!("stop requested, discarding remaining captures");
                break;
            }
            total += self.dispatcher.dispatch_capture(&capture, sink);
        }
        total
    }

    /// Synchronous variant over an in-memory capture sequence, used by
    /// the CLI for file playback. Same stop semantics.
    pub fn run_iter<I>(&self, captures: I, sink: &mut dyn RecordSink) -> usize
    where
        I: IntoIterator<Item = PulseCapture>,
    {
        let mut total = 0;
        for capture in captures {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            total += self.dispatcher.dispatch_capture(&capture, sink);
        }
        total
    }
}
