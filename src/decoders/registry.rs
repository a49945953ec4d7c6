// Decoder registry and capture dispatcher

use super::{DecodeOutcome, DecoderDescriptor, Polarity, ProtocolDecoder};
use crate::bitbuffer::BitBuffer;
use crate::demod::{demodulate, DemodParams, Modulation};
use crate::output::RecordSink;
use crate::pulse::PulseCapture;
use std::collections::HashMap;

/// What to do with bit-identical repeat rows before decoders see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDedup {
    /// Every repeat surfaces its own match.
    EmitAll,
    /// Identical rows collapse to one before validation.
    DedupIdentical,
}

/// Ordered set of protocol decoders, built once at startup and read-only
/// afterwards, so dispatch workers can share it without locking.
#[derive(Default)]
pub struct Registry {
    decoders: Vec<Box<dyn ProtocolDecoder>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stock decoders, in registration order.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(Box::new(super::HoneywellSecurity::new()));
        reg
    }

    pub fn register(&mut self, decoder: Box<dyn ProtocolDecoder>) {
        self.decoders.push(decoder);
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ProtocolDecoder> {
        self.decoders.iter().map(|d| d.as_ref())
    }

    pub fn descriptors(&self) -> Vec<&DecoderDescriptor> {
        self.decoders.iter().map(|d| d.descriptor()).collect()
    }
}

/// Runs every enabled decoder against each capture and aggregates match
/// counts. Never stops at the first match; protocols can share timing
/// characteristics and all matches are surfaced.
pub struct Dispatcher {
    registry: Registry,
    dedup: RowDedup,
}

impl Dispatcher {
    pub fn new(registry: Registry, dedup: RowDedup) -> Self {
        Self { registry, dedup }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Demodulate one capture and try every enabled decoder, reusing one
    /// BitBuffer per distinct (modulation, timing) class. Returns the
    /// total match count across all decoders.
    pub fn dispatch_capture(&self, capture: &PulseCapture, sink: &mut dyn RecordSink) -> usize {
        let mut cache: HashMap<(Modulation, DemodParams), BitBuffer> = HashMap::new();
        let mut total = 0;
        for decoder in self.registry.iter() {
            let desc = decoder.descriptor();
            if !desc.enabled {
                continue;
            }
            let key = (desc.modulation, desc.demod_params());
            let bits = cache.entry(key).or_insert_with(|| {
                let mut bits = demodulate(capture, key.0, &key.1);
                if self.dedup == RowDedup::DedupIdentical {
                    bits.dedup_rows();
                }
                bits
            });
            total += self.run_decoder(decoder, bits, sink);
        }
        total
    }

    /// Try every enabled decoder against an already-demodulated buffer.
    pub fn dispatch_buffer(&self, bits: &BitBuffer, sink: &mut dyn RecordSink) -> usize {
        let deduped;
        let bits = match self.dedup {
            RowDedup::EmitAll => bits,
            RowDedup::DedupIdentical => {
                let mut copy = bits.clone();
                copy.dedup_rows();
                deduped = copy;
                &deduped
            }
        };
        let mut total = 0;
        for decoder in self.registry.iter() {
            if decoder.descriptor().enabled {
                total += self.run_decoder(decoder, bits, sink);
            }
        }
        total
    }

    fn run_decoder(
        &self,
        decoder: &dyn ProtocolDecoder,
        bits: &BitBuffer,
        sink: &mut dyn RecordSink,
    ) -> usize {
        let desc = decoder.descriptor();
        // Polarity normalization happens on a private copy; the shared
        // buffer is never mutated
        let inverted;
        let view = match desc.polarity {
            Polarity::Normal => bits,
            Polarity::Inverted => {
                inverted = bits.inverted();
                &inverted
            }
        };
        match decoder.decode(view, sink) {
            Ok(DecodeOutcome::Matched(n)) => {
                tracing::debug!(decoder = %desc.name, matches = n, "decoded");
                n
            }
            Ok(DecodeOutcome::NoMatch) => 0,
            Ok(DecodeOutcome::FailedValidation(reason)) => {
                tracing::debug!(decoder = %desc.name, ?reason, "frame failed validation");
                0
            }
            Err(e) => {
                tracing::error!(decoder = %desc.name, error = %e, "decoder contract violation");
                0
            }
        }
    }
}
