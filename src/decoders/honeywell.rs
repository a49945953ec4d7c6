// Honeywell (Ademco) 345 MHz door/window sensor decoder
// 5811 transmitters, 2Gig DW10, Resolution RE208 repeaters

use super::{
    DecodeOutcome, DecodeResult, DecoderDescriptor, Polarity, ProtocolDecoder, ValidationFailure,
};
use crate::bitbuffer::BitBuffer;
use crate::checksum::crc16;
use crate::demod::Modulation;
use crate::output::{Record, RecordSink};

/// 12 leading bits of the 0xFFFE preamble/sync.
const PREAMBLE: [u8; 2] = [0xff, 0xe0];
const PREAMBLE_BITS: usize = 12;

/// Frame is 64 bits; anything under this is noise.
const MIN_ROW_BITS: usize = 60;

/// Payload after the sync: channel + id + event + crc.
const PAYLOAD_BITS: usize = 48;

/// Channel 8 is the Honeywell family proper; everything else (2Gig brand)
/// checksums with the alternate polynomial.
const HONEYWELL_CHANNEL: u8 = 0x8;
const CRC_POLY_HONEYWELL: u16 = 0x8005;
const CRC_POLY_2GIG: u16 = 0x8050;

enum RowResult {
    Matched,
    Skip,
    Failed(ValidationFailure),
}

/// 64-bit frames, repeated several times per open/close event:
///
/// ```text
/// PP PP C IIIII EE SS SS
/// ```
///
/// - P: 16-bit preamble and sync (always ff fe)
/// - C: 4-bit channel
/// - I: 20-bit device serial number or counter value
/// - E: 8-bit event, 0x80 = open/close, 0x04 = heartbeat
/// - S: 16-bit CRC over the four payload bytes
///
/// Every row is validated independently, so a capture holding repeats
/// yields one record per valid repeat (the dispatcher can deduplicate
/// identical rows first).
pub struct HoneywellSecurity {
    descriptor: DecoderDescriptor,
}

impl HoneywellSecurity {
    pub fn new() -> Self {
        Self {
            descriptor: DecoderDescriptor {
                name: "Honeywell-Security".to_string(),
                modulation: Modulation::OokManchesterZeroBit,
                short_width: 156,
                long_width: 0,
                reset_limit: 292,
                gap_limit: None,
                tolerance: None,
                polarity: Polarity::Inverted,
                enabled: true,
                fields: vec![
                    "model",
                    "id",
                    "channel",
                    "event",
                    "state",
                    "alarm",
                    "tamper",
                    "battery_ok",
                    "heartbeat",
                ],
            },
        }
    }

    fn decode_row(
        &self,
        bits: &BitBuffer,
        row: usize,
        sink: &mut dyn RecordSink,
    ) -> DecodeResult<RowResult> {
        let row_bits = bits.bits_per_row(row);
        if row_bits < MIN_ROW_BITS {
            return Ok(RowResult::Skip);
        }

        let pos = match bits.search(row, 0, &PREAMBLE, PREAMBLE_BITS) {
            Some(pos) => pos + PREAMBLE_BITS,
            None => return Ok(RowResult::Skip),
        };
        if pos + PAYLOAD_BITS > row_bits {
            return Ok(RowResult::Skip);
        }
        let b = bits.extract_bytes(row, pos, PAYLOAD_BITS)?;

        let channel = b[0] >> 4;
        let device_id = ((b[0] as u32 & 0xf) << 16) | ((b[1] as u32) << 8) | b[2] as u32;
        let crc = u16::from_be_bytes([b[4], b[5]]);

        // Noise that survives the preamble search rarely carries a
        // plausible id and checksum at once
        if device_id == 0 && crc == 0 {
            return Ok(RowResult::Failed(ValidationFailure::CollisionGuard));
        }

        let poly = if channel == HONEYWELL_CHANNEL {
            CRC_POLY_HONEYWELL
        } else {
            CRC_POLY_2GIG
        };
        if crc != crc16(&b[..4], poly, 0) {
            return Ok(RowResult::Failed(ValidationFailure::ChecksumMismatch));
        }

        let event = b[3];
        // event bits: AATABHUU
        let state = (event & 0x80) >> 7;
        let alarm = (event & 0xb0) >> 4;
        let tamper = (event & 0x40) >> 6;
        let battery_low = (event & 0x08) >> 3;
        let heartbeat = (event & 0x04) >> 2;

        let mut rec = Record::new(&self.descriptor.name);
        rec.push_hex("id", device_id as u64, 5);
        rec.push_int("channel", channel as i64);
        rec.push_hex("event", event as u64, 2);
        rec.push_str("state", if state != 0 { "open" } else { "closed" });
        rec.push_int("alarm", alarm as i64);
        rec.push_int("tamper", tamper as i64);
        rec.push_int("battery_ok", (1 - battery_low) as i64);
        rec.push_int("heartbeat", heartbeat as i64);
        sink.emit(rec);
        Ok(RowResult::Matched)
    }
}

impl Default for HoneywellSecurity {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolDecoder for HoneywellSecurity {
    fn descriptor(&self) -> &DecoderDescriptor {
        &self.descriptor
    }

    fn decode(&self, bits: &BitBuffer, sink: &mut dyn RecordSink) -> DecodeResult<DecodeOutcome> {
        let mut matched = 0usize;
        let mut last_failure = None;
        for row in 0..bits.num_rows() {
            match self.decode_row(bits, row, sink)? {
                RowResult::Matched => matched += 1,
                RowResult::Skip => {}
                RowResult::Failed(failure) => last_failure = Some(failure),
            }
        }
        Ok(match (matched, last_failure) {
            (0, Some(failure)) => DecodeOutcome::FailedValidation(failure),
            (0, None) => DecodeOutcome::NoMatch,
            (n, _) => DecodeOutcome::Matched(n),
        })
    }
}

/// Build one normalized (non-inverted) 64-bit frame for the given fields,
/// with the CRC computed the way the sensor family does.
#[cfg(test)]
pub(crate) fn frame_bytes(channel: u8, device_id: u32, event: u8) -> [u8; 8] {
    let mut b = [0u8; 8];
    b[0] = 0xff;
    b[1] = 0xfe;
    b[2] = (channel << 4) | ((device_id >> 16) & 0xf) as u8;
    b[3] = (device_id >> 8) as u8;
    b[4] = device_id as u8;
    b[5] = event;
    let poly = if channel == HONEYWELL_CHANNEL {
        CRC_POLY_HONEYWELL
    } else {
        CRC_POLY_2GIG
    };
    let crc = crc16(&b[2..6], poly, 0);
    b[6] = (crc >> 8) as u8;
    b[7] = crc as u8;
    b
}
