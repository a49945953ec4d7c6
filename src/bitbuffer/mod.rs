// Bit row container for demodulated transmissions
// One capture may hold several rows from repeated transmissions

use thiserror::Error;

/// Maximum rows per buffer. Malformed captures cannot grow a buffer
/// past this.
pub const MAX_ROWS: usize = 50;

/// Maximum bits per row (40 bytes).
pub const MAX_BITS_PER_ROW: usize = 320;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BitBufferError {
    #[error("Row {0} out of range ({1} rows)")]
    RowOutOfRange(usize, usize),

    #[error("Bit range {start}+{len} exceeds row length {row_len}")]
    BitRangeOutOfRange {
        start: usize,
        len: usize,
        row_len: usize,
    },
}

pub type BitBufferResult<T> = std::result::Result<T, BitBufferError>;

/// One candidate transmission's worth of bits. Bits are stored MSB-first
/// in `bytes`; the last byte may be partial, padded with zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    bytes: Vec<u8>,
    len_bits: usize,
}

impl Row {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            len_bits: 0,
        }
    }

    pub fn len_bits(&self) -> usize {
        self.len_bits
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read a single bit. Out-of-range reads return 0 so pattern scans
    /// never index past the storage.
    fn bit(&self, pos: usize) -> u8 {
        if pos >= self.len_bits {
            return 0;
        }
        (self.bytes[pos >> 3] >> (7 - (pos & 7))) & 1
    }

    fn push_bit(&mut self, bit: bool) {
        if self.len_bits >= MAX_BITS_PER_ROW {
            return; // bounded: excess bits from malformed input are dropped
        }
        if self.len_bits % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.len_bits >> 3] |= 0x80 >> (self.len_bits & 7);
        }
        self.len_bits += 1;
    }
}

/// Container of demodulated bit rows from a single capture.
///
/// Rows are independent repeats of (usually) the same message. The buffer
/// itself never compares or merges rows; that is decoder or dispatcher
/// policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    rows: Vec<Row>,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-row buffer from whole bytes. Mostly used by tests
    /// and decoder fixtures.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::new();
        for &byte in bytes {
            for bit in 0..8 {
                buf.add_bit(byte & (0x80 >> bit) != 0);
            }
        }
        buf
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> BitBufferResult<&Row> {
        self.rows
            .get(row)
            .ok_or(BitBufferError::RowOutOfRange(row, self.rows.len()))
    }

    /// Bit length of `row`, or 0 for an out-of-range row.
    pub fn bits_per_row(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |r| r.len_bits)
    }

    /// Append a bit to the current (last) row, opening row 0 if the
    /// buffer is empty. Bits past `MAX_BITS_PER_ROW` are dropped.
    pub fn add_bit(&mut self, bit: bool) {
        if self.rows.is_empty() {
            self.rows.push(Row::new());
        }
        self.rows.last_mut().unwrap().push_bit(bit);
    }

    /// Close the current row and start a new one. A trailing empty row is
    /// reused rather than stacked, and the row count is bounded.
    pub fn add_row(&mut self) {
        if let Some(last) = self.rows.last() {
            if last.len_bits == 0 {
                return;
            }
        }
        if self.rows.len() < MAX_ROWS {
            self.rows.push(Row::new());
        }
    }

    /// Drop a trailing row that never collected any bits.
    pub fn trim_empty_tail(&mut self) {
        if let Some(last) = self.rows.last() {
            if last.len_bits == 0 {
                self.rows.pop();
            }
        }
    }

    /// Flip every bit in every row, in place. Padding bits in the last
    /// partial byte stay zero.
    pub fn invert(&mut self) {
        for row in &mut self.rows {
            for byte in &mut row.bytes {
                *byte = !*byte;
            }
            let tail = row.len_bits % 8;
            if tail != 0 {
                let mask = !(0xffu8 >> tail);
                if let Some(last) = row.bytes.last_mut() {
                    *last &= mask;
                }
            }
        }
    }

    /// Non-destructive inverted copy. Decoders that need the opposite
    /// polarity work on this, never on a buffer shared with other
    /// decoders.
    pub fn inverted(&self) -> Self {
        let mut copy = self.clone();
        copy.invert();
        copy
    }

    /// Find the first bit-exact occurrence of the leading `pattern_bits`
    /// bits of `pattern` at or after `start_bit` in `row`.
    ///
    /// Returns `None` when the pattern does not occur; callers bound-check
    /// `pos + frame_bits <= len_bits` afterwards, which also covers a
    /// match found too close to the end of the row.
    pub fn search(
        &self,
        row: usize,
        start_bit: usize,
        pattern: &[u8],
        pattern_bits: usize,
    ) -> Option<usize> {
        debug_assert!(pattern_bits <= pattern.len() * 8);
        let r = self.rows.get(row)?;
        if pattern_bits == 0 || pattern_bits > r.len_bits {
            return None;
        }
        'outer: for pos in start_bit..=(r.len_bits - pattern_bits) {
            for i in 0..pattern_bits {
                let want = (pattern[i >> 3] >> (7 - (i & 7))) & 1;
                if r.bit(pos + i) != want {
                    continue 'outer;
                }
            }
            return Some(pos);
        }
        None
    }

    /// Copy `num_bits` starting at bit `start_bit` of `row` into a fresh
    /// byte vector, left-justified, zero-padding a trailing partial byte.
    ///
    /// Errors rather than reading past the row end; a decoder asking for
    /// bits beyond the buffer is a contract violation, not a crash.
    pub fn extract_bytes(
        &self,
        row: usize,
        start_bit: usize,
        num_bits: usize,
    ) -> BitBufferResult<Vec<u8>> {
        let r = self.row(row)?;
        if start_bit + num_bits > r.len_bits {
            return Err(BitBufferError::BitRangeOutOfRange {
                start: start_bit,
                len: num_bits,
                row_len: r.len_bits,
            });
        }
        let mut out = vec![0u8; num_bits.div_ceil(8)];
        for i in 0..num_bits {
            if r.bit(start_bit + i) != 0 {
                out[i >> 3] |= 0x80 >> (i & 7);
            }
        }
        Ok(out)
    }

    /// Whether two rows hold identical bits. Used by the dispatcher's
    /// repeat-deduplication policy.
    pub fn rows_equal(&self, a: usize, b: usize) -> bool {
        match (self.rows.get(a), self.rows.get(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Remove rows that are bit-identical to an earlier row, keeping the
    /// first occurrence. Returns the number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let mut kept: Vec<Row> = Vec::with_capacity(self.rows.len());
        let before = self.rows.len();
        for row in self.rows.drain(..) {
            if !kept.contains(&row) {
                kept.push(row);
            }
        }
        self.rows = kept;
        before - self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_bits_and_rows() {
        let mut buf = BitBuffer::new();
        buf.add_bit(true);
        buf.add_bit(false);
        buf.add_bit(true);
        buf.add_row();
        buf.add_bit(true);
        assert_eq!(buf.num_rows(), 2);
        assert_eq!(buf.bits_per_row(0), 3);
        assert_eq!(buf.bits_per_row(1), 1);
        assert_eq!(buf.row(0).unwrap().bytes(), &[0b1010_0000]);
    }

    #[test]
    fn test_add_row_skips_empty() {
        let mut buf = BitBuffer::new();
        buf.add_bit(true);
        buf.add_row();
        buf.add_row();
        buf.add_row();
        buf.add_bit(false);
        assert_eq!(buf.num_rows(), 2);
    }

    #[test]
    fn test_row_bounded() {
        let mut buf = BitBuffer::new();
        for _ in 0..(MAX_BITS_PER_ROW + 100) {
            buf.add_bit(true);
        }
        assert_eq!(buf.bits_per_row(0), MAX_BITS_PER_ROW);
    }

    #[test]
    fn test_search_finds_pattern() {
        // 0xFFFE: the 12-bit pattern 0xff 0xe0 first lines up at bit 4
        let buf = BitBuffer::from_bytes(&[0xff, 0xfe]);
        let pos = buf.search(0, 0, &[0xff, 0xe0], 12);
        assert_eq!(pos, Some(4));
    }

    #[test]
    fn test_search_not_found() {
        let buf = BitBuffer::from_bytes(&[0x00, 0x00, 0x00]);
        assert_eq!(buf.search(0, 0, &[0xff, 0xe0], 12), None);
        // Pattern longer than the row is never found
        let short = BitBuffer::from_bytes(&[0xff]);
        assert_eq!(short.search(0, 0, &[0xff, 0xe0], 12), None);
    }

    #[test]
    fn test_search_extract_consistency() {
        let buf = BitBuffer::from_bytes(&[0x0f, 0xfe, 0x12, 0x34]);
        let pos = buf.search(0, 0, &[0xff, 0xe0], 12).unwrap();
        let extracted = buf.extract_bytes(0, pos, 12).unwrap();
        // Re-searching at the found offset relocates the same bits
        let again = buf.search(0, pos, &extracted, 12);
        assert_eq!(again, Some(pos));
    }

    #[test]
    fn test_extract_bytes_unaligned() {
        let buf = BitBuffer::from_bytes(&[0xff, 0xfe, 0x81, 0x23]);
        // Skip the 16-bit sync, pull the next 16 bits
        let bytes = buf.extract_bytes(0, 16, 16).unwrap();
        assert_eq!(bytes, vec![0x81, 0x23]);
        // Odd offset, left-justified result
        let bytes = buf.extract_bytes(0, 15, 9).unwrap();
        assert_eq!(bytes, vec![0x40, 0x80]);
    }

    #[test]
    fn test_extract_past_end_errors() {
        let buf = BitBuffer::from_bytes(&[0xaa]);
        let err = buf.extract_bytes(0, 4, 8).unwrap_err();
        assert_eq!(
            err,
            BitBufferError::BitRangeOutOfRange {
                start: 4,
                len: 8,
                row_len: 8
            }
        );
        assert!(buf.extract_bytes(1, 0, 1).is_err());
    }

    #[test]
    fn test_invert_keeps_padding_zero() {
        let mut buf = BitBuffer::new();
        for bit in [true, false, true] {
            buf.add_bit(bit);
        }
        buf.invert();
        assert_eq!(buf.row(0).unwrap().bytes(), &[0b0100_0000]);
        // inverted() round-trips
        assert_eq!(buf.inverted().row(0).unwrap().bytes(), &[0b1010_0000]);
    }

    #[test]
    fn test_rows_equal_and_dedup() {
        let mut buf = BitBuffer::new();
        for &byte in &[0xde, 0xad] {
            for bit in 0..8 {
                buf.add_bit(byte & (0x80 >> bit) != 0);
            }
        }
        buf.add_row();
        for &byte in &[0xde, 0xad] {
            for bit in 0..8 {
                buf.add_bit(byte & (0x80 >> bit) != 0);
            }
        }
        buf.add_row();
        buf.add_bit(true);
        buf.trim_empty_tail();
        assert_eq!(buf.num_rows(), 3);
        assert!(buf.rows_equal(0, 1));
        assert!(!buf.rows_equal(0, 2));
        assert_eq!(buf.dedup_rows(), 1);
        assert_eq!(buf.num_rows(), 2);
    }
}
