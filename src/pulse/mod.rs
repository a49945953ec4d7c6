// Pulse timing container produced by the upstream envelope detector

/// Ordered pulse/gap timing pairs for one capture, microsecond units.
///
/// Produced upstream (pulse detection from the raw envelope is not this
/// crate's job) and consumed exactly once by a demodulator. A capture ends
/// at a timeout gap or at end of input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PulseCapture {
    pairs: Vec<(u32, u32)>,
}

impl PulseCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(u32, u32)>) -> Self {
        Self { pairs }
    }

    /// Append one mark/space pair (microseconds).
    pub fn push(&mut self, pulse_us: u32, gap_us: u32) {
        self.pairs.push((pulse_us, gap_us));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, u32)> {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_iter() {
        let mut cap = PulseCapture::new();
        cap.push(156, 156);
        cap.push(312, 624);
        assert_eq!(cap.len(), 2);
        assert_eq!(cap.pairs()[1], (312, 624));
        let total: u32 = cap.iter().map(|&(p, g)| p + g).sum();
        assert_eq!(total, 1248);
    }
}
