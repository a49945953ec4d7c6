// Pulse data text format
// Header lines start with ';', then one "pulse gap" pair per line (µs)

use crate::pulse::PulseCapture;
use nom::{
    character::complete::{space0, space1, u32 as dec_u32},
    IResult, Parser,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OokError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed pulse data at line {line}: {text:?}")]
    Malformed { line: usize, text: String },

    #[error("No pulse data in file")]
    Empty,
}

pub type OokResult<T> = std::result::Result<T, OokError>;

fn parse_pair(input: &str) -> IResult<&str, (u32, u32)> {
    let (input, _) = space0(input)?;
    let (input, pulse) = dec_u32(input)?;
    let (input, _) = space1(input)?;
    let (input, gap) = dec_u32(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (pulse, gap)))
}

/// Parse pulse data from text. Lines opening with ';' are headers or
/// comments and are ignored; every other non-blank line must be a
/// `pulse gap` microsecond pair.
pub fn parse_ook(text: &str) -> OokResult<PulseCapture> {
    let mut capture = PulseCapture::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        match parse_pair.parse(trimmed) {
            Ok(("", (pulse, gap))) => capture.push(pulse, gap),
            _ => {
                return Err(OokError::Malformed {
                    line: idx + 1,
                    text: line.to_string(),
                })
            }
        }
    }
    if capture.is_empty() {
        return Err(OokError::Empty);
    }
    Ok(capture)
}

/// Load one capture from a pulse data file.
pub fn load_ook(path: impl AsRef<Path>) -> OokResult<PulseCapture> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loaded pulse data file");
    parse_ook(&text)
}

/// Write a capture as a pulse data file.
pub fn save_ook(path: impl AsRef<Path>, capture: &PulseCapture) -> OokResult<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, ";pulse data")?;
    writeln!(file, ";version 1")?;
    writeln!(file, ";timescale 1us")?;
    for &(pulse, gap) in capture.iter() {
        writeln!(file, "{} {}", pulse, gap)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_headers_and_blanks() {
        let text = ";pulse data\n;timescale 1us\n\n100 200\n  150   300\n";
        let cap = parse_ook(text).unwrap();
        assert_eq!(cap.pairs(), &[(100, 200), (150, 300)]);
    }

    #[test]
    fn test_malformed_line_errors() {
        let text = "100 200\n100 abc\n";
        match parse_ook(text) {
            Err(OokError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {:?}", other.map(|_| ())),
        }
        // missing gap column
        assert!(parse_ook("100\n").is_err());
        // empty file
        assert!(matches!(parse_ook(";only headers\n"), Err(OokError::Empty)));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.ook");
        let cap = PulseCapture::from_pairs(vec![(156, 156), (312, 292), (156, 5000)]);
        save_ook(&path, &cap).unwrap();
        let loaded = load_ook(&path).unwrap();
        assert_eq!(loaded, cap);
    }
}
