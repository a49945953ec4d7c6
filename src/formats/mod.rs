// Capture file formats

pub mod ook;

pub use ook::{load_ook, parse_ook, save_ook, OokError};
