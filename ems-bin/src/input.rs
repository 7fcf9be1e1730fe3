//! Input reading: `>` lines are headers, everything else is a sequence.

use std::io;
use std::path::Path;

use ems::alphabet::Encoder;
use ems::Sequence;
use regex::Regex;

pub struct InputFile {
    pub sequences: Vec<Sequence>,
    /// Planted consensus motif, when the first line announces one.
    pub consensus: Option<String>,
}

pub fn read_input(path: &Path) -> io::Result<InputFile> {
    Ok(parse_input(&std::fs::read_to_string(path)?))
}

pub fn parse_input(text: &str) -> InputFile {
    let encoder = Encoder::new();
    let pattern = Regex::new(r"Motif\s+([ACGTacgt]+)\s+planted").unwrap();
    let consensus = text
        .lines()
        .next()
        .and_then(|first| pattern.captures(first))
        .map(|caps| caps[1].to_uppercase());
    let sequences = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('>'))
        .map(|line| encoder.encode(line))
        .collect();
    InputFile {
        sequences,
        consensus,
    }
}
