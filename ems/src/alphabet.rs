//! The fixed DNA domain and its rank encoding.

use bio::alphabets::{Alphabet, RankTransform};

use crate::{Seq, Sequence};

/// Domain size.
pub const SIGMA: usize = 4;

/// The concrete letters, in rank order.
pub const DNA_DOMAIN: &[u8; SIGMA] = b"ACGT";

/// Scaffold symbol standing for every concrete letter at once. Introduced by
/// substitutions and insertions during neighborhood construction; never part
/// of an encoded sequence or an emitted result.
pub const WILDCARD: u8 = SIGMA as u8;

/// Scaffold symbol marking a position removed by a deletion; stripped before
/// emission.
pub const DELETED: u8 = WILDCARD + 1;

/// Sharing mask covering the whole domain.
pub const ALPHABET_MASK: u8 = (1 << SIGMA) - 1;

/// The sharing mask of a candidate symbol.
#[inline]
pub fn letter_mask(c: u8) -> u8 {
    if c == WILDCARD {
        ALPHABET_MASK
    } else {
        1 << c
    }
}

/// Maps input text onto ranks `0..SIGMA` through the DNA alphabet.
///
/// Characters are upper-cased, `U` reads as `T`, and anything outside the
/// domain encodes to rank 0.
pub struct Encoder {
    alphabet: Alphabet,
    ranks: RankTransform,
}

impl Encoder {
    pub fn new() -> Self {
        let alphabet = Alphabet::new(DNA_DOMAIN);
        let ranks = RankTransform::new(&alphabet);
        Self { alphabet, ranks }
    }

    pub fn encode(&self, line: &str) -> Sequence {
        line.bytes()
            .map(|b| {
                let b = match b.to_ascii_uppercase() {
                    b'U' => b'T',
                    b => b,
                };
                if self.alphabet.is_word([b]) {
                    self.ranks.get(b)
                } else {
                    0
                }
            })
            .collect()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes ranks back into domain letters.
pub fn decode(motif: Seq) -> String {
    motif.iter().map(|&c| DNA_DOMAIN[c as usize] as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_ranks() {
        let enc = Encoder::new();
        assert_eq!(enc.encode("ACGT"), vec![0, 1, 2, 3]);
        assert_eq!(enc.encode("acgt"), vec![0, 1, 2, 3]);
    }

    #[test]
    fn uracil_reads_as_thymine() {
        let enc = Encoder::new();
        assert_eq!(enc.encode("AUGu"), vec![0, 3, 2, 3]);
    }

    #[test]
    fn unknown_characters_encode_to_zero() {
        let enc = Encoder::new();
        assert_eq!(enc.encode("NX-"), vec![0, 0, 0]);
    }

    #[test]
    fn decode_round_trip() {
        let enc = Encoder::new();
        assert_eq!(decode(&enc.encode("GATTACA")), "GATTACA");
    }
}
