//! Bit-packed motif keys for the parallel engine.

use crate::{Seq, Sequence};

/// Longest motif a 64-bit key can hold.
pub const MAX_L: usize = 32;

/// A length-`l` motif packed 2 bits per letter, leftmost letter in the
/// highest bits, so numeric order on keys equals lexicographic order on
/// motifs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct MotifKey(u64);

impl MotifKey {
    pub fn pack(motif: Seq) -> Self {
        debug_assert!(motif.len() <= MAX_L);
        let mut data = 0u64;
        for &c in motif {
            debug_assert!((c as usize) < crate::alphabet::SIGMA);
            data = data << 2 | c as u64;
        }
        MotifKey(data)
    }

    pub fn unpack(self, l: usize) -> Sequence {
        (0..l)
            .map(|i| (self.0 >> (2 * (l - 1 - i)) & 0b11) as u8)
            .collect()
    }
}
