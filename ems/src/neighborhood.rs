//! Neighborhood enumeration shared by every engine.
//!
//! For a substring `x` of length `k`, the `d` edits are decomposed into
//! `delta` deletions, `sigma` substitutions and `alpha` insertions with
//! `delta + sigma + alpha = d` and `k - delta + alpha = l`, so every emitted
//! candidate has length exactly `l`. Deletions mark buffer positions as
//! DELETED and are stripped before emission; substitutions and insertions
//! either branch over concrete letters or write a single WILDCARD, depending
//! on the mode the engine asked for.

use crate::alphabet::{DELETED, SIGMA, WILDCARD};
use crate::Seq;

/// Receives every candidate the enumerator reaches. Candidates have length
/// `l` and contain WILDCARD positions when the enumerator runs in wildcard
/// mode. The same candidate may be emitted more than once; sinks are expected
/// to deduplicate.
pub trait CandidateSink {
    fn emit(&mut self, candidate: Seq);
}

/// Substring lengths that can reach a length-`l` motif within `d` edits on a
/// sequence of length `m`. Empty when the sequence is shorter than `l - d`.
pub fn length_range(l: usize, d: usize, m: usize) -> std::ops::RangeInclusive<usize> {
    1.max(l.saturating_sub(d))..=m.min(l + d)
}

/// The `(delta, sigma, alpha)` decompositions of `d` for substring length `k`.
/// `alpha - delta = l - k` pins the final length; `delta >= max(0, q)` keeps
/// every count non-negative and `delta <= (d + q) / 2` breaks the symmetry
/// between inserting and deleting at the same site.
fn partitions(l: usize, d: usize, k: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    let d = d as isize;
    let q = k as isize - l as isize;
    (q.max(0)..=(d + q) / 2).map(move |delta| {
        let alpha = delta - q;
        let sigma = d - alpha - delta;
        (delta as usize, sigma as usize, alpha as usize)
    })
}

/// Enumerator for the `(l,d)`-neighborhoods of a sequence's substrings.
///
/// Holds the scratch buffers; the recursion mutates them in place and
/// backtracks rather than cloning per step.
pub struct Neighborhood {
    l: usize,
    d: usize,
    /// Branch substitutions and insertions over concrete letters instead of
    /// writing WILDCARD.
    concrete: bool,
    buf: Vec<u8>,
    out: Vec<u8>,
}

impl Neighborhood {
    pub fn new(l: usize, d: usize, concrete: bool) -> Self {
        Self {
            l,
            d,
            concrete,
            buf: Vec::with_capacity(l + 2 * d),
            out: Vec::with_capacity(l),
        }
    }

    /// Enumerates every substring of `seq` across all edit partitions.
    pub fn of_sequence<S: CandidateSink>(&mut self, seq: Seq, sink: &mut S) {
        for k in length_range(self.l, self.d, seq.len()) {
            for (delta, sigma, alpha) in partitions(self.l, self.d, k) {
                for i in 0..=seq.len() - k {
                    self.enumerate(&seq[i..i + k], delta, sigma, alpha, sink);
                }
            }
        }
    }

    /// Enumerates the single substring `seq[i..i+k]` across all edit
    /// partitions. Entry point for the parallel engine's work shards.
    pub fn of_substring<S: CandidateSink>(&mut self, seq: Seq, i: usize, k: usize, sink: &mut S) {
        for (delta, sigma, alpha) in partitions(self.l, self.d, k) {
            self.enumerate(&seq[i..i + k], delta, sigma, alpha, sink);
        }
    }

    fn enumerate<S: CandidateSink>(
        &mut self,
        x: Seq,
        delta: usize,
        sigma: usize,
        alpha: usize,
        sink: &mut S,
    ) {
        self.buf.clear();
        self.buf.extend_from_slice(x);
        self.deletions(delta, sigma, alpha, 0, sink);
    }

    /// Phase 1: mark `delta` positions DELETED, chosen in increasing order.
    fn deletions<S: CandidateSink>(
        &mut self,
        delta: usize,
        sigma: usize,
        alpha: usize,
        from: usize,
        sink: &mut S,
    ) {
        if delta == 0 {
            self.substitutions(sigma, alpha, 0, sink);
            return;
        }
        for j in from..self.buf.len() {
            let kept = self.buf[j];
            self.buf[j] = DELETED;
            self.deletions(delta - 1, sigma, alpha, j + 1, sink);
            self.buf[j] = kept;
        }
    }

    /// Phase 2: overwrite `sigma` non-deleted positions, chosen in increasing
    /// order.
    fn substitutions<S: CandidateSink>(
        &mut self,
        sigma: usize,
        alpha: usize,
        from: usize,
        sink: &mut S,
    ) {
        if sigma == 0 {
            self.insertions(alpha, sink);
            return;
        }
        for j in from..self.buf.len() {
            let kept = self.buf[j];
            if kept == DELETED {
                continue;
            }
            if self.concrete {
                for s in 0..SIGMA as u8 {
                    if s == kept {
                        continue;
                    }
                    self.buf[j] = s;
                    self.substitutions(sigma - 1, alpha, j + 1, sink);
                }
            } else {
                self.buf[j] = WILDCARD;
                self.substitutions(sigma - 1, alpha, j + 1, sink);
            }
            self.buf[j] = kept;
        }
    }

    /// Phase 3: insert `alpha` symbols at gap positions. A gap whose right
    /// neighbor is a WILDCARD is skipped; the run it belongs to is already
    /// reachable by inserting on the other side.
    fn insertions<S: CandidateSink>(&mut self, alpha: usize, sink: &mut S) {
        if alpha == 0 {
            self.finish(sink);
            return;
        }
        for j in 0..=self.buf.len() {
            if j < self.buf.len() && self.buf[j] == WILDCARD {
                continue;
            }
            if self.concrete {
                for s in 0..SIGMA as u8 {
                    self.buf.insert(j, s);
                    self.insertions(alpha - 1, sink);
                    self.buf.remove(j);
                }
            } else {
                self.buf.insert(j, WILDCARD);
                self.insertions(alpha - 1, sink);
                self.buf.remove(j);
            }
        }
    }

    fn finish<S: CandidateSink>(&mut self, sink: &mut S) {
        self.out.clear();
        self.out
            .extend(self.buf.iter().copied().filter(|&c| c != DELETED));
        debug_assert_eq!(self.out.len(), self.l);
        sink.emit(&self.out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Encoder;
    use crate::distance::edit_distance;
    use crate::Sequence;
    use rustc_hash::FxHashSet;

    struct Collect {
        set: FxHashSet<Sequence>,
    }

    impl CandidateSink for Collect {
        fn emit(&mut self, candidate: Seq) {
            self.set.insert(candidate.to_vec());
        }
    }

    /// Expands WILDCARD positions before collecting, so wildcard-mode output
    /// is comparable to concrete-mode output.
    struct Expand {
        set: FxHashSet<Sequence>,
    }

    impl CandidateSink for Expand {
        fn emit(&mut self, candidate: Seq) {
            let mut scratch = candidate.to_vec();
            expand_into(&mut scratch, 0, &mut self.set);
        }
    }

    fn expand_into(scratch: &mut Sequence, from: usize, set: &mut FxHashSet<Sequence>) {
        match scratch[from..].iter().position(|&c| c == WILDCARD) {
            None => {
                set.insert(scratch.clone());
            }
            Some(off) => {
                let j = from + off;
                for s in 0..SIGMA as u8 {
                    scratch[j] = s;
                    expand_into(scratch, j + 1, set);
                }
                scratch[j] = WILDCARD;
            }
        }
    }

    fn all_motifs(l: usize) -> Vec<Sequence> {
        let mut out = vec![Vec::new()];
        for _ in 0..l {
            out = out
                .into_iter()
                .flat_map(|m| {
                    (0..SIGMA as u8).map(move |c| {
                        let mut m = m.clone();
                        m.push(c);
                        m
                    })
                })
                .collect();
        }
        out
    }

    /// Ground truth: all length-`l` strings within distance `d` of some
    /// substring of `seq`, by exhaustive Wagner–Fischer.
    fn reference(seq: Seq, l: usize, d: usize) -> FxHashSet<Sequence> {
        all_motifs(l)
            .into_iter()
            .filter(|m| {
                length_range(l, d, seq.len()).any(|k| {
                    (0..=seq.len() - k).any(|i| edit_distance(&seq[i..i + k], m) <= d)
                })
            })
            .collect()
    }

    #[test]
    fn concrete_mode_matches_reference() {
        let seq = Encoder::new().encode("ACGTT");
        for d in 0..=2 {
            let mut sink = Collect {
                set: FxHashSet::default(),
            };
            Neighborhood::new(3, d, true).of_sequence(&seq, &mut sink);
            assert_eq!(sink.set, reference(&seq, 3, d), "d = {d}");
        }
    }

    #[test]
    fn wildcard_mode_matches_reference() {
        let seq = Encoder::new().encode("GATTAC");
        for d in 0..=2 {
            let mut sink = Expand {
                set: FxHashSet::default(),
            };
            Neighborhood::new(4, d, false).of_sequence(&seq, &mut sink);
            assert_eq!(sink.set, reference(&seq, 4, d), "d = {d}");
        }
    }

    #[test]
    fn homopolymer_neighborhood_count() {
        // |{y : |y| = 5, ed(y, AAAAA) <= 2}| = sum_i C(5,i) 3^i = 106.
        let seq = Encoder::new().encode("AAAAA");
        let mut sink = Collect {
            set: FxHashSet::default(),
        };
        Neighborhood::new(5, 2, true).of_sequence(&seq, &mut sink);
        assert_eq!(sink.set.len(), 106);
    }

    #[test]
    fn too_short_sequence_yields_nothing() {
        let seq = Encoder::new().encode("AC");
        let mut sink = Collect {
            set: FxHashSet::default(),
        };
        Neighborhood::new(6, 1, true).of_sequence(&seq, &mut sink);
        assert!(sink.set.is_empty());
    }
}
