//! Engine 1: brute-force counting over fully materialized neighborhoods.
//!
//! Exists as the ground-truth reference and for small instances; its cost is
//! proportional to the total concrete neighborhood size.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::engine::MotifEngine;
use crate::neighborhood::{CandidateSink, Neighborhood};
use crate::{Seq, Sequence};

pub struct Brute {
    l: usize,
    d: usize,
}

impl Brute {
    pub fn new(l: usize, d: usize) -> Self {
        Self { l, d }
    }
}

struct SetSink<'a> {
    set: &'a mut FxHashSet<Sequence>,
}

impl CandidateSink for SetSink<'_> {
    fn emit(&mut self, candidate: Seq) {
        if !self.set.contains(candidate) {
            self.set.insert(candidate.to_vec());
        }
    }
}

impl MotifEngine for Brute {
    fn name(&self) -> &'static str {
        "ems1"
    }

    fn search(&self, seqs: &[Sequence]) -> Vec<Sequence> {
        if seqs.is_empty() {
            return Vec::new();
        }
        let mut nbhd = Neighborhood::new(self.l, self.d, true);
        // counts[m] = number of distinct sequences whose candidate set holds
        // m so far; last_seq guards against double-counting within one
        // sequence.
        let mut counts: FxHashMap<Sequence, usize> = FxHashMap::default();
        let mut last_seq: FxHashMap<Sequence, usize> = FxHashMap::default();
        for (i, seq) in seqs.iter().enumerate() {
            let id = i + 1;
            log::debug!("ems1: processing sequence {id}");
            let mut candidates = FxHashSet::default();
            nbhd.of_sequence(seq, &mut SetSink {
                set: &mut candidates,
            });
            for motif in candidates {
                if last_seq.get(&motif) != Some(&id) {
                    last_seq.insert(motif.clone(), id);
                    *counts.entry(motif).or_insert(0) += 1;
                }
            }
            log::debug!("ems1: candidate pool size {}", counts.len());
        }
        let mut motifs: Vec<Sequence> = counts
            .into_iter()
            .filter(|&(_, c)| c == seqs.len())
            .map(|(m, _)| m)
            .collect();
        motifs.sort();
        motifs
    }
}
