//! Engine 2p: bit-packed candidates, sharded sort-merge across a worker
//! pool.
//!
//! Tries are dropped entirely: every concrete neighbor is emitted as a
//! 2-bit-per-letter key, each shard sorts and dedupes its keys and
//! intersects them against a snapshot of the running result, and the shard
//! results are folded with a binary union-reduction. Intersection
//! distributes over union, so the fold equals intersecting the running
//! result with the sequence's whole candidate set.

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::alphabet::{SIGMA, WILDCARD};
use crate::engine::MotifEngine;
use crate::neighborhood::{length_range, CandidateSink, Neighborhood};
use crate::packed::{MotifKey, MAX_L};
use crate::{Error, Seq, Sequence};

/// Fixed seed for the work-list shuffle; spreads expensive substrings across
/// shards while keeping runs reproducible.
const SHUFFLE_SEED: u64 = 42;

pub struct Parallel {
    l: usize,
    d: usize,
    pool: rayon::ThreadPool,
}

impl Parallel {
    pub fn new(l: usize, d: usize, threads: usize) -> Result<Self, Error> {
        if l > MAX_L {
            return Err(Error::MotifTooLong(l));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()?;
        Ok(Self { l, d, pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Packs every concrete realization of a candidate, expanding WILDCARD
/// positions eagerly.
struct PackedSink {
    scratch: Vec<u8>,
    keys: Vec<MotifKey>,
}

impl PackedSink {
    fn expand(&mut self, from: usize) {
        match self.scratch[from..].iter().position(|&c| c == WILDCARD) {
            None => self.keys.push(MotifKey::pack(&self.scratch)),
            Some(off) => {
                let j = from + off;
                for s in 0..SIGMA as u8 {
                    self.scratch[j] = s;
                    self.expand(j + 1);
                }
                self.scratch[j] = WILDCARD;
            }
        }
    }
}

impl CandidateSink for PackedSink {
    fn emit(&mut self, candidate: Seq) {
        self.scratch.clear();
        self.scratch.extend_from_slice(candidate);
        self.expand(0);
    }
}

/// Two-pointer merge keeping keys present in both sorted inputs.
fn intersect_sorted(a: &[MotifKey], b: &[MotifKey]) -> Vec<MotifKey> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    out
}

/// Two-pointer deduplicating union of two sorted inputs.
fn union_sorted(a: &[MotifKey], b: &[MotifKey]) -> Vec<MotifKey> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        if j == b.len() || (i < a.len() && a[i] < b[j]) {
            out.push(a[i]);
            i += 1;
        } else if i == a.len() || b[j] < a[i] {
            out.push(b[j]);
            j += 1;
        } else {
            out.push(a[i]);
            i += 1;
            j += 1;
        }
    }
    out
}

impl MotifEngine for Parallel {
    fn name(&self) -> &'static str {
        "ems2p"
    }

    fn search(&self, seqs: &[Sequence]) -> Vec<Sequence> {
        let mut main: Vec<MotifKey> = Vec::new();
        for (idx, seq) in seqs.iter().enumerate() {
            log::debug!("ems2p: processing sequence {}", idx + 1);
            let mut work = length_range(self.l, self.d, seq.len())
                .flat_map(|k| (0..=seq.len() - k).map(move |i| (i, k)))
                .collect_vec();
            work.shuffle(&mut ChaCha8Rng::seed_from_u64(SHUFFLE_SEED));
            let shard = work.len().div_ceil(self.threads()).max(1);
            let first = idx == 0;
            let main_ref = &main;
            let results: Vec<Vec<MotifKey>> = self.pool.install(|| {
                work.par_chunks(shard)
                    .map(|chunk| {
                        let mut nbhd = Neighborhood::new(self.l, self.d, false);
                        let mut sink = PackedSink {
                            scratch: Vec::with_capacity(self.l),
                            keys: Vec::new(),
                        };
                        for &(i, k) in chunk {
                            nbhd.of_substring(seq, i, k, &mut sink);
                        }
                        let mut keys = sink.keys;
                        keys.sort_unstable();
                        keys.dedup();
                        if first {
                            keys
                        } else {
                            intersect_sorted(&keys, main_ref)
                        }
                    })
                    .collect()
            });
            main = reduce_union(results);
            if idx >= 1 && main.is_empty() {
                log::info!("ems2p: no common motifs after sequence {}", idx + 1);
                break;
            }
        }
        main.into_iter().map(|k| k.unpack(self.l)).collect()
    }
}

/// Binary reduction tree over the per-shard arrays.
fn reduce_union(mut arrays: Vec<Vec<MotifKey>>) -> Vec<MotifKey> {
    while arrays.len() > 1 {
        let mut next = Vec::with_capacity(arrays.len().div_ceil(2));
        let mut iter = arrays.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(union_sorted(&a, &b)),
                None => next.push(a),
            }
        }
        arrays = next;
    }
    arrays.pop().unwrap_or_default()
}
