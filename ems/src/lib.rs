//! Edited motif search (EMS).
//!
//! Given sequences over the DNA alphabet, a motif length `l` and an edit
//! budget `d`, find every length-`l` string that lies within Levenshtein
//! distance `d` of some substring of every sequence.
//!
//! Four engines share one neighborhood enumerator and differ in how they
//! store and intersect per-sequence candidate sets:
//! - [`brute::Brute`] materializes every neighbor into a hash set and counts
//!   coverage across sequences,
//! - [`trie::TrieEngine`] keeps candidates in sharing-mask tries (slot-array
//!   or child-list nodes) and intersects them depth-wise,
//! - [`parallel::Parallel`] packs candidates into 2-bit-per-letter integer
//!   keys and sort-merges them across worker shards.

pub mod alphabet;
pub mod brute;
pub mod distance;
pub mod engine;
pub mod neighborhood;
pub mod packed;
pub mod parallel;
pub mod trie;

/// An owned, rank-encoded sequence.
pub type Sequence = Vec<u8>;
/// A rank-encoded sequence slice.
pub type Seq<'a> = &'a [u8];

/// Errors surfaced by parameter validation and engine construction. All of
/// them are fatal at the driver boundary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("motif length must be > 0")]
    BadMotifLength,
    #[error("motif length {0} exceeds the packed-key limit of {max}", max = packed::MAX_L)]
    MotifTooLong(usize),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub mod prelude {
    pub use crate::alphabet::{decode, Encoder, DELETED, SIGMA, WILDCARD};
    pub use crate::engine::{build, MotifEngine, Params, Version};
    pub use crate::{Seq, Sequence};
    pub use rustc_hash::FxHashMap as HashMap;
    pub use rustc_hash::FxHashSet as HashSet;
}
