//! Engine selection and the shared search interface.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::brute::Brute;
use crate::parallel::Parallel;
use crate::trie::TrieEngine;
use crate::{Error, Sequence};

/// Which engine runs the search.
#[derive(ValueEnum, Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Version {
    /// Brute-force counting of explicit neighborhoods.
    #[value(name = "1")]
    Brute,
    /// Sharing-mask trie with slot-array nodes.
    #[default]
    #[value(name = "2")]
    Trie,
    /// Sharing-mask trie with child-list nodes.
    #[value(name = "2m")]
    SimpleTrie,
    /// Bit-packed parallel sort-merge.
    #[value(name = "2p")]
    Parallel,
}

/// Search parameters common to every engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Params {
    /// Motif length.
    pub l: usize,
    /// Maximum edit distance.
    pub d: usize,
    /// Worker count; only the parallel engine uses more than one.
    pub threads: usize,
}

impl Params {
    pub fn validate(&self) -> Result<(), Error> {
        if self.l == 0 {
            return Err(Error::BadMotifLength);
        }
        Ok(())
    }
}

/// A motif-search engine. `search` is a batch operation: it runs to
/// completion over all sequences and returns the motifs common to every one
/// of them, encoded and lexicographically sorted.
pub trait MotifEngine {
    /// Short engine name used in output and log file paths.
    fn name(&self) -> &'static str;
    fn search(&self, seqs: &[Sequence]) -> Vec<Sequence>;
}

/// Builds the engine for `version`, validating `params` against its limits.
pub fn build(version: Version, params: &Params) -> Result<Box<dyn MotifEngine>, Error> {
    params.validate()?;
    Ok(match version {
        Version::Brute => Box::new(Brute::new(params.l, params.d)),
        Version::Trie => Box::new(TrieEngine::fast(params.l, params.d)),
        Version::SimpleTrie => Box::new(TrieEngine::simple(params.l, params.d)),
        Version::Parallel => Box::new(Parallel::new(params.l, params.d, params.threads)?),
    })
}
