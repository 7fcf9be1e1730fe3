//! Planted `(l,d)` edited-motif instances.
//!
//! Draws random DNA sequences, one consensus motif, and plants a copy of the
//! consensus edited by exactly `d` operations into every sequence at a random
//! position. Instance files carry one `>` header per sequence recording the
//! plant, and the first header doubles as the consensus annotation the search
//! driver picks up.

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const ALPH: [char; 4] = ['A', 'C', 'G', 'T'];

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
pub struct GenerateArgs {
    /// The number of sequences to generate
    #[clap(short = 'n', long, default_value_t = 20, display_order = 1)]
    pub cnt: usize,

    /// Length of each generated sequence
    #[clap(short = 'm', long, default_value_t = 600, display_order = 2)]
    pub length: usize,

    /// Length of the consensus motif
    #[clap(short = 'l', long, default_value_t = 11, display_order = 3)]
    pub motif_length: usize,

    /// Exact number of edits applied to each planted copy
    #[clap(short = 'd', long, default_value_t = 3, display_order = 4)]
    pub edits: usize,

    /// Seed to initialize RNG for reproducability
    #[clap(long)]
    pub seed: Option<u64>,

    /// Output path [default: planted_l<l>_d<d>.txt]
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("planted_l{}_d{}.txt", self.motif_length, self.edits))
    }
}

/// One planted copy: the edited motif and the window it overwrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub edited: String,
    pub pos: usize,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub consensus: String,
    pub sequences: Vec<String>,
    pub plants: Vec<Plant>,
}

fn rand_char(rng: &mut impl Rng) -> char {
    ALPH[rng.gen_range(0..4)]
}

/// Applies exactly `d` edits to `motif`: first `delta ~ U[0,d]` deletions,
/// then `alpha ~ U[0,d-delta]` insertions, then the rest as letter-changing
/// substitutions.
pub fn edit_motif(motif: &str, d: usize, rng: &mut impl Rng) -> String {
    let mut m: Vec<char> = motif.chars().collect();
    let delta = rng.gen_range(0..=d);
    for _ in 0..delta {
        if m.is_empty() {
            break;
        }
        let pos = rng.gen_range(0..m.len());
        m.remove(pos);
    }
    let alpha = rng.gen_range(0..=d - delta);
    for _ in 0..alpha {
        let pos = rng.gen_range(0..=m.len());
        m.insert(pos, rand_char(rng));
    }
    let beta = d - delta - alpha;
    for _ in 0..beta {
        if m.is_empty() {
            break;
        }
        let pos = rng.gen_range(0..m.len());
        let old = m[pos];
        let mut new = rand_char(rng);
        while new == old {
            new = rand_char(rng);
        }
        m[pos] = new;
    }
    m.into_iter().collect()
}

pub fn generate_instance(args: &GenerateArgs, rng: &mut impl Rng) -> Instance {
    let consensus: String = (0..args.motif_length).map(|_| rand_char(rng)).collect();
    let mut sequences = Vec::with_capacity(args.cnt);
    let mut plants = Vec::with_capacity(args.cnt);
    for _ in 0..args.cnt {
        let mut seq = (0..args.length).map(|_| rand_char(rng)).collect_vec();
        let edited = edit_motif(&consensus, args.edits, rng);
        let pos = if edited.len() >= seq.len() {
            0
        } else {
            rng.gen_range(0..=seq.len() - edited.len())
        };
        for (off, c) in edited.chars().enumerate() {
            if pos + off < seq.len() {
                seq[pos + off] = c;
            }
        }
        sequences.push(seq.into_iter().collect());
        plants.push(Plant { edited, pos });
    }
    Instance {
        consensus,
        sequences,
        plants,
    }
}

/// Reproducible instance from a fixed seed.
pub fn instance_with_seed(args: &GenerateArgs, seed: u64) -> Instance {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    generate_instance(args, &mut rng)
}

/// Renders the instance in the on-disk format: a `>` header per sequence
/// followed by the raw sequence line. The headers stay invisible to the
/// reader while the first one still carries the consensus pattern.
pub fn render_instance(instance: &Instance) -> String {
    let mut out = String::new();
    for (i, (seq, plant)) in instance.sequences.iter().zip(&instance.plants).enumerate() {
        out += &format!(
            ">{} Motif {} planted as {} at position {}\n{}\n",
            i, instance.consensus, plant.edited, plant.pos, seq
        );
    }
    out
}

pub fn write_instance(path: &Path, instance: &Instance) -> io::Result<()> {
    std::fs::write(path, render_instance(instance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn args() -> GenerateArgs {
        GenerateArgs {
            cnt: 5,
            length: 80,
            motif_length: 9,
            edits: 2,
            seed: None,
            output: None,
        }
    }

    #[test]
    fn instance_shape() {
        let instance = instance_with_seed(&args(), 7);
        assert_eq!(instance.consensus.len(), 9);
        assert_eq!(instance.sequences.len(), 5);
        assert_eq!(instance.plants.len(), 5);
        for seq in &instance.sequences {
            assert_eq!(seq.len(), 80);
            assert!(seq.chars().all(|c| ALPH.contains(&c)));
        }
    }

    #[test]
    fn plants_are_embedded() {
        let instance = instance_with_seed(&args(), 11);
        for (seq, plant) in instance.sequences.iter().zip(&instance.plants) {
            assert_eq!(
                &seq[plant.pos..plant.pos + plant.edited.len()],
                plant.edited
            );
        }
    }

    #[test]
    fn edited_length_stays_in_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for d in 0..=3usize {
            for _ in 0..50 {
                let edited = edit_motif("ACGTACGTACG", d, &mut rng);
                assert!(edited.len() >= 11 - d && edited.len() <= 11 + d);
            }
        }
    }

    #[test]
    fn zero_edits_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(edit_motif("GATTACA", 0, &mut rng), "GATTACA");
    }

    #[test]
    fn same_seed_same_instance() {
        let a = instance_with_seed(&args(), 42);
        let b = instance_with_seed(&args(), 42);
        assert_eq!(a.consensus, b.consensus);
        assert_eq!(a.sequences, b.sequences);
    }

    #[test]
    fn rendered_headers_are_skippable() {
        let instance = instance_with_seed(&args(), 13);
        let text = render_instance(&instance);
        let first = text.lines().next().expect("header");
        assert!(first.starts_with('>'));
        assert!(first.contains(&format!("Motif {} planted", instance.consensus)));
        let seq_lines = text.lines().filter(|l| !l.starts_with('>')).count();
        assert_eq!(seq_lines, 5);
    }
}
