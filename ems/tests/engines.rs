//! Cross-engine properties: every engine must produce the same sorted motif
//! list, and that list must agree with an exhaustive Wagner–Fischer oracle.

use ems::alphabet::{Encoder, SIGMA};
use ems::distance::edit_distance;
use ems::engine::{build, MotifEngine, Params, Version};
use ems::neighborhood::length_range;
use ems::{Seq, Sequence};
use ems_generate::{instance_with_seed, GenerateArgs};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ALL_VERSIONS: [Version; 4] = [
    Version::Brute,
    Version::Trie,
    Version::SimpleTrie,
    Version::Parallel,
];

fn engines(l: usize, d: usize) -> Vec<Box<dyn MotifEngine>> {
    let params = Params { l, d, threads: 3 };
    ALL_VERSIONS
        .iter()
        .map(|&v| build(v, &params).expect("engine"))
        .collect()
}

fn encode_all(seqs: &[&str]) -> Vec<Sequence> {
    let enc = Encoder::new();
    seqs.iter().map(|s| enc.encode(s)).collect()
}

fn all_motifs(l: usize) -> Vec<Sequence> {
    let mut out: Vec<Sequence> = vec![Vec::new()];
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

fn within(seq: Seq, motif: Seq, l: usize, d: usize) -> bool {
    length_range(l, d, seq.len())
        .any(|k| (0..=seq.len() - k).any(|i| edit_distance(&seq[i..i + k], motif) <= d))
}

/// Exhaustive oracle over all `SIGMA^l` candidate motifs.
fn oracle(seqs: &[Sequence], l: usize, d: usize) -> Vec<Sequence> {
    all_motifs(l)
        .into_iter()
        .filter(|m| seqs.iter().all(|s| within(s, m, l, d)))
        .collect()
}

fn assert_all_engines_equal(seqs: &[Sequence], l: usize, d: usize) -> Vec<Sequence> {
    let mut results = engines(l, d)
        .iter()
        .map(|e| (e.name(), e.search(seqs)))
        .collect::<Vec<_>>();
    let (_, first) = results.remove(0);
    for (name, result) in results {
        assert_eq!(result, first, "{name} disagrees (l={l}, d={d})");
    }
    assert!(
        first.windows(2).all(|w| w[0] < w[1]),
        "output not strictly ascending"
    );
    first
}

#[test]
fn exact_windows_single_sequence() {
    // l=3, d=0 over ACGT: exactly the two 3-mers
    let seqs = encode_all(&["ACGT"]);
    let motifs = assert_all_engines_equal(&seqs, 3, 0);
    assert_eq!(motifs, encode_all(&["ACG", "CGT"]));
}

#[test]
fn one_edit_pair_matches_oracle() {
    let seqs = encode_all(&["ACG", "CGT"]);
    let motifs = assert_all_engines_equal(&seqs, 3, 1);
    assert_eq!(motifs, oracle(&seqs, 3, 1));
    for motif in &motifs {
        for seq in &seqs {
            assert!(within(seq, motif, 3, 1), "unsound motif in output");
        }
    }
}

#[test]
fn incompatible_sequences_yield_nothing() {
    // a 4-mer within one edit of a run of A's needs three A's; likewise for
    // C's, so the candidate sets cannot overlap
    let seqs = encode_all(&["AAAAAA", "CCCCCC"]);
    let motifs = assert_all_engines_equal(&seqs, 4, 1);
    assert!(motifs.is_empty());
}

#[test]
fn homopolymer_ball_has_closed_form_size() {
    // |{y : |y|=5, ed(y, AAAAA) <= 2}| = C(5,0) + 3 C(5,1) + 9 C(5,2) = 106
    let seqs = encode_all(&["AAAAA", "AAAAA"]);
    let motifs = assert_all_engines_equal(&seqs, 5, 2);
    assert_eq!(motifs.len(), 106);
    assert_eq!(motifs, oracle(&seqs, 5, 2));
}

#[test]
fn random_instances_match_oracle() {
    let mut rng = ChaCha8Rng::seed_from_u64(31415);
    for _ in 0..8 {
        let l = rng.gen_range(2..=4);
        let d = rng.gen_range(0..=2);
        let n = rng.gen_range(1..=3);
        let m = rng.gen_range(l.max(3)..=l + d + 5);
        let seqs: Vec<Sequence> = (0..n)
            .map(|_| (0..m).map(|_| rng.gen_range(0..SIGMA as u8)).collect())
            .collect();
        let motifs = assert_all_engines_equal(&seqs, l, d);
        assert_eq!(motifs, oracle(&seqs, l, d), "l={l} d={d} seqs={seqs:?}");
    }
}

#[test]
fn planted_consensus_is_recovered() {
    let args = GenerateArgs {
        cnt: 5,
        length: 50,
        motif_length: 6,
        edits: 1,
        seed: None,
        output: None,
    };
    let instance = instance_with_seed(&args, 2024);
    let enc = Encoder::new();
    let seqs: Vec<Sequence> = instance.sequences.iter().map(|s| enc.encode(s)).collect();
    let consensus = enc.encode(&instance.consensus);
    let motifs = assert_all_engines_equal(&seqs, 6, 1);
    assert!(
        motifs.contains(&consensus),
        "planted consensus missing from output"
    );
}

#[test]
fn brute_and_parallel_agree_on_a_noisier_instance() {
    let args = GenerateArgs {
        cnt: 4,
        length: 60,
        motif_length: 7,
        edits: 2,
        seed: None,
        output: None,
    };
    let instance = instance_with_seed(&args, 99);
    let enc = Encoder::new();
    let seqs: Vec<Sequence> = instance.sequences.iter().map(|s| enc.encode(s)).collect();
    let params = Params {
        l: 7,
        d: 2,
        threads: 4,
    };
    let brute = build(Version::Brute, &params).expect("engine").search(&seqs);
    let parallel = build(Version::Parallel, &params)
        .expect("engine")
        .search(&seqs);
    assert_eq!(brute, parallel);
    assert!(brute.contains(&enc.encode(&instance.consensus)));
}

#[test]
fn parallel_results_are_reproducible() {
    let seqs = encode_all(&["ACGTACGTAC", "TACGTTACGA", "CGTACCGTAA"]);
    let first = build(Version::Parallel, &Params { l: 4, d: 1, threads: 2 })
        .expect("engine")
        .search(&seqs);
    for threads in [1, 3, 5] {
        let again = build(Version::Parallel, &Params { l: 4, d: 1, threads })
            .expect("engine")
            .search(&seqs);
        assert_eq!(again, first, "threads={threads}");
    }
}
