//! Sharing-mask candidate tries and the trie-intersection engines.
//!
//! Both trie variants represent a set of length-`l` motifs as the union over
//! root-to-leaf paths of the Cartesian product of the letters in each edge's
//! sharing mask. A WILDCARD insertion touches one physical subtree instead of
//! `SIGMA`, which is what keeps per-sequence candidate sets tractable.

use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::alphabet::{letter_mask, ALPHABET_MASK, SIGMA, WILDCARD};
use crate::engine::MotifEngine;
use crate::neighborhood::{CandidateSink, Neighborhood};
use crate::{Seq, Sequence};

type NodeId = u32;
const ROOT: NodeId = 0;

/// Behavior shared by the two trie representations.
pub trait MotifTrie {
    fn with_len(l: usize) -> Self;
    /// Inserts a candidate; WILDCARD positions cover every letter at once.
    fn insert(&mut self, motif: Seq);
    /// The represented-set intersection, as a fresh trie.
    fn intersect(&self, other: &Self) -> Self;
    /// True when no motif is represented.
    fn is_empty(&self) -> bool;
    /// Every represented motif, lexicographically sorted without duplicates.
    fn motifs(&self) -> Vec<Sequence>;
}

/// Slot-array trie ("fast" variant, engine 2).
///
/// Each node holds one child slot per letter; several slots may point to the
/// same physical child, whose `sharing` mask records exactly which slots do.
/// Sibling masks are pairwise disjoint, and nodes are never reachable from
/// more than one parent, so a subtree can be mutated through any of its slots
/// without affecting unrelated prefixes.
pub struct FastTrie {
    l: usize,
    nodes: Vec<FastNode>,
}

#[derive(Clone)]
struct FastNode {
    /// Letters whose parent slot leads here.
    sharing: u8,
    children: [Option<NodeId>; SIGMA],
}

impl FastTrie {
    fn node(&self, id: NodeId) -> &FastNode {
        &self.nodes[id as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut FastNode {
        &mut self.nodes[id as usize]
    }

    fn alloc(&mut self, sharing: u8) -> NodeId {
        self.nodes.push(FastNode {
            sharing,
            children: [None; SIGMA],
        });
        (self.nodes.len() - 1) as NodeId
    }

    /// Distinct physical children of `id`, in first-slot order.
    fn distinct_children(&self, id: NodeId) -> SmallVec<[NodeId; SIGMA]> {
        let mut out = SmallVec::new();
        for child in self.node(id).children.iter().flatten() {
            if !out.contains(child) {
                out.push(*child);
            }
        }
        out
    }

    fn insert_at(&mut self, node: NodeId, motif: Seq, depth: usize) {
        let Some(&c) = motif.get(depth) else {
            return;
        };
        if c == WILDCARD {
            let existing = self.distinct_children(node);
            let mut covered = 0u8;
            for &child in &existing {
                covered |= self.node(child).sharing;
                self.insert_at(child, motif, depth + 1);
            }
            let remaining = ALPHABET_MASK & !covered;
            if remaining != 0 {
                let fresh = self.alloc(remaining);
                for j in 0..SIGMA {
                    if remaining & (1 << j) != 0 {
                        self.node_mut(node).children[j] = Some(fresh);
                    }
                }
                self.insert_at(fresh, motif, depth + 1);
            }
        } else {
            let bit = 1u8 << c;
            let slot = c as usize;
            match self.node(node).children[slot] {
                None => {
                    let fresh = self.alloc(bit);
                    self.node_mut(node).children[slot] = Some(fresh);
                    self.insert_at(fresh, motif, depth + 1);
                }
                Some(child) if self.node(child).sharing == bit => {
                    self.insert_at(child, motif, depth + 1);
                }
                Some(child) => {
                    // Split: peel letter `c` off the shared subtree. The copy
                    // keeps the subtree's strings reachable through `c`; the
                    // original keeps the remaining letters' paths untouched.
                    let copy = self.clone_subtree(child);
                    self.node_mut(copy).sharing = bit;
                    self.node_mut(child).sharing &= !bit;
                    self.node_mut(node).children[slot] = Some(copy);
                    self.insert_at(copy, motif, depth + 1);
                }
            }
        }
    }

    /// Copies the physical subtree below `id`. Slots of one node that share a
    /// child keep sharing the copied child, so the shape is preserved and the
    /// cost is the physical node count, not the represented string count.
    fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let src = self.node(id).clone();
        let mut children = [None; SIGMA];
        let mut copied: SmallVec<[(NodeId, NodeId); SIGMA]> = SmallVec::new();
        for j in 0..SIGMA {
            if let Some(old) = src.children[j] {
                let new = match copied.iter().find(|(o, _)| *o == old) {
                    Some(&(_, n)) => n,
                    None => {
                        let n = self.clone_subtree(old);
                        copied.push((old, n));
                        n
                    }
                };
                children[j] = Some(new);
            }
        }
        self.nodes.push(FastNode {
            sharing: src.sharing,
            children,
        });
        (self.nodes.len() - 1) as NodeId
    }

    fn intersect_at(
        &self,
        a: NodeId,
        other: &FastTrie,
        b: NodeId,
        depth: usize,
        out: &mut FastTrie,
        dst: NodeId,
    ) {
        if depth == self.l {
            return;
        }
        for &ca in &self.distinct_children(a) {
            for &cb in &other.distinct_children(b) {
                let common = self.node(ca).sharing & other.node(cb).sharing;
                if common == 0 {
                    continue;
                }
                let child = out.alloc(common);
                self.intersect_at(ca, other, cb, depth + 1, out, child);
                if depth + 1 == self.l || out.node(child).children.iter().any(Option::is_some) {
                    for j in 0..SIGMA {
                        if common & (1 << j) != 0 {
                            out.node_mut(dst).children[j] = Some(child);
                        }
                    }
                }
                // an empty interior result stays orphaned in the arena
            }
        }
    }

    fn walk(&self, id: NodeId, depth: usize, buf: &mut Sequence, out: &mut Vec<Sequence>) {
        if depth == self.l {
            out.push(buf.clone());
            return;
        }
        for j in 0..SIGMA {
            if let Some(child) = self.node(id).children[j] {
                buf.push(j as u8);
                self.walk(child, depth + 1, buf, out);
                buf.pop();
            }
        }
    }
}

impl MotifTrie for FastTrie {
    fn with_len(l: usize) -> Self {
        Self {
            l,
            nodes: vec![FastNode {
                sharing: 0,
                children: [None; SIGMA],
            }],
        }
    }

    fn insert(&mut self, motif: Seq) {
        debug_assert_eq!(motif.len(), self.l);
        self.insert_at(ROOT, motif, 0);
    }

    fn intersect(&self, other: &Self) -> Self {
        let mut out = FastTrie::with_len(self.l);
        self.intersect_at(ROOT, other, ROOT, 0, &mut out, ROOT);
        out
    }

    fn is_empty(&self) -> bool {
        self.node(ROOT).children.iter().all(Option::is_none)
    }

    fn motifs(&self) -> Vec<Sequence> {
        // slot order is letter order and slots are per-letter unique, so the
        // walk is already sorted and duplicate-free
        let mut out = Vec::new();
        self.walk(ROOT, 0, &mut Vec::with_capacity(self.l), &mut out);
        out
    }
}

/// Child-list trie ("simple" variant, engine 2m).
///
/// Children are kept as a list of (mask, node) edges in insertion order. An
/// insertion reuses an edge only on an exact mask match and never splits, so
/// sibling masks may overlap; the represented set is the union over all
/// edges, and traversal deduplicates.
pub struct SimpleTrie {
    l: usize,
    nodes: Vec<SimpleNode>,
}

#[derive(Clone, Copy)]
struct SimpleEdge {
    mask: u8,
    node: NodeId,
}

#[derive(Default)]
struct SimpleNode {
    children: SmallVec<[SimpleEdge; SIGMA]>,
}

impl SimpleTrie {
    fn node(&self, id: NodeId) -> &SimpleNode {
        &self.nodes[id as usize]
    }

    fn alloc(&mut self) -> NodeId {
        self.nodes.push(SimpleNode::default());
        (self.nodes.len() - 1) as NodeId
    }

    fn intersect_at(
        &self,
        a: NodeId,
        other: &SimpleTrie,
        b: NodeId,
        depth: usize,
        out: &mut SimpleTrie,
        dst: NodeId,
    ) {
        if depth == self.l {
            return;
        }
        for &ea in &self.node(a).children {
            for &eb in &other.node(b).children {
                let common = ea.mask & eb.mask;
                if common == 0 {
                    continue;
                }
                let child = out.alloc();
                self.intersect_at(ea.node, other, eb.node, depth + 1, out, child);
                if depth + 1 == self.l || !out.node(child).children.is_empty() {
                    out.nodes[dst as usize].children.push(SimpleEdge {
                        mask: common,
                        node: child,
                    });
                }
            }
        }
    }

    fn walk(&self, id: NodeId, depth: usize, buf: &mut Sequence, out: &mut Vec<Sequence>) {
        if depth == self.l {
            out.push(buf.clone());
            return;
        }
        for j in 0..SIGMA as u8 {
            for e in &self.node(id).children {
                if e.mask & (1 << j) != 0 {
                    buf.push(j);
                    self.walk(e.node, depth + 1, buf, out);
                    buf.pop();
                }
            }
        }
    }
}

impl MotifTrie for SimpleTrie {
    fn with_len(l: usize) -> Self {
        Self {
            l,
            nodes: vec![SimpleNode::default()],
        }
    }

    fn insert(&mut self, motif: Seq) {
        debug_assert_eq!(motif.len(), self.l);
        let mut cur = ROOT;
        for &c in motif {
            let mask = letter_mask(c);
            // first-fit on stable insertion order
            let found = self
                .node(cur)
                .children
                .iter()
                .find(|e| e.mask == mask)
                .map(|e| e.node);
            cur = match found {
                Some(next) => next,
                None => {
                    let fresh = self.alloc();
                    self.nodes[cur as usize]
                        .children
                        .push(SimpleEdge { mask, node: fresh });
                    fresh
                }
            };
        }
    }

    fn intersect(&self, other: &Self) -> Self {
        let mut out = SimpleTrie::with_len(self.l);
        self.intersect_at(ROOT, other, ROOT, 0, &mut out, ROOT);
        out
    }

    fn is_empty(&self) -> bool {
        self.node(ROOT).children.is_empty()
    }

    fn motifs(&self) -> Vec<Sequence> {
        // overlapping sibling masks can reach the same motif twice
        let mut out = Vec::new();
        self.walk(ROOT, 0, &mut Vec::with_capacity(self.l), &mut out);
        out.sort();
        out.dedup();
        out
    }
}

/// Engines 2 and 2m: build a candidate trie per sequence and intersect it
/// into the running main trie, stopping as soon as the intersection empties.
pub struct TrieEngine<T: MotifTrie> {
    name: &'static str,
    l: usize,
    d: usize,
    _tree: PhantomData<T>,
}

impl TrieEngine<FastTrie> {
    pub fn fast(l: usize, d: usize) -> Self {
        Self {
            name: "ems2",
            l,
            d,
            _tree: PhantomData,
        }
    }
}

impl TrieEngine<SimpleTrie> {
    pub fn simple(l: usize, d: usize) -> Self {
        Self {
            name: "ems2m",
            l,
            d,
            _tree: PhantomData,
        }
    }
}

struct TrieSink<'a, T: MotifTrie> {
    tree: &'a mut T,
}

impl<T: MotifTrie> CandidateSink for TrieSink<'_, T> {
    fn emit(&mut self, candidate: Seq) {
        self.tree.insert(candidate);
    }
}

impl<T: MotifTrie> MotifEngine for TrieEngine<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn search(&self, seqs: &[Sequence]) -> Vec<Sequence> {
        let Some((first, rest)) = seqs.split_first() else {
            return Vec::new();
        };
        let mut nbhd = Neighborhood::new(self.l, self.d, false);
        let mut main = T::with_len(self.l);
        log::debug!("{}: processing sequence 1", self.name);
        nbhd.of_sequence(first, &mut TrieSink { tree: &mut main });
        for (i, seq) in rest.iter().enumerate() {
            log::debug!("{}: processing sequence {}", self.name, i + 2);
            let mut tmp = T::with_len(self.l);
            nbhd.of_sequence(seq, &mut TrieSink { tree: &mut tmp });
            main = main.intersect(&tmp);
            if main.is_empty() {
                log::info!("{}: no common motifs after sequence {}", self.name, i + 2);
                return Vec::new();
            }
        }
        main.motifs()
    }
}
