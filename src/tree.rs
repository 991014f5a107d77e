//! A set of leaf frags that always tiles the whole space.
//!
//! This is the shape a sharded directory or hash-partitioned collection keeps:
//! each leaf owns the values it contains, a hot leaf is split into `2^by`
//! pieces, and a cold subtree is merged back into one frag.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{FragError, FragResult};
use crate::{Frag, SPACE_SIZE};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragTree {
    /// Ordered logically, so a frag's descendants follow it contiguously.
    leaves: BTreeSet<Frag>,
}

impl FragTree {
    /// A tree with the root as its only leaf.
    pub fn new() -> Self {
        Self {
            leaves: BTreeSet::from([Frag::ROOT]),
        }
    }

    /// Rebuilds a tree from stored leaves, checking that they tile the space.
    pub fn from_leaves(leaves: impl IntoIterator<Item = Frag>) -> FragResult<Self> {
        let tree = Self {
            leaves: leaves.into_iter().collect(),
        };
        tree.verify()?;
        Ok(tree)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_leaf(&self, frag: Frag) -> bool {
        self.leaves.contains(&frag)
    }

    /// Leaves in logical order.
    pub fn leaves(&self) -> impl Iterator<Item = Frag> + '_ {
        self.leaves.iter().copied()
    }

    /// The unique leaf containing the 24-bit `value`.
    pub fn leaf_for(&self, value: u32) -> Frag {
        // No leaf sorts after the point frag of a value it contains, and the
        // nearest leaf at or before it is the one that contains it.
        match self.leaves.range(..=Frag::point(value)).next_back() {
            Some(&leaf) => {
                debug_assert!(leaf.contains_value(value));
                leaf
            }
            None => panic!("leaf set does not cover value {value:#08x}"),
        }
    }

    /// The leaf that `frag` lies within, if `frag` has not been split further.
    pub fn covering_leaf(&self, frag: Frag) -> Option<Frag> {
        let leaf = self.leaf_for(frag.value());
        leaf.contains(frag).then_some(leaf)
    }

    /// Leaves inside `frag`, or the single leaf covering it.
    pub fn leaves_under(&self, frag: Frag) -> Vec<Frag> {
        if let Some(leaf) = self.covering_leaf(frag) {
            return vec![leaf];
        }
        self.leaves
            .range(frag..)
            .take_while(|leaf| frag.contains(**leaf))
            .copied()
            .collect()
    }

    /// Replaces the leaf `frag` with its `2^by` children and returns them.
    pub fn split(&mut self, frag: Frag, by: u32) -> FragResult<Vec<Frag>> {
        if by == 0 {
            return Err(FragError::EmptySplit);
        }
        if !self.is_leaf(frag) {
            return Err(FragError::NotALeaf(frag));
        }
        let children: Vec<Frag> = frag.children(by)?.collect();

        self.leaves.remove(&frag);
        self.leaves.extend(children.iter().copied());
        debug!(frag = %frag, by, leaves = self.leaves.len(), "split frag");
        Ok(children)
    }

    /// Collapses every leaf under `frag` into `frag` and returns the leaves
    /// removed. Merging a frag that is already a leaf removes nothing.
    pub fn merge(&mut self, frag: Frag) -> FragResult<Vec<Frag>> {
        if let Some(leaf) = self.covering_leaf(frag) {
            if leaf == frag {
                return Ok(Vec::new());
            }
            return Err(FragError::Covered { frag, leaf });
        }

        let removed = self.leaves_under(frag);
        for leaf in &removed {
            self.leaves.remove(leaf);
        }
        self.leaves.insert(frag);
        debug!(
            frag = %frag,
            merged = removed.len(),
            leaves = self.leaves.len(),
            "merged frag"
        );
        Ok(removed)
    }

    /// Checks that the leaves tile the space with no gaps or overlaps.
    pub fn verify(&self) -> FragResult<()> {
        let mut expected = 0u32;
        for leaf in &self.leaves {
            if leaf.value() != expected {
                return Err(FragError::Gap(*leaf));
            }
            expected = leaf.value() + (SPACE_SIZE >> leaf.depth());
        }
        if expected != SPACE_SIZE {
            let last = self.leaves.last().copied().unwrap_or(Frag::ROOT);
            return Err(FragError::Gap(last));
        }
        Ok(())
    }
}

impl Default for FragTree {
    fn default() -> Self {
        Self::new()
    }
}
