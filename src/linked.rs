//! Linked DDG encoding: the whole tree linearised into one cell array.

use log::debug;

use crate::ddg::{Depth, Outcome, Plan};
use crate::error::WeightError;
use crate::flat::FlatTree;
use crate::flip::Flip;
use crate::weights::{Weight, Weights};

/// One node of a [`LinkedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Internal node; its children are cells `first` and `first + 1`.
    Branch(u32),
    Leaf(Outcome),
}

/// DDG tree stored as `2L - 1` cells in level order (for `L` leaves), root
/// at cell 0.
///
/// Sampling follows child links directly, so no per-level bookkeeping is
/// needed during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedTree {
    cells: Vec<Cell>,
    outcomes: usize,
}

impl LinkedTree {
    /// Build the tree for `weights` with the given depth policy.
    ///
    /// # Errors
    /// Same as [`FlatTree::new`], plus [`WeightError::TooMany`] if the cell
    /// array cannot be addressed with `u32`.
    pub fn new<W: Weight>(weights: &[W], depth: Depth) -> Result<Self, WeightError> {
        let plan = Plan::new(Weights::validate(weights, |_| u32::MAX)?, depth);
        let tree = Self::link(plan.levels(), plan.leaf_count(), plan.outcomes())?;
        debug!(
            "linked ddg: n={} depth={} cells={} bytes={}",
            tree.outcomes,
            plan.depth,
            tree.cells.len(),
            tree.bytes()
        );
        Ok(tree)
    }

    pub fn fldr<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        Self::new(weights, Depth::Fldr)
    }

    pub fn aldr<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        Self::new(weights, Depth::Aldr)
    }

    /// Lay out the levels so that the children of every internal node sit
    /// next to each other at the start of the following level's free slots.
    fn link<L, I>(levels: L, leaf_count: usize, outcomes: usize) -> Result<Self, WeightError>
    where
        L: Iterator<Item = I>,
        I: Iterator<Item = Outcome>,
    {
        let total = 2 * leaf_count - 1;
        if u32::try_from(total).is_err() {
            return Err(WeightError::TooMany { len: outcomes });
        }

        let mut cells = Vec::with_capacity(total);
        // One past the last slot of the level being filled.
        let mut level_end = 1;
        for level in levels {
            cells.extend(level.map(Cell::Leaf));
            let mut next = level_end;
            while cells.len() < level_end {
                cells.push(Cell::Branch(next as u32));
                next += 2;
            }
            level_end = next;
        }
        debug_assert_eq!(cells.len(), total);
        Ok(Self { cells, outcomes })
    }

    /// Draw an index in `0..len()`.
    ///
    /// A reject leaf restarts at the root, consuming bits exactly as a
    /// [`FlatTree`] walk on the same tree does.
    pub fn sample_index<F: Flip + ?Sized>(&self, bits: &mut F) -> usize {
        let mut at = 0;
        loop {
            match self.cells[at] {
                Cell::Branch(first) => at = first as usize + usize::from(bits.flip()),
                Cell::Leaf(Outcome::Emit(i)) => return i as usize,
                Cell::Leaf(Outcome::Reject) => at = 0,
            }
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes == 0
    }

    /// Size of the owned buffer in bytes.
    pub fn bytes(&self) -> usize {
        std::mem::size_of_val(self.cells.as_slice())
    }
}

impl TryFrom<&FlatTree> for LinkedTree {
    type Error = WeightError;

    /// Re-linearise an existing flat tree.
    fn try_from(flat: &FlatTree) -> Result<Self, Self::Error> {
        Self::link(flat.levels(), flat.leaves().len(), flat.len())
    }
}
