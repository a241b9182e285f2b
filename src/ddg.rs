//! Leaf placement shared by both tree encodings.
//!
//! Every weight is rescaled to a `K`-bit fraction of `2^K`: with
//! `c = 2^K div m` and `r = 2^K mod m`, outcome `i` owns mass `c * w_i` and
//! the leftover `r` becomes reject mass. Each set bit `2^(K - j)` of those
//! numbers is one leaf at level `j` of a complete binary tree of depth `K`.

use crate::weights::Weights;

/// Tree depth policy.
///
/// `Fldr` uses the bit length `k` of the weight sum as depth; `Aldr` uses
/// `2k`, which costs a larger table but keeps the expected number of bits
/// per sample within two of the entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Depth {
    Fldr,
    #[default]
    Aldr,
}

impl Depth {
    pub const fn multiplier(self) -> u32 {
        match self {
            Depth::Fldr => 1,
            Depth::Aldr => 2,
        }
    }
}

/// What a leaf does when the walk lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Discard the walk and start over at the root.
    Reject,
    Emit(u32),
}

impl Outcome {
    /// Packed form used by the flat encoding: 0 rejects, `i + 1` emits `i`.
    #[inline]
    pub const fn tag(self) -> u32 {
        match self {
            Outcome::Reject => 0,
            Outcome::Emit(i) => i + 1,
        }
    }

    #[inline]
    pub const fn from_tag(tag: u32) -> Self {
        match tag {
            0 => Outcome::Reject,
            t => Outcome::Emit(t - 1),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Plan {
    weights: Vec<u32>,
    /// Tree depth `K`.
    pub(crate) depth: u32,
    amplify: u128,
    reject: u128,
}

impl Plan {
    pub(crate) fn new(weights: Weights, policy: Depth) -> Self {
        let m = weights.sum;
        // An exact power of two needs one bit less than its bit length.
        let k = u32::BITS - m.leading_zeros() - u32::from(m.is_power_of_two());
        let depth = k * policy.multiplier();
        let full = 1u128 << depth;
        let m = u128::from(m);
        Self {
            weights: weights.values,
            depth,
            amplify: full / m,
            reject: full % m,
        }
    }

    pub(crate) fn outcomes(&self) -> usize {
        self.weights.len()
    }

    pub(crate) fn leaf_count(&self) -> usize {
        let emit: u32 = self
            .weights
            .iter()
            .map(|&w| (self.amplify * u128::from(w)).count_ones())
            .sum();
        (self.reject.count_ones() + emit) as usize
    }

    /// Leaves at level `j`, left to right: the reject leaf first, then
    /// outcomes in index order.
    pub(crate) fn level(&self, j: u32) -> impl Iterator<Item = Outcome> + '_ {
        let bit = 1u128 << (self.depth - j);
        let reject = (self.reject & bit != 0).then_some(Outcome::Reject);
        let emits = self
            .weights
            .iter()
            .enumerate()
            .filter(move |&(_, &w)| (self.amplify * u128::from(w)) & bit != 0)
            .map(|(i, _)| Outcome::Emit(i as u32));
        reject.into_iter().chain(emits)
    }

    pub(crate) fn levels(&self) -> impl Iterator<Item = impl Iterator<Item = Outcome> + '_> + '_ {
        (0..=self.depth).map(move |j| self.level(j))
    }
}
