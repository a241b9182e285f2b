//! # exactdraw
//!
//! Exact, entropy-efficient sampling from integer-weighted discrete
//! distributions.
//!
//! Outcome `i` is drawn with probability exactly `weight[i] / Σ weights`;
//! no floating point is involved anywhere on the sampling path. Randomness
//! is consumed as individual fair bits through [`Flip`], so the cost of a
//! draw can be measured in bits and compared with the Shannon entropy.
//!
//! Three samplers are provided:
//!
//! 1. [`FlatTree`]: a Knuth–Yao style DDG tree stored as per-level leaf
//!    counts plus a flat leaf array.
//! 2. [`LinkedTree`]: the same tree linearised into one array of
//!    [`Cell`]s that the walk follows by offset.
//! 3. [`AliasTable`]: Vose's alias method over integer odds, sampled with
//!    an exact uniform draw and an exact rational coin.
//!
//! The trees come in two depths, chosen with [`Depth`]: `Fldr` (depth equal
//! to the bit length of the weight sum) and `Aldr` (twice that, which keeps
//! the expected bit cost within two bits of the entropy).
//!
//! ## Quick start
//!
//! ```rust
//! use exactdraw::{FlatTree, Flipper};
//!
//! let tree = FlatTree::aldr(&[1u32, 2, 3]).unwrap();
//! let mut bits = Flipper::from_thread_rng();
//! let i = tree.sample_index(&mut bits);
//! assert!(i < 3);
//! ```
//!
//! ## Items and enums
//!
//! ```rust,ignore
//! use exactdraw::{AliasTable, WeightedEnum, with_thread_flipper};
//!
//! #[derive(Copy, Clone, Debug, WeightedEnum)]
//! enum Loot {
//!     #[weight(60)] Common,
//!     #[weight(30)] Uncommon,
//!     #[weight(9)]  Rare,
//!     #[weight(1)]  Legendary,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = Loot::droptable()?;
//! let item = with_thread_flipper(|bits| table.sample_owned(bits));
//! # Ok(()) }
//! ```
//!
//! ## Performance
//! * **Build**: O(n) for the alias table, O(n·K) for the trees.
//! * **Sample**: one bit per tree level; the alias table spends a uniform
//!   draw and a Bernoulli draw.
//! * **Space**: see each sampler's `bytes()`.
//!
//! ## Gotchas
//! * Weights must be non-negative, not all zero, and sum to at most
//!   `u32::MAX`; the alias table further caps each weight at `u32::MAX / n`.
//! * This is for *fixed* distributions. If weights change, rebuild.
//! * A [`Flipper`] is single-owner state; give each thread its own (or use
//!   [`with_thread_flipper`]).

#![forbid(unsafe_code)]

mod alias;
mod ddg;
mod error;
mod flat;
mod flip;
mod linked;
mod sampler;
mod staticdt;
pub mod stats;
mod weights;

/// A minimal interface for "index samplers".
#[allow(clippy::len_without_is_empty)]
pub trait IndexSampler {
    fn len(&self) -> usize;
    fn sample_index<F: Flip + ?Sized>(&self, bits: &mut F) -> usize;
}

/// Samplers that can be built from a weight vector alone.
pub trait FromWeights: Sized {
    fn from_weights<W: Weight>(weights: &[W]) -> Result<Self, WeightError>;
}

pub use alias::AliasTable;
pub use ddg::{Depth, Outcome};
pub use error::WeightError;
pub use flat::FlatTree;
pub use flip::{Flip, Flipper, with_thread_flipper};
pub use linked::{Cell, LinkedTree};
pub use sampler::UniformSampler;
pub use staticdt::StaticDropTable;
pub use weights::Weight;

/// Derive macro imported from `exactdraw_macros`.
/// See the crate-level example for usage.
pub use exactdraw_macros::WeightedEnum;

/// A generic "drop table": associates items with weights and samples them
/// through any [`IndexSampler`].
#[derive(Debug, Clone)]
pub struct DropTable<T, S = AliasTable> {
    sampler: S,
    items: Vec<T>,
}

/// Trait implemented by the `WeightedEnum` derive macro.
///
/// Variants and their integer weights are exposed in declaration order,
/// which enables building a ready-to-sample [`StaticDropTable`].
pub trait WeightedEnum: Sized + 'static {
    const VARIANTS: &'static [Self];
    const WEIGHTS: &'static [u32];

    /// Build a table over the variants with the sampler of your choice.
    ///
    /// # Errors
    /// See [`WeightError`]: all-zero weights are rejected, and the alias
    /// table rejects weights above `u32::MAX / n`.
    fn droptable_with<S: FromWeights + IndexSampler>()
    -> Result<StaticDropTable<S, Self>, WeightError> {
        let sampler = S::from_weights(Self::WEIGHTS)?;
        Ok(StaticDropTable::new(sampler, Self::VARIANTS))
    }
}

impl<T, S: FromWeights + IndexSampler> DropTable<T, S> {
    /// Build from any `(item, weight)` iterator.
    ///
    /// # Errors
    /// Whatever `S` rejects; see [`WeightError`].
    pub fn from_pairs<I, W>(pairs: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (T, W)>,
        W: Weight,
    {
        let (items, weights): (Vec<T>, Vec<W>) = pairs.into_iter().unzip();
        let sampler = S::from_weights(&weights)?;
        Ok(Self { sampler, items })
    }
}

impl<T, S: IndexSampler> DropTable<T, S> {
    /// Sample an item **by reference** (no `Clone` bound).
    pub fn sample<F: Flip + ?Sized>(&self, bits: &mut F) -> &T {
        let idx = self.sampler.sample_index(bits);
        &self.items[idx]
    }

    /// Sample an item **by value** (clones the chosen element).
    pub fn sample_owned<F: Flip + ?Sized>(&self, bits: &mut F) -> T
    where
        T: Clone,
    {
        self.items[self.sampler.sample_index(bits)].clone()
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
