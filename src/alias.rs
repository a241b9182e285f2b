//! Exact alias method (Vose) over integer odds.

use log::debug;

use crate::error::WeightError;
use crate::flip::Flip;
use crate::weights::{Weight, Weights};

/// Marks the end of a list threaded through [`Aliases`].
const NIL: u32 = u32::MAX;

/// One buffer of `n` slots holding three structures at once: the list of
/// small indices, the list of big indices, and the finished alias map.
///
/// Every index is in exactly one of them at any time. While `i` is queued,
/// `slots[i]` is the next index of its list; once it is assigned an alias,
/// `slots[i]` is that alias. When both lists are drained the buffer is the
/// alias array, with no second allocation.
struct Aliases {
    slots: Vec<u32>,
    smalls: u32,
    bigs: u32,
}

impl Aliases {
    fn new(n: usize) -> Self {
        Self {
            slots: vec![NIL; n],
            smalls: NIL,
            bigs: NIL,
        }
    }

    fn push_small(&mut self, idx: u32) {
        self.slots[idx as usize] = self.smalls;
        self.smalls = idx;
    }

    fn push_big(&mut self, idx: u32) {
        self.slots[idx as usize] = self.bigs;
        self.bigs = idx;
    }

    fn pop_small(&mut self) -> Option<u32> {
        let idx = self.smalls;
        (idx != NIL).then(|| {
            self.smalls = self.slots[idx as usize];
            idx
        })
    }

    fn pop_big(&mut self) -> Option<u32> {
        let idx = self.bigs;
        (idx != NIL).then(|| {
            self.bigs = self.slots[idx as usize];
            idx
        })
    }

    fn set_alias(&mut self, idx: u32, alias: u32) {
        self.slots[idx as usize] = alias;
    }

    fn into_aliases(self) -> Vec<u32> {
        debug_assert!(self.smalls == NIL && self.bigs == NIL);
        self.slots
    }
}

/// Alias table with exact integer mixing odds.
///
/// Bucket `i` returns `i` with probability `no_alias_odds[i] / weight_sum`
/// and `alias[i]` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<u32>,
    no_alias_odds: Vec<u32>,
    weight_sum: u32,
}

impl AliasTable {
    /// Construct an alias table from non-negative integer weights. O(n).
    ///
    /// # Errors
    /// * [`WeightError::Empty`] if there are no weights.
    /// * [`WeightError::TooMany`] if `n` does not fit in `u32`.
    /// * [`WeightError::Negative`] if any weight is negative.
    /// * [`WeightError::TooLarge`] if any weight exceeds `u32::MAX / n`.
    /// * [`WeightError::ZeroSum`] if every weight is zero.
    pub fn new<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        let weights = Weights::validate(weights, |n| u32::MAX / n as u32)?;
        let n = weights.len();
        let weight_sum = weights.sum;

        // The sum of weights stands for 100% of no-alias odds.
        let mut no_alias_odds: Vec<u32> = weights.values.iter().map(|&w| w * n as u32).collect();

        let mut aliases = Aliases::new(n);
        for (i, &odds) in no_alias_odds.iter().enumerate() {
            if odds < weight_sum {
                aliases.push_small(i as u32);
            } else {
                aliases.push_big(i as u32);
            }
        }

        // Each small bucket borrows its deficit from a big one.
        loop {
            let Some(small) = aliases.pop_small() else {
                break;
            };
            let Some(big) = aliases.pop_big() else {
                aliases.push_small(small);
                break;
            };
            aliases.set_alias(small, big);
            no_alias_odds[big as usize] -= weight_sum - no_alias_odds[small as usize];
            if no_alias_odds[big as usize] < weight_sum {
                aliases.push_small(big);
            } else {
                aliases.push_big(big);
            }
        }

        // Whatever is left is already exactly full.
        while let Some(i) = aliases.pop_small().or_else(|| aliases.pop_big()) {
            no_alias_odds[i as usize] = weight_sum;
            aliases.set_alias(i, i);
        }

        let table = Self {
            aliases: aliases.into_aliases(),
            no_alias_odds,
            weight_sum,
        };
        debug!("alias table: n={n} weight_sum={weight_sum} bytes={}", table.bytes());
        Ok(table)
    }

    /// Draw a single sample: one uniform bucket, one exact coin.
    pub fn sample_index<F: Flip + ?Sized>(&self, bits: &mut F) -> usize {
        let i = bits.uniform(self.aliases.len() as u32) as usize;
        if bits.bernoulli(self.no_alias_odds[i], self.weight_sum) {
            i
        } else {
            self.aliases[i] as usize
        }
    }

    pub fn aliases(&self) -> &[u32] {
        &self.aliases
    }

    pub fn no_alias_odds(&self) -> &[u32] {
        &self.no_alias_odds
    }

    pub fn weight_sum(&self) -> u32 {
        self.weight_sum
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Size of the owned buffers in bytes.
    pub fn bytes(&self) -> usize {
        std::mem::size_of_val(self.aliases.as_slice())
            + std::mem::size_of_val(self.no_alias_odds.as_slice())
    }

    /// Draw k samples, returning counts per index (useful for checks).
    #[cfg(test)]
    pub fn sample_counts<F: Flip + ?Sized>(&self, bits: &mut F, draws: usize) -> Vec<usize> {
        let mut counts = vec![0usize; self.len()];
        for _ in 0..draws {
            let i = self.sample_index(bits);
            counts[i] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::Flipper;
    use crate::flip::testing::Scripted;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Mass that bucket layout hands to each outcome, in units of
    /// `1 / (n * weight_sum)`.
    fn implied_mass(table: &AliasTable) -> Vec<u64> {
        let ws = u64::from(table.weight_sum());
        let mut mass: Vec<u64> = table.no_alias_odds().iter().map(|&o| u64::from(o)).collect();
        for (j, &a) in table.aliases().iter().enumerate() {
            mass[a as usize] += ws - u64::from(table.no_alias_odds()[j]);
        }
        mass
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(AliasTable::new::<u32>(&[]), Err(WeightError::Empty)));
        assert!(matches!(
            AliasTable::new(&[0, 0]),
            Err(WeightError::ZeroSum)
        ));
        assert!(matches!(
            AliasTable::new(&[-1, 2]),
            Err(WeightError::Negative { .. })
        ));
        assert!(matches!(
            AliasTable::new(&[u32::MAX / 2 + 1, 1]),
            Err(WeightError::TooLarge { index: 0, .. })
        ));
    }

    #[test]
    fn odds_are_exact() {
        for weights in [&[1u32, 2, 3, 4][..], &[5], &[0, 0, 7], &[9, 1, 1, 1, 0, 30]] {
            let table = AliasTable::new(weights).unwrap();
            let n = weights.len() as u64;
            let ws = u64::from(table.weight_sum());
            assert!(table.no_alias_odds().iter().all(|&o| o <= table.weight_sum()));
            assert!(table.aliases().iter().all(|&a| (a as usize) < weights.len()));

            let mass = implied_mass(&table);
            assert_eq!(mass.iter().sum::<u64>(), ws * n);
            for (i, &w) in weights.iter().enumerate() {
                assert_eq!(mass[i], u64::from(w) * n, "{weights:?} i={i}");
            }
        }
    }

    #[test]
    fn known_table() {
        // n = 2, sum 4: bucket 0 keeps 2/4 of itself, the rest goes to 1.
        let table = AliasTable::new(&[1, 3]).unwrap();
        assert_eq!(table.no_alias_odds(), &[2, 4]);
        assert_eq!(table.aliases(), &[1, 1]);
        assert_eq!(table.bytes(), 16);
    }

    #[test]
    fn scripted_draws() {
        let table = AliasTable::new(&[1, 3]).unwrap();
        // Bucket 0, then the 2/4 coin comes up alias.
        let mut s = Scripted::new(&[0, 0]);
        assert_eq!(table.sample_index(&mut s), 1);
        // Bucket 0, coin keeps it.
        let mut s = Scripted::new(&[0, 1]);
        assert_eq!(table.sample_index(&mut s), 0);
        // Bucket 1 is full and never consults its coin.
        let mut s = Scripted::new(&[1]);
        assert_eq!(table.sample_index(&mut s), 1);
        assert_eq!(s.used(), 1);
    }

    #[test]
    fn roughly_matches_distribution() {
        let weights = [1u32, 2, 3, 4];
        let alias = AliasTable::new(&weights).unwrap();

        let mut f = Flipper::new(Pcg32::seed_from_u64(42));
        let draws = 40_000usize;
        let counts = alias.sample_counts(&mut f, draws);

        let sum_w: u32 = weights.iter().sum();
        for (i, &c) in counts.iter().enumerate() {
            let p = f64::from(weights[i]) / f64::from(sum_w);
            let emp = c as f64 / draws as f64;
            assert!((emp - p).abs() < 0.02, "i={i} emp={emp} p={p}");
        }
    }

    #[test]
    fn two_outcomes_even() {
        let alias = AliasTable::new(&[1, 1]).unwrap();
        let mut f = Flipper::new(Pcg32::seed_from_u64(6));
        let counts = alias.sample_counts(&mut f, 20_000);
        let emp = counts[0] as f64 / 20_000.0;
        assert!((emp - 0.5).abs() < 0.02, "emp={emp}");
    }

    #[test]
    fn degenerate_singleton() {
        let alias = AliasTable::new(&[5]).unwrap();
        assert_eq!(alias.bytes(), 8);
        let mut f = Flipper::from_thread_rng();
        for _ in 0..1000 {
            assert_eq!(alias.sample_index(&mut f), 0);
        }
    }
}
