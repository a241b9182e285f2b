//! Flat DDG encoding: per-level leaf counts plus one level-ordered leaf array.

use log::debug;

use crate::ddg::{Depth, Outcome, Plan};
use crate::error::WeightError;
use crate::flip::Flip;
use crate::weights::{Weight, Weights};

/// DDG tree stored as `breadths[j]` (leaves on level `j`) and the leaf tags
/// of all levels concatenated.
///
/// A walk keeps its position on the current level as an offset past that
/// level's leaves; internal nodes are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTree {
    breadths: Vec<u32>,
    leaves: Vec<u32>,
    outcomes: usize,
}

impl FlatTree {
    /// Build the tree for `weights` with the given depth policy. O(n·K).
    ///
    /// # Errors
    /// * [`WeightError::Empty`] if there are no weights.
    /// * [`WeightError::Negative`] / [`WeightError::TooLarge`] if a weight is
    ///   outside `0..=u32::MAX`.
    /// * [`WeightError::SumOverflow`] if the sum does not fit in `u32`.
    /// * [`WeightError::ZeroSum`] if every weight is zero.
    pub fn new<W: Weight>(weights: &[W], depth: Depth) -> Result<Self, WeightError> {
        let plan = Plan::new(Weights::validate(weights, |_| u32::MAX)?, depth);
        Ok(Self::from_plan(&plan))
    }

    /// Tree depth equal to the bit length of the weight sum.
    pub fn fldr<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        Self::new(weights, Depth::Fldr)
    }

    /// Tree depth twice the bit length of the weight sum.
    pub fn aldr<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        Self::new(weights, Depth::Aldr)
    }

    pub(crate) fn from_plan(plan: &Plan) -> Self {
        let mut breadths = Vec::with_capacity(plan.depth as usize + 1);
        let mut leaves = Vec::with_capacity(plan.leaf_count());
        for level in plan.levels() {
            let before = leaves.len();
            leaves.extend(level.map(Outcome::tag));
            breadths.push((leaves.len() - before) as u32);
        }
        let tree = Self {
            breadths,
            leaves,
            outcomes: plan.outcomes(),
        };
        debug!(
            "flat ddg: n={} depth={} leaves={} bytes={}",
            tree.outcomes,
            plan.depth,
            tree.leaves.len(),
            tree.bytes()
        );
        tree
    }

    /// Draw an index in `0..len()`, one bit per level descended.
    pub fn sample_index<F: Flip + ?Sized>(&self, bits: &mut F) -> usize {
        'attempt: loop {
            let mut depth = 0;
            let mut location = 0;
            let mut val = 0;
            loop {
                let breadth = self.breadths[depth] as usize;
                if val < breadth {
                    match Outcome::from_tag(self.leaves[location + val]) {
                        Outcome::Emit(i) => return i as usize,
                        Outcome::Reject => continue 'attempt,
                    }
                }
                location += breadth;
                val = ((val - breadth) << 1) | usize::from(bits.flip());
                depth += 1;
            }
        }
    }

    /// Leaves per level, root level first.
    pub fn breadths(&self) -> &[u32] {
        &self.breadths
    }

    /// Leaf tags in level order: 0 rejects, `i + 1` emits `i`.
    pub fn leaves(&self) -> &[u32] {
        &self.leaves
    }

    /// Leaves grouped by level.
    pub fn levels(&self) -> impl Iterator<Item = impl Iterator<Item = Outcome> + '_> + '_ {
        let mut start = 0;
        self.breadths.iter().map(move |&b| {
            let level = &self.leaves[start..start + b as usize];
            start += b as usize;
            level.iter().map(|&t| Outcome::from_tag(t))
        })
    }

    /// Depth `K` of the tree.
    pub fn depth(&self) -> u32 {
        self.breadths.len() as u32 - 1
    }

    pub fn len(&self) -> usize {
        self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes == 0
    }

    /// Size of the owned buffers in bytes.
    pub fn bytes(&self) -> usize {
        std::mem::size_of_val(self.breadths.as_slice())
            + std::mem::size_of_val(self.leaves.as_slice())
    }

    /// Probability that a single walk ends on a reject leaf, `r / 2^K`.
    pub fn reject_probability(&self) -> f64 {
        self.levels()
            .enumerate()
            .map(|(j, level)| {
                let rejects = level.filter(|&o| o == Outcome::Reject).count();
                rejects as f64 * 0.5f64.powi(j as i32)
            })
            .sum()
    }

    /// Expected number of bits consumed per sample, restarts included.
    pub fn expected_bits(&self) -> f64 {
        let per_walk: f64 = self
            .breadths
            .iter()
            .enumerate()
            .map(|(j, &b)| j as f64 * f64::from(b) * 0.5f64.powi(j as i32))
            .sum();
        per_walk / (1.0 - self.reject_probability())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::Flipper;
    use crate::flip::testing::Scripted;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    impl FlatTree {
        /// Draw k samples, returning counts per index (useful for checks).
        pub(crate) fn sample_counts<F: Flip>(&self, bits: &mut F, draws: usize) -> Vec<usize> {
            let mut counts = vec![0usize; self.len()];
            for _ in 0..draws {
                counts[self.sample_index(bits)] += 1;
            }
            counts
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(FlatTree::aldr::<u32>(&[]), Err(WeightError::Empty)));
        assert!(matches!(
            FlatTree::fldr(&[0, 0]),
            Err(WeightError::ZeroSum)
        ));
        assert!(matches!(
            FlatTree::aldr(&[-1i64, 2]),
            Err(WeightError::Negative { .. })
        ));
    }

    #[test]
    fn fldr_uniform_three_layout() {
        let tree = FlatTree::fldr(&[1, 1, 1]).unwrap();
        assert_eq!(tree.breadths(), &[0, 0, 4]);
        assert_eq!(tree.leaves(), &[0, 1, 2, 3]);
        assert_eq!(tree.bytes(), 7 * 4);
    }

    #[test]
    fn aldr_uniform_three_layout() {
        // K = 4, c = 5 = 0b101, r = 1.
        let tree = FlatTree::aldr(&[1, 1, 1]).unwrap();
        assert_eq!(tree.breadths(), &[0, 0, 3, 0, 4]);
        assert_eq!(tree.leaves(), &[1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn scripted_walks() {
        let tree = FlatTree::fldr(&[1, 1, 1]).unwrap();
        // 00 lands on the reject leaf, then 11 on outcome 2.
        let mut s = Scripted::new(&[0, 0, 1, 1]);
        assert_eq!(tree.sample_index(&mut s), 2);
        assert_eq!(s.used(), 4);
        let mut s = Scripted::new(&[0, 1]);
        assert_eq!(tree.sample_index(&mut s), 0);
    }

    #[test]
    fn degenerate_singleton() {
        let tree = FlatTree::aldr(&[5]).unwrap();
        assert_eq!(tree.len(), 1);
        let mut f = Flipper::new(Pcg32::seed_from_u64(5));
        for _ in 0..1000 {
            assert_eq!(tree.sample_index(&mut f), 0);
        }

        // A weight sum of one is a bare root leaf that uses no bits.
        let tree = FlatTree::fldr(&[1]).unwrap();
        assert_eq!(tree.breadths(), &[1]);
        let mut s = Scripted::new(&[]);
        assert_eq!(tree.sample_index(&mut s), 0);
    }

    #[test]
    fn zero_weights_never_drawn() {
        let tree = FlatTree::aldr(&[0, 3, 0, 1]).unwrap();
        let mut f = Flipper::new(Pcg32::seed_from_u64(11));
        let counts = tree.sample_counts(&mut f, 10_000);
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
    }

    #[test]
    fn power_of_two_sum_never_restarts() {
        let tree = FlatTree::fldr(&[2, 2, 4]).unwrap();
        assert!(tree.leaves().iter().all(|&t| t != 0));
        assert_eq!(tree.reject_probability(), 0.0);

        let mut f = Flipper::new(Pcg32::seed_from_u64(8));
        let draws = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            f.reset_counters();
            let i = tree.sample_index(&mut f);
            // Outcome 2 sits one level up.
            let expected = if i == 2 { 1 } else { 2 };
            assert_eq!(f.bits_consumed(), expected);
            counts[i] += 1;
        }
        for (i, p) in [0.25, 0.25, 0.5].into_iter().enumerate() {
            let emp = counts[i] as f64 / draws as f64;
            assert!((emp - p).abs() < 0.02, "i={i} emp={emp} p={p}");
        }
    }

    #[test]
    fn uniform_three_restarts_but_stays_fair() {
        let tree = FlatTree::fldr(&[1, 1, 1]).unwrap();
        let mut f = Flipper::new(Pcg32::seed_from_u64(13));
        let draws = 30_000;
        let counts = tree.sample_counts(&mut f, draws);

        // Every walk costs two bits, so anything past 2 per sample is restarts.
        let restarts = (f.bits_consumed() - 2 * draws as u64) / 2;
        let rate = restarts as f64 / draws as f64;
        assert!(rate > 0.2 && rate < 0.45, "restart rate {rate}");

        for (i, &c) in counts.iter().enumerate() {
            let emp = c as f64 / draws as f64;
            assert!((emp - 1.0 / 3.0).abs() < 0.02, "i={i} emp={emp}");
        }
    }

    #[test]
    fn roughly_matches_distribution() {
        let weights = [1u32, 2, 3, 4];
        for tree in [FlatTree::fldr(&weights).unwrap(), FlatTree::aldr(&weights).unwrap()] {
            let mut f = Flipper::new(Pcg32::seed_from_u64(42));
            let draws = 40_000;
            let counts = tree.sample_counts(&mut f, draws);
            for (i, &c) in counts.iter().enumerate() {
                let p = f64::from(weights[i]) / 10.0;
                let emp = c as f64 / draws as f64;
                assert!((emp - p).abs() < 0.02, "i={i} emp={emp} p={p}");
            }
        }
    }

    #[test]
    fn expected_bits_matches_hand_count() {
        // Two bits per walk, accepted with probability 3/4.
        let tree = FlatTree::fldr(&[1, 1, 1]).unwrap();
        assert!((tree.expected_bits() - 8.0 / 3.0).abs() < 1e-12);
        assert!((tree.reject_probability() - 0.25).abs() < 1e-12);
        // ALDR: 2·3/4 + 4·4/16 = 2.5 per walk, accepted with probability 15/16.
        let tree = FlatTree::aldr(&[1, 1, 1]).unwrap();
        assert!((tree.expected_bits() - 2.5 * 16.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn measured_bits_track_expectation() {
        let tree = FlatTree::aldr(&[3, 5, 7, 11]).unwrap();
        let mut f = Flipper::new(Pcg32::seed_from_u64(17));
        let draws = 50_000;
        tree.sample_counts(&mut f, draws);
        let measured = f.bits_consumed() as f64 / draws as f64;
        assert!(
            (measured - tree.expected_bits()).abs() < 0.05,
            "measured {measured} expected {}",
            tree.expected_bits()
        );
    }
}
