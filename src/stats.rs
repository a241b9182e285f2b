//! Entropy bookkeeping for comparing samplers against the optimum.

use crate::flat::FlatTree;

/// Shannon entropy of the distribution `weights / Σ weights`, in bits.
///
/// Zero weights contribute nothing; an all-zero vector has entropy 0.
pub fn entropy(weights: &[u32]) -> f64 {
    let total: f64 = weights.iter().map(|&w| f64::from(w)).sum();
    if total == 0.0 {
        return 0.0;
    }
    weights
        .iter()
        .filter(|&&w| w > 0)
        .map(|&w| {
            let p = f64::from(w) / total;
            -p * p.log2()
        })
        .sum()
}

/// Expected bits per sample above the entropy bound.
pub fn toll(tree: &FlatTree, weights: &[u32]) -> f64 {
    tree.expected_bits() - entropy(weights)
}
