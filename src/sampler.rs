use crate::{
    FromWeights, IndexSampler, alias::AliasTable, error::WeightError, flat::FlatTree,
    flip::Flip, linked::LinkedTree, weights::Weight,
};

/// Uniform index sampler: picks an index in `0..n` with equal probability.
#[derive(Debug, Clone, Copy)]
pub struct UniformSampler {
    n: u32,
}

impl UniformSampler {
    pub fn new(n: usize) -> Result<Self, WeightError> {
        if n == 0 {
            return Err(WeightError::Empty);
        }
        let n = u32::try_from(n).map_err(|_| WeightError::TooMany { len: n })?;
        Ok(Self { n })
    }
}

impl IndexSampler for UniformSampler {
    #[inline]
    fn len(&self) -> usize {
        self.n as usize
    }
    #[inline]
    fn sample_index<F: Flip + ?Sized>(&self, bits: &mut F) -> usize {
        bits.uniform(self.n) as usize
    }
}

// The inherent methods share these names; call them explicitly to avoid
// trait recursion.
macro_rules! impl_index_sampler {
    ($($t:ty),*) => {
        $(
            impl IndexSampler for $t {
                #[inline]
                fn len(&self) -> usize {
                    <$t>::len(self)
                }
                #[inline]
                fn sample_index<F: Flip + ?Sized>(&self, bits: &mut F) -> usize {
                    <$t>::sample_index(self, bits)
                }
            }
        )*
    };
}

impl_index_sampler!(FlatTree, LinkedTree, AliasTable);

/// Trees built through the generic constructor use the ALDR depth.
impl FromWeights for FlatTree {
    fn from_weights<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        FlatTree::aldr(weights)
    }
}

impl FromWeights for LinkedTree {
    fn from_weights<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        LinkedTree::aldr(weights)
    }
}

impl FromWeights for AliasTable {
    fn from_weights<W: Weight>(weights: &[W]) -> Result<Self, WeightError> {
        AliasTable::new(weights)
    }
}
