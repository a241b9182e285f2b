//! Validation of integer weight vectors.

use crate::error::WeightError;

/// A primitive integer usable as a weight.
///
/// Every weight is checked and narrowed to `u32` before construction, so
/// negative values and values wider than 32 bits surface as [`WeightError`]s
/// instead of wrapping.
pub trait Weight: Copy {
    fn widen(self) -> i128;
}

macro_rules! impl_weight {
    ($($t:ty),* $(,)?) => {
        $(
            impl Weight for $t {
                #[inline]
                fn widen(self) -> i128 {
                    self as i128
                }
            }
        )*
    };
}

impl_weight!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// A weight vector that passed validation: non-empty, every entry within
/// `max_weight`, and a non-zero sum that fits in `u32`.
#[derive(Debug, Clone)]
pub(crate) struct Weights {
    pub(crate) values: Vec<u32>,
    pub(crate) sum: u32,
}

impl Weights {
    /// `max_weight` receives the vector length, so the alias table can cap
    /// each entry at `u32::MAX / n`.
    pub(crate) fn validate<W: Weight>(
        weights: &[W],
        max_weight: impl FnOnce(usize) -> u32,
    ) -> Result<Self, WeightError> {
        let n = weights.len();
        if n == 0 {
            return Err(WeightError::Empty);
        }
        // u32::MAX is kept free as the end-of-list marker in alias construction.
        if n >= u32::MAX as usize {
            return Err(WeightError::TooMany { len: n });
        }
        let max = max_weight(n);

        let mut values = Vec::with_capacity(n);
        let mut sum = 0u32;
        for (index, &w) in weights.iter().enumerate() {
            let value = w.widen();
            if value < 0 {
                return Err(WeightError::Negative { index, value });
            }
            if value > i128::from(max) {
                return Err(WeightError::TooLarge { index, value, max });
            }
            let w = value as u32;
            sum = sum.checked_add(w).ok_or(WeightError::SumOverflow)?;
            values.push(w);
        }
        if sum == 0 {
            return Err(WeightError::ZeroSum);
        }
        Ok(Self { values, sum })
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}
