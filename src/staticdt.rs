use crate::IndexSampler;
use crate::flip::Flip;

/// Table backed by an **index sampler** and a **static slice** of items.
///
/// - No per-table `Vec<T>` allocation.
/// - Great for enums (the derive emits a `&'static [T]`).
/// - Can sample by reference **or** by value (if `T: Copy`).
#[derive(Debug, Clone)]
pub struct StaticDropTable<S: IndexSampler, T: 'static> {
    sampler: S,
    items: &'static [T],
}

impl<S: IndexSampler, T> StaticDropTable<S, T> {
    pub const fn new(sampler: S, items: &'static [T]) -> Self {
        Self { sampler, items }
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.sampler.len()
    }

    /// Borrowed sample (zero clone).
    #[inline]
    pub fn sample<F: Flip + ?Sized>(&self, bits: &mut F) -> &'static T {
        let i = self.sampler.sample_index(bits);
        &self.items[i]
    }

    /// Owned sample (requires `T: Copy`).
    #[inline]
    pub fn sample_owned<F: Flip + ?Sized>(&self, bits: &mut F) -> T
    where
        T: Copy,
    {
        let i = self.sampler.sample_index(bits);
        self.items[i]
    }

    #[inline]
    pub const fn items(&self) -> &'static [T] {
        self.items
    }

    #[inline]
    pub const fn sampler(&self) -> &S {
        &self.sampler
    }
}
