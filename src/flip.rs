//! Fair random bits and the exact draws built on them.
//!
//! Everything downstream consumes randomness through [`Flip`]. The default
//! implementation, [`Flipper`], keeps a 64-bit reservoir filled from any
//! `rand` generator and hands it out one bit at a time, so the number of
//! physical random words fetched stays close to the information actually
//! used.

use std::cell::RefCell;

use log::trace;
use rand::RngCore;
use rand::TryRngCore;
use rand::rand_core::UnwrapErr;
use rand::rngs::{OsRng, ThreadRng};

const WORD_BITS: u32 = u64::BITS;

/// A source of unbiased bits.
///
/// Only [`flip`](Flip::flip) is required; the other draws are defined in
/// terms of it and consume the minimal expected number of bits.
pub trait Flip {
    /// One fair bit.
    fn flip(&mut self) -> bool;

    /// `count` fair bits packed most-significant first.
    ///
    /// # Panics
    /// If `count > 32`.
    fn flip_n(&mut self, count: u32) -> u32 {
        assert!(count <= u32::BITS, "flip_n: {count} bits requested");
        let mut out = 0u64;
        for _ in 0..count {
            out = (out << 1) | u64::from(self.flip());
        }
        out as u32
    }

    /// Uniform integer in `[0, n)`.
    ///
    /// Pre-draws `bitlen(n - 1)` bits, then keeps doubling the candidate
    /// range one bit at a time, folding the rejected excess back in instead
    /// of throwing it away.
    ///
    /// # Panics
    /// If `n == 0`.
    fn uniform(&mut self, n: u32) -> u32 {
        assert!(n > 0, "uniform over an empty range");
        let n = u64::from(n);
        let presample = u64::BITS - (n - 1).leading_zeros();
        let mut bound = 1u64 << presample;
        let mut x = u64::from(self.flip_n(presample));
        loop {
            if bound >= n {
                if x < n {
                    return x as u32;
                }
                bound -= n;
                x -= n;
            }
            bound <<= 1;
            x = (x << 1) | u64::from(self.flip());
        }
    }

    /// `true` with probability exactly `numer / denom`.
    ///
    /// Walks the binary expansion of `numer / denom` against a stream of
    /// fair bits and stops at the first position where they differ: two bits
    /// on average.
    ///
    /// # Panics
    /// If `denom == 0` or `numer > denom`.
    fn bernoulli(&mut self, numer: u32, denom: u32) -> bool {
        assert!(
            denom > 0 && numer <= denom,
            "bernoulli: {numer}/{denom} is not a probability"
        );
        if numer == 0 {
            return false;
        }
        if numer == denom {
            return true;
        }
        let denom = u64::from(denom);
        let mut numer = u64::from(numer);
        loop {
            numer <<= 1;
            if numer == denom {
                return self.flip();
            }
            let digit = numer > denom;
            if digit {
                numer -= denom;
            }
            if self.flip() {
                return digit;
            }
        }
    }
}

/// Bit reservoir over a `rand` generator.
///
/// Each refill pulls one `u64` from the generator; bits are consumed from the
/// most significant end. `refills` counts the physical words fetched.
#[derive(Debug, Clone)]
pub struct Flipper<R> {
    rng: R,
    word: u64,
    pos: u32,
    refills: u64,
}

impl<R: RngCore> Flipper<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            word: 0,
            pos: 0,
            refills: 0,
        }
    }

    #[inline]
    fn refill(&mut self) {
        if self.pos == 0 {
            self.word = self.rng.next_u64();
            self.pos = WORD_BITS;
            self.refills += 1;
            trace!("flipper refill #{}", self.refills);
        }
    }

    /// Number of words pulled from the generator so far.
    pub fn refills(&self) -> u64 {
        self.refills
    }

    /// Number of bits handed out so far.
    pub fn bits_consumed(&self) -> u64 {
        self.refills * u64::from(WORD_BITS) - u64::from(self.pos)
    }

    /// Zero the counters. Bits still buffered are discarded so the next
    /// draw starts on a fresh word.
    pub fn reset_counters(&mut self) {
        self.refills = 0;
        self.pos = 0;
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl Flipper<UnwrapErr<OsRng>> {
    /// Reservoir filled straight from the operating system.
    ///
    /// # Panics
    /// On a refill if the OS randomness source fails.
    pub fn os() -> Self {
        Self::new(OsRng.unwrap_err())
    }
}

impl Flipper<ThreadRng> {
    /// Reservoir over `rand::rng()`.
    pub fn from_thread_rng() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: RngCore> Flip for Flipper<R> {
    #[inline]
    fn flip(&mut self) -> bool {
        self.refill();
        self.pos -= 1;
        (self.word >> self.pos) & 1 == 1
    }

    fn flip_n(&mut self, count: u32) -> u32 {
        assert!(count <= u32::BITS, "flip_n: {count} bits requested");
        let mut out = 0u64;
        let mut left = count;
        while left > 0 {
            self.refill();
            let take = left.min(self.pos);
            self.pos -= take;
            let chunk = (self.word >> self.pos) & ((1u64 << take) - 1);
            out = (out << take) | chunk;
            left -= take;
        }
        out as u32
    }
}

thread_local! {
    static THREAD_FLIPPER: RefCell<Flipper<ThreadRng>> =
        RefCell::new(Flipper::from_thread_rng());
}

/// Run `f` with this thread's lazily created [`Flipper`].
///
/// # Panics
/// If called again from inside `f`.
pub fn with_thread_flipper<T>(f: impl FnOnce(&mut Flipper<ThreadRng>) -> T) -> T {
    THREAD_FLIPPER.with(|cell| f(&mut cell.borrow_mut()))
}
