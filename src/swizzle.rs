//! Lane permutations.
//!
//! A swizzle maps each destination lane to a source lane. Repetition is
//! allowed, so "broadcast lane 3" is a valid swizzle.

use crate::error::{Error, Result};
use crate::lanes::is_supported;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Swizzle<const N: usize> {
    indices: [u8; N],
}

impl<const N: usize> Swizzle<N> {
    const VALID: () = assert!(is_supported(N), "lane count must be a power of two no larger than 64");

    /// Destination lane `i` reads source lane `indices[i]`.
    ///
    /// Indices must be below `N`. Debug builds assert; release builds wrap
    /// each index modulo `N` when applied.
    pub fn new(indices: [u8; N]) -> Self {
        let () = Self::VALID;
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < N),
            "swizzle index out of range for {N} lanes"
        );
        Self { indices }
    }

    /// Like [`Swizzle::new`] but reports the first bad index.
    pub fn try_new(indices: [u8; N]) -> Result<Self> {
        let () = Self::VALID;
        match indices.iter().position(|&i| (i as usize) >= N) {
            Some(lane) => Err(Error::SwizzleIndex { lane, index: indices[lane], lanes: N }),
            None => Ok(Self { indices }),
        }
    }

    pub fn from_fn(mut f: impl FnMut(usize) -> usize) -> Self {
        Self::new(core::array::from_fn(|i| f(i) as u8))
    }

    pub fn identity() -> Self {
        Self::from_fn(|i| i)
    }

    pub fn reverse() -> Self {
        Self::from_fn(|i| N - 1 - i)
    }

    /// Destination lane `i` reads source lane `(i + k) % N`.
    pub fn rotate(k: usize) -> Self {
        Self::from_fn(|i| (i + k) % N)
    }

    /// Every output lane is the same source lane.
    pub fn broadcast(lane: usize) -> Self {
        Self::from_fn(|_| lane)
    }

    /// Source lane for destination lane `i`.
    #[inline(always)]
    pub fn source(&self, lane: usize) -> usize {
        self.indices[lane] as usize & (N - 1)
    }

    pub fn indices(&self) -> [u8; N] {
        self.indices
    }

    /// `true` when every source lane is used exactly once.
    pub fn is_permutation(&self) -> bool {
        let mut seen = 0u64;
        for lane in 0..N {
            seen |= 1 << self.source(lane);
        }
        seen.count_ones() as usize == N
    }
}
