//! # Lane Masks
//!
//! `Mask<N>` holds one boolean per lane, packed into the low `N` bits of a
//! `u64` (bit `i` is lane `i`). Bits above `N` are always zero.
//!
//! A mask is independent of element type: the same `Mask<8>` selects lanes of
//! a `u8x8` or an `f64x8`. Plugins expand it into whatever register form they
//! need at the point of use.

use crate::lanes::{is_supported, lane_bits};
use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Mask<const N: usize> {
    bits: u64,
}

impl<const N: usize> Mask<N> {
    const VALID: () = assert!(is_supported(N), "lane count must be a power of two no larger than 64");
    const LANE_BITS: u64 = lane_bits(N);

    pub const LANES: usize = N;

    /// Builds a mask from one flag per lane.
    #[inline]
    pub const fn new(lanes: [bool; N]) -> Self {
        let () = Self::VALID;
        let mut bits = 0u64;
        let mut i = 0;
        while i < N {
            if lanes[i] {
                bits |= 1 << i;
            }
            i += 1;
        }
        Self { bits }
    }

    /// Builds a mask from a bitfield. Bits at or above `N` are discarded.
    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        let () = Self::VALID;
        Self { bits: bits & Self::LANE_BITS }
    }

    #[inline]
    pub fn from_fn(mut f: impl FnMut(usize) -> bool) -> Self {
        let mut bits = 0u64;
        for i in 0..N {
            if f(i) {
                bits |= 1 << i;
            }
        }
        Self::from_bits(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    #[inline(always)]
    pub const fn all_true() -> Self {
        Self::from_bits(u64::MAX)
    }

    #[inline(always)]
    pub const fn all_false() -> Self {
        Self::from_bits(0)
    }

    /// Flag of `lane`.
    ///
    /// `lane` must be below `N`; release builds wrap it.
    #[inline(always)]
    pub const fn extract(self, lane: usize) -> bool {
        debug_assert!(lane < N, "mask lane out of range");
        (self.bits >> (lane & (N - 1))) & 1 == 1
    }

    /// Sets the flag of `lane`.
    #[inline(always)]
    pub fn insert(&mut self, lane: usize, value: bool) {
        debug_assert!(lane < N, "mask lane out of range");
        let bit = 1u64 << (lane & (N - 1));
        if value {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
    }

    pub fn to_array(self) -> [bool; N] {
        core::array::from_fn(|i| self.extract(i))
    }

    /// Number of set lanes.
    #[inline(always)]
    pub const fn count(self) -> u32 {
        self.bits.count_ones()
    }

    #[inline(always)]
    pub const fn any(self) -> bool {
        self.bits != 0
    }

    #[inline(always)]
    pub const fn all(self) -> bool {
        self.bits == Self::LANE_BITS
    }

    #[inline(always)]
    pub const fn none(self) -> bool {
        self.bits == 0
    }

    /// Index of the lowest set lane.
    #[inline(always)]
    pub const fn first(self) -> Option<usize> {
        if self.bits == 0 {
            None
        } else {
            Some(self.bits.trailing_zeros() as usize)
        }
    }

    /// Indices of the set lanes, lowest first.
    pub fn iter_set(self) -> impl Iterator<Item = usize> {
        let mut bits = self.bits;
        core::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let lane = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(lane)
        })
    }

    #[inline(always)]
    pub const fn land(self, other: Self) -> Self {
        Self { bits: self.bits & other.bits }
    }

    #[inline(always)]
    pub const fn lor(self, other: Self) -> Self {
        Self { bits: self.bits | other.bits }
    }

    #[inline(always)]
    pub const fn lxor(self, other: Self) -> Self {
        Self { bits: self.bits ^ other.bits }
    }

    #[inline(always)]
    pub const fn lnot(self) -> Self {
        Self { bits: !self.bits & Self::LANE_BITS }
    }

    /// Lanes selected by `mask` take the result of `op`, the rest keep `self`.
    #[inline(always)]
    const fn merge(self, mask: Self, result: Self) -> Self {
        Self { bits: (self.bits & !mask.bits) | (result.bits & mask.bits) }
    }

    pub const fn land_masked(self, mask: Self, other: Self) -> Self {
        self.merge(mask, self.land(other))
    }

    pub const fn lor_masked(self, mask: Self, other: Self) -> Self {
        self.merge(mask, self.lor(other))
    }

    pub const fn lxor_masked(self, mask: Self, other: Self) -> Self {
        self.merge(mask, self.lxor(other))
    }

    pub const fn lnot_masked(self, mask: Self) -> Self {
        self.merge(mask, self.lnot())
    }

    /// AND across all lanes.
    #[inline(always)]
    pub const fn hland(self) -> bool {
        self.all()
    }

    /// OR across all lanes.
    #[inline(always)]
    pub const fn hlor(self) -> bool {
        self.any()
    }

    /// XOR across all lanes.
    #[inline(always)]
    pub const fn hlxor(self) -> bool {
        self.bits.count_ones() % 2 == 1
    }

    /// The `width`-lane slice of this mask starting at lane `chunk * width`,
    /// shifted down to bit 0.
    #[inline(always)]
    pub(crate) const fn chunk_bits(self, chunk: usize, width: usize) -> u64 {
        (self.bits >> (chunk * width)) & lane_bits(width)
    }

    #[inline(always)]
    pub(crate) fn set_chunk(&mut self, chunk: usize, width: usize, bits: u64) {
        let shift = chunk * width;
        let field = lane_bits(width) << shift;
        self.bits = (self.bits & !field) | ((bits << shift) & field);
    }
}

impl<const N: usize> From<[bool; N]> for Mask<N> {
    fn from(lanes: [bool; N]) -> Self {
        Self::new(lanes)
    }
}

impl<const N: usize> BitAnd for Mask<N> {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        self.land(rhs)
    }
}

impl<const N: usize> BitOr for Mask<N> {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        self.lor(rhs)
    }
}

impl<const N: usize> BitXor for Mask<N> {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        self.lxor(rhs)
    }
}

impl<const N: usize> Not for Mask<N> {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        self.lnot()
    }
}

impl<const N: usize> BitAndAssign for Mask<N> {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.land(rhs);
    }
}

impl<const N: usize> BitOrAssign for Mask<N> {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.lor(rhs);
    }
}

impl<const N: usize> BitXorAssign for Mask<N> {
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = self.lxor(rhs);
    }
}

impl<const N: usize> fmt::Debug for Mask<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask<{N}>[")?;
        for i in 0..N {
            f.write_str(if self.extract(i) { "1" } else { "0" })?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_packs_low_bits() {
        let m = Mask::new([true, false, true, true]);
        assert_eq!(m.bits(), 0b1101);
        assert_eq!(m.count(), 3);
        assert_eq!(m.first(), Some(0));
    }

    #[test]
    fn from_bits_drops_high_bits() {
        assert_eq!(Mask::<4>::from_bits(0xFF).bits(), 0xF);
        assert!(Mask::<4>::from_bits(0xF0).none());
        assert!(Mask::<64>::from_bits(u64::MAX).all());
    }

    #[test]
    fn not_stays_inside_lanes() {
        let m = !Mask::<8>::from_bits(0b1010_1010);
        assert_eq!(m.bits(), 0b0101_0101);
        assert!((!Mask::<8>::all_true()).none());
    }

    #[test]
    fn masked_logic_keeps_unselected_lanes() {
        let a = Mask::<4>::from_bits(0b0011);
        let b = Mask::<4>::from_bits(0b0101);
        let sel = Mask::<4>::from_bits(0b1100);
        assert_eq!(a.lor_masked(sel, b).bits(), 0b0111);
        assert_eq!(a.lnot_masked(sel).bits(), 0b1111);
        assert_eq!(a.land_masked(sel, b).bits(), 0b0011);
    }

    #[test]
    fn horizontal_logic() {
        let m = Mask::<4>::from_bits(0b0111);
        assert!(!m.hland());
        assert!(m.hlor());
        assert!(m.hlxor());
        assert!(!Mask::<4>::all_false().hlor());
    }

    #[test]
    fn chunks() {
        let mut m = Mask::<16>::from_bits(0xABCD);
        assert_eq!(m.chunk_bits(1, 4), 0xC);
        m.set_chunk(0, 8, 0x12);
        assert_eq!(m.bits(), 0xAB12);
    }

    #[test]
    fn iter_set_lowest_first() {
        let lanes: Vec<usize> = Mask::<8>::from_bits(0b1001_0010).iter_set().collect();
        assert_eq!(lanes, vec![1, 4, 7]);
    }
}
