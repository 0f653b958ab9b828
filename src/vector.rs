//! # Vector
//!
//! `Vector<T, N, P>` is `N` lanes of `T` executed by plugin `P`. The lanes
//! live in an ordinary array inside a 64-byte aligned struct; plugins load
//! them into registers per operation.
//!
//! Shapes are limited to power-of-two lane counts from 1 to 64 and at most
//! 128 bytes of payload. Both limits are checked at compile time when a
//! vector is first built.

use crate::backends::Native;
use crate::capability::{BinaryOp, ShiftOp, UnaryOp};
use crate::element::{Element, IntElement, SignedElement, UnsignedElement};
use crate::error::{Error, Result};
use crate::lanes::is_supported;
use crate::mask::Mask;
use crate::plugin::Plugin;
use crate::swizzle::Swizzle;
use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ops::*;

/// Largest payload a vector may carry, in bytes.
pub const MAX_VECTOR_BYTES: usize = 128;

/// Strongest alignment any vector guarantees.
pub const MAX_ALIGNMENT: usize = 64;

/// Every vector is 64-byte aligned whatever its payload, so shapes below
/// 64 bytes are padded: `size_of::<U8x16>()` is 64. Arrays of small vectors
/// pay that footprint; [`Vector::ALIGNMENT`] is the alignment the aligned
/// memory forms actually require.
#[repr(C, align(64))]
pub struct Vector<T, const N: usize, P = Native> {
    pub(crate) lanes: [T; N],
    plugin: PhantomData<P>,
}

impl<T: Element, const N: usize, P: Plugin> Vector<T, N, P> {
    const SHAPE: () = {
        assert!(is_supported(N), "lane count must be a power of two no larger than 64");
        assert!(N * size_of::<T>() <= MAX_VECTOR_BYTES, "vector payload exceeds 128 bytes");
    };

    pub const LANES: usize = N;

    /// Alignment the aligned load and store forms require: the payload size,
    /// capped at 64 bytes.
    pub const ALIGNMENT: usize = {
        let bytes = N * size_of::<T>();
        if bytes < MAX_ALIGNMENT {
            bytes
        } else {
            MAX_ALIGNMENT
        }
    };

    #[inline(always)]
    pub const fn from_array(lanes: [T; N]) -> Self {
        let () = Self::SHAPE;
        Self { lanes, plugin: PhantomData }
    }

    #[inline(always)]
    pub const fn new(lanes: [T; N]) -> Self {
        Self::from_array(lanes)
    }

    #[inline(always)]
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self::from_array(core::array::from_fn(f))
    }

    #[inline(always)]
    pub fn to_array(self) -> [T; N] {
        self.lanes
    }

    #[inline(always)]
    pub const fn as_array(&self) -> &[T; N] {
        &self.lanes
    }

    /// Loads the first `N` elements of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` holds fewer than `N` elements.
    #[inline]
    pub fn load(src: &[T]) -> Self {
        assert!(src.len() >= N, "slice too short: need {N} elements, got {}", src.len());
        let mut lanes = [T::ZERO; N];
        lanes.copy_from_slice(&src[..N]);
        Self::from_array(lanes)
    }

    /// Like [`Vector::load`] but reports a short slice instead of panicking.
    pub fn try_load(src: &[T]) -> Result<Self> {
        if src.len() < N {
            return Err(Error::SliceTooShort { needed: N, got: src.len() });
        }
        Ok(Self::load(src))
    }

    /// # Safety
    ///
    /// `src` must be valid for reading `N` consecutive `T`.
    #[inline(always)]
    pub unsafe fn load_ptr(src: *const T) -> Self {
        Self::from_array(unsafe { src.cast::<[T; N]>().read_unaligned() })
    }

    /// # Safety
    ///
    /// `src` must be valid for reading `N` consecutive `T` and aligned to
    /// [`Vector::ALIGNMENT`].
    #[inline(always)]
    pub unsafe fn load_aligned(src: *const T) -> Self {
        debug_assert!(src as usize % Self::ALIGNMENT == 0, "misaligned vector load");
        Self::from_array(unsafe { src.cast::<[T; N]>().read() })
    }

    /// Overwrites the lanes selected by `mask` with the matching elements of
    /// `src`. Only selected lanes are read.
    pub fn load_masked(&mut self, mask: &Mask<N>, src: &[T]) {
        for lane in mask.iter_set() {
            self.lanes[lane] = src[lane];
        }
    }

    /// # Panics
    ///
    /// Panics if `dst` holds fewer than `N` elements.
    #[inline]
    pub fn store(&self, dst: &mut [T]) {
        assert!(dst.len() >= N, "slice too short: need {N} elements, got {}", dst.len());
        dst[..N].copy_from_slice(&self.lanes);
    }

    /// Writes only the lanes selected by `mask`.
    pub fn store_masked(&self, mask: &Mask<N>, dst: &mut [T]) {
        for lane in mask.iter_set() {
            dst[lane] = self.lanes[lane];
        }
    }

    /// # Safety
    ///
    /// `dst` must be valid for writing `N` consecutive `T`.
    #[inline(always)]
    pub unsafe fn store_ptr(&self, dst: *mut T) {
        unsafe { dst.cast::<[T; N]>().write_unaligned(self.lanes) }
    }

    /// # Safety
    ///
    /// `dst` must be valid for writing `N` consecutive `T` and aligned to
    /// [`Vector::ALIGNMENT`].
    #[inline(always)]
    pub unsafe fn store_aligned(&self, dst: *mut T) {
        debug_assert!(dst as usize % Self::ALIGNMENT == 0, "misaligned vector store");
        unsafe { dst.cast::<[T; N]>().write(self.lanes) }
    }

    #[inline(always)]
    pub fn assign(&mut self, other: Self) {
        *self = other;
    }

    #[inline(always)]
    pub fn assign_scalar(&mut self, value: T) {
        self.lanes = [value; N];
    }

    /// Copies lanes of `other` selected by `mask` into `self`.
    #[inline(always)]
    pub fn assign_masked(&mut self, mask: &Mask<N>, other: Self) {
        self.lanes = P::blend(*mask, &other.lanes, &self.lanes);
    }

    /// Equality of raw lane bits. Unlike `==`, two NaNs with the same
    /// payload compare equal.
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.lanes.iter().zip(&other.lanes).all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Lane `i` of the result is lane `swizzle.source(i)` of `self`.
    pub fn swizzle(self, swizzle: &Swizzle<N>) -> Self {
        Self::from_fn(|i| self.lanes[swizzle.source(i)])
    }

    /// Swizzles the lanes selected by `mask`; the others keep their value.
    pub fn swizzle_masked(self, mask: &Mask<N>, swizzle: &Swizzle<N>) -> Self {
        Self::from_fn(|i| if mask.extract(i) { self.lanes[swizzle.source(i)] } else { self.lanes[i] })
    }

    /// `true` when no two lanes are equal (by `==`).
    pub fn unique(&self) -> bool {
        for i in 0..N {
            for j in i + 1..N {
                if self.lanes[i] == self.lanes[j] {
                    return false;
                }
            }
        }
        true
    }

    /// Reads lane `i` from `base + indices[i]` (in elements).
    ///
    /// # Safety
    ///
    /// Every `base.add(indices[i])` must be valid for reading a `T`.
    pub unsafe fn gather<I: UnsignedElement>(base: *const T, indices: &Vector<I, N, P>) -> Self {
        Self::from_fn(|i| unsafe { base.add(indices.lanes[i].to_index()).read() })
    }

    /// Gathers the lanes selected by `mask`; the others keep their value.
    /// Only selected lanes are read.
    ///
    /// # Safety
    ///
    /// `base.add(indices[i])` must be valid for reading a `T` for every
    /// selected lane `i`.
    pub unsafe fn gather_masked<I: UnsignedElement>(
        &self,
        mask: &Mask<N>,
        base: *const T,
        indices: &Vector<I, N, P>,
    ) -> Self {
        let mut out = *self;
        for lane in mask.iter_set() {
            out.lanes[lane] = unsafe { base.add(indices.lanes[lane].to_index()).read() };
        }
        out
    }

    /// Bounds-checked [`Vector::gather`].
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds for `base`.
    pub fn gather_from<I: UnsignedElement>(base: &[T], indices: &Vector<I, N, P>) -> Self {
        Self::from_fn(|i| base[indices.lanes[i].to_index()])
    }

    pub fn gather_from_masked<I: UnsignedElement>(
        &self,
        mask: &Mask<N>,
        base: &[T],
        indices: &Vector<I, N, P>,
    ) -> Self {
        let mut out = *self;
        for lane in mask.iter_set() {
            out.lanes[lane] = base[indices.lanes[lane].to_index()];
        }
        out
    }

    /// Writes lane `i` to `base + indices[i]`. Lanes are written in order, so
    /// when two indices collide the higher lane wins.
    ///
    /// # Safety
    ///
    /// Every `base.add(indices[i])` must be valid for writing a `T`.
    pub unsafe fn scatter<I: UnsignedElement>(&self, base: *mut T, indices: &Vector<I, N, P>) {
        for lane in 0..N {
            unsafe { base.add(indices.lanes[lane].to_index()).write(self.lanes[lane]) };
        }
    }

    /// # Safety
    ///
    /// `base.add(indices[i])` must be valid for writing a `T` for every
    /// selected lane `i`.
    pub unsafe fn scatter_masked<I: UnsignedElement>(
        &self,
        mask: &Mask<N>,
        base: *mut T,
        indices: &Vector<I, N, P>,
    ) {
        for lane in mask.iter_set() {
            unsafe { base.add(indices.lanes[lane].to_index()).write(self.lanes[lane]) };
        }
    }

    /// Bounds-checked [`Vector::scatter`].
    pub fn scatter_into<I: UnsignedElement>(&self, base: &mut [T], indices: &Vector<I, N, P>) {
        for lane in 0..N {
            base[indices.lanes[lane].to_index()] = self.lanes[lane];
        }
    }

    pub fn scatter_into_masked<I: UnsignedElement>(
        &self,
        mask: &Mask<N>,
        base: &mut [T],
        indices: &Vector<I, N, P>,
    ) {
        for lane in mask.iter_set() {
            base[indices.lanes[lane].to_index()] = self.lanes[lane];
        }
    }

    /// Same lanes, different plugin.
    #[inline(always)]
    pub fn with_plugin<Q: Plugin>(self) -> Vector<T, N, Q> {
        Vector::from_array(self.lanes)
    }

    #[inline(always)]
    pub(crate) fn binary(self, op: BinaryOp, rhs: Self) -> Self {
        Self::from_array(P::binary(op, &self.lanes, &rhs.lanes))
    }

    #[inline(always)]
    pub(crate) fn unary(self, op: UnaryOp) -> Self {
        Self::from_array(P::unary(op, &self.lanes))
    }

    /// Debug-checks that no lane of `divisor` is zero where `mask` is set.
    #[inline(always)]
    pub(crate) fn check_divisor(divisor: &Self, mask: Mask<N>) {
        if T::KIND.is_float() {
            return;
        }
        debug_assert!(
            mask.iter_set().all(|i| divisor.lanes[i] != T::ZERO),
            "integer division by zero"
        );
    }
}

impl<T: IntElement, const N: usize, P: Plugin> Vector<T, N, P> {
    #[inline(always)]
    pub(crate) fn shift(self, op: ShiftOp, count: u32) -> Self {
        debug_assert!(count < T::BITS, "shift amount {count} out of range for {}-bit lanes", T::BITS);
        Self::from_array(P::shift_uniform(op, &self.lanes, count))
    }

    #[inline(always)]
    pub(crate) fn shift_lanes(self, op: ShiftOp, counts: &Self) -> Self {
        let counts: [u32; N] = core::array::from_fn(|i| counts.lanes[i].to_bits() as u32);
        debug_assert!(counts.iter().all(|&c| c < T::BITS), "per-lane shift amount out of range");
        Self::from_array(P::shift_lanes(op, &self.lanes, &counts))
    }
}

impl<T: Copy, const N: usize, P> Clone for Vector<T, N, P> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy, const N: usize, P> Copy for Vector<T, N, P> {}

impl<T: Element, const N: usize, P: Plugin> Default for Vector<T, N, P> {
    fn default() -> Self {
        Self::from_array([T::ZERO; N])
    }
}

impl<T: Element, const N: usize, P: Plugin> From<[T; N]> for Vector<T, N, P> {
    fn from(lanes: [T; N]) -> Self {
        Self::from_array(lanes)
    }
}

impl<T: Element, const N: usize, P: Plugin> From<Vector<T, N, P>> for [T; N] {
    fn from(v: Vector<T, N, P>) -> Self {
        v.lanes
    }
}

impl<T: Element, const N: usize, P: Plugin> PartialEq for Vector<T, N, P> {
    fn eq(&self, other: &Self) -> bool {
        self.lanes == other.lanes
    }
}

impl<T: Element, const N: usize, P: Plugin> Index<usize> for Vector<T, N, P> {
    type Output = T;
    fn index(&self, lane: usize) -> &T {
        &self.lanes[lane]
    }
}

impl<T: Element, const N: usize, P: Plugin> fmt::Debug for Vector<T, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}<{}>{:?}", T::KIND.name(), N, P::NAME, self.lanes)
    }
}

macro_rules! impl_binary_op {
    ($bound:ident, $trait:ident, $method:ident, $assign:ident, $assign_method:ident, $op:expr) => {
        impl<T: $bound, const N: usize, P: Plugin> $trait for Vector<T, N, P> {
            type Output = Self;
            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                self.binary($op, rhs)
            }
        }

        impl<T: $bound, const N: usize, P: Plugin> $trait<T> for Vector<T, N, P> {
            type Output = Self;
            #[inline(always)]
            fn $method(self, rhs: T) -> Self {
                self.binary($op, Self::from_array([rhs; N]))
            }
        }

        impl<T: $bound, const N: usize, P: Plugin> $assign for Vector<T, N, P> {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = self.binary($op, rhs);
            }
        }
    };
}

impl_binary_op!(Element, Add, add, AddAssign, add_assign, BinaryOp::Add);
impl_binary_op!(Element, Sub, sub, SubAssign, sub_assign, BinaryOp::Sub);
impl_binary_op!(Element, Mul, mul, MulAssign, mul_assign, BinaryOp::Mul);
impl_binary_op!(IntElement, BitAnd, bitand, BitAndAssign, bitand_assign, BinaryOp::And);
impl_binary_op!(IntElement, BitOr, bitor, BitOrAssign, bitor_assign, BinaryOp::Or);
impl_binary_op!(IntElement, BitXor, bitxor, BitXorAssign, bitxor_assign, BinaryOp::Xor);

impl<T: Element, const N: usize, P: Plugin> Div for Vector<T, N, P> {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self::check_divisor(&rhs, Mask::all_true());
        self.binary(BinaryOp::Div, rhs)
    }
}

impl<T: Element, const N: usize, P: Plugin> Div<T> for Vector<T, N, P> {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: T) -> Self {
        self / Self::from_array([rhs; N])
    }
}

impl<T: Element, const N: usize, P: Plugin> DivAssign for Vector<T, N, P> {
    #[inline(always)]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<T: SignedElement, const N: usize, P: Plugin> Neg for Vector<T, N, P> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        self.unary(UnaryOp::Neg)
    }
}

impl<T: IntElement, const N: usize, P: Plugin> Not for Vector<T, N, P> {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        self.unary(UnaryOp::Not)
    }
}

impl<T: IntElement, const N: usize, P: Plugin> Shl<u32> for Vector<T, N, P> {
    type Output = Self;
    #[inline(always)]
    fn shl(self, count: u32) -> Self {
        self.shift(ShiftOp::Left, count)
    }
}

impl<T: IntElement, const N: usize, P: Plugin> Shr<u32> for Vector<T, N, P> {
    type Output = Self;
    #[inline(always)]
    fn shr(self, count: u32) -> Self {
        self.shift(ShiftOp::Right, count)
    }
}

impl<T: IntElement, const N: usize, P: Plugin> ShlAssign<u32> for Vector<T, N, P> {
    fn shl_assign(&mut self, count: u32) {
        *self = *self << count;
    }
}

impl<T: IntElement, const N: usize, P: Plugin> ShrAssign<u32> for Vector<T, N, P> {
    fn shr_assign(&mut self, count: u32) {
        *self = *self >> count;
    }
}
