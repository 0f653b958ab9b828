//! # Capability Contract
//!
//! The operation families a vector kind supports, as traits. Every trait has
//! a single blanket implementation for [`Vector`], bounded by what the lane
//! type allows: `Bitwise` only for integer lanes, `FloatMath` only for float
//! lanes, and so on.
//!
//! ## Masked operations
//!
//! Every `*_masked` method follows one rule: lane `i` of the result is the
//! operation's result where `mask[i]` is set and `self[i]` elsewhere. The
//! rule is implemented once, by [`VectorKind::blend`]; the masked forms are
//! default methods that compute the unmasked result and blend it in.

use crate::capability::{BinaryOp, CmpOp, FusedOp, ReduceOp, ShiftOp, UnaryOp};
use crate::element::{Element, FloatElement, IntElement, SignedElement};
use crate::mask::Mask;
use crate::plugin::Plugin;
use crate::vector::Vector;
use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use core::ops::{BitAnd, BitOr, BitXor, Neg, Not};

/// Shape, construction, lane access, and the masked-write rule.
pub trait VectorKind: Copy + Debug + PartialEq + Send + Sync + 'static {
    type Scalar: Element;
    type Mask: Copy + Debug;

    const LANES: usize;

    fn length() -> usize {
        Self::LANES
    }

    fn alignment() -> usize;

    fn zero() -> Self;

    fn splat(value: Self::Scalar) -> Self;

    /// Lane `lane`. Out-of-range lanes are a debug assertion and wrap in
    /// release builds.
    fn extract(&self, lane: usize) -> Self::Scalar;

    fn insert(&mut self, lane: usize, value: Self::Scalar);

    /// Lane `i` is `other[i]` where `mask[i]` is set and `self[i]` elsewhere.
    fn blend(self, mask: &Self::Mask, other: Self) -> Self;
}

pub trait Arithmetic:
    VectorKind
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;

    /// Saturating add. Floats add normally.
    fn sadd(self, other: Self) -> Self;
    /// Saturating subtract. Floats subtract normally.
    fn ssub(self, other: Self) -> Self;

    /// `self * b + c`, rounded once for floats.
    fn fmuladd(self, b: Self, c: Self) -> Self;
    /// `self * b - c`, rounded once for floats.
    fn fmulsub(self, b: Self, c: Self) -> Self;

    /// `(self + b) * c`
    fn faddmul(self, b: Self, c: Self) -> Self {
        (self + b) * c
    }

    /// `(self - b) * c`
    fn fsubmul(self, b: Self, c: Self) -> Self {
        (self - b) * c
    }

    /// Masked division. Masked-out lanes never divide, so they may hold a
    /// zero divisor.
    fn div_masked(self, mask: &Self::Mask, other: Self) -> Self;

    fn add_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self + other)
    }

    fn sub_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self - other)
    }

    fn mul_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self * other)
    }

    fn min_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self.min(other))
    }

    fn max_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self.max(other))
    }

    fn sadd_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self.sadd(other))
    }

    fn ssub_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self.ssub(other))
    }

    fn fmuladd_masked(self, mask: &Self::Mask, b: Self, c: Self) -> Self {
        self.blend(mask, self.fmuladd(b, c))
    }

    fn fmulsub_masked(self, mask: &Self::Mask, b: Self, c: Self) -> Self {
        self.blend(mask, self.fmulsub(b, c))
    }

    fn faddmul_masked(self, mask: &Self::Mask, b: Self, c: Self) -> Self {
        self.blend(mask, self.faddmul(b, c))
    }

    fn fsubmul_masked(self, mask: &Self::Mask, b: Self, c: Self) -> Self {
        self.blend(mask, self.fsubmul(b, c))
    }

    fn add_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.add_masked(mask, other);
    }

    fn sub_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.sub_masked(mask, other);
    }

    fn mul_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.mul_masked(mask, other);
    }

    fn div_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.div_masked(mask, other);
    }

    fn sadd_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.sadd_masked(mask, other);
    }

    fn ssub_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.ssub_masked(mask, other);
    }

    fn min_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.min_masked(mask, other);
    }

    fn max_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.max_masked(mask, other);
    }
}

pub trait SignedArithmetic: Arithmetic + Neg<Output = Self> {
    fn abs(self) -> Self;

    fn neg_masked(self, mask: &Self::Mask) -> Self {
        self.blend(mask, -self)
    }

    fn abs_masked(self, mask: &Self::Mask) -> Self {
        self.blend(mask, self.abs())
    }
}

pub trait FloatMath: SignedArithmetic {
    fn sqrt(self) -> Self;

    fn sqrt_masked(self, mask: &Self::Mask) -> Self {
        self.blend(mask, self.sqrt())
    }
}

pub trait Comparable: VectorKind {
    fn cmpeq(&self, other: &Self) -> Self::Mask;
    fn cmpne(&self, other: &Self) -> Self::Mask;
    fn cmplt(&self, other: &Self) -> Self::Mask;
    fn cmple(&self, other: &Self) -> Self::Mask;
    fn cmpgt(&self, other: &Self) -> Self::Mask;
    fn cmpge(&self, other: &Self) -> Self::Mask;

    /// `true` iff every lane equals the matching lane of `other`.
    fn cmpe(&self, other: &Self) -> bool;

    /// `true` iff every lane equals `value`.
    fn cmpes(&self, value: Self::Scalar) -> bool {
        self.cmpe(&Self::splat(value))
    }

    /// `true` iff no two lanes are equal.
    fn unique(&self) -> bool;
}

/// Horizontal reductions.
///
/// Masked-out lanes contribute the operation's identity. Seeded forms
/// combine the seed with the reduced value: `op(seed, reduce(v))`.
pub trait Reducible: VectorKind {
    /// General form behind every `h*` method.
    fn hreduce(&self, op: ReduceOp, mask: Option<&Self::Mask>) -> Self::Scalar;

    /// Index of the largest lane; the first one wins ties.
    fn imax(&self) -> usize;
    /// Index of the smallest lane; the first one wins ties.
    fn imin(&self) -> usize;
    /// `None` when no lane is selected.
    fn imax_masked(&self, mask: &Self::Mask) -> Option<usize>;
    fn imin_masked(&self, mask: &Self::Mask) -> Option<usize>;

    fn hreduce_seeded(&self, op: ReduceOp, mask: Option<&Self::Mask>, seed: Self::Scalar) -> Self::Scalar {
        <Self::Scalar as Element>::binary(op.binary(), seed, self.hreduce(op, mask))
    }

    fn hadd(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::Add, None)
    }

    fn hadd_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::Add, Some(mask))
    }

    fn hadd_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Add, None, seed)
    }

    fn hadd_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Add, Some(mask), seed)
    }

    fn hmul(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::Mul, None)
    }

    fn hmul_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::Mul, Some(mask))
    }

    fn hmul_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Mul, None, seed)
    }

    fn hmul_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Mul, Some(mask), seed)
    }

    fn hmax(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::Max, None)
    }

    fn hmax_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::Max, Some(mask))
    }

    fn hmax_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Max, None, seed)
    }

    fn hmax_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Max, Some(mask), seed)
    }

    fn hmin(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::Min, None)
    }

    fn hmin_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::Min, Some(mask))
    }

    fn hmin_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Min, None, seed)
    }

    fn hmin_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Min, Some(mask), seed)
    }
}

/// Integer-only bit manipulation.
pub trait Bitwise:
    Reducible
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
{
    fn band(self, other: Self) -> Self {
        self & other
    }

    fn bor(self, other: Self) -> Self {
        self | other
    }

    fn bxor(self, other: Self) -> Self {
        self ^ other
    }

    fn bnot(self) -> Self {
        !self
    }

    fn band_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self & other)
    }

    fn bor_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self | other)
    }

    fn bxor_masked(self, mask: &Self::Mask, other: Self) -> Self {
        self.blend(mask, self ^ other)
    }

    fn bnot_masked(self, mask: &Self::Mask) -> Self {
        self.blend(mask, !self)
    }

    /// Shift every lane left by `count`, which must be below the lane width.
    fn lsh(self, count: u32) -> Self;
    /// Logical for unsigned lanes, arithmetic for signed ones.
    fn rsh(self, count: u32) -> Self;
    fn rol(self, count: u32) -> Self;
    fn ror(self, count: u32) -> Self;

    /// Shift lane `i` left by `counts[i]`.
    fn lshv(self, counts: Self) -> Self;
    fn rshv(self, counts: Self) -> Self;

    fn lsh_masked(self, mask: &Self::Mask, count: u32) -> Self {
        self.blend(mask, self.lsh(count))
    }

    fn rsh_masked(self, mask: &Self::Mask, count: u32) -> Self {
        self.blend(mask, self.rsh(count))
    }

    fn lshv_masked(self, mask: &Self::Mask, counts: Self) -> Self {
        self.blend(mask, self.lshv(counts))
    }

    fn rshv_masked(self, mask: &Self::Mask, counts: Self) -> Self {
        self.blend(mask, self.rshv(counts))
    }

    fn band_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.band_masked(mask, other);
    }

    fn bor_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.bor_masked(mask, other);
    }

    fn bxor_assign_masked(&mut self, mask: &Self::Mask, other: Self) {
        *self = self.bxor_masked(mask, other);
    }

    fn lsh_assign_masked(&mut self, mask: &Self::Mask, count: u32) {
        *self = self.lsh_masked(mask, count);
    }

    fn rsh_assign_masked(&mut self, mask: &Self::Mask, count: u32) {
        *self = self.rsh_masked(mask, count);
    }

    fn lshv_assign_masked(&mut self, mask: &Self::Mask, counts: Self) {
        *self = self.lshv_masked(mask, counts);
    }

    fn rshv_assign_masked(&mut self, mask: &Self::Mask, counts: Self) {
        *self = self.rshv_masked(mask, counts);
    }

    fn hband(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::And, None)
    }

    fn hband_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::And, Some(mask))
    }

    fn hband_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::And, None, seed)
    }

    fn hband_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::And, Some(mask), seed)
    }

    fn hbor(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::Or, None)
    }

    fn hbor_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::Or, Some(mask))
    }

    fn hbor_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Or, None, seed)
    }

    fn hbor_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Or, Some(mask), seed)
    }

    fn hbxor(&self) -> Self::Scalar {
        self.hreduce(ReduceOp::Xor, None)
    }

    fn hbxor_masked(&self, mask: &Self::Mask) -> Self::Scalar {
        self.hreduce(ReduceOp::Xor, Some(mask))
    }

    fn hbxor_seeded(&self, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Xor, None, seed)
    }

    fn hbxor_masked_seeded(&self, mask: &Self::Mask, seed: Self::Scalar) -> Self::Scalar {
        self.hreduce_seeded(ReduceOp::Xor, Some(mask), seed)
    }
}

/// Splitting into and rebuilding from half-width vectors.
pub trait Packable: VectorKind {
    type Half: VectorKind<Scalar = Self::Scalar>;

    /// Lanes `0..N/2`.
    fn unpacklo(self) -> Self::Half;
    /// Lanes `N/2..N`.
    fn unpackhi(self) -> Self::Half;

    fn unpack(self) -> (Self::Half, Self::Half) {
        (self.unpacklo(), self.unpackhi())
    }

    /// Inverse of [`Packable::unpack`].
    fn pack(lo: Self::Half, hi: Self::Half) -> Self;
}

impl<T: Element, const N: usize, P: Plugin> VectorKind for Vector<T, N, P> {
    type Scalar = T;
    type Mask = Mask<N>;

    const LANES: usize = N;

    #[inline(always)]
    fn alignment() -> usize {
        Self::ALIGNMENT
    }

    #[inline(always)]
    fn zero() -> Self {
        Self::from_array([T::ZERO; N])
    }

    #[inline(always)]
    fn splat(value: T) -> Self {
        Self::from_array([value; N])
    }

    #[inline(always)]
    fn extract(&self, lane: usize) -> T {
        debug_assert!(lane < N, "lane {lane} out of range for {N} lanes");
        self.lanes[lane & (N - 1)]
    }

    #[inline(always)]
    fn insert(&mut self, lane: usize, value: T) {
        debug_assert!(lane < N, "lane {lane} out of range for {N} lanes");
        self.lanes[lane & (N - 1)] = value;
    }

    #[inline(always)]
    fn blend(self, mask: &Mask<N>, other: Self) -> Self {
        Self::from_array(P::blend(*mask, &other.lanes, &self.lanes))
    }
}

impl<T: Element, const N: usize, P: Plugin> Arithmetic for Vector<T, N, P> {
    #[inline(always)]
    fn min(self, other: Self) -> Self {
        self.binary(BinaryOp::Min, other)
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        self.binary(BinaryOp::Max, other)
    }

    #[inline(always)]
    fn sadd(self, other: Self) -> Self {
        self.binary(BinaryOp::SatAdd, other)
    }

    #[inline(always)]
    fn ssub(self, other: Self) -> Self {
        self.binary(BinaryOp::SatSub, other)
    }

    #[inline(always)]
    fn fmuladd(self, b: Self, c: Self) -> Self {
        Self::from_array(P::fused(FusedOp::MulAdd, &self.lanes, &b.lanes, &c.lanes))
    }

    #[inline(always)]
    fn fmulsub(self, b: Self, c: Self) -> Self {
        Self::from_array(P::fused(FusedOp::MulSub, &self.lanes, &b.lanes, &c.lanes))
    }

    fn div_masked(self, mask: &Mask<N>, other: Self) -> Self {
        Self::check_divisor(&other, *mask);
        let divisor = Self::splat(T::ONE).blend(mask, other);
        self.blend(mask, self.binary(BinaryOp::Div, divisor))
    }
}

impl<T: SignedElement, const N: usize, P: Plugin> SignedArithmetic for Vector<T, N, P> {
    #[inline(always)]
    fn abs(self) -> Self {
        self.unary(UnaryOp::Abs)
    }
}

impl<T: FloatElement, const N: usize, P: Plugin> FloatMath for Vector<T, N, P> {
    #[inline(always)]
    fn sqrt(self) -> Self {
        self.unary(UnaryOp::Sqrt)
    }
}

impl<T: Element, const N: usize, P: Plugin> Comparable for Vector<T, N, P> {
    #[inline(always)]
    fn cmpeq(&self, other: &Self) -> Mask<N> {
        P::compare(CmpOp::Eq, &self.lanes, &other.lanes)
    }

    #[inline(always)]
    fn cmpne(&self, other: &Self) -> Mask<N> {
        P::compare(CmpOp::Ne, &self.lanes, &other.lanes)
    }

    #[inline(always)]
    fn cmplt(&self, other: &Self) -> Mask<N> {
        P::compare(CmpOp::Lt, &self.lanes, &other.lanes)
    }

    #[inline(always)]
    fn cmple(&self, other: &Self) -> Mask<N> {
        P::compare(CmpOp::Le, &self.lanes, &other.lanes)
    }

    #[inline(always)]
    fn cmpgt(&self, other: &Self) -> Mask<N> {
        P::compare(CmpOp::Gt, &self.lanes, &other.lanes)
    }

    #[inline(always)]
    fn cmpge(&self, other: &Self) -> Mask<N> {
        P::compare(CmpOp::Ge, &self.lanes, &other.lanes)
    }

    #[inline(always)]
    fn cmpe(&self, other: &Self) -> bool {
        self.cmpeq(other).all()
    }

    fn unique(&self) -> bool {
        Vector::unique(self)
    }
}

/// Index of the lane that `better` prefers over every earlier candidate.
fn extreme_lane<T: Element, const N: usize>(
    lanes: &[T; N],
    mask: Option<&Mask<N>>,
    better: impl Fn(T, T) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &lane) in lanes.iter().enumerate() {
        if mask.is_some_and(|m| !m.extract(i)) {
            continue;
        }
        match best {
            Some(b) if !better(lane, lanes[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

impl<T: Element, const N: usize, P: Plugin> Reducible for Vector<T, N, P> {
    fn hreduce(&self, op: ReduceOp, mask: Option<&Mask<N>>) -> T {
        match mask {
            None => P::reduce(op, &self.lanes),
            Some(mask) => {
                let identity = [T::identity(op); N];
                P::reduce(op, &P::blend(*mask, &self.lanes, &identity))
            }
        }
    }

    fn imax(&self) -> usize {
        extreme_lane(&self.lanes, None, |a, b| a > b).unwrap_or(0)
    }

    fn imin(&self) -> usize {
        extreme_lane(&self.lanes, None, |a, b| a < b).unwrap_or(0)
    }

    fn imax_masked(&self, mask: &Mask<N>) -> Option<usize> {
        extreme_lane(&self.lanes, Some(mask), |a, b| a > b)
    }

    fn imin_masked(&self, mask: &Mask<N>) -> Option<usize> {
        extreme_lane(&self.lanes, Some(mask), |a, b| a < b)
    }
}

impl<T: IntElement, const N: usize, P: Plugin> Bitwise for Vector<T, N, P> {
    #[inline(always)]
    fn lsh(self, count: u32) -> Self {
        self.shift(ShiftOp::Left, count)
    }

    #[inline(always)]
    fn rsh(self, count: u32) -> Self {
        self.shift(ShiftOp::Right, count)
    }

    #[inline(always)]
    fn rol(self, count: u32) -> Self {
        self.shift(ShiftOp::RotateLeft, count)
    }

    #[inline(always)]
    fn ror(self, count: u32) -> Self {
        self.shift(ShiftOp::RotateRight, count)
    }

    #[inline(always)]
    fn lshv(self, counts: Self) -> Self {
        self.shift_lanes(ShiftOp::Left, &counts)
    }

    #[inline(always)]
    fn rshv(self, counts: Self) -> Self {
        self.shift_lanes(ShiftOp::Right, &counts)
    }
}

macro_rules! impl_packable {
    ($($n:literal => $half:literal),* $(,)?) => {
        $(
            impl<T: Element, P: Plugin> Packable for Vector<T, $n, P> {
                type Half = Vector<T, $half, P>;

                #[inline(always)]
                fn unpacklo(self) -> Self::Half {
                    Vector::from_fn(|i| self.lanes[i])
                }

                #[inline(always)]
                fn unpackhi(self) -> Self::Half {
                    Vector::from_fn(|i| self.lanes[i + $half])
                }

                #[inline(always)]
                fn pack(lo: Self::Half, hi: Self::Half) -> Self {
                    Vector::from_fn(|i| if i < $half { lo.lanes[i] } else { hi.lanes[i - $half] })
                }
            }
        )*
    };
}

impl_packable!(2 => 1, 4 => 2, 8 => 4, 16 => 8, 32 => 16, 64 => 32);
