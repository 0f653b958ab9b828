//! # Plugin Contract
//!
//! A plugin is a zero-sized type that carries one ISA's kernels. Every
//! vector is parameterized by one, and every operation a vector exposes
//! bottoms out in one of the entry points below.
//!
//! Entry points work on plain lane arrays. A plugin may load them into
//! registers, run a native kernel, and store the result, or it may hand
//! the arrays to [`Scalar`](crate::backends::Scalar), which is the single
//! reference emulation. Either way the result must be bit-identical to the
//! per-lane definitions in [`element`](crate::element).

use crate::capability::{BinaryOp, CmpOp, ElemKind, FusedOp, Op, ReduceOp, ShiftOp, UnaryOp};
use crate::element::{AsLane, Element, IntElement};
use crate::mask::Mask;
use core::fmt::Debug;

pub(crate) mod sealed {
    pub trait Sealed {}
}

pub trait Plugin: sealed::Sealed + Copy + Debug + Default + Send + Sync + 'static {
    /// Short identifier used in diagnostics.
    const NAME: &'static str;

    /// Native register width in bytes. Zero for the scalar plugin.
    const REGISTER_BYTES: usize;

    /// Whether `op` on `kind` has a native kernel in this build.
    fn native(op: Op, kind: ElemKind) -> bool;

    fn binary<T: Element, const N: usize>(op: BinaryOp, a: &[T; N], b: &[T; N]) -> [T; N];

    fn unary<T: Element, const N: usize>(op: UnaryOp, a: &[T; N]) -> [T; N];

    /// `a * b + c` or `a * b - c`, fused (single rounding) for floats.
    fn fused<T: Element, const N: usize>(op: FusedOp, a: &[T; N], b: &[T; N], c: &[T; N]) -> [T; N];

    fn compare<T: Element, const N: usize>(op: CmpOp, a: &[T; N], b: &[T; N]) -> Mask<N>;

    /// Lane `i` of the result is `if_true[i]` where `mask[i]` is set and
    /// `if_false[i]` elsewhere.
    fn blend<T: Element, const N: usize>(mask: Mask<N>, if_true: &[T; N], if_false: &[T; N]) -> [T; N];

    /// Horizontal reduction. Lanes are combined pairwise by halving the
    /// vector: lane `i` with lane `i + w` for `w = N/2, N/4, .., 1`.
    fn reduce<T: Element, const N: usize>(op: ReduceOp, a: &[T; N]) -> T;

    /// Shift or rotate every lane by the same amount.
    fn shift_uniform<T: IntElement, const N: usize>(op: ShiftOp, a: &[T; N], count: u32) -> [T; N];

    /// Shift or rotate lane `i` by `counts[i]`.
    fn shift_lanes<T: IntElement, const N: usize>(op: ShiftOp, a: &[T; N], counts: &[u32; N]) -> [T; N];

    /// Numeric `as` conversion of every lane.
    fn convert<T: Element + AsLane<U>, U: Element, const N: usize>(a: &[T; N]) -> [U; N];
}
