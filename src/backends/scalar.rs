//! Scalar plugin.
//!
//! Loops over lanes using the per-lane definitions in `element`. It is a
//! complete plugin on its own and the fallback for every kernel another
//! plugin does not have.

use crate::capability::{BinaryOp, CmpOp, ElemKind, FusedOp, Op, ReduceOp, ShiftOp, UnaryOp};
use crate::element::{AsLane, Element, IntElement};
use crate::mask::Mask;
use crate::plugin::{sealed, Plugin};
use core::array;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Scalar;

impl sealed::Sealed for Scalar {}

impl Plugin for Scalar {
    const NAME: &'static str = "scalar";
    const REGISTER_BYTES: usize = 0;

    #[inline(always)]
    fn native(_op: Op, _kind: ElemKind) -> bool {
        false
    }

    #[inline(always)]
    fn binary<T: Element, const N: usize>(op: BinaryOp, a: &[T; N], b: &[T; N]) -> [T; N] {
        array::from_fn(|i| T::binary(op, a[i], b[i]))
    }

    #[inline(always)]
    fn unary<T: Element, const N: usize>(op: UnaryOp, a: &[T; N]) -> [T; N] {
        array::from_fn(|i| T::unary(op, a[i]))
    }

    #[inline(always)]
    fn fused<T: Element, const N: usize>(op: FusedOp, a: &[T; N], b: &[T; N], c: &[T; N]) -> [T; N] {
        array::from_fn(|i| T::fused(op, a[i], b[i], c[i]))
    }

    #[inline(always)]
    fn compare<T: Element, const N: usize>(op: CmpOp, a: &[T; N], b: &[T; N]) -> Mask<N> {
        Mask::from_fn(|i| {
            let (x, y) = (a[i], b[i]);
            match op {
                CmpOp::Eq => x == y,
                CmpOp::Ne => x != y,
                CmpOp::Lt => x < y,
                CmpOp::Le => x <= y,
                CmpOp::Gt => x > y,
                CmpOp::Ge => x >= y,
            }
        })
    }

    #[inline(always)]
    fn blend<T: Element, const N: usize>(mask: Mask<N>, if_true: &[T; N], if_false: &[T; N]) -> [T; N] {
        array::from_fn(|i| if mask.extract(i) { if_true[i] } else { if_false[i] })
    }

    fn reduce<T: Element, const N: usize>(op: ReduceOp, a: &[T; N]) -> T {
        let op = op.binary();
        let mut buf = *a;
        let mut width = N;
        while width > 1 {
            width /= 2;
            for i in 0..width {
                buf[i] = T::binary(op, buf[i], buf[i + width]);
            }
        }
        buf[0]
    }

    #[inline(always)]
    fn shift_uniform<T: IntElement, const N: usize>(op: ShiftOp, a: &[T; N], count: u32) -> [T; N] {
        array::from_fn(|i| T::shift(op, a[i], count))
    }

    #[inline(always)]
    fn shift_lanes<T: IntElement, const N: usize>(op: ShiftOp, a: &[T; N], counts: &[u32; N]) -> [T; N] {
        array::from_fn(|i| T::shift(op, a[i], counts[i]))
    }

    #[inline(always)]
    fn convert<T: Element + AsLane<U>, U: Element, const N: usize>(a: &[T; N]) -> [U; N] {
        array::from_fn(|i| a[i].as_lane())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_pairs_by_halving() {
        // ((1+5)+(3+7)) + ((2+6)+(4+8)) for a halving tree
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(Scalar::reduce(ReduceOp::Add, &a), 36.0);
        assert_eq!(Scalar::reduce(ReduceOp::Max, &[3u8, 9, 2, 9]), 9);
        assert_eq!(Scalar::reduce(ReduceOp::Xor, &[1u16]), 1);
    }

    #[test]
    fn blend_selects_per_lane() {
        let m = Mask::<4>::from_bits(0b0101);
        assert_eq!(Scalar::blend(m, &[1, 2, 3, 4], &[9, 9, 9, 9]), [1, 9, 3, 9]);
    }

    #[test]
    fn compare_follows_ieee() {
        let nan = f32::NAN;
        let m = Scalar::compare(CmpOp::Ne, &[nan, 1.0], &[nan, 1.0]);
        assert_eq!(m.bits(), 0b01);
        let m = Scalar::compare(CmpOp::Le, &[nan, 1.0], &[nan, 1.0]);
        assert_eq!(m.bits(), 0b10);
    }

    #[test]
    fn convert_uses_as_semantics() {
        assert_eq!(Scalar::convert::<f32, u8, 4>(&[-1.0, 300.0, 2.7, f32::NAN]), [0, 255, 2, 0]);
        assert_eq!(Scalar::convert::<i16, u8, 2>(&[-1, 256]), [255, 0]);
    }
}
