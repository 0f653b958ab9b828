//! # Lane Elements
//!
//! The sealed set of scalar types a vector lane can hold, and their per-lane
//! semantics. Every plugin must agree with these definitions bit-for-bit:
//! the scalar plugin simply loops over them.
//!
//! Integer arithmetic wraps. Integer division by zero yields zero (callers
//! catch it with a debug assertion before it gets here). Shift and rotate
//! amounts are masked to the lane width.

use crate::capability::{BinaryOp, ElemKind, FusedOp, ReduceOp, ShiftOp, UnaryOp};
use crate::registry::Sibling;
use core::fmt::Debug;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A scalar type that can live in a vector lane.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a lane element type",
    label = "this vector kind has no such sibling type",
    note = "the trait registry marks missing siblings (e.g. the wider kind of a 64-bit lane) as `Absent`"
)]
pub trait Element:
    sealed::Sealed + Copy + Debug + Default + PartialEq + PartialOrd + Send + Sync + 'static
{
    /// Runtime tag.
    const KIND: ElemKind;
    /// Lane width in bits.
    const BITS: u32 = Self::KIND.bits();
    const ZERO: Self;
    const ONE: Self;
    /// Smallest representable value (most negative finite value for floats).
    const MIN: Self;
    /// Largest representable value (largest finite value for floats).
    const MAX: Self;

    /// Same-width signed sibling.
    type Signed: Sibling;
    /// Same-width unsigned sibling.
    type Unsigned: Sibling;
    /// Same-width float sibling.
    type Float: Sibling;
    /// Half-width sibling of the same family.
    type Narrower: Sibling;
    /// Double-width sibling of the same family.
    type Wider: Sibling;

    fn binary(op: BinaryOp, a: Self, b: Self) -> Self;
    /// `Sqrt` returns integer lanes unchanged.
    fn unary(op: UnaryOp, a: Self) -> Self;
    fn fused(op: FusedOp, a: Self, b: Self, c: Self) -> Self;

    /// Shift or rotate by `count`, masked to the lane width.
    /// Float lanes are returned unchanged.
    fn shift(op: ShiftOp, a: Self, count: u32) -> Self;

    /// Raw bit pattern, zero-extended.
    fn to_bits(self) -> u64;

    /// Inverse of [`Element::to_bits`]; higher bits are discarded.
    fn from_bits(bits: u64) -> Self;

    /// The value a masked-out lane contributes to a reduction.
    fn identity(op: ReduceOp) -> Self;
}

/// Integer lanes: bitwise and shift operations apply.
pub trait IntElement: Element {}

/// Unsigned integer lanes, usable as gather/scatter indices.
pub trait UnsignedElement: IntElement {
    fn to_index(self) -> usize;
}

/// Lanes with a sign: negation and absolute value apply.
pub trait SignedElement: Element {}

/// Floating-point lanes.
pub trait FloatElement: SignedElement {}

/// Numeric `as` conversion from one lane type to another.
pub trait AsLane<U: Element>: Element {
    fn as_lane(self) -> U;
}

macro_rules! impl_int_element {
    ($t:ident, $kind:ident, signed: $s:ty, unsigned: $u:ty, float: $f:ty, narrower: $n:ty, wider: $w:ty) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const KIND: ElemKind = ElemKind::$kind;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            type Signed = $s;
            type Unsigned = $u;
            type Float = $f;
            type Narrower = $n;
            type Wider = $w;

            #[inline(always)]
            fn binary(op: BinaryOp, a: Self, b: Self) -> Self {
                match op {
                    BinaryOp::Add => a.wrapping_add(b),
                    BinaryOp::Sub => a.wrapping_sub(b),
                    BinaryOp::Mul => a.wrapping_mul(b),
                    BinaryOp::Div => {
                        if b == 0 {
                            0
                        } else {
                            a.wrapping_div(b)
                        }
                    }
                    BinaryOp::Min => {
                        if a < b {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::Max => {
                        if a > b {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::SatAdd => saturating_add!($t, a, b),
                    BinaryOp::SatSub => saturating_sub!($t, a, b),
                    BinaryOp::And => a & b,
                    BinaryOp::Or => a | b,
                    BinaryOp::Xor => a ^ b,
                }
            }

            #[inline(always)]
            fn unary(op: UnaryOp, a: Self) -> Self {
                match op {
                    UnaryOp::Neg => a.wrapping_neg(),
                    UnaryOp::Abs => int_abs!($t, a),
                    UnaryOp::Not => !a,
                    UnaryOp::Sqrt => a,
                }
            }

            #[inline(always)]
            fn fused(op: FusedOp, a: Self, b: Self, c: Self) -> Self {
                match op {
                    FusedOp::MulAdd => a.wrapping_mul(b).wrapping_add(c),
                    FusedOp::MulSub => a.wrapping_mul(b).wrapping_sub(c),
                }
            }

            #[inline(always)]
            fn shift(op: ShiftOp, a: Self, count: u32) -> Self {
                match op {
                    ShiftOp::Left => a.wrapping_shl(count),
                    ShiftOp::Right => a.wrapping_shr(count),
                    ShiftOp::RotateLeft => a.rotate_left(count),
                    ShiftOp::RotateRight => a.rotate_right(count),
                }
            }

            #[inline(always)]
            fn to_bits(self) -> u64 {
                self as $u as u64
            }

            #[inline(always)]
            fn from_bits(bits: u64) -> Self {
                bits as $u as $t
            }

            #[inline(always)]
            fn identity(op: ReduceOp) -> Self {
                match op {
                    ReduceOp::Add | ReduceOp::Or | ReduceOp::Xor => 0,
                    ReduceOp::Mul => 1,
                    ReduceOp::And => !0,
                    ReduceOp::Max => <$t>::MIN,
                    ReduceOp::Min => <$t>::MAX,
                }
            }
        }

        impl IntElement for $t {}
    };
}

// Unsigned saturation written the way the contract states it, so that it is
// obviously overflow-free: `a > MAX - b ? MAX : a + b` and `a < b ? 0 : a - b`.
macro_rules! saturating_add {
    (u8, $a:ident, $b:ident) => { unsigned_sadd!(u8, $a, $b) };
    (u16, $a:ident, $b:ident) => { unsigned_sadd!(u16, $a, $b) };
    (u32, $a:ident, $b:ident) => { unsigned_sadd!(u32, $a, $b) };
    (u64, $a:ident, $b:ident) => { unsigned_sadd!(u64, $a, $b) };
    ($t:ty, $a:ident, $b:ident) => { $a.saturating_add($b) };
}

macro_rules! saturating_sub {
    (u8, $a:ident, $b:ident) => { unsigned_ssub!($a, $b) };
    (u16, $a:ident, $b:ident) => { unsigned_ssub!($a, $b) };
    (u32, $a:ident, $b:ident) => { unsigned_ssub!($a, $b) };
    (u64, $a:ident, $b:ident) => { unsigned_ssub!($a, $b) };
    ($t:ty, $a:ident, $b:ident) => { $a.saturating_sub($b) };
}

macro_rules! unsigned_sadd {
    ($t:ty, $a:ident, $b:ident) => {
        if $a > <$t>::MAX - $b {
            <$t>::MAX
        } else {
            $a + $b
        }
    };
}

macro_rules! unsigned_ssub {
    ($a:ident, $b:ident) => {
        if $a < $b {
            0
        } else {
            $a - $b
        }
    };
}

macro_rules! int_abs {
    (u8, $a:ident) => { $a };
    (u16, $a:ident) => { $a };
    (u32, $a:ident) => { $a };
    (u64, $a:ident) => { $a };
    ($t:ty, $a:ident) => { $a.wrapping_abs() };
}

macro_rules! impl_float_element {
    ($t:ident, $kind:ident, $bits:ty, signed: $s:ty, unsigned: $u:ty, narrower: $n:ty, wider: $w:ty,
     sqrt: $sqrt:path, fma: $fma:path) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const KIND: ElemKind = ElemKind::$kind;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            type Signed = $s;
            type Unsigned = $u;
            type Float = $t;
            type Narrower = $n;
            type Wider = $w;

            #[inline(always)]
            fn binary(op: BinaryOp, a: Self, b: Self) -> Self {
                match op {
                    BinaryOp::Add | BinaryOp::SatAdd => a + b,
                    BinaryOp::Sub | BinaryOp::SatSub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    // Same operand order as minps/maxps: the second operand
                    // wins on equality and when either side is NaN.
                    BinaryOp::Min => {
                        if a < b {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::Max => {
                        if a > b {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::And => <$t>::from_bits(a.to_bits() & b.to_bits()),
                    BinaryOp::Or => <$t>::from_bits(a.to_bits() | b.to_bits()),
                    BinaryOp::Xor => <$t>::from_bits(a.to_bits() ^ b.to_bits()),
                }
            }

            #[inline(always)]
            fn unary(op: UnaryOp, a: Self) -> Self {
                const SIGN: $bits = 1 << (<$bits>::BITS - 1);
                match op {
                    UnaryOp::Neg => <$t>::from_bits(a.to_bits() ^ SIGN),
                    UnaryOp::Abs => <$t>::from_bits(a.to_bits() & !SIGN),
                    UnaryOp::Not => <$t>::from_bits(!a.to_bits()),
                    UnaryOp::Sqrt => $sqrt(a),
                }
            }

            #[inline(always)]
            fn fused(op: FusedOp, a: Self, b: Self, c: Self) -> Self {
                match op {
                    FusedOp::MulAdd => $fma(a, b, c),
                    FusedOp::MulSub => $fma(a, b, -c),
                }
            }

            #[inline(always)]
            fn shift(_op: ShiftOp, a: Self, _count: u32) -> Self {
                a
            }

            #[inline(always)]
            fn to_bits(self) -> u64 {
                <$t>::to_bits(self) as u64
            }

            #[inline(always)]
            fn from_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as $bits)
            }

            #[inline(always)]
            fn identity(op: ReduceOp) -> Self {
                match op {
                    ReduceOp::Add | ReduceOp::Or | ReduceOp::Xor => 0.0,
                    ReduceOp::Mul => 1.0,
                    ReduceOp::And => <$t>::from_bits(!0),
                    ReduceOp::Max => <$t>::NEG_INFINITY,
                    ReduceOp::Min => <$t>::INFINITY,
                }
            }
        }

        impl SignedElement for $t {}
        impl FloatElement for $t {}
    };
}

use crate::registry::Absent;

impl_int_element!(u8, U8, signed: i8, unsigned: u8, float: Absent, narrower: Absent, wider: u16);
impl_int_element!(u16, U16, signed: i16, unsigned: u16, float: Absent, narrower: u8, wider: u32);
impl_int_element!(u32, U32, signed: i32, unsigned: u32, float: f32, narrower: u16, wider: u64);
impl_int_element!(u64, U64, signed: i64, unsigned: u64, float: f64, narrower: u32, wider: Absent);
impl_int_element!(i8, I8, signed: i8, unsigned: u8, float: Absent, narrower: Absent, wider: i16);
impl_int_element!(i16, I16, signed: i16, unsigned: u16, float: Absent, narrower: i8, wider: i32);
impl_int_element!(i32, I32, signed: i32, unsigned: u32, float: f32, narrower: i16, wider: i64);
impl_int_element!(i64, I64, signed: i64, unsigned: u64, float: f64, narrower: i32, wider: Absent);

impl_float_element!(f32, F32, u32, signed: i32, unsigned: u32, narrower: Absent, wider: f64,
    sqrt: libm::sqrtf, fma: libm::fmaf);
impl_float_element!(f64, F64, u64, signed: i64, unsigned: u64, narrower: f32, wider: Absent,
    sqrt: libm::sqrt, fma: libm::fma);

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl UnsignedElement for $t {
                #[inline(always)]
                fn to_index(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_unsigned!(u8, u16, u32, u64);

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(impl SignedElement for $t {})*
    };
}

impl_signed!(i8, i16, i32, i64);

macro_rules! impl_as_lane {
    ($from:ty => $($to:ty),*) => {
        $(
            impl AsLane<$to> for $from {
                #[inline(always)]
                fn as_lane(self) -> $to {
                    self as $to
                }
            }
        )*
    };
}

impl_as_lane!(u8 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(u16 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(u32 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(u64 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(i8 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(i16 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(i32 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(i64 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(f32 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
impl_as_lane!(f64 => u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_saturation_matches_formula() {
        assert_eq!(u8::binary(BinaryOp::SatAdd, 200, 100), u8::MAX);
        assert_eq!(u8::binary(BinaryOp::SatAdd, 100, 100), 200);
        assert_eq!(u32::binary(BinaryOp::SatSub, 3, 7), 0);
        assert_eq!(u64::binary(BinaryOp::SatSub, 7, 3), 4);
        assert_eq!(i8::binary(BinaryOp::SatAdd, 100, 100), i8::MAX);
        assert_eq!(i16::binary(BinaryOp::SatSub, i16::MIN, 1), i16::MIN);
    }

    #[test]
    fn division_by_zero_yields_zero() {
        assert_eq!(u32::binary(BinaryOp::Div, 10, 0), 0);
        assert_eq!(i32::binary(BinaryOp::Div, i32::MIN, -1), i32::MIN);
        assert!(f32::binary(BinaryOp::Div, 1.0, 0.0).is_infinite());
    }

    #[test]
    fn integer_sqrt_leaves_lane_alone() {
        assert_eq!(u32::unary(UnaryOp::Sqrt, 9), 9);
        assert_eq!(i8::unary(UnaryOp::Sqrt, -4), -4);
        assert_eq!(f64::unary(UnaryOp::Sqrt, 9.0), 3.0);
    }

    #[test]
    fn shift_amount_is_masked() {
        assert_eq!(u32::shift(ShiftOp::Left, 1, 33), 2);
        assert_eq!(i16::shift(ShiftOp::Right, -4, 1), -2);
        assert_eq!(u8::shift(ShiftOp::RotateLeft, 0x81, 1), 0x03);
        assert_eq!(u16::shift(ShiftOp::RotateRight, 0x0001, 1), 0x8000);
    }

    #[test]
    fn float_minmax_prefers_second_operand() {
        assert_eq!(f32::binary(BinaryOp::Min, 0.0, -0.0).to_bits(), (-0.0f32).to_bits());
        assert!(f32::binary(BinaryOp::Max, 1.0, f32::NAN).is_nan());
        assert_eq!(f32::binary(BinaryOp::Max, f32::NAN, 1.0), 1.0);
    }

    #[test]
    fn identities() {
        assert_eq!(u16::identity(ReduceOp::And), u16::MAX);
        assert_eq!(i32::identity(ReduceOp::Max), i32::MIN);
        assert_eq!(f64::identity(ReduceOp::Min), f64::INFINITY);
        assert_eq!(f32::identity(ReduceOp::Mul), 1.0);
    }

    #[test]
    fn bits_round_trip_through_unsigned() {
        assert_eq!((-1i8).to_bits(), 0xFF);
        assert_eq!(i8::from_bits(0xFF), -1);
        assert_eq!(<f32 as Element>::from_bits(0x3F80_0000), 1.0);
    }

    #[test]
    fn float_abs_and_neg_touch_only_the_sign() {
        assert_eq!(f32::unary(UnaryOp::Abs, -2.5), 2.5);
        assert_eq!(f64::unary(UnaryOp::Neg, 2.5), -2.5);
        assert_eq!(f32::unary(UnaryOp::Sqrt, 9.0), 3.0);
    }
}
