//! Cross-backend equivalence: every x86 plugin entry point must produce the
//! same bits as the scalar plugin, for every element kind and a spread of
//! shapes (below one register, exactly one, and several).
//!
//! Randomized float inputs mix finite values with NaN, infinities, signed
//! zeros and subnormals, and are compared with every NaN folded together,
//! since the payload of a NaN produced from two different NaNs depends on
//! operand order. The fixed special-value cases compare raw bits, NaN
//! payloads included. Fused ops draw from finite ranges only. Integer
//! division uses non-zero divisors.

#![cfg(all(target_arch = "x86_64", feature = "x86"))]

use lanekit::backends::{Scalar, X86};
use lanekit::capability::{BinaryOp, CmpOp, FusedOp, ReduceOp, ShiftOp, UnaryOp};
use lanekit::prelude::*;
use lanekit::{Element, Plugin};
use proptest::prelude::*;
use std::fmt::Debug;
use std::hint::black_box;

fn lanes<T: Arbitrary + Debug, const N: usize>() -> impl Strategy<Value = [T; N]> {
    prop::collection::vec(any::<T>(), N).prop_map(|v| match v.try_into() {
        Ok(array) => array,
        Err(v) => panic!("strategy produced {} lanes, wanted {N}", Vec::len(&v)),
    })
}

fn float_lanes<S, const N: usize>(range: S) -> impl Strategy<Value = [S::Value; N]>
where
    S: Strategy,
    S::Value: Debug,
{
    prop::collection::vec(range, N).prop_map(|v| match v.try_into() {
        Ok(array) => array,
        Err(v) => panic!("strategy produced {} lanes, wanted {N}", Vec::len(&v)),
    })
}

fn bits<T: Element, const N: usize>(a: &[T; N]) -> [u64; N] {
    core::array::from_fn(|i| a[i].to_bits())
}

/// Bit patterns, with every NaN lane as `None`.
fn nan_folded<T: Element, const N: usize>(a: &[T; N]) -> [Option<u64>; N] {
    core::array::from_fn(|i| a[i].partial_cmp(&a[i]).map(|_| a[i].to_bits()))
}

/// Lanes alternate between `a` and `b`, so compares see equal lanes too.
fn interleave<T: Copy, const N: usize>(a: &[T; N], b: &[T; N]) -> [T; N] {
    core::array::from_fn(|i| if i % 3 == 0 { a[i] } else { b[i] })
}

macro_rules! conversions_agree {
    ($check:ident, $view:ident; $a:expr, $t:ty, $n:literal; $($to:ty),*) => {
        $(
            $check!(
                $view(&X86::convert::<$t, $to, $n>(&$a)),
                $view(&Scalar::convert::<$t, $to, $n>(&$a)),
                "{} -> {}", stringify!($t), stringify!($to)
            );
        )*
    };
}

macro_rules! int_equivalence {
    ($name:ident, $t:ty, $n:literal) => {
        mod $name {
            use super::*;

            proptest! {
                #![proptest_config(ProptestConfig::with_cases(64))]

                #[test]
                fn fuzz_binary_ops(a in lanes::<$t, $n>(), b in lanes::<$t, $n>()) {
                    for op in BinaryOp::ALL {
                        if op == BinaryOp::Div {
                            continue;
                        }
                        prop_assert_eq!(X86::binary(op, &a, &b), Scalar::binary(op, &a, &b), "{:?}", op);
                    }
                }

                #[test]
                fn fuzz_division(a in lanes::<$t, $n>(), b in lanes::<$t, $n>()) {
                    let b = b.map(|x| if x == 0 { 1 } else { x });
                    prop_assert_eq!(
                        X86::binary(BinaryOp::Div, &a, &b),
                        Scalar::binary(BinaryOp::Div, &a, &b)
                    );
                }

                #[test]
                fn fuzz_unary_ops(a in lanes::<$t, $n>()) {
                    for op in UnaryOp::ALL {
                        prop_assert_eq!(X86::unary(op, &a), Scalar::unary(op, &a), "{:?}", op);
                    }
                }

                #[test]
                fn fuzz_fused_ops(a in lanes::<$t, $n>(), b in lanes::<$t, $n>(), c in lanes::<$t, $n>()) {
                    for op in [FusedOp::MulAdd, FusedOp::MulSub] {
                        prop_assert_eq!(X86::fused(op, &a, &b, &c), Scalar::fused(op, &a, &b, &c), "{:?}", op);
                    }
                }

                #[test]
                fn fuzz_compares(a in lanes::<$t, $n>(), b in lanes::<$t, $n>()) {
                    let b = interleave(&a, &b);
                    for op in CmpOp::ALL {
                        prop_assert_eq!(X86::compare(op, &a, &b), Scalar::compare(op, &a, &b), "{:?}", op);
                    }
                }

                #[test]
                fn fuzz_blends(m in any::<u64>(), a in lanes::<$t, $n>(), b in lanes::<$t, $n>()) {
                    let mask = Mask::<$n>::from_bits(m);
                    prop_assert_eq!(X86::blend(mask, &a, &b), Scalar::blend(mask, &a, &b));
                }

                #[test]
                fn fuzz_reductions(a in lanes::<$t, $n>()) {
                    for op in ReduceOp::ALL {
                        prop_assert_eq!(X86::reduce(op, &a), Scalar::reduce(op, &a), "{:?}", op);
                    }
                }

                #[test]
                fn fuzz_shifts(a in lanes::<$t, $n>(), count in 0u32..(<$t>::BITS)) {
                    for op in ShiftOp::ALL {
                        prop_assert_eq!(
                            X86::shift_uniform(op, &a, count),
                            Scalar::shift_uniform(op, &a, count),
                            "{:?} by {}", op, count
                        );
                    }
                }

                #[test]
                fn fuzz_conversions(a in lanes::<$t, $n>()) {
                    conversions_agree!(prop_assert_eq, bits; a, $t, $n; u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
                }
            }
        }
    };
}

macro_rules! float_equivalence {
    ($name:ident, $t:ident, $n:literal) => {
        mod $name {
            use super::*;

            fn finite() -> impl Strategy<Value = [$t; $n]> {
                float_lanes::<_, $n>((-1.0e3 as $t)..(1.0e3 as $t))
            }

            fn special() -> impl Strategy<Value = $t> {
                prop_oneof![
                    Just(<$t>::NAN),
                    Just(<$t>::INFINITY),
                    Just(<$t>::NEG_INFINITY),
                    Just(0.0 as $t),
                    Just(-0.0 as $t),
                    Just(<$t>::MIN_POSITIVE / 4.0),
                    Just(-<$t>::MIN_POSITIVE),
                    Just(<$t>::MAX),
                    Just(<$t>::MIN),
                ]
            }

            fn mixed() -> impl Strategy<Value = [$t; $n]> {
                float_lanes::<_, $n>(prop_oneof![
                    3 => (-1.0e3 as $t)..(1.0e3 as $t),
                    1 => special(),
                ])
            }

            proptest! {
                #![proptest_config(ProptestConfig::with_cases(64))]

                #[test]
                fn fuzz_binary_ops(a in mixed(), b in mixed()) {
                    for op in BinaryOp::ALL {
                        prop_assert_eq!(
                            nan_folded(&X86::binary(op, &a, &b)),
                            nan_folded(&Scalar::binary(op, &a, &b)),
                            "{:?}", op
                        );
                    }
                }

                #[test]
                fn fuzz_unary_ops(a in mixed()) {
                    for op in UnaryOp::ALL {
                        prop_assert_eq!(
                            nan_folded(&X86::unary(op, &a)),
                            nan_folded(&Scalar::unary(op, &a)),
                            "{:?}", op
                        );
                    }
                }

                #[test]
                fn fuzz_square_root(a in float_lanes::<_, $n>((0.0 as $t)..(1.0e6 as $t))) {
                    prop_assert_eq!(
                        bits(&X86::unary(UnaryOp::Sqrt, &a)),
                        bits(&Scalar::unary(UnaryOp::Sqrt, &a))
                    );
                }

                #[test]
                fn fuzz_fused_ops(a in finite(), b in finite(), c in finite()) {
                    for op in [FusedOp::MulAdd, FusedOp::MulSub] {
                        prop_assert_eq!(
                            bits(&X86::fused(op, &a, &b, &c)),
                            bits(&Scalar::fused(op, &a, &b, &c)),
                            "{:?}", op
                        );
                    }
                }

                #[test]
                fn fuzz_compares(a in mixed(), b in mixed()) {
                    let b = interleave(&a, &b);
                    for op in CmpOp::ALL {
                        prop_assert_eq!(X86::compare(op, &a, &b), Scalar::compare(op, &a, &b), "{:?}", op);
                    }
                }

                #[test]
                fn fuzz_blends(m in any::<u64>(), a in mixed(), b in mixed()) {
                    let mask = Mask::<$n>::from_bits(m);
                    prop_assert_eq!(bits(&X86::blend(mask, &a, &b)), bits(&Scalar::blend(mask, &a, &b)));
                }

                #[test]
                fn fuzz_reductions(a in mixed()) {
                    for op in [ReduceOp::Add, ReduceOp::Mul, ReduceOp::Max, ReduceOp::Min] {
                        prop_assert_eq!(
                            nan_folded(&[X86::reduce(op, &a)]),
                            nan_folded(&[Scalar::reduce(op, &a)]),
                            "{:?}", op
                        );
                    }
                }

                #[test]
                fn fuzz_conversions(a in mixed()) {
                    conversions_agree!(prop_assert_eq, nan_folded; a, $t, $n; u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
                }
            }
        }
    };
}

/// Runs a fixed array of special values against a permutation of itself
/// through every float-relevant entry point, comparing raw bits.
macro_rules! special_values_agree {
    ($name:ident, $t:ty, $n:literal, $specials:expr) => {
        #[test]
        fn $name() {
            let a: [$t; $n] = black_box($specials);
            let b: [$t; $n] = black_box(core::array::from_fn(|i| a[(i * 5 + 3) % $n]));
            for op in BinaryOp::ALL {
                assert_eq!(bits(&X86::binary(op, &a, &b)), bits(&Scalar::binary(op, &a, &b)), "{:?}", op);
            }
            for op in UnaryOp::ALL {
                assert_eq!(bits(&X86::unary(op, &a)), bits(&Scalar::unary(op, &a)), "{:?}", op);
            }
            for op in CmpOp::ALL {
                assert_eq!(X86::compare(op, &a, &b), Scalar::compare(op, &a, &b), "{:?}", op);
            }
            for op in [ReduceOp::Add, ReduceOp::Mul, ReduceOp::Max, ReduceOp::Min] {
                for v in [&a, &b] {
                    assert_eq!(X86::reduce(op, v).to_bits(), Scalar::reduce(op, v).to_bits(), "{:?}", op);
                }
            }
            conversions_agree!(assert_eq, bits; a, $t, $n; u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
        }
    };
}

int_equivalence!(u8x8, u8, 8);
int_equivalence!(u8x16, u8, 16);
int_equivalence!(u8x64, u8, 64);
int_equivalence!(u16x8, u16, 8);
int_equivalence!(u16x32, u16, 32);
int_equivalence!(u32x2, u32, 2);
int_equivalence!(u32x4, u32, 4);
int_equivalence!(u32x16, u32, 16);
int_equivalence!(u64x2, u64, 2);
int_equivalence!(u64x16, u64, 16);
int_equivalence!(i8x16, i8, 16);
int_equivalence!(i8x32, i8, 32);
int_equivalence!(i16x16, i16, 16);
int_equivalence!(i32x8, i32, 8);
int_equivalence!(i32x32, i32, 32);
int_equivalence!(i64x4, i64, 4);

float_equivalence!(f32x2, f32, 2);
float_equivalence!(f32x4, f32, 4);
float_equivalence!(f32x32, f32, 32);
float_equivalence!(f64x2, f64, 2);
float_equivalence!(f64x16, f64, 16);

special_values_agree!(
    test_special_f32_values_agree,
    f32,
    16,
    [
        f32::NAN,
        -f32::NAN,
        f32::INFINITY,
        f32::NEG_INFINITY,
        0.0,
        -0.0,
        f32::from_bits(1),
        f32::from_bits(0x8000_0001),
        f32::MIN_POSITIVE,
        -f32::MIN_POSITIVE,
        f32::MAX,
        f32::MIN,
        1.0,
        -1.0,
        f32::from_bits(0x7FC0_1234),
        0.5,
    ]
);

special_values_agree!(
    test_special_f64_values_agree,
    f64,
    8,
    [
        f64::NAN,
        f64::NEG_INFINITY,
        -0.0,
        f64::from_bits(1),
        f64::INFINITY,
        0.0,
        -f64::NAN,
        f64::MIN_POSITIVE,
    ]
);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fuzz_per_lane_shifts_agree(a in lanes::<u32, 8>(), counts in lanes::<u8, 8>()) {
        let counts = counts.map(|c| u32::from(c) % 32);
        for op in ShiftOp::ALL {
            prop_assert_eq!(X86::shift_lanes(op, &a, &counts), Scalar::shift_lanes(op, &a, &counts));
        }
    }

    #[test]
    fn fuzz_masked_vector_ops_agree(m in any::<u64>(), a in lanes::<i16, 16>(), b in lanes::<i16, 16>()) {
        let mask = Mask::<16>::from_bits(m);
        let (x, y) = (Vector::<i16, 16, X86>::new(a), Vector::<i16, 16, X86>::new(b));
        let (sx, sy) = (x.with_plugin::<Scalar>(), y.with_plugin::<Scalar>());
        prop_assert_eq!(x.sadd_masked(&mask, y).to_array(), sx.sadd_masked(&mask, sy).to_array());
        prop_assert_eq!(x.max_masked(&mask, y).to_array(), sx.max_masked(&mask, sy).to_array());
        prop_assert_eq!(x.hadd_masked(&mask), sx.hadd_masked(&mask));
        prop_assert_eq!(x.imin_masked(&mask), sx.imin_masked(&mask));
        prop_assert_eq!(x.abs_masked(&mask).to_array(), sx.abs_masked(&mask).to_array());
    }
}

#[test]
fn test_native_reports_match_x86_table() {
    use lanekit::capability::{x86_native, ElemKind, IsaFeatures, Op};
    for kind in ElemKind::ALL {
        for op in Op::for_kind(kind) {
            assert_eq!(X86::native(op, kind), x86_native(op, kind, IsaFeatures::TARGET));
        }
    }
    assert!(!Scalar::native(Op::Binary(BinaryOp::Add), ElemKind::U8));
}
