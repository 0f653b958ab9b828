use core::any::TypeId;
use lanekit::backends::Scalar;
use lanekit::capability::{BinaryOp, ElemKind, Op, UnaryOp};
use lanekit::config::emulated_ops;
use lanekit::lanes::is_supported;
use lanekit::registry::{
    Absent, FitsLanes, FloatOf, HalfOf, MaskOf, NarrowerOf, SignedOf, UnsignedOf, WiderOf,
};
use lanekit::{Element, Mask, Native, Vector};

fn same<A: 'static, B: 'static>() -> bool {
    TypeId::of::<A>() == TypeId::of::<B>()
}

type V<T, const N: usize> = Vector<T, N, Scalar>;

#[test]
fn test_sibling_table_for_u8() {
    assert!(same::<MaskOf<V<u8, 16>>, Mask<16>>());
    assert!(same::<HalfOf<V<u8, 16>>, V<u8, 8>>());
    assert!(same::<SignedOf<V<u8, 16>>, V<i8, 16>>());
    assert!(same::<UnsignedOf<V<u8, 16>>, V<u8, 16>>());
    assert!(same::<FloatOf<V<u8, 16>>, Absent>());
    assert!(same::<NarrowerOf<V<u8, 16>>, Absent>());
    assert!(same::<WiderOf<V<u8, 16>>, V<u16, 16>>());
}

#[test]
fn test_sibling_table_for_floats() {
    assert!(same::<SignedOf<V<f32, 8>>, V<i32, 8>>());
    assert!(same::<UnsignedOf<V<f32, 8>>, V<u32, 8>>());
    assert!(same::<FloatOf<V<f32, 8>>, V<f32, 8>>());
    assert!(same::<NarrowerOf<V<f32, 8>>, Absent>());
    assert!(same::<WiderOf<V<f32, 8>>, V<f64, 8>>());

    assert!(same::<NarrowerOf<V<f64, 4>>, V<f32, 4>>());
    assert!(same::<WiderOf<V<f64, 4>>, Absent>());
    assert!(same::<SignedOf<V<f64, 4>>, V<i64, 4>>());
}

#[test]
fn test_sibling_table_for_wide_ints() {
    assert!(same::<WiderOf<V<i64, 2>>, Absent>());
    assert!(same::<NarrowerOf<V<i64, 2>>, V<i32, 2>>());
    assert!(same::<FloatOf<V<u32, 4>>, V<f32, 4>>());
    assert!(same::<FloatOf<V<i64, 4>>, V<f64, 4>>());
    assert!(same::<FloatOf<V<u16, 8>>, Absent>());
    assert!(same::<UnsignedOf<V<i16, 8>>, V<u16, 8>>());
}

#[test]
fn test_wider_sibling_of_full_size_vectors_is_absent() {
    assert!(same::<WiderOf<V<u32, 32>>, Absent>());
    assert!(same::<WiderOf<V<i32, 32>>, Absent>());
    assert!(same::<WiderOf<V<f32, 32>>, Absent>());
    assert!(same::<WiderOf<V<u16, 64>>, Absent>());
    assert!(same::<WiderOf<lanekit::U32x32>, Absent>());

    // 64 lanes of u16 is exactly 128 bytes.
    assert!(same::<WiderOf<V<u8, 64>>, V<u16, 64>>());
    assert!(same::<WiderOf<V<i32, 16>>, V<i64, 16>>());
    assert!(same::<NarrowerOf<V<f64, 16>>, V<f32, 16>>());
    assert!(same::<FloatOf<V<i64, 16>>, V<f64, 16>>());
}

fn fits<T: FitsLanes<N>, const N: usize>() -> usize {
    N * core::mem::size_of::<T>()
}

#[test]
fn test_fitting_shapes_stay_within_128_bytes() {
    assert_eq!(fits::<u8, 64>(), 64);
    assert_eq!(fits::<u16, 64>(), 128);
    assert_eq!(fits::<f32, 32>(), 128);
    assert_eq!(fits::<u64, 16>(), 128);
    assert_eq!(fits::<i64, 1>(), 8);
}

#[test]
fn test_half_width_shapes() {
    assert!(same::<HalfOf<V<u32, 2>>, V<u32, 1>>());
    assert!(same::<HalfOf<V<u32, 1>>, Absent>());
    assert!(same::<HalfOf<V<f64, 16>>, V<f64, 8>>());
    assert!(same::<HalfOf<Vector<u8, 64>>, Vector<u8, 32, Native>>());
}

#[test]
fn test_supported_lane_counts() {
    for n in [1, 2, 4, 8, 16, 32, 64] {
        assert!(is_supported(n), "{n}");
    }
    for n in [0, 3, 12, 48, 128] {
        assert!(!is_supported(n), "{n}");
    }
}

#[test]
fn test_element_kinds_line_up() {
    assert_eq!(<u8 as Element>::KIND, ElemKind::U8);
    assert_eq!(<f64 as Element>::KIND, ElemKind::F64);
    assert_eq!(<i16 as Element>::BITS, 16);
    assert_eq!(ElemKind::U32.float(), Some(ElemKind::F32));
    assert_eq!(ElemKind::U16.float(), None);
    assert_eq!(ElemKind::I64.wider(), None);
    assert_eq!(ElemKind::F32.signed(), Some(ElemKind::I32));
}

#[test]
fn test_operation_applicability() {
    assert!(!Op::Unary(UnaryOp::Sqrt).applies_to(ElemKind::U32));
    assert!(Op::Unary(UnaryOp::Sqrt).applies_to(ElemKind::F32));
    assert!(!Op::Binary(BinaryOp::And).applies_to(ElemKind::F64));
    assert!(!Op::Unary(UnaryOp::Neg).applies_to(ElemKind::U8));
    assert!(Op::for_kind(ElemKind::I8).all(|op| op.applies_to(ElemKind::I8)));
}

#[test]
fn test_scalar_plugin_emulates_every_applicable_op() {
    for kind in ElemKind::ALL {
        let applicable = Op::for_kind(kind).count();
        assert!(applicable > 0);
        assert_eq!(emulated_ops::<Scalar>(kind).count(), applicable, "{}", kind.name());
    }
}
