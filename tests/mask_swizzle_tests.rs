use lanekit::prelude::*;
use lanekit::Error;
use proptest::prelude::*;

fn flags(mask: Mask<16>) -> [bool; 16] {
    mask.to_array()
}

#[test]
fn test_mask_counts_and_queries() {
    let m = Mask::<8>::new([false, true, false, false, true, true, false, false]);
    assert_eq!(m.count(), 3);
    assert_eq!(m.first(), Some(1));
    assert_eq!(m.iter_set().collect::<Vec<_>>(), vec![1, 4, 5]);
    assert!(m.any() && !m.all() && !m.none());
    assert!(m.hlxor());
    assert!(!m.hland());
    assert!(m.hlor());

    assert_eq!(Mask::<8>::all_false().first(), None);
    assert!(Mask::<8>::all_true().hland());
    assert_eq!(Mask::<4>::all_true().bits(), 0b1111);
}

#[test]
fn test_mask_from_bits_discards_high_lanes() {
    let m = Mask::<4>::from_bits(0xFF);
    assert_eq!(m.bits(), 0b1111);
    assert!(m.all());
    assert_eq!(!m, Mask::all_false());
}

#[test]
fn test_mask_masked_logic_keeps_unselected_lanes() {
    let a = Mask::<4>::new([true, true, false, false]);
    let b = Mask::<4>::new([true, false, true, false]);
    let sel = Mask::<4>::new([false, true, true, false]);
    assert_eq!(a.land_masked(sel, b).to_array(), [true, false, false, false]);
    assert_eq!(a.lor_masked(sel, b).to_array(), [true, true, true, false]);
    assert_eq!(a.lnot_masked(sel).to_array(), [true, false, true, false]);
}

#[test]
fn test_mask_insert_and_extract() {
    let mut m = Mask::<16>::all_false();
    m.insert(9, true);
    m.insert(3, true);
    m.insert(9, false);
    assert!(m.extract(3));
    assert!(!m.extract(9));
    assert_eq!(m.count(), 1);
}

#[test]
fn test_mask_from_compare_feeds_masked_ops() {
    let v = I32x8::new([-3, 7, 0, -1, 12, -8, 5, 2]);
    let negative = v.cmplt(&I32x8::zero());
    assert_eq!(negative.iter_set().collect::<Vec<_>>(), vec![0, 3, 5]);
    assert_eq!(v.neg_masked(&negative).to_array(), [3, 7, 0, 1, 12, 8, 5, 2]);
}

#[test]
fn test_swizzle_constructors() {
    let v = U16x8::from_fn(|i| i as u16 * 10);
    assert_eq!(v.swizzle(&Swizzle::identity()), v);
    assert_eq!(v.swizzle(&Swizzle::reverse()).to_array(), [70, 60, 50, 40, 30, 20, 10, 0]);
    assert_eq!(v.swizzle(&Swizzle::rotate(3)).to_array(), [30, 40, 50, 60, 70, 0, 10, 20]);
    assert_eq!(v.swizzle(&Swizzle::broadcast(5)), U16x8::splat(50));

    assert!(Swizzle::<8>::reverse().is_permutation());
    assert!(!Swizzle::<8>::broadcast(1).is_permutation());
}

#[test]
fn test_swizzle_try_new_reports_first_bad_index() {
    let err = Swizzle::<4>::try_new([0, 1, 9, 12]).unwrap_err();
    assert_eq!(err, Error::SwizzleIndex { lane: 2, index: 9, lanes: 4 });
    assert_eq!(err.to_string(), "swizzle index 9 at lane 2 is out of range for 4 lanes");
    assert!(Swizzle::<4>::try_new([3, 2, 1, 0]).is_ok());
}

#[test]
fn test_swizzle_masked_keeps_unselected_lanes() {
    let v = U8x16::from_fn(|i| i as u8);
    let even = Mask::from_fn(|i| i % 2 == 0);
    let r = v.swizzle_masked(&even, &Swizzle::broadcast(15));
    for i in 0..16 {
        let expect = if i % 2 == 0 { 15 } else { i as u8 };
        assert_eq!(r.extract(i), expect);
    }
}

proptest! {
    #[test]
    fn fuzz_mask_logic_matches_bool_lanes(a in any::<u16>(), b in any::<u16>()) {
        let (x, y) = (Mask::<16>::from_bits(a as u64), Mask::<16>::from_bits(b as u64));
        let (fx, fy) = (flags(x), flags(y));
        for i in 0..16 {
            prop_assert_eq!(flags(x & y)[i], fx[i] && fy[i]);
            prop_assert_eq!(flags(x | y)[i], fx[i] || fy[i]);
            prop_assert_eq!(flags(x ^ y)[i], fx[i] != fy[i]);
            prop_assert_eq!(flags(!x)[i], !fx[i]);
        }
        prop_assert_eq!(x.count() as usize, fx.iter().filter(|&&f| f).count());
        prop_assert_eq!(Mask::<16>::new(fx), x);
    }

    #[test]
    fn fuzz_swizzle_permutes_lanes(indices in prop::array::uniform8(0u8..8)) {
        let v = U32x8::from_fn(|i| (i as u32 + 1) * 3);
        let s = Swizzle::new(indices);
        let r = v.swizzle(&s);
        for i in 0..8 {
            prop_assert_eq!(r.extract(i), v.extract(indices[i] as usize));
        }
        prop_assert_eq!(r.unique(), s.is_permutation());
    }
}
