//! x86_64 plugin (128-bit registers).
//!
//! Kernels target the SSE2 baseline every x86_64 CPU has. Faster paths are
//! compiled in when `sse4.1`, `sse4.2` or `fma` are enabled with
//! `-C target-feature`. A `[T; N]` is processed as `N * size_of::<T>() / 16`
//! registers. Vectors narrower than one register, and (op, kind) pairs with
//! no kernel, run on the scalar plugin.

#![allow(unused_unsafe)]

use super::scalar::Scalar;
use crate::capability::{
    self, BinaryOp, CmpOp, ElemKind, FusedOp, IsaFeatures, Op, ReduceOp, ShiftOp, UnaryOp,
    X86_REGISTER_BYTES,
};
use crate::element::{AsLane, Element, IntElement};
use crate::mask::Mask;
use crate::plugin::{sealed, Plugin};
use core::arch::x86_64::*;
use core::cmp::Ordering;
use core::mem::size_of;

const REG: usize = X86_REGISTER_BYTES;
const MAX_REGS: usize = 8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct X86;

impl sealed::Sealed for X86 {}

/// Registers covering `[T; N]`; zero when the array is narrower than one
/// register or wider than the largest vector.
#[inline(always)]
const fn registers<T, const N: usize>() -> usize {
    let bytes = N * size_of::<T>();
    if bytes < REG || bytes > REG * MAX_REGS {
        0
    } else {
        bytes / REG
    }
}

#[inline(always)]
fn load<T, const N: usize>(a: &[T; N], k: usize) -> __m128i {
    debug_assert!((k + 1) * REG <= N * size_of::<T>());
    unsafe { _mm_loadu_si128(a.as_ptr().cast::<u8>().add(k * REG).cast()) }
}

#[inline(always)]
fn store<T, const N: usize>(out: &mut [T; N], k: usize, v: __m128i) {
    debug_assert!((k + 1) * REG <= N * size_of::<T>());
    unsafe { _mm_storeu_si128(out.as_mut_ptr().cast::<u8>().add(k * REG).cast(), v) }
}

#[inline(always)]
fn map1<T: Element, const N: usize>(
    a: &[T; N],
    kernel: impl Fn(__m128i) -> Option<__m128i>,
) -> Option<[T; N]> {
    let regs = registers::<T, N>();
    if regs == 0 {
        return None;
    }
    let mut out = [T::ZERO; N];
    for k in 0..regs {
        store(&mut out, k, kernel(load(a, k))?);
    }
    Some(out)
}

#[inline(always)]
fn map2<T: Element, const N: usize>(
    a: &[T; N],
    b: &[T; N],
    kernel: impl Fn(__m128i, __m128i) -> Option<__m128i>,
) -> Option<[T; N]> {
    let regs = registers::<T, N>();
    if regs == 0 {
        return None;
    }
    let mut out = [T::ZERO; N];
    for k in 0..regs {
        store(&mut out, k, kernel(load(a, k), load(b, k))?);
    }
    Some(out)
}

#[inline(always)]
fn map3<T: Element, const N: usize>(
    a: &[T; N],
    b: &[T; N],
    c: &[T; N],
    kernel: impl Fn(__m128i, __m128i, __m128i) -> Option<__m128i>,
) -> Option<[T; N]> {
    let regs = registers::<T, N>();
    if regs == 0 {
        return None;
    }
    let mut out = [T::ZERO; N];
    for k in 0..regs {
        store(&mut out, k, kernel(load(a, k), load(b, k), load(c, k))?);
    }
    Some(out)
}

impl Plugin for X86 {
    const NAME: &'static str = "x86";
    const REGISTER_BYTES: usize = REG;

    #[inline(always)]
    fn native(op: Op, kind: ElemKind) -> bool {
        capability::x86_native(op, kind, IsaFeatures::TARGET)
    }

    #[inline(always)]
    fn binary<T: Element, const N: usize>(op: BinaryOp, a: &[T; N], b: &[T; N]) -> [T; N] {
        map2(a, b, |x, y| kernel::binary(op, T::KIND, x, y))
            .unwrap_or_else(|| Scalar::binary(op, a, b))
    }

    #[inline(always)]
    fn unary<T: Element, const N: usize>(op: UnaryOp, a: &[T; N]) -> [T; N] {
        map1(a, |x| kernel::unary(op, T::KIND, x)).unwrap_or_else(|| Scalar::unary(op, a))
    }

    #[inline(always)]
    fn fused<T: Element, const N: usize>(op: FusedOp, a: &[T; N], b: &[T; N], c: &[T; N]) -> [T; N] {
        if T::KIND.is_float() {
            return map3(a, b, c, |x, y, z| kernel::fused_float(op, T::KIND, x, y, z))
                .unwrap_or_else(|| Scalar::fused(op, a, b, c));
        }
        // Integer lanes wrap, so the unfused composition is exact.
        let product = Self::binary(BinaryOp::Mul, a, b);
        let combine = match op {
            FusedOp::MulAdd => BinaryOp::Add,
            FusedOp::MulSub => BinaryOp::Sub,
        };
        Self::binary(combine, &product, c)
    }

    fn compare<T: Element, const N: usize>(op: CmpOp, a: &[T; N], b: &[T; N]) -> Mask<N> {
        let regs = registers::<T, N>();
        if regs == 0 {
            return Scalar::compare(op, a, b);
        }
        let width = REG / size_of::<T>();
        let mut mask = Mask::all_false();
        for k in 0..regs {
            match kernel::compare(op, T::KIND, load(a, k), load(b, k)) {
                Some(m) => mask.set_chunk(k, width, kernel::movemask(m, size_of::<T>())),
                None => return Scalar::compare(op, a, b),
            }
        }
        mask
    }

    fn blend<T: Element, const N: usize>(mask: Mask<N>, if_true: &[T; N], if_false: &[T; N]) -> [T; N] {
        let regs = registers::<T, N>();
        if regs == 0 {
            return Scalar::blend(mask, if_true, if_false);
        }
        let width = REG / size_of::<T>();
        let mut out = [T::ZERO; N];
        for k in 0..regs {
            let m = kernel::expand(mask.chunk_bits(k, width), size_of::<T>());
            store(&mut out, k, kernel::select(m, load(if_true, k), load(if_false, k)));
        }
        out
    }

    fn reduce<T: Element, const N: usize>(op: ReduceOp, a: &[T; N]) -> T {
        reduce_registers(op.binary(), a).unwrap_or_else(|| Scalar::reduce(op, a))
    }

    #[inline(always)]
    fn shift_uniform<T: IntElement, const N: usize>(op: ShiftOp, a: &[T; N], count: u32) -> [T; N] {
        map1(a, |x| kernel::shift(op, T::KIND, x, count))
            .unwrap_or_else(|| Scalar::shift_uniform(op, a, count))
    }

    #[inline(always)]
    fn shift_lanes<T: IntElement, const N: usize>(op: ShiftOp, a: &[T; N], counts: &[u32; N]) -> [T; N] {
        Scalar::shift_lanes(op, a, counts)
    }

    fn convert<T: Element + AsLane<U>, U: Element, const N: usize>(a: &[T; N]) -> [U; N] {
        convert_registers(a).unwrap_or_else(|| Scalar::convert(a))
    }
}

/// Folds register `k` with register `k + width` until one remains, then
/// halves inside it. The pairing is the same halving tree as the scalar
/// reduction, so float results agree bit for bit.
fn reduce_registers<T: Element, const N: usize>(op: BinaryOp, a: &[T; N]) -> Option<T> {
    let regs = registers::<T, N>();
    if regs == 0 {
        return None;
    }
    let size = size_of::<T>();
    let mut acc = [unsafe { _mm_setzero_si128() }; MAX_REGS];
    for (k, slot) in acc.iter_mut().enumerate().take(regs) {
        *slot = load(a, k);
    }
    let mut width = regs;
    while width > 1 {
        width /= 2;
        for k in 0..width {
            acc[k] = kernel::binary(op, T::KIND, acc[k], acc[k + width])?;
        }
    }
    let mut v = acc[0];
    let mut lanes = REG / size;
    while lanes > 1 {
        lanes /= 2;
        let high = kernel::shift_bytes_down(v, lanes * size);
        v = kernel::binary(op, T::KIND, v, high)?;
    }
    let mut bytes = [0u8; REG];
    unsafe {
        _mm_storeu_si128(bytes.as_mut_ptr().cast(), v);
        Some(bytes.as_ptr().cast::<T>().read_unaligned())
    }
}

fn convert_registers<T: Element + AsLane<U>, U: Element, const N: usize>(a: &[T; N]) -> Option<[U; N]> {
    let (from, to) = (T::KIND, U::KIND);
    let (src, dst) = (registers::<T, N>(), registers::<U, N>());
    if src == 0 || dst == 0 || !capability::x86_native_convert(from, to) {
        return None;
    }
    let mut out = [U::ZERO; N];
    match from.bytes().cmp(&to.bytes()) {
        Ordering::Equal => {
            for k in 0..src {
                store(&mut out, k, kernel::convert_same_width(from, to, load(a, k))?);
            }
        }
        Ordering::Less => {
            for k in 0..src {
                let (lo, hi) = kernel::widen(from, to, load(a, k))?;
                store(&mut out, 2 * k, lo);
                store(&mut out, 2 * k + 1, hi);
            }
        }
        Ordering::Greater => {
            for k in 0..dst {
                store(&mut out, k, kernel::narrow(from, to, load(a, 2 * k), load(a, 2 * k + 1))?);
            }
        }
    }
    Some(out)
}

/// One-register kernels. `None` means "no kernel for this kind"; the caller
/// then reruns the whole operation on the scalar plugin.
mod kernel {
    use super::*;

    #[inline(always)]
    fn as_ps(v: __m128i) -> __m128 {
        unsafe { _mm_castsi128_ps(v) }
    }

    #[inline(always)]
    fn as_pd(v: __m128i) -> __m128d {
        unsafe { _mm_castsi128_pd(v) }
    }

    #[inline(always)]
    fn from_ps(v: __m128) -> __m128i {
        unsafe { _mm_castps_si128(v) }
    }

    #[inline(always)]
    fn from_pd(v: __m128d) -> __m128i {
        unsafe { _mm_castpd_si128(v) }
    }

    #[inline(always)]
    fn ones() -> __m128i {
        unsafe { _mm_set1_epi32(-1) }
    }

    #[cfg(target_feature = "sse4.1")]
    #[inline(always)]
    pub(super) fn select(mask: __m128i, t: __m128i, f: __m128i) -> __m128i {
        unsafe { _mm_blendv_epi8(f, t, mask) }
    }

    #[cfg(not(target_feature = "sse4.1"))]
    #[inline(always)]
    pub(super) fn select(mask: __m128i, t: __m128i, f: __m128i) -> __m128i {
        unsafe { _mm_or_si128(_mm_and_si128(mask, t), _mm_andnot_si128(mask, f)) }
    }

    #[cfg(target_feature = "sse4.1")]
    #[inline(always)]
    fn mullo_epi32(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_mullo_epi32(a, b) }
    }

    #[cfg(not(target_feature = "sse4.1"))]
    #[inline(always)]
    fn mullo_epi32(a: __m128i, b: __m128i) -> __m128i {
        unsafe {
            let even = _mm_mul_epu32(a, b);
            let odd = _mm_mul_epu32(_mm_srli_epi64::<32>(a), _mm_srli_epi64::<32>(b));
            let even = _mm_shuffle_epi32::<0b00_00_10_00>(even);
            let odd = _mm_shuffle_epi32::<0b00_00_10_00>(odd);
            _mm_unpacklo_epi32(even, odd)
        }
    }

    #[cfg(target_feature = "sse4.1")]
    #[inline(always)]
    fn cmpeq_epi64(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_cmpeq_epi64(a, b) }
    }

    #[cfg(not(target_feature = "sse4.1"))]
    #[inline(always)]
    fn cmpeq_epi64(a: __m128i, b: __m128i) -> __m128i {
        unsafe {
            let halves = _mm_cmpeq_epi32(a, b);
            _mm_and_si128(halves, _mm_shuffle_epi32::<0b10_11_00_01>(halves))
        }
    }

    /// Sign bit of every lane of `kind`.
    #[inline(always)]
    fn sign_bits(kind: ElemKind) -> __m128i {
        unsafe {
            match kind.bytes() {
                1 => _mm_set1_epi8(i8::MIN),
                2 => _mm_set1_epi16(i16::MIN),
                4 => _mm_set1_epi32(i32::MIN),
                _ => _mm_set1_epi64x(i64::MIN),
            }
        }
    }

    pub(super) fn binary(op: BinaryOp, kind: ElemKind, a: __m128i, b: __m128i) -> Option<__m128i> {
        use BinaryOp::*;
        use ElemKind::*;
        unsafe {
            Some(match (op, kind) {
                (And, _) => _mm_and_si128(a, b),
                (Or, _) => _mm_or_si128(a, b),
                (Xor, _) => _mm_xor_si128(a, b),

                (Add | SatAdd, F32) => from_ps(_mm_add_ps(as_ps(a), as_ps(b))),
                (Sub | SatSub, F32) => from_ps(_mm_sub_ps(as_ps(a), as_ps(b))),
                (Mul, F32) => from_ps(_mm_mul_ps(as_ps(a), as_ps(b))),
                (Div, F32) => from_ps(_mm_div_ps(as_ps(a), as_ps(b))),
                (Min, F32) => from_ps(_mm_min_ps(as_ps(a), as_ps(b))),
                (Max, F32) => from_ps(_mm_max_ps(as_ps(a), as_ps(b))),
                (Add | SatAdd, F64) => from_pd(_mm_add_pd(as_pd(a), as_pd(b))),
                (Sub | SatSub, F64) => from_pd(_mm_sub_pd(as_pd(a), as_pd(b))),
                (Mul, F64) => from_pd(_mm_mul_pd(as_pd(a), as_pd(b))),
                (Div, F64) => from_pd(_mm_div_pd(as_pd(a), as_pd(b))),
                (Min, F64) => from_pd(_mm_min_pd(as_pd(a), as_pd(b))),
                (Max, F64) => from_pd(_mm_max_pd(as_pd(a), as_pd(b))),

                (Add, U8 | I8) => _mm_add_epi8(a, b),
                (Add, U16 | I16) => _mm_add_epi16(a, b),
                (Add, U32 | I32) => _mm_add_epi32(a, b),
                (Add, U64 | I64) => _mm_add_epi64(a, b),
                (Sub, U8 | I8) => _mm_sub_epi8(a, b),
                (Sub, U16 | I16) => _mm_sub_epi16(a, b),
                (Sub, U32 | I32) => _mm_sub_epi32(a, b),
                (Sub, U64 | I64) => _mm_sub_epi64(a, b),
                (Mul, U16 | I16) => _mm_mullo_epi16(a, b),
                (Mul, U32 | I32) => mullo_epi32(a, b),

                (SatAdd, U8) => _mm_adds_epu8(a, b),
                (SatAdd, I8) => _mm_adds_epi8(a, b),
                (SatAdd, U16) => _mm_adds_epu16(a, b),
                (SatAdd, I16) => _mm_adds_epi16(a, b),
                (SatSub, U8) => _mm_subs_epu8(a, b),
                (SatSub, I8) => _mm_subs_epi8(a, b),
                (SatSub, U16) => _mm_subs_epu16(a, b),
                (SatSub, I16) => _mm_subs_epi16(a, b),
                (SatAdd, U32) => {
                    // the sum wrapped exactly when it came out below `a`
                    let sum = _mm_add_epi32(a, b);
                    _mm_or_si128(sum, cmpgt(U32, a, sum)?)
                }
                (SatSub, U32) => _mm_andnot_si128(cmpgt(U32, b, a)?, _mm_sub_epi32(a, b)),

                (Min, _) => return min_max(false, kind, a, b),
                (Max, _) => return min_max(true, kind, a, b),
                _ => return None,
            })
        }
    }

    fn min_max(max: bool, kind: ElemKind, a: __m128i, b: __m128i) -> Option<__m128i> {
        use ElemKind::*;
        unsafe {
            Some(match (kind, max) {
                (U8, false) => _mm_min_epu8(a, b),
                (U8, true) => _mm_max_epu8(a, b),
                (I16, false) => _mm_min_epi16(a, b),
                (I16, true) => _mm_max_epi16(a, b),
                #[cfg(target_feature = "sse4.1")]
                (I8, false) => _mm_min_epi8(a, b),
                #[cfg(target_feature = "sse4.1")]
                (I8, true) => _mm_max_epi8(a, b),
                #[cfg(target_feature = "sse4.1")]
                (U16, false) => _mm_min_epu16(a, b),
                #[cfg(target_feature = "sse4.1")]
                (U16, true) => _mm_max_epu16(a, b),
                #[cfg(target_feature = "sse4.1")]
                (I32, false) => _mm_min_epi32(a, b),
                #[cfg(target_feature = "sse4.1")]
                (I32, true) => _mm_max_epi32(a, b),
                #[cfg(target_feature = "sse4.1")]
                (U32, false) => _mm_min_epu32(a, b),
                #[cfg(target_feature = "sse4.1")]
                (U32, true) => _mm_max_epu32(a, b),
                #[cfg(not(target_feature = "sse4.1"))]
                (I8, _) => {
                    // flipping the sign bit maps signed order onto unsigned order
                    let bias = sign_bits(I8);
                    let (x, y) = (_mm_xor_si128(a, bias), _mm_xor_si128(b, bias));
                    let r = if max { _mm_max_epu8(x, y) } else { _mm_min_epu8(x, y) };
                    _mm_xor_si128(r, bias)
                }
                #[cfg(not(target_feature = "sse4.1"))]
                (U16, _) => {
                    let bias = sign_bits(U16);
                    let (x, y) = (_mm_xor_si128(a, bias), _mm_xor_si128(b, bias));
                    let r = if max { _mm_max_epi16(x, y) } else { _mm_min_epi16(x, y) };
                    _mm_xor_si128(r, bias)
                }
                _ => {
                    let gt = cmpgt(kind, a, b)?;
                    if max {
                        select(gt, a, b)
                    } else {
                        select(gt, b, a)
                    }
                }
            })
        }
    }

    /// Lane-wise `a > b` as an all-ones/all-zeros register.
    pub(super) fn cmpgt(kind: ElemKind, a: __m128i, b: __m128i) -> Option<__m128i> {
        use ElemKind::*;
        unsafe {
            Some(match kind {
                I8 => _mm_cmpgt_epi8(a, b),
                I16 => _mm_cmpgt_epi16(a, b),
                I32 => _mm_cmpgt_epi32(a, b),
                #[cfg(target_feature = "sse4.2")]
                I64 => _mm_cmpgt_epi64(a, b),
                #[cfg(not(target_feature = "sse4.2"))]
                I64 => return None,
                U8 | U16 | U32 | U64 => {
                    let bias = sign_bits(kind);
                    let signed = kind.signed().unwrap_or(kind);
                    return cmpgt(signed, _mm_xor_si128(a, bias), _mm_xor_si128(b, bias));
                }
                F32 => from_ps(_mm_cmpgt_ps(as_ps(a), as_ps(b))),
                F64 => from_pd(_mm_cmpgt_pd(as_pd(a), as_pd(b))),
            })
        }
    }

    fn cmpeq(kind: ElemKind, a: __m128i, b: __m128i) -> __m128i {
        unsafe {
            match kind {
                ElemKind::F32 => from_ps(_mm_cmpeq_ps(as_ps(a), as_ps(b))),
                ElemKind::F64 => from_pd(_mm_cmpeq_pd(as_pd(a), as_pd(b))),
                _ => match kind.bytes() {
                    1 => _mm_cmpeq_epi8(a, b),
                    2 => _mm_cmpeq_epi16(a, b),
                    4 => _mm_cmpeq_epi32(a, b),
                    _ => cmpeq_epi64(a, b),
                },
            }
        }
    }

    pub(super) fn compare(op: CmpOp, kind: ElemKind, a: __m128i, b: __m128i) -> Option<__m128i> {
        unsafe {
            match kind {
                ElemKind::F32 => {
                    let (x, y) = (as_ps(a), as_ps(b));
                    return Some(from_ps(match op {
                        CmpOp::Eq => _mm_cmpeq_ps(x, y),
                        CmpOp::Ne => _mm_cmpneq_ps(x, y),
                        CmpOp::Lt => _mm_cmplt_ps(x, y),
                        CmpOp::Le => _mm_cmple_ps(x, y),
                        CmpOp::Gt => _mm_cmpgt_ps(x, y),
                        CmpOp::Ge => _mm_cmpge_ps(x, y),
                    }));
                }
                ElemKind::F64 => {
                    let (x, y) = (as_pd(a), as_pd(b));
                    return Some(from_pd(match op {
                        CmpOp::Eq => _mm_cmpeq_pd(x, y),
                        CmpOp::Ne => _mm_cmpneq_pd(x, y),
                        CmpOp::Lt => _mm_cmplt_pd(x, y),
                        CmpOp::Le => _mm_cmple_pd(x, y),
                        CmpOp::Gt => _mm_cmpgt_pd(x, y),
                        CmpOp::Ge => _mm_cmpge_pd(x, y),
                    }));
                }
                _ => {}
            }
            Some(match op {
                CmpOp::Eq => cmpeq(kind, a, b),
                CmpOp::Ne => _mm_xor_si128(cmpeq(kind, a, b), ones()),
                CmpOp::Gt => cmpgt(kind, a, b)?,
                CmpOp::Lt => cmpgt(kind, b, a)?,
                CmpOp::Le => _mm_xor_si128(cmpgt(kind, a, b)?, ones()),
                CmpOp::Ge => _mm_xor_si128(cmpgt(kind, b, a)?, ones()),
            })
        }
    }

    /// Collapses a compare result to one bit per lane.
    pub(super) fn movemask(m: __m128i, lane_bytes: usize) -> u64 {
        unsafe {
            let bits = match lane_bytes {
                1 => _mm_movemask_epi8(m),
                2 => _mm_movemask_epi8(_mm_packs_epi16(m, _mm_setzero_si128())) & 0xFF,
                4 => _mm_movemask_ps(_mm_castsi128_ps(m)),
                _ => _mm_movemask_pd(_mm_castsi128_pd(m)),
            };
            bits as u32 as u64
        }
    }

    /// Inverse of [`movemask`]: one bit per lane to all-ones/all-zeros lanes.
    pub(super) fn expand(bits: u64, lane_bytes: usize) -> __m128i {
        unsafe {
            match lane_bytes {
                1 => {
                    let lo = (bits & 0xFF).wrapping_mul(0x0101_0101_0101_0101);
                    let hi = ((bits >> 8) & 0xFF).wrapping_mul(0x0101_0101_0101_0101);
                    let v = _mm_set_epi64x(hi as i64, lo as i64);
                    let sel = _mm_set1_epi64x(0x8040_2010_0804_0201_u64 as i64);
                    _mm_cmpeq_epi8(_mm_and_si128(v, sel), sel)
                }
                2 => {
                    let sel = _mm_setr_epi16(1, 2, 4, 8, 16, 32, 64, 128);
                    let v = _mm_set1_epi16(bits as i16);
                    _mm_cmpeq_epi16(_mm_and_si128(v, sel), sel)
                }
                4 => {
                    let sel = _mm_setr_epi32(1, 2, 4, 8);
                    let v = _mm_set1_epi32(bits as i32);
                    _mm_cmpeq_epi32(_mm_and_si128(v, sel), sel)
                }
                _ => _mm_set_epi64x(-(((bits >> 1) & 1) as i64), -((bits & 1) as i64)),
            }
        }
    }

    pub(super) fn unary(op: UnaryOp, kind: ElemKind, a: __m128i) -> Option<__m128i> {
        use ElemKind::*;
        unsafe {
            let zero = _mm_setzero_si128();
            Some(match (op, kind) {
                (UnaryOp::Not, _) => _mm_xor_si128(a, ones()),
                (UnaryOp::Neg, F32 | F64) => _mm_xor_si128(a, sign_bits(kind)),
                (UnaryOp::Neg, U8 | I8) => _mm_sub_epi8(zero, a),
                (UnaryOp::Neg, U16 | I16) => _mm_sub_epi16(zero, a),
                (UnaryOp::Neg, U32 | I32) => _mm_sub_epi32(zero, a),
                (UnaryOp::Neg, U64 | I64) => _mm_sub_epi64(zero, a),
                (UnaryOp::Abs, F32 | F64) => _mm_andnot_si128(sign_bits(kind), a),
                (UnaryOp::Abs, U8 | U16 | U32 | U64) => a,
                (UnaryOp::Abs, I8) => {
                    let sign = _mm_cmpgt_epi8(zero, a);
                    _mm_sub_epi8(_mm_xor_si128(a, sign), sign)
                }
                (UnaryOp::Abs, I16) => {
                    let sign = _mm_srai_epi16::<15>(a);
                    _mm_sub_epi16(_mm_xor_si128(a, sign), sign)
                }
                (UnaryOp::Abs, I32) => {
                    let sign = _mm_srai_epi32::<31>(a);
                    _mm_sub_epi32(_mm_xor_si128(a, sign), sign)
                }
                (UnaryOp::Sqrt, F32) => from_ps(_mm_sqrt_ps(as_ps(a))),
                (UnaryOp::Sqrt, F64) => from_pd(_mm_sqrt_pd(as_pd(a))),
                _ => return None,
            })
        }
    }

    #[cfg(target_feature = "fma")]
    pub(super) fn fused_float(op: FusedOp, kind: ElemKind, a: __m128i, b: __m128i, c: __m128i) -> Option<__m128i> {
        unsafe {
            Some(match (op, kind) {
                (FusedOp::MulAdd, ElemKind::F32) => from_ps(_mm_fmadd_ps(as_ps(a), as_ps(b), as_ps(c))),
                (FusedOp::MulSub, ElemKind::F32) => from_ps(_mm_fmsub_ps(as_ps(a), as_ps(b), as_ps(c))),
                (FusedOp::MulAdd, ElemKind::F64) => from_pd(_mm_fmadd_pd(as_pd(a), as_pd(b), as_pd(c))),
                (FusedOp::MulSub, ElemKind::F64) => from_pd(_mm_fmsub_pd(as_pd(a), as_pd(b), as_pd(c))),
                _ => return None,
            })
        }
    }

    // Without FMA hardware a mul followed by an add rounds twice.
    #[cfg(not(target_feature = "fma"))]
    pub(super) fn fused_float(_op: FusedOp, _kind: ElemKind, _a: __m128i, _b: __m128i, _c: __m128i) -> Option<__m128i> {
        None
    }

    fn sll(kind: ElemKind, a: __m128i, count: __m128i) -> Option<__m128i> {
        unsafe {
            Some(match kind.bytes() {
                2 => _mm_sll_epi16(a, count),
                4 => _mm_sll_epi32(a, count),
                8 => _mm_sll_epi64(a, count),
                _ => return None,
            })
        }
    }

    fn srl(kind: ElemKind, a: __m128i, count: __m128i) -> Option<__m128i> {
        unsafe {
            Some(match kind.bytes() {
                2 => _mm_srl_epi16(a, count),
                4 => _mm_srl_epi32(a, count),
                8 => _mm_srl_epi64(a, count),
                _ => return None,
            })
        }
    }

    pub(super) fn shift(op: ShiftOp, kind: ElemKind, a: __m128i, count: u32) -> Option<__m128i> {
        use ElemKind::*;
        let bits = kind.bits();
        let c = count & (bits - 1);
        unsafe {
            let n = _mm_cvtsi32_si128(c as i32);
            // shifting by the full width yields zero, which makes c == 0 a plain copy
            let back = _mm_cvtsi32_si128((bits - c) as i32);
            Some(match (op, kind) {
                (ShiftOp::Left, _) => sll(kind, a, n)?,
                (ShiftOp::Right, U16 | U32 | U64) => srl(kind, a, n)?,
                (ShiftOp::Right, I16) => _mm_sra_epi16(a, n),
                (ShiftOp::Right, I32) => _mm_sra_epi32(a, n),
                (ShiftOp::RotateLeft, _) => _mm_or_si128(sll(kind, a, n)?, srl(kind, a, back)?),
                (ShiftOp::RotateRight, _) => _mm_or_si128(srl(kind, a, n)?, sll(kind, a, back)?),
                _ => return None,
            })
        }
    }

    /// Moves the upper bytes of `v` down by `bytes`, zero-filling the top.
    pub(super) fn shift_bytes_down(v: __m128i, bytes: usize) -> __m128i {
        unsafe {
            match bytes {
                8 => _mm_srli_si128::<8>(v),
                4 => _mm_srli_si128::<4>(v),
                2 => _mm_srli_si128::<2>(v),
                1 => _mm_srli_si128::<1>(v),
                _ => v,
            }
        }
    }

    pub(super) fn convert_same_width(from: ElemKind, to: ElemKind, v: __m128i) -> Option<__m128i> {
        match (from, to) {
            (ElemKind::I32, ElemKind::F32) => Some(from_ps(unsafe { _mm_cvtepi32_ps(v) })),
            _ if !from.is_float() && !to.is_float() && from.bytes() == to.bytes() => Some(v),
            _ => None,
        }
    }

    pub(super) fn widen(from: ElemKind, to: ElemKind, v: __m128i) -> Option<(__m128i, __m128i)> {
        use ElemKind::*;
        unsafe {
            let zero = _mm_setzero_si128();
            Some(match (from, to) {
                (U8, U16) => (_mm_unpacklo_epi8(v, zero), _mm_unpackhi_epi8(v, zero)),
                (U16, U32) => (_mm_unpacklo_epi16(v, zero), _mm_unpackhi_epi16(v, zero)),
                (U32, U64) => (_mm_unpacklo_epi32(v, zero), _mm_unpackhi_epi32(v, zero)),
                (I8, I16) => {
                    let sign = _mm_cmpgt_epi8(zero, v);
                    (_mm_unpacklo_epi8(v, sign), _mm_unpackhi_epi8(v, sign))
                }
                (I16, I32) => {
                    let sign = _mm_srai_epi16::<15>(v);
                    (_mm_unpacklo_epi16(v, sign), _mm_unpackhi_epi16(v, sign))
                }
                (I32, I64) => {
                    let sign = _mm_srai_epi32::<31>(v);
                    (_mm_unpacklo_epi32(v, sign), _mm_unpackhi_epi32(v, sign))
                }
                (F32, F64) => {
                    let x = as_ps(v);
                    (from_pd(_mm_cvtps_pd(x)), from_pd(_mm_cvtps_pd(_mm_movehl_ps(x, x))))
                }
                _ => return None,
            })
        }
    }

    /// Narrows two registers of `from` into one of `to`, truncating.
    pub(super) fn narrow(from: ElemKind, to: ElemKind, lo: __m128i, hi: __m128i) -> Option<__m128i> {
        use ElemKind::*;
        unsafe {
            Some(match (from, to) {
                (U16, U8) | (I16, I8) => {
                    let low_byte = _mm_set1_epi16(0xFF);
                    _mm_packus_epi16(_mm_and_si128(lo, low_byte), _mm_and_si128(hi, low_byte))
                }
                (U32, U16) | (I32, I16) => {
                    // sign-extend the low half so the saturating pack never clamps
                    let l = _mm_srai_epi32::<16>(_mm_slli_epi32::<16>(lo));
                    let h = _mm_srai_epi32::<16>(_mm_slli_epi32::<16>(hi));
                    _mm_packs_epi32(l, h)
                }
                (U64, U32) | (I64, I32) => {
                    let l = _mm_shuffle_epi32::<0b10_00_10_00>(lo);
                    let h = _mm_shuffle_epi32::<0b10_00_10_00>(hi);
                    _mm_unpacklo_epi64(l, h)
                }
                (F64, F32) => from_ps(_mm_movelh_ps(_mm_cvtpd_ps(as_pd(lo)), _mm_cvtpd_ps(as_pd(hi)))),
                _ => return None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_counts() {
        assert_eq!(registers::<u8, 8>(), 0);
        assert_eq!(registers::<u8, 16>(), 1);
        assert_eq!(registers::<f64, 16>(), 8);
        assert_eq!(registers::<u64, 32>(), 0);
    }

    #[test]
    fn mask_expansion_inverts_movemask() {
        for lane_bytes in [1usize, 2, 4, 8] {
            let lanes = REG / lane_bytes;
            let bits = 0xA5A5u64 & crate::lanes::lane_bits(lanes);
            let m = kernel::expand(bits, lane_bytes);
            assert_eq!(kernel::movemask(m, lane_bytes), bits, "{lane_bytes}-byte lanes");
        }
    }

    #[test]
    fn unsigned_saturating_add_u32() {
        let a = [u32::MAX - 1, 5, 0, u32::MAX];
        let b = [5u32, 7, 0, 1];
        assert_eq!(X86::binary(BinaryOp::SatAdd, &a, &b), [u32::MAX, 12, 0, u32::MAX]);
        assert_eq!(X86::binary(BinaryOp::SatSub, &b, &a), [0, 2, 0, 0]);
    }

    #[test]
    fn mul_u32_without_pmulld() {
        let a = [0xFFFF_FFFFu32, 3, 0x1234_5678, 7];
        let b = [2u32, 0x8000_0001, 0x9ABC_DEF0, 0];
        let expect: [u32; 4] = core::array::from_fn(|i| a[i].wrapping_mul(b[i]));
        assert_eq!(X86::binary(BinaryOp::Mul, &a, &b), expect);
    }

    #[test]
    fn signed_min_i8() {
        let a: [i8; 16] = core::array::from_fn(|i| (i as i8 - 8) * 15);
        let b = [0i8; 16];
        let expect: [i8; 16] = core::array::from_fn(|i| a[i].min(0));
        assert_eq!(X86::binary(BinaryOp::Min, &a, &b), expect);
    }

    #[test]
    fn reduction_matches_scalar_tree() {
        let a: [f32; 16] = core::array::from_fn(|i| 0.1 * (i as f32 + 1.0));
        assert_eq!(
            X86::reduce(ReduceOp::Add, &a).to_bits(),
            Scalar::reduce(ReduceOp::Add, &a).to_bits()
        );
        let b: [u16; 32] = core::array::from_fn(|i| (i as u16).wrapping_mul(977));
        assert_eq!(X86::reduce(ReduceOp::Max, &b), Scalar::reduce(ReduceOp::Max, &b));
    }

    #[test]
    fn narrowing_truncates() {
        let a: [u32; 8] = core::array::from_fn(|i| 0x0001_8000 + i as u32);
        let out: [u16; 8] = X86::convert(&a);
        assert_eq!(out, core::array::from_fn(|i| 0x8000 + i as u16));
        let b: [i64; 4] = [-1, 1 << 40, 7, i64::MIN];
        let out: [i32; 4] = X86::convert(&b);
        assert_eq!(out, [-1, 0, 7, 0]);
    }
}
