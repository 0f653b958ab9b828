//! # lanekit
//!
//! Explicit SIMD vectors with one portable API and per-ISA plugins.
//!
//! A [`Vector<T, N, P>`] is `N` lanes of the scalar type `T`, executed by the
//! plugin `P`. Every operation has a scalar reference definition; the
//! [`Scalar`] plugin implements exactly that, and hardware plugins such as
//! [`X86`](backends::X86) must agree with it bit for bit. Where a hardware
//! plugin has no kernel for an (operation, element kind) pair it defers to
//! the scalar plugin for that one operation.
//!
//! ```
//! use lanekit::prelude::*;
//!
//! let v = U32x8::new([1, 2, 3, 4, 5, 6, 7, 8]);
//! assert_eq!(v.hadd(), 36);
//! let odd = Mask::new([true, false, true, false, true, false, true, false]);
//! assert_eq!(v.hadd_masked(&odd), 16);
//! assert_eq!(v.promote().to_array()[7], 8u64);
//! ```
//!
//! ## Modules
//!
//! - [`element`]: the sealed lane types and their per-lane semantics.
//! - [`vector`]: the vector type, memory access, gather/scatter, swizzles.
//! - [`contract`]: operation families as capability traits.
//! - [`registry`]: compile-time lookup of sibling vector types.
//! - [`plugin`] / [`backends`]: the plugin seam and its implementations.
//! - [`capability`]: which operations each plugin runs natively.
//! - [`cpu`] / [`config`]: compiled-in and detected CPU features.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod backends;
pub mod capability;
pub mod config;
pub mod contract;
mod convert;
pub mod cpu;
pub mod element;
pub mod error;
pub mod lanes;
pub mod mask;
pub mod plugin;
pub mod registry;
pub mod swizzle;
pub mod vector;

pub use backends::{Native, Scalar};
pub use contract::{
    Arithmetic, Bitwise, Comparable, FloatMath, Packable, Reducible, SignedArithmetic, VectorKind,
};
pub use element::{AsLane, Element, FloatElement, IntElement, SignedElement, UnsignedElement};
pub use error::{Error, Result};
pub use mask::Mask;
pub use plugin::Plugin;
pub use registry::TraitRecord;
pub use swizzle::Swizzle;
pub use vector::Vector;

macro_rules! shape_aliases {
    ($($alias:ident = $t:ty, $n:literal;)*) => {
        $(
            #[doc = concat!("`", stringify!($n), "` lanes of `", stringify!($t), "` on the native plugin.")]
            pub type $alias = Vector<$t, $n>;
        )*
    };
}

shape_aliases! {
    U8x16 = u8, 16;
    U8x32 = u8, 32;
    U8x64 = u8, 64;
    I8x16 = i8, 16;
    I8x32 = i8, 32;
    I8x64 = i8, 64;
    U16x8 = u16, 8;
    U16x16 = u16, 16;
    U16x32 = u16, 32;
    U16x64 = u16, 64;
    I16x8 = i16, 8;
    I16x16 = i16, 16;
    I16x32 = i16, 32;
    I16x64 = i16, 64;
    U32x4 = u32, 4;
    U32x8 = u32, 8;
    U32x16 = u32, 16;
    U32x32 = u32, 32;
    I32x4 = i32, 4;
    I32x8 = i32, 8;
    I32x16 = i32, 16;
    I32x32 = i32, 32;
    F32x4 = f32, 4;
    F32x8 = f32, 8;
    F32x16 = f32, 16;
    F32x32 = f32, 32;
    U64x2 = u64, 2;
    U64x4 = u64, 4;
    U64x8 = u64, 8;
    U64x16 = u64, 16;
    I64x2 = i64, 2;
    I64x4 = i64, 4;
    I64x8 = i64, 8;
    I64x16 = i64, 16;
    F64x2 = f64, 2;
    F64x4 = f64, 4;
    F64x8 = f64, 8;
    F64x16 = f64, 16;
}

/// Everything needed to use vectors through the capability traits.
pub mod prelude {
    pub use crate::contract::{
        Arithmetic, Bitwise, Comparable, FloatMath, Packable, Reducible, SignedArithmetic,
        VectorKind,
    };
    pub use crate::mask::Mask;
    pub use crate::swizzle::Swizzle;
    pub use crate::vector::Vector;
    pub use crate::{
        F32x16, F32x32, F32x4, F32x8, F64x16, F64x2, F64x4, F64x8, I16x16, I16x32,
        I16x64, I16x8, I32x16, I32x32, I32x4, I32x8, I64x16, I64x2, I64x4, I64x8, I8x16,
        I8x32, I8x64, U16x16, U16x32, U16x64, U16x8, U32x16, U32x32, U32x4, U32x8,
        U64x16, U64x2, U64x4, U64x8, U8x16, U8x32, U8x64,
    };
}
