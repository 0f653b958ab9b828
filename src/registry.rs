//! # Trait Registry
//!
//! Compile-time lookup from a vector type to its related types: the matching
//! mask, the half-width shape, and the same-shape vectors over each sibling
//! element type.
//!
//! Siblings that do not exist resolve to [`Absent`]: the wider kind of a
//! 64-bit lane, say, or the wider kind of a 128-byte `u32` vector, whose
//! 32 `u64` lanes would not fit. Conversions bound their target by
//! [`FitsLanes`], which `Absent` never implements, so asking for a missing
//! sibling fails to type-check.

use crate::element::Element;
use crate::lanes::{LaneCount, SupportedLaneCount};
use crate::mask::Mask;
use crate::plugin::Plugin;
use crate::vector::Vector;

/// Marker for a registry entry with no type behind it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Absent {}

/// An element-level registry entry: either a lane type or [`Absent`].
pub trait Sibling: 'static {}

impl Sibling for Absent {}

/// The vector of a sibling at lane count `N`. Resolves to [`Absent`] when `N`
/// lanes of the sibling would exceed
/// [`MAX_VECTOR_BYTES`](crate::vector::MAX_VECTOR_BYTES).
pub trait SiblingAt<const N: usize>: Sibling {
    type Vector<P: Plugin>;
}

impl<const N: usize> SiblingAt<N> for Absent {
    type Vector<P: Plugin> = Absent;
}

/// Lane types of which `N` lanes fit in one vector.
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no vector of this lane count",
    label = "this vector kind has no such sibling type",
    note = "a vector carries at most 128 bytes, and missing siblings resolve to `Absent`"
)]
pub trait FitsLanes<const N: usize>: Element + SiblingAt<N> {}

macro_rules! sibling_table {
    ($($t:ty => [$($fit:literal)*] [$($absent:literal)*];)*) => {
        $(
            impl Sibling for $t {}
            $(
                impl SiblingAt<$fit> for $t {
                    type Vector<P: Plugin> = Vector<$t, $fit, P>;
                }

                impl FitsLanes<$fit> for $t {}
            )*
            $(
                impl SiblingAt<$absent> for $t {
                    type Vector<P: Plugin> = Absent;
                }
            )*
        )*
    };
}

sibling_table! {
    u8 => [1 2 4 8 16 32 64] [];
    i8 => [1 2 4 8 16 32 64] [];
    u16 => [1 2 4 8 16 32 64] [];
    i16 => [1 2 4 8 16 32 64] [];
    u32 => [1 2 4 8 16 32] [64];
    i32 => [1 2 4 8 16 32] [64];
    f32 => [1 2 4 8 16 32] [64];
    u64 => [1 2 4 8 16] [32 64];
    i64 => [1 2 4 8 16] [32 64];
    f64 => [1 2 4 8 16] [32 64];
}

/// Related types of a vector kind.
pub trait TraitRecord {
    type Mask;
    type HalfWidth;
    type Signed;
    type Unsigned;
    type Float;
    type Narrower;
    type Wider;
}

impl<T: Element, P: Plugin, const N: usize> TraitRecord for Vector<T, N, P>
where
    LaneCount<N>: SupportedLaneCount,
    <T as Element>::Signed: SiblingAt<N>,
    <T as Element>::Unsigned: SiblingAt<N>,
    <T as Element>::Float: SiblingAt<N>,
    <T as Element>::Narrower: SiblingAt<N>,
    <T as Element>::Wider: SiblingAt<N>,
{
    type Mask = Mask<N>;
    type HalfWidth = <LaneCount<N> as SupportedLaneCount>::HalfVector<T, P>;
    type Signed = <<T as Element>::Signed as SiblingAt<N>>::Vector<P>;
    type Unsigned = <<T as Element>::Unsigned as SiblingAt<N>>::Vector<P>;
    type Float = <<T as Element>::Float as SiblingAt<N>>::Vector<P>;
    type Narrower = <<T as Element>::Narrower as SiblingAt<N>>::Vector<P>;
    type Wider = <<T as Element>::Wider as SiblingAt<N>>::Vector<P>;
}

pub type MaskOf<V> = <V as TraitRecord>::Mask;
pub type HalfOf<V> = <V as TraitRecord>::HalfWidth;
pub type SignedOf<V> = <V as TraitRecord>::Signed;
pub type UnsignedOf<V> = <V as TraitRecord>::Unsigned;
pub type FloatOf<V> = <V as TraitRecord>::Float;
pub type NarrowerOf<V> = <V as TraitRecord>::Narrower;
pub type WiderOf<V> = <V as TraitRecord>::Wider;
