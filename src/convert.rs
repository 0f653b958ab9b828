//! Precision and type conversions between same-shape sibling vectors.
//!
//! Every conversion is a lane-wise Rust `as` cast: integer narrowing
//! truncates, float to integer saturates with NaN mapping to zero, and
//! float narrowing rounds to nearest. Asking for a sibling the registry
//! marks `Absent` does not compile, and neither does a conversion whose
//! target would exceed the largest vector:
//!
//! ```compile_fail
//! use lanekit::prelude::*;
//!
//! // 32 lanes of u64 is 256 bytes.
//! let _ = U32x32::splat(1).promote();
//! ```

use crate::element::{AsLane, Element};
use crate::plugin::Plugin;
use crate::registry::FitsLanes;
use crate::vector::Vector;

impl<T: Element, const N: usize, P: Plugin> Vector<T, N, P> {
    /// Lane-wise `as` cast to any element type.
    #[inline(always)]
    pub fn cast<U: FitsLanes<N>>(self) -> Vector<U, N, P>
    where
        T: AsLane<U>,
    {
        Vector::from_array(P::convert(&self.lanes))
    }

    /// Converts to the double-width sibling.
    #[inline(always)]
    pub fn promote(self) -> Vector<<T as Element>::Wider, N, P>
    where
        <T as Element>::Wider: FitsLanes<N>,
        T: AsLane<<T as Element>::Wider>,
    {
        self.cast()
    }

    /// Converts to the half-width sibling.
    #[inline(always)]
    pub fn degrade(self) -> Vector<<T as Element>::Narrower, N, P>
    where
        <T as Element>::Narrower: FitsLanes<N>,
        T: AsLane<<T as Element>::Narrower>,
    {
        self.cast()
    }

    #[inline(always)]
    pub fn to_signed(self) -> Vector<<T as Element>::Signed, N, P>
    where
        <T as Element>::Signed: FitsLanes<N>,
        T: AsLane<<T as Element>::Signed>,
    {
        self.cast()
    }

    #[inline(always)]
    pub fn to_unsigned(self) -> Vector<<T as Element>::Unsigned, N, P>
    where
        <T as Element>::Unsigned: FitsLanes<N>,
        T: AsLane<<T as Element>::Unsigned>,
    {
        self.cast()
    }

    #[inline(always)]
    pub fn to_float(self) -> Vector<<T as Element>::Float, N, P>
    where
        <T as Element>::Float: FitsLanes<N>,
        T: AsLane<<T as Element>::Float>,
    {
        self.cast()
    }
}
