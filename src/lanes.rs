//! Supported lane counts.
//!
//! A vector's lane count is a const generic restricted to powers of two
//! from 1 to 64 through the sealed [`SupportedLaneCount`] bound.

use crate::element::Element;
use crate::plugin::Plugin;
use crate::registry::Absent;
use crate::vector::Vector;

mod sealed {
    pub trait Sealed {}
}

/// Type-level wrapper for a lane count.
pub struct LaneCount<const N: usize>;

impl<const N: usize> sealed::Sealed for LaneCount<N> {}

/// Implemented only for the lane counts vectors may have.
pub trait SupportedLaneCount: sealed::Sealed {
    /// Lanes in the half-width shape; zero when there is none.
    const HALF: usize;

    /// The vector with half as many lanes of the same element type.
    type HalfVector<T: Element, P: Plugin>;
}

impl SupportedLaneCount for LaneCount<1> {
    const HALF: usize = 0;
    type HalfVector<T: Element, P: Plugin> = Absent;
}

macro_rules! supported_lane_count {
    ($($n:literal => $half:literal),* $(,)?) => {
        $(
            impl SupportedLaneCount for LaneCount<$n> {
                const HALF: usize = $half;
                type HalfVector<T: Element, P: Plugin> = Vector<T, $half, P>;
            }
        )*
    };
}

supported_lane_count!(2 => 1, 4 => 2, 8 => 4, 16 => 8, 32 => 16, 64 => 32);

/// `true` for the lane counts that have a [`SupportedLaneCount`] impl.
pub const fn is_supported(lanes: usize) -> bool {
    lanes.is_power_of_two() && lanes <= 64
}

/// Bit pattern selecting the low `lanes` bits of a `u64`.
pub(crate) const fn lane_bits(lanes: usize) -> u64 {
    if lanes >= 64 {
        u64::MAX
    } else {
        (1u64 << lanes) - 1
    }
}
