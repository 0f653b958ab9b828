//! Errors for the checked entry points.
//!
//! Most contract violations (lane index out of range, shift too wide,
//! integer division by zero) are debug assertions, not errors. This type
//! covers the few places where a caller can ask to be told instead.

use crate::cpu::CpuFeatures;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Swizzle index `index` at `lane` does not address one of `lanes` lanes.
    SwizzleIndex { lane: usize, index: u8, lanes: usize },
    /// A load needed `needed` elements but the slice held `got`.
    SliceTooShort { needed: usize, got: usize },
    /// The running CPU lacks features the crate was compiled for.
    UnsupportedCpu { missing: CpuFeatures },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SwizzleIndex { lane, index, lanes } => {
                write!(f, "swizzle index {index} at lane {lane} is out of range for {lanes} lanes")
            }
            Error::SliceTooShort { needed, got } => {
                write!(f, "slice too short: need {needed} elements, got {got}")
            }
            Error::UnsupportedCpu { missing } => {
                write!(f, "CPU is missing compiled-in features: {missing:?}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
