//! Plugin implementations.
//!
//! `Native` names the best plugin for the compilation target and is the
//! default plugin parameter of every vector.

pub mod scalar;
#[cfg(all(feature = "x86", target_arch = "x86_64"))]
pub mod x86;

pub use scalar::Scalar;
#[cfg(all(feature = "x86", target_arch = "x86_64"))]
pub use x86::X86;

#[cfg(all(feature = "x86", target_arch = "x86_64"))]
pub type Native = X86;

#[cfg(not(all(feature = "x86", target_arch = "x86_64")))]
pub type Native = Scalar;
