//! CPU feature flags.
//!
//! `compiled()` reports the ISA extensions this build was compiled against.
//! With `std`, `detected()` reports what the running CPU has and `verify()`
//! checks one against the other.

use crate::capability::IsaFeatures;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CpuFeatures: u32 {
        const SSE2 = 1 << 0;
        const SSE3 = 1 << 1;
        const SSSE3 = 1 << 2;
        const SSE41 = 1 << 3;
        const SSE42 = 1 << 4;
        const AVX = 1 << 5;
        const AVX2 = 1 << 6;
        const FMA = 1 << 7;
        const AVX512F = 1 << 8;
        const AVX512BW = 1 << 9;
        const AVX512DQ = 1 << 10;
        const NEON = 1 << 11;
    }
}

macro_rules! compiled_flags {
    ($($feature:literal => $flag:ident),* $(,)?) => {{
        let mut flags = CpuFeatures::empty();
        $(
            if cfg!(target_feature = $feature) {
                flags = flags.union(CpuFeatures::$flag);
            }
        )*
        flags
    }};
}

/// Features enabled at compile time with `-C target-feature`.
pub const fn compiled() -> CpuFeatures {
    compiled_flags!(
        "sse2" => SSE2,
        "sse3" => SSE3,
        "ssse3" => SSSE3,
        "sse4.1" => SSE41,
        "sse4.2" => SSE42,
        "avx" => AVX,
        "avx2" => AVX2,
        "fma" => FMA,
        "avx512f" => AVX512F,
        "avx512bw" => AVX512BW,
        "avx512dq" => AVX512DQ,
        "neon" => NEON,
    )
}

impl From<CpuFeatures> for IsaFeatures {
    fn from(flags: CpuFeatures) -> Self {
        IsaFeatures {
            sse41: flags.contains(CpuFeatures::SSE41),
            sse42: flags.contains(CpuFeatures::SSE42),
            fma: flags.contains(CpuFeatures::FMA),
        }
    }
}

#[cfg(feature = "std")]
mod runtime {
    use super::CpuFeatures;
    use crate::error::Error;
    use once_cell::sync::Lazy;

    static DETECTED: Lazy<CpuFeatures> = Lazy::new(|| {
        let flags = probe();
        log::debug!("detected CPU features: {:?}", flags);
        flags
    });

    #[cfg(target_arch = "x86_64")]
    fn probe() -> CpuFeatures {
        let mut flags = CpuFeatures::empty();
        flags.set(CpuFeatures::SSE2, std::is_x86_feature_detected!("sse2"));
        flags.set(CpuFeatures::SSE3, std::is_x86_feature_detected!("sse3"));
        flags.set(CpuFeatures::SSSE3, std::is_x86_feature_detected!("ssse3"));
        flags.set(CpuFeatures::SSE41, std::is_x86_feature_detected!("sse4.1"));
        flags.set(CpuFeatures::SSE42, std::is_x86_feature_detected!("sse4.2"));
        flags.set(CpuFeatures::AVX, std::is_x86_feature_detected!("avx"));
        flags.set(CpuFeatures::AVX2, std::is_x86_feature_detected!("avx2"));
        flags.set(CpuFeatures::FMA, std::is_x86_feature_detected!("fma"));
        flags.set(CpuFeatures::AVX512F, std::is_x86_feature_detected!("avx512f"));
        flags.set(CpuFeatures::AVX512BW, std::is_x86_feature_detected!("avx512bw"));
        flags.set(CpuFeatures::AVX512DQ, std::is_x86_feature_detected!("avx512dq"));
        flags
    }

    #[cfg(target_arch = "aarch64")]
    fn probe() -> CpuFeatures {
        let mut flags = CpuFeatures::empty();
        flags.set(CpuFeatures::NEON, std::arch::is_aarch64_feature_detected!("neon"));
        flags
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    fn probe() -> CpuFeatures {
        CpuFeatures::empty()
    }

    /// Features of the running CPU, probed once.
    pub fn detected() -> CpuFeatures {
        *DETECTED
    }

    /// Fails when this build relies on features the running CPU lacks.
    pub fn verify() -> Result<(), Error> {
        let missing = super::compiled().difference(detected());
        if missing.is_empty() {
            return Ok(());
        }
        log::warn!("compiled for CPU features this machine lacks: {:?}", missing);
        Err(Error::UnsupportedCpu { missing })
    }
}

#[cfg(feature = "std")]
pub use runtime::{detected, verify};
