//! Build configuration as seen by the running crate.
//!
//! Everything here is fixed at compile time: which plugin `Native` names,
//! its register width, and which target features the kernels were compiled
//! against. The probe binary serializes it into its report.

use crate::backends::Native;
use crate::capability::{ElemKind, Op};
use crate::cpu::{self, CpuFeatures};
use crate::plugin::Plugin;
use crate::vector::MAX_VECTOR_BYTES;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Name of the `Native` plugin.
    pub plugin: &'static str,
    /// Native register width in bytes; 0 for the scalar plugin.
    pub register_bytes: usize,
    pub max_vector_bytes: usize,
    /// Whether `build.rs` printed emulation diagnostics.
    pub diagnose_emulation: bool,
    pub target_features: CpuFeatures,
}

pub const BUILD: BuildConfig = BuildConfig {
    plugin: Native::NAME,
    register_bytes: Native::REGISTER_BYTES,
    max_vector_bytes: MAX_VECTOR_BYTES,
    diagnose_emulation: cfg!(lanekit_diagnose),
    target_features: cpu::compiled(),
};

/// Operations on `kind` that plugin `P` services through the scalar
/// emulation in this build.
pub fn emulated_ops<P: Plugin>(kind: ElemKind) -> impl Iterator<Item = Op> {
    Op::for_kind(kind).filter(move |op| !P::native(*op, kind))
}
