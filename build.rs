// build.rs

use std::env;

#[allow(dead_code)]
#[path = "src/capability.rs"]
mod capability;

use capability::{x86_native, ElemKind, IsaFeatures, Op};

fn main() {
    println!("cargo::rustc-check-cfg=cfg(lanekit_diagnose)");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/capability.rs");

    if env::var_os("CARGO_FEATURE_DIAGNOSE_EMULATION").is_none() {
        return;
    }
    println!("cargo:rustc-cfg=lanekit_diagnose");

    // Target, not host: these describe what the crate is being compiled for.
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let features = env::var("CARGO_CFG_TARGET_FEATURE").unwrap_or_default();
    let x86_plugin = env::var_os("CARGO_FEATURE_X86").is_some();

    if arch != "x86_64" || !x86_plugin {
        println!(
            "cargo:warning=lanekit: no hardware plugin for target `{}`; every operation runs on the scalar plugin",
            arch
        );
        return;
    }

    let isa = IsaFeatures::from_cargo_list(&features);
    for kind in ElemKind::ALL {
        let gaps: Vec<String> = Op::for_kind(kind)
            .filter(|op| !x86_native(*op, kind, isa))
            .map(|op| op.to_string())
            .collect();
        if !gaps.is_empty() {
            println!(
                "cargo:warning=lanekit: x86 {} emulated ({:?}): {}",
                kind.name(),
                isa,
                gaps.join(", ")
            );
        }
    }
    println!("cargo:warning=lanekit: vectors under 16 bytes always use the scalar plugin");
}
