//! Prints what this build of lanekit runs on: the native plugin, compiled
//! and detected CPU features, the sibling registry, and which operations
//! fall back to the scalar emulation.

use anyhow::Context;
use lanekit::capability::ElemKind;
use lanekit::{config, cpu, Native};
use log::info;
use serde_json::{json, Value};

fn registry_table() -> Value {
    let name = |kind: Option<ElemKind>| kind.map(ElemKind::name);
    ElemKind::ALL
        .iter()
        .map(|&kind| {
            json!({
                "kind": kind.name(),
                "signed": name(kind.signed()),
                "unsigned": name(kind.unsigned()),
                "float": name(kind.float()),
                "narrower": name(kind.narrower()),
                "wider": name(kind.wider()),
            })
        })
        .collect()
}

fn emulation_table() -> Value {
    ElemKind::ALL
        .iter()
        .map(|&kind| {
            let ops: Vec<String> = config::emulated_ops::<Native>(kind).map(|op| op.to_string()).collect();
            json!({ "kind": kind.name(), "emulated": ops })
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let build = config::BUILD;
    let detected = cpu::detected();
    let missing = build.target_features.difference(detected);
    info!("native plugin: {} ({} byte registers)", build.plugin, build.register_bytes);
    info!("detected CPU features: {:?}", detected);

    let report = json!({
        "build": build,
        "detected": detected,
        "missing": missing,
        "registry": registry_table(),
        "emulation": emulation_table(),
    });
    let text = serde_json::to_string_pretty(&report).context("Failed to serialize probe report")?;
    println!("{}", text);

    cpu::verify().context("This binary was compiled for CPU features the running machine lacks")?;
    Ok(())
}
