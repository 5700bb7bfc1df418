//! Selects the transport backend compiled into the crate.
//!
//! Runs the selection from `src/selection.rs` over the enabled backend
//! features and emits `mysql_generic_backend="<backend>"` so that only the
//! chosen backend module is compiled.

#[allow(dead_code)]
#[path = "src/selection.rs"]
mod selection;

use selection::{
    BACKEND_CFG, Backend, CUSTOM_SOURCE_ENV, FALLBACK_CFG, SHADOWED_ENV, Selection,
    resolve_custom_source,
};
use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo::rerun-if-changed=src/selection.rs");
    println!("cargo::rerun-if-env-changed={CUSTOM_SOURCE_ENV}");

    let values: Vec<String> = Backend::PRIORITY
        .iter()
        .map(|b| format!("\"{}\"", b.cfg_value()))
        .collect();
    println!(
        "cargo::rustc-check-cfg=cfg({BACKEND_CFG}, values({}))",
        values.join(", ")
    );
    println!("cargo::rustc-check-cfg=cfg({FALLBACK_CFG})");

    let selection = Selection::resolve(|b| env::var_os(b.cargo_feature_env()).is_some());

    for diagnostic in selection.diagnostics() {
        println!("cargo::warning={diagnostic}");
    }

    if selection.backend == Backend::Custom {
        install_custom_backend();
    }

    println!(
        "cargo::rustc-cfg={BACKEND_CFG}=\"{}\"",
        selection.backend.cfg_value()
    );
    if selection.is_fallback() {
        println!("cargo::rustc-cfg={FALLBACK_CFG}");
    }

    let shadowed: Vec<&str> = selection.shadowed.iter().map(|b| b.feature()).collect();
    println!("cargo::rustc-env={SHADOWED_ENV}={}", shadowed.join(","));
}

/// Copies the user's backend source into `OUT_DIR` for `backend::custom`.
fn install_custom_backend() {
    let manifest_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set"));
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set"));

    let value = env::var(CUSTOM_SOURCE_ENV).ok();
    let source = match resolve_custom_source(value.as_deref(), &manifest_dir) {
        Ok(source) => source,
        Err(missing) => panic!("{missing}"),
    };

    println!("cargo::rerun-if-changed={}", source.display());
    std::fs::copy(&source, out_dir.join("custom_ethernet.rs"))
        .unwrap_or_else(|e| panic!("failed to copy {}: {e}", source.display()));
}
