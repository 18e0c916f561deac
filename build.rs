//! Build script for oracle-core
//!
//! Exports `ORACLE_BUILD_ID`, the version marker of corpora compiled into the binary
//! (`source::EmbeddedSource`). It combines the package version with the time this script last
//! ran. Cargo reruns it only when `build.rs` or `Cargo.toml` change, or when `ORACLE_BUILD_ID`
//! is set in the environment, so builds that embed a different corpus should set
//! `ORACLE_BUILD_ID` explicitly.

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=ORACLE_BUILD_ID");

    let build_id = match env::var("ORACLE_BUILD_ID") {
        Ok(id) if !id.is_empty() => id,
        _ => {
            let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|since_epoch| since_epoch.as_secs())
                .unwrap_or_default();
            format!("{version}+{stamp}")
        }
    };
    println!("cargo:rustc-env=ORACLE_BUILD_ID={build_id}");
}
