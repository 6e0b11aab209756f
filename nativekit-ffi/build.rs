//! Build script for nativekit-ffi.
//!
//! Generates the C header `include/nativekit.h` from the exported items with
//! `cbindgen`, driven by `cbindgen.toml`.
//!
//! # Environment variables
//!
//! - `NATIVEKIT_SKIP_HEADER`: when set (any value), header generation is
//!   skipped entirely. Useful for docs.rs and sandboxed builds.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=NATIVEKIT_SKIP_HEADER");
    println!("cargo:rerun-if-env-changed=DOCS_RS");

    if env::var_os("NATIVEKIT_SKIP_HEADER").is_some() || env::var_os("DOCS_RS").is_some() {
        return;
    }

    let crate_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let include_dir = crate_dir.join("include");
    if let Err(e) = fs::create_dir_all(&include_dir) {
        println!("cargo:warning=cannot create {}: {e}", include_dir.display());
        return;
    }

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")).unwrap_or_default();

    // Header failures are warnings only.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(include_dir.join("nativekit.h"));
        }
        Err(e) => println!("cargo:warning=skipping nativekit.h generation: {e}"),
    }
}
