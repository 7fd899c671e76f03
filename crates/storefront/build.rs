//! Build script for storefront crate.
//!
//! Generates content-based hashes for the stylesheet and the client script
//! so templates can cache-bust them with a `?v=` query.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    emit_hash("CSS_HASH", &static_dir.join("css/main.css"));
    emit_hash("JS_HASH", &static_dir.join("js/app.js"));
}

/// Set `var` to the first 8 hex chars of the file's SHA-256.
fn emit_hash(var: &str, path: &Path) {
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);
    println!("cargo:rustc-env={var}={short_hash}");
}
