//! Generates `todo_client.h` from the `extern "C"` surface.
//!
//! The header lands in `OUT_DIR`. Set `TODO_CLIENT_HEADER_DIR` to also copy
//! it somewhere a C build can pick it up. Header generation never fails the
//! build; problems are reported as cargo warnings.

use std::env;
use std::path::PathBuf;

const HEADER: &str = "todo_client.h";
const EXPORT_DIR_ENV: &str = "TODO_CLIENT_HEADER_DIR";

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-env-changed={EXPORT_DIR_ENV}");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=C header not generated: cargo build environment missing");
        return;
    };
    let out = PathBuf::from(out_dir).join(HEADER);

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("TODO_CLIENT_H".to_string()),
        cpp_compat: true,
        ..Default::default()
    };

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=C header not generated: {e}");
            return;
        }
    };
    bindings.write_to_file(&out);

    if let Ok(dir) = env::var(EXPORT_DIR_ENV) {
        let dir = PathBuf::from(dir);
        let copied = std::fs::create_dir_all(&dir).and_then(|_| std::fs::copy(&out, dir.join(HEADER)));
        if let Err(e) = copied {
            println!("cargo:warning=C header not copied to {}: {e}", dir.display());
        }
    }
}
