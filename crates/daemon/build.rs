// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("cargo:warning=OUT_DIR not set: {e}");
            std::process::exit(1);
        }
    };
    let dest_path = Path::new(&out_dir).join("env_names.rs");

    let mut file = match fs::File::create(&dest_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cargo:warning=failed to create env_names.rs: {e}");
            std::process::exit(1);
        }
    };

    let contents = r#"/// Environment variable: override the computed control address (abstract socket name).
pub const NIMF_CONTROL_ADDRESS: &str = "NIMF_CONTROL_ADDRESS";

/// Environment variable: control handshake timeout in milliseconds.
pub const NIMF_CONTROL_TIMEOUT_MS: &str = "NIMF_CONTROL_TIMEOUT_MS";

/// Environment variable: indicator program and arguments, whitespace separated.
pub const NIMF_INDICATOR_COMMAND: &str = "NIMF_INDICATOR_COMMAND";

/// Environment variable: controls log level filtering (used by tracing-subscriber).
pub const RUST_LOG: &str = "RUST_LOG";

/// Environment variable: GTK input module selection, forced for the daemon process.
pub const GTK_IM_MODULE: &str = "GTK_IM_MODULE";

/// Environment variable: GDK backend selection, forced for the daemon process.
pub const GDK_BACKEND: &str = "GDK_BACKEND";
"#;

    if let Err(e) = file.write_all(contents.as_bytes()) {
        eprintln!("cargo:warning=failed to write env_names.rs: {e}");
        std::process::exit(1);
    }
}
