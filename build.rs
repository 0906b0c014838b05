use std::env;
use std::path::Path;

fn main() {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(val) => val,
        Err(_) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR is not set; bundled art path left empty");
            println!("cargo:rustc-env=ARTFETCH_BUNDLED_ASCII_DIR=");
            return;
        }
    };

    // Bundled art directory, used when no installed copy is found at runtime
    let ascii_dir = Path::new(&manifest_dir).join("ascii");
    println!("cargo:rustc-env=ARTFETCH_BUNDLED_ASCII_DIR={}", ascii_dir.display());
    println!("cargo:rerun-if-changed=ascii");
    println!("cargo:rerun-if-changed=config/config.toml");
}
