// Build script for brioctl - embeds version at compile time

fn main() {
    // Release builds may override the version from the environment
    let version =
        std::env::var("BRIO_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=BRIO_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=BRIO_VERSION");
}
