// Bakes the reported `--version` string into the binary

fn main() {
    // MCASTCTL_VERSION lets packagers stamp a release string; the crate version is the fallback
    let version =
        std::env::var("MCASTCTL_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=MCASTCTL_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=MCASTCTL_VERSION");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
