/// Flicker build script.
///
/// The screensaver only does something useful on Windows. Other targets still
/// build (the platform-free modules and their tests compile everywhere), but
/// the resulting binary just reports that the platform is unsupported.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=flicker targets Windows; building a stub binary \
             for CARGO_CFG_TARGET_OS = {target_os:?}"
        );
    }

    println!("cargo:rerun-if-changed=build.rs");
}
