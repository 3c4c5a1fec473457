// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 and
// DirectDraw FFI). Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]
// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// Off Windows only the platform-free core is reachable (from its tests).
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod config;
mod display;
mod error;
mod mode;
mod notify;
mod platform;

use config::Settings;
use error::Result;
use mode::Mode;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::default();

    let code = match launch(settings) {
        Ok(code) => code,
        Err(e) => {
            // Setup failed, or the command line made no sense. Report once,
            // then exit with a status that identifies the failure.
            log::error!("{e}");
            platform::report_error(&e.to_string(), &settings);
            e.exit_code()
        }
    };

    log::debug!("exiting with status {code}");
    std::process::exit(code);
}

/// Pick the mode from the command line and run it to completion.
fn launch(settings: Settings) -> Result<i32> {
    let args = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned());
    let mode = Mode::from_args(args)?;
    log::info!("starting in {mode:?} mode");

    match mode {
        Mode::Run => platform::run_fullscreen(settings),
        Mode::Preview { parent } => platform::run_preview(parent, settings),
        Mode::Configure => {
            platform::show_config_notice();
            Ok(0)
        }
    }
}
