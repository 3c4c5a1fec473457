// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface that `main` uses to talk to the OS.  No
// `unsafe` lives here; all Win32 FFI is confined to the `win32` sub-module and
// never leaks outward.  On other hosts every entry point reports
// `SaverError::Unsupported` so the platform-free modules still build and test.

use crate::{config::Settings, error::Result};

#[cfg(windows)]
pub mod win32;

/// Run fullscreen until user input ends the screensaver.
///
/// Returns the process exit code carried by the final `WM_QUIT`.
#[cfg(windows)]
pub(crate) fn run_fullscreen(settings: Settings) -> Result<i32> {
    win32::window::run_fullscreen(settings)
}

/// Draw inside the preview box identified by the raw handle `parent`.
#[cfg(windows)]
pub(crate) fn run_preview(parent: isize, settings: Settings) -> Result<i32> {
    win32::window::run_preview(parent, settings)
}

/// Tell the user there is nothing to configure.
#[cfg(windows)]
pub(crate) fn show_config_notice() {
    win32::dialogs::show_config_notice();
}

/// Show a fatal error to the user, waiting at most `settings.dialog_timeout`.
#[cfg(windows)]
pub(crate) fn report_error(message: &str, settings: &Settings) {
    win32::dialogs::show_error_dialog(message, settings.dialog_timeout);
}

#[cfg(not(windows))]
pub(crate) fn run_fullscreen(_settings: Settings) -> Result<i32> {
    Err(crate::error::SaverError::Unsupported)
}

#[cfg(not(windows))]
pub(crate) fn run_preview(_parent: isize, _settings: Settings) -> Result<i32> {
    Err(crate::error::SaverError::Unsupported)
}

#[cfg(not(windows))]
pub(crate) fn show_config_notice() {
    log::warn!("No configuration available.");
}

#[cfg(not(windows))]
pub(crate) fn report_error(_message: &str, _settings: &Settings) {
    // Already logged by the caller; there is no dialog to show.
}
