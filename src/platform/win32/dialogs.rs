// ── Message boxes ──────────────────────────────────────────────────────────────
//
// The two dialogs Flicker ever shows: the fatal-error box used by `main`, and
// the notice shown for `/c` since there is nothing to configure.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::time::Duration;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::HWND,
        UI::WindowsAndMessaging::{
            MessageBoxW, MB_ICONERROR, MB_OK, MB_SYSTEMMODAL, MB_TOPMOST,
        },
    },
};

use crate::notify::{self, Wait};

// ── Error dialog ──────────────────────────────────────────────────────────────

/// Show a modal error dialog with the given message.
///
/// The dialog runs on its own thread; the caller waits at most `timeout` and
/// then carries on, leaving the box on screen.
pub(crate) fn show_error_dialog(message: &str, timeout: Duration) {
    let msg_wide = to_wide(message);

    let wait = notify::run_bounded(timeout, move || {
        // SAFETY: msg_wide is a valid null-terminated UTF-16 string owned by
        // this closure for the duration of the MessageBoxW call.
        // HWND::default() (null) means the dialog has no owner window.
        // Return value (button pressed) is intentionally unused.
        unsafe {
            let _ = MessageBoxW(
                HWND::default(),
                PCWSTR(msg_wide.as_ptr()),
                w!("Flicker"),
                MB_OK | MB_ICONERROR | MB_TOPMOST | MB_SYSTEMMODAL,
            );
        }
    });

    if wait != Wait::Completed {
        log::debug!("error dialog wait ended with {wait:?}");
    }
}

// ── Configure notice ──────────────────────────────────────────────────────────

/// Display the "nothing to configure" notice and wait for the user.
pub(crate) fn show_config_notice() {
    // SAFETY: both strings are `w!` literals with static lifetime.
    // Return value (button pressed) is intentionally unused.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            w!("No configuration available."),
            w!("Screensaver"),
            MB_OK,
        );
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
