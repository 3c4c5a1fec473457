// ── Fixed settings ────────────────────────────────────────────────────────────
//
// Flicker has no configuration UI and persists nothing.  The constants that
// shape a run are collected here so the platform layer and the tests read
// them from one place.

use std::time::Duration;

use crate::display::Point;

/// Display mode and timing used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settings {
    /// Fullscreen display width in pixels.
    pub(crate) width: u32,
    /// Fullscreen display height in pixels.
    pub(crate) height: u32,
    /// Fullscreen colour depth. 8-bit content doesn't need 32.
    pub(crate) bits_per_pixel: u32,
    /// Pause after every frame. A crude throttle, not a frame clock.
    pub(crate) frame_interval: Duration,
    /// How long the caller waits for a modal error dialog before moving on.
    pub(crate) dialog_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            bits_per_pixel: 16,
            frame_interval: Duration::from_millis(100),
            dialog_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Screen centre of the fullscreen mode, computed once at startup.
    ///
    /// Mouse movement is detected by comparing the cursor against this point.
    pub(crate) fn center(&self) -> Point {
        Point {
            x: (self.width / 2) as i32,
            y: (self.height / 2) as i32,
        }
    }
}
