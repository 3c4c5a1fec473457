// ── Application state & window-message state machine ─────────────────────────
//
// A single `App` is created by the platform layer on its own stack frame and
// handed to the window procedure for the lifetime of the window.  All
// mutations happen on the UI thread; there is no global mutable state.
//
// `App::handle` is platform-free: the window procedure translates each Win32
// message into a `Message`, and performs the returned `Action` once its borrow
// of the state has ended.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::Settings,
    display::{Display, FillArea, Point, Rect},
};

// ── Presentation ──────────────────────────────────────────────────────────────

/// How the window is shown. Input only ends the screensaver fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presentation {
    Fullscreen,
    Preview,
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// created → running → destroying → destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Created,
    Running,
    Destroying,
    Destroyed,
}

// ── Messages & actions ────────────────────────────────────────────────────────

/// The window messages the screensaver reacts to, already decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Message {
    Create,
    Size { width: u16, height: u16 },
    /// `parent` is the parent's client rectangle and the screen position of
    /// its client origin, or `None` for a top-level window.
    Paint { parent: Option<(Rect, Point)> },
    /// `cursor` is `None` when the cursor position could not be read.
    MouseMove { cursor: Option<Point> },
    KeyDown,
    SysKeyDown,
    Close,
    Destroy,
    Other,
}

/// What the window procedure must do after `App::handle` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Return 0.
    Handled,
    /// `PostQuitMessage(0)`, then return 0.
    PostQuit,
    /// `DestroyWindow(hwnd)`, then return 0.
    DestroyWindow,
    /// Forward to `DefWindowProcW`.
    Default,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Top-level screensaver state.
///
/// Passed by mutable reference to the message handler so that every handler
/// sees one explicit state root.
pub(crate) struct App {
    presentation: Presentation,
    settings: Settings,
    /// Reference point for mouse-move detection, fixed at startup.
    center: Point,
    /// The run flag. Lowered once by input or close; never raised again.
    running: bool,
    phase: Phase,
    display: Option<Box<dyn Display>>,
    rng: StdRng,
}

impl App {
    pub(crate) fn new(presentation: Presentation, settings: Settings) -> Self {
        Self::with_rng(presentation, settings, StdRng::from_entropy())
    }

    fn with_rng(presentation: Presentation, settings: Settings, rng: StdRng) -> Self {
        Self {
            presentation,
            settings,
            center: settings.center(),
            running: true,
            phase: Phase::Created,
            display: None,
            rng,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Bind an initialised display to this window and start rendering.
    pub(crate) fn attach(&mut self, display: Box<dyn Display>) {
        self.display = Some(display);
        if self.phase == Phase::Created {
            self.phase = Phase::Running;
        }
        log::info!("display attached ({:?})", self.presentation);
    }

    /// Release the surface and then the context. Safe to call repeatedly.
    pub(crate) fn release_display(&mut self) {
        if let Some(mut display) = self.display.take() {
            display.release();
            log::debug!("display released");
        }
    }

    /// Advance the state machine for one window message.
    pub(crate) fn handle(&mut self, msg: Message) -> Action {
        // After WM_DESTROY the window is gone; only default handling remains
        // for whatever still trickles in (WM_NCDESTROY and friends).
        if self.phase == Phase::Destroyed {
            return match msg {
                Message::Other => Action::Default,
                _ => Action::Handled,
            };
        }

        match msg {
            Message::Create => Action::Handled,

            // Preview resizing is not handled; the child keeps its
            // creation-time size.
            Message::Size { width, height } => {
                log::trace!("resize to {width}x{height} ignored");
                Action::Handled
            }

            Message::Paint { parent } => {
                self.render(parent);
                Action::Handled
            }

            Message::MouseMove { cursor } => {
                if self.presentation != Presentation::Fullscreen {
                    return Action::Handled;
                }
                match cursor {
                    Some(pos) if pos != self.center => {
                        log::debug!("cursor at ({}, {}) left centre", pos.x, pos.y);
                        self.shutdown()
                    }
                    Some(_) => Action::Handled,
                    None => {
                        log::warn!("GetCursorPos failed; mouse move ignored");
                        Action::Handled
                    }
                }
            }

            Message::KeyDown | Message::SysKeyDown => {
                if self.presentation == Presentation::Fullscreen {
                    self.shutdown()
                } else {
                    Action::Handled
                }
            }

            Message::Destroy => {
                self.phase = Phase::Destroying;
                self.release_display();
                self.phase = Phase::Destroyed;
                Action::PostQuit
            }

            Message::Close => {
                self.running = false;
                Action::DestroyWindow
            }

            Message::Other => Action::Default,
        }
    }

    /// Lower the run flag and ask for a quit, only on the first request.
    fn shutdown(&mut self) -> Action {
        if !self.running {
            return Action::Handled;
        }
        self.running = false;
        log::info!("input received, shutting down");
        Action::PostQuit
    }

    /// Fill the target area with one random palette index, then pause.
    ///
    /// The colour is only a real colour in palettised (8-bit) modes; at 16
    /// bits the byte lands in the low bits of a packed pixel.
    fn render(&mut self, parent: Option<(Rect, Point)>) {
        if !self.running {
            return;
        }
        let Some(display) = self.display.as_mut() else {
            return;
        };

        let area = FillArea::for_parent(parent);
        let color: u8 = self.rng.gen();
        log::trace!("fill {area:?} with {color}");

        if let Err(e) = display.color_fill(area, color) {
            log::warn!("colour fill failed: {e}");
        }

        std::thread::sleep(self.settings.frame_interval);
    }
}

/// Process exit status for a `WM_QUIT` whose wParam is `wparam`.
///
/// Windows convention: the low 16 bits, read as a signed value.
pub(crate) fn quit_status(wparam: usize) -> i32 {
    i32::from(wparam as u16 as i16)
}

impl Drop for App {
    fn drop(&mut self) {
        self.release_display();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::display::mock::MockDisplay;

    fn settings() -> Settings {
        Settings {
            frame_interval: Duration::ZERO,
            ..Settings::default()
        }
    }

    fn app(presentation: Presentation) -> App {
        App::with_rng(presentation, settings(), StdRng::seed_from_u64(7))
    }

    #[test]
    fn starts_running_in_created_phase() {
        let app = app(Presentation::Fullscreen);
        assert!(app.is_running());
        assert_eq!(app.phase(), Phase::Created);
    }

    #[test]
    fn attach_moves_to_running() {
        let mut app = app(Presentation::Fullscreen);
        let (display, _log) = MockDisplay::new();
        app.attach(Box::new(display));
        assert_eq!(app.phase(), Phase::Running);
    }

    #[test]
    fn create_and_size_are_no_ops() {
        let mut app = app(Presentation::Preview);
        assert_eq!(app.handle(Message::Create), Action::Handled);
        assert_eq!(
            app.handle(Message::Size {
                width: 152,
                height: 112
            }),
            Action::Handled
        );
        assert!(app.is_running());
    }

    #[test]
    fn key_down_shuts_down_exactly_once() {
        let mut app = app(Presentation::Fullscreen);
        assert_eq!(app.handle(Message::KeyDown), Action::PostQuit);
        assert!(!app.is_running());
        assert_eq!(app.handle(Message::KeyDown), Action::Handled);
        assert_eq!(app.handle(Message::SysKeyDown), Action::Handled);
        assert!(!app.is_running());
    }

    #[test]
    fn sys_key_down_shuts_down() {
        let mut app = app(Presentation::Fullscreen);
        assert_eq!(app.handle(Message::SysKeyDown), Action::PostQuit);
        assert!(!app.is_running());
    }

    #[test]
    fn keys_ignored_in_preview() {
        let mut app = app(Presentation::Preview);
        assert_eq!(app.handle(Message::KeyDown), Action::Handled);
        assert_eq!(app.handle(Message::SysKeyDown), Action::Handled);
        assert!(app.is_running());
    }

    #[test]
    fn mouse_at_center_keeps_running() {
        let mut app = app(Presentation::Fullscreen);
        let cursor = Some(Point { x: 320, y: 240 });
        assert_eq!(app.handle(Message::MouseMove { cursor }), Action::Handled);
        assert!(app.is_running());
    }

    #[test]
    fn mouse_away_from_center_shuts_down() {
        let mut app = app(Presentation::Fullscreen);
        let cursor = Some(Point { x: 321, y: 240 });
        assert_eq!(app.handle(Message::MouseMove { cursor }), Action::PostQuit);
        assert!(!app.is_running());
        assert_eq!(app.handle(Message::MouseMove { cursor }), Action::Handled);
    }

    #[test]
    fn unreadable_cursor_is_ignored() {
        let mut app = app(Presentation::Fullscreen);
        assert_eq!(
            app.handle(Message::MouseMove { cursor: None }),
            Action::Handled
        );
        assert!(app.is_running());
    }

    #[test]
    fn mouse_ignored_in_preview() {
        let mut app = app(Presentation::Preview);
        let cursor = Some(Point { x: 0, y: 0 });
        assert_eq!(app.handle(Message::MouseMove { cursor }), Action::Handled);
        assert!(app.is_running());
    }

    #[test]
    fn close_lowers_flag_and_destroys_window() {
        let mut app = app(Presentation::Preview);
        assert_eq!(app.handle(Message::Close), Action::DestroyWindow);
        assert!(!app.is_running());
    }

    #[test]
    fn close_then_destroy_releases_surface_before_context_once() {
        let mut app = app(Presentation::Fullscreen);
        let (display, log) = MockDisplay::new();
        app.attach(Box::new(display));

        assert_eq!(app.handle(Message::Close), Action::DestroyWindow);
        assert_eq!(app.handle(Message::Destroy), Action::PostQuit);
        assert_eq!(app.phase(), Phase::Destroyed);
        assert_eq!(log.borrow().released, ["surface", "context"]);

        // A second destroy neither quits again nor releases anything more.
        assert_eq!(app.handle(Message::Destroy), Action::Handled);
        drop(app);
        assert_eq!(log.borrow().released.len(), 2);
    }

    #[test]
    fn dropping_app_releases_display() {
        let mut app = app(Presentation::Fullscreen);
        let (display, log) = MockDisplay::new();
        app.attach(Box::new(display));
        drop(app);
        assert_eq!(log.borrow().released, ["surface", "context"]);
    }

    #[test]
    fn paint_without_display_is_a_no_op() {
        let mut app = app(Presentation::Fullscreen);
        assert_eq!(app.handle(Message::Paint { parent: None }), Action::Handled);
        assert!(app.is_running());
    }

    #[test]
    fn paint_after_destroy_is_a_no_op() {
        let mut app = app(Presentation::Fullscreen);
        let (display, log) = MockDisplay::new();
        app.attach(Box::new(display));
        app.handle(Message::Destroy);
        app.handle(Message::Paint { parent: None });
        assert!(log.borrow().fills.is_empty());
    }

    #[test]
    fn destroyed_window_ignores_input_and_close() {
        let mut app = app(Presentation::Fullscreen);
        let (display, _log) = MockDisplay::new();
        app.attach(Box::new(display));
        app.handle(Message::Destroy);

        assert_eq!(app.handle(Message::KeyDown), Action::Handled);
        let cursor = Some(Point { x: 1, y: 1 });
        assert_eq!(app.handle(Message::MouseMove { cursor }), Action::Handled);
        assert_eq!(app.handle(Message::Close), Action::Handled);
        assert_eq!(app.handle(Message::Other), Action::Default);
        assert!(app.is_running());
        assert_eq!(app.phase(), Phase::Destroyed);
    }

    #[test]
    fn fullscreen_paint_fills_whole_surface_with_random_index() {
        let mut app = app(Presentation::Fullscreen);
        let (display, log) = MockDisplay::new();
        app.attach(Box::new(display));

        app.handle(Message::Paint { parent: None });

        let expected: u8 = StdRng::seed_from_u64(7).gen();
        assert_eq!(log.borrow().fills, [(FillArea::Whole, expected)]);
    }

    #[test]
    fn preview_paint_fills_parent_region_in_screen_coordinates() {
        let mut app = app(Presentation::Preview);
        let (display, log) = MockDisplay::new();
        app.attach(Box::new(display));

        let client = Rect {
            left: 0,
            top: 0,
            right: 152,
            bottom: 112,
        };
        let origin = Point { x: 10, y: 20 };
        app.handle(Message::Paint {
            parent: Some((client, origin)),
        });

        let log = log.borrow();
        assert_eq!(log.fills.len(), 1);
        assert_eq!(
            log.fills[0].0,
            FillArea::Region(Rect {
                left: 10,
                top: 20,
                right: 162,
                bottom: 132,
            })
        );
    }

    #[test]
    fn failed_fill_keeps_running() {
        let mut app = app(Presentation::Fullscreen);
        let (mut display, log) = MockDisplay::new();
        display.fail_fills = true;
        app.attach(Box::new(display));

        assert_eq!(app.handle(Message::Paint { parent: None }), Action::Handled);
        assert!(app.is_running());
        assert!(log.borrow().fills.is_empty());
    }

    #[test]
    fn paint_after_shutdown_draws_nothing() {
        let mut app = app(Presentation::Fullscreen);
        let (display, log) = MockDisplay::new();
        app.attach(Box::new(display));
        app.handle(Message::KeyDown);
        app.handle(Message::Paint { parent: None });
        assert!(log.borrow().fills.is_empty());
    }

    #[test]
    fn quit_status_uses_low_word_signed() {
        assert_eq!(quit_status(0), 0);
        assert_eq!(quit_status(7), 7);
        assert_eq!(quit_status(0x1_0003), 3);
        assert_eq!(quit_status(0xFFFF), -1);
    }

    #[test]
    fn unhandled_messages_use_default_processing() {
        let mut app = app(Presentation::Fullscreen);
        assert_eq!(app.handle(Message::Other), Action::Default);
    }
}
