// ── Drawing surface abstraction ───────────────────────────────────────────────
//
// Pure Rust geometry plus the `Display` trait the window procedure renders
// through.  The DirectDraw implementation lives in `platform::win32::ddraw`;
// tests substitute a recording mock.

use crate::error::Result;

/// A point in screen or client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

/// An axis-aligned rectangle, right/bottom exclusive (Win32 `RECT` layout).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Rect {
    pub(crate) left: i32,
    pub(crate) top: i32,
    pub(crate) right: i32,
    pub(crate) bottom: i32,
}

impl Rect {
    pub(crate) fn width(&self) -> i32 {
        self.right - self.left
    }

    pub(crate) fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Shift the rectangle by `by`.
    pub(crate) fn offset(self, by: Point) -> Self {
        Self {
            left: self.left + by.x,
            top: self.top + by.y,
            right: self.right + by.x,
            bottom: self.bottom + by.y,
        }
    }

    /// Geometry of a child window covering `parent_window`.
    ///
    /// Child coordinates are relative to the parent's client area, so the
    /// child sits at the origin with the parent's outer size.
    pub(crate) fn covering(parent_window: Rect) -> Self {
        Self {
            left: 0,
            top: 0,
            right: parent_window.width(),
            bottom: parent_window.height(),
        }
    }
}

/// The region a colour fill targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FillArea {
    /// The whole primary surface (fullscreen).
    Whole,
    /// A rectangle in screen coordinates (preview box).
    Region(Rect),
}

impl FillArea {
    /// Work out where to draw this frame.
    ///
    /// `parent` is the parent window's client rectangle together with the
    /// screen position of its client origin. No parent, or a parent whose
    /// client rectangle is empty, means fullscreen.
    pub(crate) fn for_parent(parent: Option<(Rect, Point)>) -> Self {
        match parent {
            Some((client, origin)) if client.right != 0 || client.bottom != 0 => {
                Self::Region(client.offset(origin))
            }
            _ => Self::Whole,
        }
    }
}

/// A display context together with the primary surface it owns.
///
/// Dropping the value must release both; `release` does it eagerly, surface
/// first, and must be idempotent.
pub(crate) trait Display {
    /// Fill `area` of the primary surface with palette index `color`.
    fn color_fill(&mut self, area: FillArea, color: u8) -> Result<()>;

    /// Release the surface, then the context.
    fn release(&mut self);
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording `Display` used by the state-machine tests.

    use std::{cell::RefCell, rc::Rc};

    use super::{Display, FillArea};
    use crate::error::{Result, SaverError};

    /// Everything the mock saw, shared with the test body.
    #[derive(Debug, Default)]
    pub(crate) struct Log {
        pub(crate) fills: Vec<(FillArea, u8)>,
        /// Release calls in order: `"surface"` then `"context"`.
        pub(crate) released: Vec<&'static str>,
    }

    pub(crate) struct MockDisplay {
        log: Rc<RefCell<Log>>,
        live: bool,
        pub(crate) fail_fills: bool,
    }

    impl MockDisplay {
        pub(crate) fn new() -> (Self, Rc<RefCell<Log>>) {
            let log = Rc::new(RefCell::new(Log::default()));
            let display = Self {
                log: Rc::clone(&log),
                live: true,
                fail_fills: false,
            };
            (display, log)
        }
    }

    impl Display for MockDisplay {
        fn color_fill(&mut self, area: FillArea, color: u8) -> Result<()> {
            if self.fail_fills {
                return Err(SaverError::Win32 {
                    function: "Blt",
                    code: 0x8876_0091,
                });
            }
            self.log.borrow_mut().fills.push((area, color));
            Ok(())
        }

        fn release(&mut self) {
            if self.live {
                self.live = false;
                let mut log = self.log.borrow_mut();
                log.released.push("surface");
                log.released.push("context");
            }
        }
    }

    impl Drop for MockDisplay {
        fn drop(&mut self) {
            self.release();
        }
    }
}
